//! PPU Rendering Tests
//!
//! - Background tiles through the fetch pipeline
//! - Sprite drawing, priority and sprite-0 hit
//! - Sprite overflow and color effects

use super::*;

/// Solid background with rendering on, positioned at the start of frame 1
fn rendering_rig() -> Rig {
    let mut rig = Rig::new();
    rig.setup_solid_background();
    rig.write(PPUMASK, 0x1E);
    rig
}

#[test]
fn test_solid_background() {
    let mut rig = rendering_rig();
    rig.run_until(2, 0, 0);

    assert_eq!(rig.pixel(0, 0), 0x16);
    assert_eq!(rig.pixel(128, 120), 0x16);
    assert_eq!(rig.pixel(255, 239), 0x16);
}

#[test]
fn test_background_disabled_shows_backdrop() {
    let mut rig = Rig::new();
    rig.setup_solid_background();
    rig.write(PPUMASK, 0x10);
    rig.run_until(2, 0, 0);

    assert_eq!(rig.pixel(100, 100), 0x0F);
}

#[test]
fn test_sprite_drawn_one_line_below_oam_y() {
    let mut rig = rendering_rig();
    rig.set_sprite(0, 30, 0x01, 0x00, 40);
    rig.run_until(2, 0, 0);

    assert_eq!(rig.pixel(40, 30), 0x16);
    assert_eq!(rig.pixel(40, 31), 0x2A);
    assert_eq!(rig.pixel(47, 38), 0x2A);
    assert_eq!(rig.pixel(48, 31), 0x16);
    assert_eq!(rig.pixel(40, 39), 0x16);
}

#[test]
fn test_sprite_behind_background() {
    let mut rig = rendering_rig();
    rig.set_sprite(0, 30, 0x01, 0x20, 40);
    rig.run_until(2, 0, 0);

    assert_eq!(rig.pixel(40, 31), 0x16);
}

#[test]
fn test_sprite_zero_hit_timing() {
    let mut rig = rendering_rig();
    rig.set_sprite(0, 30, 0x01, 0x00, 40);

    rig.run_until(1, 31, 41);
    assert!(!rig.ppu.status().contains(PpuStatus::SPRITE_ZERO_HIT));

    rig.step();
    assert!(rig.ppu.status().contains(PpuStatus::SPRITE_ZERO_HIT));
}

#[test]
fn test_sprite_zero_hit_only_for_oam_entry_zero() {
    let mut rig = rendering_rig();
    rig.set_sprite(0, 200, 0x01, 0x00, 40);
    rig.set_sprite(1, 30, 0x01, 0x00, 40);
    rig.run_until(1, 100, 0);

    assert!(!rig.ppu.status().contains(PpuStatus::SPRITE_ZERO_HIT));
}

#[test]
fn test_sprite_overflow() {
    let mut rig = rendering_rig();
    for index in 0..9 {
        rig.set_sprite(index, 50, 0x01, 0x00, index * 10);
    }
    rig.run_until(1, 50, 0);
    assert!(!rig.ppu.status().contains(PpuStatus::SPRITE_OVERFLOW));

    rig.run_until(1, 51, 0);
    assert!(rig.ppu.status().contains(PpuStatus::SPRITE_OVERFLOW));
}

#[test]
fn test_eight_sprites_do_not_overflow() {
    let mut rig = rendering_rig();
    for index in 0..8 {
        rig.set_sprite(index, 50, 0x01, 0x00, index * 10);
    }
    rig.run_until(1, 60, 0);
    assert!(!rig.ppu.status().contains(PpuStatus::SPRITE_OVERFLOW));
}

#[test]
fn test_grayscale() {
    let mut rig = Rig::new();
    rig.setup_solid_background();
    rig.write(PPUMASK, 0x1F);
    rig.run_until(2, 0, 0);

    assert_eq!(rig.pixel(10, 10), 0x16 & 0x30);
}

#[test]
fn test_horizontal_flip() {
    let mut rig = rendering_rig();
    // Tile 2: only the leftmost pixel set
    rig.poke(0x0020, &[0x80; 8]);
    rig.set_sprite(1, 30, 0x02, 0x40, 40);
    rig.run_until(2, 0, 0);

    assert_eq!(rig.pixel(40, 31), 0x16);
    assert_eq!(rig.pixel(47, 31), 0x2A);
}
