// Cartridge integration tests
//
// Each test runs a tiny program that programs the board's registers the way
// a game would, then checks what the CPU and PPU see through the machine.

mod common;

use common::{machine_with, run_frames, RomBuilder, PRG_BANK};

/// Offset of the bank marker inside every 16KB PRG bank
const MARKER: usize = 0x100;

#[test]
fn nrom_prg_ram_survives_reset() {
    // LDA #$5A; STA $6000; JMP $8005
    let image = RomBuilder::new(0, 1, 1)
        .battery()
        .code(0, &[0xA9, 0x5A, 0x8D, 0x00, 0x60, 0x4C, 0x05, 0x80])
        .build();
    let mut machine = machine_with(&image);
    machine.exec(100);
    assert_eq!(machine.peek(0x6000), 0x5A);

    machine.reset();
    assert_eq!(machine.peek(0x6000), 0x5A);
}

#[test]
fn nrom_128_mirrors_prg() {
    let image = RomBuilder::new(0, 1, 1).code(0x1234, &[0xAB]).build();
    let machine = machine_with(&image);
    assert_eq!(machine.peek(0x9234), 0xAB);
    assert_eq!(machine.peek(0xD234), 0xAB);
}

#[test]
fn mmc1_serial_prg_switch() {
    // Five writes of bit 0 to $E000 load PRG bank 2; the code runs from the
    // fixed bank at $C000
    let program = [
        0xA9, 0x00, 0x8D, 0x00, 0xE0, // bit 0 = 0
        0xA9, 0x01, 0x8D, 0x00, 0xE0, // bit 1 = 1
        0xA9, 0x00, 0x8D, 0x00, 0xE0, // bit 2 = 0
        0x8D, 0x00, 0xE0, // bit 3 = 0
        0x8D, 0x00, 0xE0, // bit 4 = 0
        0x4C, 0x15, 0xC0, // JMP $C015
    ];
    let image = RomBuilder::new(1, 4, 1)
        .mark_banks(PRG_BANK, MARKER)
        .code(3 * PRG_BANK, &program)
        .vectors(0xC000, 0xC000, 0xC000)
        .build();
    let mut machine = machine_with(&image);
    assert_eq!(machine.peek(0x8000 + MARKER as u16), 0);
    assert_eq!(machine.peek(0xC000 + MARKER as u16), 3);

    machine.exec(100);
    assert_eq!(machine.peek(0x8000 + MARKER as u16), 2);
    assert_eq!(machine.peek(0xC000 + MARKER as u16), 3);
}

#[test]
fn uxrom_switches_the_low_bank() {
    // LDA #$02; STA $8000; JMP $C005
    let image = RomBuilder::new(2, 4, 0)
        .mark_banks(PRG_BANK, MARKER)
        .code(3 * PRG_BANK, &[0xA9, 0x02, 0x8D, 0x00, 0x80, 0x4C, 0x05, 0xC0])
        .vectors(0xC000, 0xC000, 0xC000)
        .build();
    let mut machine = machine_with(&image);
    machine.exec(100);

    assert_eq!(machine.peek(0x8000 + MARKER as u16), 2);
    assert_eq!(machine.peek(0xC000 + MARKER as u16), 3);

    // CHR-RAM
    machine.ppu_poke(0x0010, 0x99);
    assert_eq!(machine.ppu_peek(0x0010), 0x99);
}

#[test]
fn cnrom_switches_chr() {
    // LDA #$03; STA $8000; JMP $8005
    let image = RomBuilder::new(3, 1, 4)
        .code(0, &[0xA9, 0x03, 0x8D, 0x00, 0x80, 0x4C, 0x05, 0x80])
        .build();
    let mut machine = machine_with(&image);
    assert_eq!(machine.ppu_peek(0x0000), 0);

    machine.exec(100);
    // 8KB bank 3 starts at 1KB bank 24
    assert_eq!(machine.ppu_peek(0x0000), 24);
    assert_eq!(machine.ppu_peek(0x1C00), 31);

    // CHR-ROM ignores writes
    machine.ppu_poke(0x0000, 0xFF);
    assert_eq!(machine.ppu_peek(0x0000), 24);
}

#[test]
fn axrom_switches_32k_and_screen() {
    // LDA #$11; STA $8000; JMP $8005 in every bank
    let image = RomBuilder::new(7, 4, 0)
        .mark_banks(PRG_BANK, MARKER)
        .code_in_every_bank(0, &[0xA9, 0x11, 0x8D, 0x00, 0x80, 0x4C, 0x05, 0x80])
        .build();
    let mut machine = machine_with(&image);
    assert_eq!(machine.peek(0x8000 + MARKER as u16), 0);

    machine.exec(100);
    assert_eq!(machine.peek(0x8000 + MARKER as u16), 2);
    assert_eq!(machine.peek(0xC000 + MARKER as u16), 3);

    // Single-screen: all four nametables are one table
    machine.ppu_poke(0x2000, 0x55);
    assert_eq!(machine.ppu_peek(0x2400), 0x55);
    assert_eq!(machine.ppu_peek(0x2C00), 0x55);
}

#[test]
fn color_dreams_switches_prg_and_chr() {
    // LDA #$21; STA $8000: PRG bank 1, CHR bank 2
    let image = RomBuilder::new(11, 4, 4)
        .mark_banks(PRG_BANK, MARKER)
        .code_in_every_bank(0, &[0xA9, 0x21, 0x8D, 0x00, 0x80, 0x4C, 0x05, 0x80])
        .build();
    let mut machine = machine_with(&image);
    machine.exec(100);

    assert_eq!(machine.peek(0x8000 + MARKER as u16), 2);
    assert_eq!(machine.ppu_peek(0x0000), 16);
    assert_eq!(machine.ppu_peek(0x0400), 17);
}

#[test]
fn gxrom_switches_prg_and_chr() {
    // LDA #$13; STA $8000: PRG bank 1, CHR bank 3
    let image = RomBuilder::new(66, 4, 4)
        .mark_banks(PRG_BANK, MARKER)
        .code_in_every_bank(0, &[0xA9, 0x13, 0x8D, 0x00, 0x80, 0x4C, 0x05, 0x80])
        .build();
    let mut machine = machine_with(&image);
    machine.exec(100);

    assert_eq!(machine.peek(0x8000 + MARKER as u16), 2);
    assert_eq!(machine.ppu_peek(0x0000), 24);
}

#[test]
fn mmc3_scanline_irq_reaches_the_cpu() {
    // Runs from the fixed bank at $E000
    let program = [
        0x78, // SEI
        0xA9, 0x40, 0x8D, 0x17, 0x40, // LDA #$40; STA $4017 (no APU frame IRQ)
        0xA9, 0x08, 0x8D, 0x01, 0x20, // LDA #$08; STA $2001 (show background)
        0xA9, 0x10, 0x8D, 0x00, 0xC0, // LDA #$10; STA $C000 (latch 16)
        0x8D, 0x01, 0xC0, // STA $C001 (reload)
        0x8D, 0x01, 0xE0, // STA $E001 (enable)
        0x58, // CLI
        0x4C, 0x17, 0xE0, // JMP $E017
    ];
    // INC $10; STA $E000; STA $E001; RTI
    let handler = [0xE6, 0x10, 0x8D, 0x00, 0xE0, 0x8D, 0x01, 0xE0, 0x40];

    let image = RomBuilder::new(4, 2, 1)
        .code(0x6000, &program)
        .code(0x6100, &handler)
        .vectors(0xE017, 0xE000, 0xE100)
        .build();
    let mut machine = machine_with(&image);
    run_frames(&mut machine, 2);

    // One IRQ every 17 rendered scanlines, 241 clocked lines per frame
    let irqs = machine.peek(0x0010);
    assert!((20..=30).contains(&irqs), "irqs = {}", irqs);
}

#[test]
fn mmc3_irq_needs_rendering() {
    let program = [
        0x78, // SEI
        0xA9, 0x40, 0x8D, 0x17, 0x40, // LDA #$40; STA $4017
        0xA9, 0x10, 0x8D, 0x00, 0xC0, // LDA #$10; STA $C000
        0x8D, 0x01, 0xC0, // STA $C001
        0x8D, 0x01, 0xE0, // STA $E001
        0x58, // CLI
        0x4C, 0x12, 0xE0, // JMP $E012
    ];
    let handler = [0xE6, 0x10, 0x8D, 0x00, 0xE0, 0x8D, 0x01, 0xE0, 0x40];

    let image = RomBuilder::new(4, 2, 1)
        .code(0x6000, &program)
        .code(0x6100, &handler)
        .vectors(0xE012, 0xE000, 0xE100)
        .build();
    let mut machine = machine_with(&image);
    run_frames(&mut machine, 2);

    assert_eq!(machine.peek(0x0010), 0);
}
