// Machine integration tests
//
// Drive the whole console through the host API with small synthetic
// programs: timing, interrupts, DMA, input, snapshots and output.

mod common;

use common::{machine_with, nrom, run_frames, RomBuilder, FRAME_MICROS};
use madnes::ppu::{CYCLES_PER_FRAME, CYCLES_PER_SCANLINE};
use madnes::{
    keys, CartridgeError, Machine, MachineConfig, Snapshot, SnapshotError, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

/// JMP $8000
const LOOP: [u8; 3] = [0x4C, 0x00, 0x80];

/// Enable the vblank NMI and spin; the handler at $8100 counts NMIs in $10
fn nmi_counter_rom() -> Vec<u8> {
    RomBuilder::new(0, 1, 1)
        // LDA #$80; STA $2000; JMP $8005
        .code(0, &[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80])
        // INC $10; RTI
        .code(0x100, &[0xE6, 0x10, 0x40])
        .vectors(0x8100, 0x8000, 0x8000)
        .build()
}

// ============================================================================
// Timing
// ============================================================================

#[test]
fn exec_tracks_the_cpu_clock() {
    let mut machine = machine_with(&nrom(&LOOP));

    // 60 frames of wall time is 998_340 us = 1_786_801.98 CPU cycles
    let cycles = run_frames(&mut machine, 60);
    assert!(
        (1_786_802..=1_786_804).contains(&cycles),
        "cycles = {}",
        cycles
    );
    assert_eq!(machine.ticks(), cycles);

    // 89_342 dots per frame with rendering off
    assert!((59..=60).contains(&machine.frame_count()));
}

#[test]
fn frame_sized_exec_with_rendering_on() {
    // LDA #$08; STA $2001; JMP $8005
    let mut machine = machine_with(&nrom(&[0xA9, 0x08, 0x8D, 0x01, 0x20, 0x4C, 0x05, 0x80]));

    // Park mid-frame so each call's small drift never crosses a frame edge
    while machine.frame_count() < 1 || machine.bus().ppu().scanline() < 120 {
        machine.step();
    }
    let dot = |m: &Machine| {
        let ppu = m.bus().ppu();
        ppu.scanline() as i64 * CYCLES_PER_SCANLINE as i64 + ppu.cycle() as i64
    };

    let mut lengths = Vec::new();
    for _ in 0..8 {
        let frames = machine.frame_count();
        let start = dot(&machine);
        let cycles = machine.exec(FRAME_MICROS) as i64;

        assert_eq!(machine.frame_count(), frames + 1);
        // Three dots per CPU cycle, minus the drift within the frame
        lengths.push(cycles * 3 - (dot(&machine) - start));
    }

    // Odd frames drop one dot of the pre-render line
    let full = CYCLES_PER_FRAME as i64;
    for pair in lengths.windows(2) {
        assert_eq!(pair[0] + pair[1], 2 * full - 1, "lengths = {:?}", lengths);
        assert!(pair[0] == full || pair[0] == full - 1, "lengths = {:?}", lengths);
    }
}

#[test]
fn exec_zero_time_does_nothing() {
    let mut machine = machine_with(&nrom(&LOOP));
    assert_eq!(machine.exec(0), 0);
    assert_eq!(machine.cpu().pc, 0x8000);
}

#[test]
fn nmi_fires_once_per_vblank() {
    let mut machine = machine_with(&nmi_counter_rom());
    run_frames(&mut machine, 10);

    let frames = machine.frame_count();
    let nmis = machine.peek(0x0010) as u64;
    assert!(frames >= 9, "frames = {}", frames);
    assert!(
        (frames..=frames + 1).contains(&nmis),
        "{} NMIs in {} frames",
        nmis,
        frames
    );
}

#[test]
fn oam_dma_stalls_the_cpu() {
    // LDA #$77; STA $0203; LDA #$02; STA $4014; JMP $800A
    let program = [
        0xA9, 0x77, 0x8D, 0x03, 0x02, 0xA9, 0x02, 0x8D, 0x14, 0x40, 0x4C, 0x0A, 0x80,
    ];
    let mut machine = machine_with(&nrom(&program));

    assert_eq!(machine.step(), Some(2));
    assert_eq!(machine.step(), Some(4));
    assert_eq!(machine.step(), Some(2));
    // STA ends on odd cycle 19: 4 + 514
    assert_eq!(machine.step(), Some(518));
    assert_eq!(machine.cpu().cycles, 7 + 2 + 4 + 2 + 518);
    assert_eq!(machine.bus().ppu().oam()[3], 0x77);
}

// ============================================================================
// Cartridges
// ============================================================================

#[test]
fn rejected_image_keeps_the_running_cartridge() {
    let mut machine = machine_with(&nrom(&LOOP));
    machine.exec(1000);

    let mut bad_magic = nrom(&LOOP);
    bad_magic[0] = b'X';
    assert!(matches!(
        machine.insert_cart(&bad_magic),
        Err(CartridgeError::Malformed(_))
    ));

    let mut truncated = nrom(&LOOP);
    truncated.truncate(1000);
    assert!(matches!(
        machine.insert_cart(&truncated),
        Err(CartridgeError::Malformed(_))
    ));

    let mmc5 = RomBuilder::new(5, 1, 1).build();
    assert_eq!(
        machine.insert_cart(&mmc5),
        Err(CartridgeError::UnsupportedMapper(5))
    );

    assert!(machine.cartridge_inserted());
    assert!(machine.exec(1000) > 0);
}

#[test]
fn inserting_a_new_cartridge_powers_on() {
    // LDA #$42; STA $10; JMP $8004
    let mut machine = machine_with(&nrom(&[0xA9, 0x42, 0x85, 0x10, 0x4C, 0x04, 0x80]));
    machine.exec(100);
    assert_eq!(machine.peek(0x0010), 0x42);

    machine.insert_cart(&nrom(&LOOP)).expect("valid image");
    assert_eq!(machine.peek(0x0010), 0x00, "Power-on clears RAM");
    assert_eq!(machine.ticks(), 0);
}

#[test]
fn reset_keeps_ram_and_restarts() {
    let mut machine = machine_with(&nmi_counter_rom());
    run_frames(&mut machine, 3);
    let nmis = machine.peek(0x0010);
    assert!(nmis > 0);

    machine.reset();
    assert_eq!(machine.cpu().pc, 0x8000);
    assert_eq!(machine.peek(0x0010), nmis);
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn program_reads_the_pad() {
    // Strobe, then store A and B bits in $10 and $11
    let program = [
        0xA9, 0x01, 0x8D, 0x16, 0x40, // LDA #$01; STA $4016
        0xA9, 0x00, 0x8D, 0x16, 0x40, // LDA #$00; STA $4016
        0xAD, 0x16, 0x40, 0x85, 0x10, // LDA $4016; STA $10
        0xAD, 0x16, 0x40, 0x85, 0x11, // LDA $4016; STA $11
        0x4C, 0x14, 0x80, // JMP $8014
    ];
    let mut machine = machine_with(&nrom(&program));
    machine.key_down(keys::A);
    assert_eq!(machine.pad_mask(), 0x01);

    machine.exec(100);
    assert_eq!(machine.peek(0x0010) & 0x01, 1);
    assert_eq!(machine.peek(0x0011) & 0x01, 0);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_restores_into_a_fresh_machine() {
    let mut original = machine_with(&nmi_counter_rom());
    run_frames(&mut original, 5);

    let blob = original.save_snapshot().expect("save").to_bytes();
    run_frames(&mut original, 5);
    let expected = original.save_snapshot().expect("save");

    let snapshot = Snapshot::from_bytes(&blob).expect("parse");
    let mut restored = Machine::new();
    restored
        .load_snapshot(snapshot.version, &snapshot.image)
        .expect("load");
    assert!(restored.cartridge_inserted());

    run_frames(&mut restored, 5);
    let actual = restored.save_snapshot().expect("save");

    assert_eq!(actual.image, expected.image, "Execution diverged after restore");
    assert_eq!(restored.peek(0x0010), original.peek(0x0010));
}

#[test]
fn snapshot_from_another_build_is_rejected() {
    let mut machine = machine_with(&nrom(&LOOP));
    machine.exec(FRAME_MICROS);
    let snapshot = machine.save_snapshot().expect("save");

    let mut blob = snapshot.to_bytes();
    blob[0] ^= 0xFF;
    let foreign = Snapshot::from_bytes(&blob).expect("parse");

    let result = machine.load_snapshot(foreign.version, &foreign.image);
    assert!(matches!(result, Err(SnapshotError::VersionMismatch { .. })));
    assert_eq!(machine.save_snapshot().expect("save").image, snapshot.image);
}

#[test]
fn snapshot_load_keeps_queued_audio() {
    let mut machine = machine_with(&nrom(&LOOP));
    let snapshot = machine.save_snapshot().expect("save");

    machine.exec(FRAME_MICROS);
    let queued = machine.audio_samples().len();
    assert!(queued > 0);

    machine
        .load_snapshot(snapshot.version, &snapshot.image)
        .expect("load");
    assert_eq!(machine.audio_samples().len(), queued);
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn audio_follows_the_configured_rate() {
    let config = MachineConfig {
        sample_rate: 48_000,
        ..MachineConfig::default()
    };
    let mut machine = Machine::with_config(config).expect("valid config");
    machine.insert_cart(&nrom(&LOOP)).expect("valid image");
    machine.exec(FRAME_MICROS);

    // 48000 / 60.1 = ~799 samples per frame
    let samples = machine.audio_samples();
    assert!((780..=820).contains(&samples.len()), "len = {}", samples.len());

    let mut out = vec![0.0; 1024];
    let drained = samples.drain(&mut out);
    assert!(drained > 0);
    assert!(samples.is_empty());
}

#[test]
fn screenshot_is_a_full_frame_png() {
    let mut machine = machine_with(&nrom(&LOOP));
    run_frames(&mut machine, 2);

    let info = machine.display_info();
    assert_eq!(info.width, SCREEN_WIDTH);
    assert_eq!(info.height, SCREEN_HEIGHT);
    assert_eq!(info.frame, machine.frame_count());

    let png_bytes = machine.screenshot_png().expect("encode");
    let decoder = png::Decoder::new(std::io::Cursor::new(png_bytes));
    let reader = decoder.read_info().expect("valid PNG");
    assert_eq!(reader.info().width as usize, SCREEN_WIDTH);
    assert_eq!(reader.info().height as usize, SCREEN_HEIGHT);
}

#[test]
fn trace_machine_logs_the_program() {
    let mut machine = Machine::with_trace(MachineConfig::default()).expect("valid config");
    machine.insert_cart(&nmi_counter_rom()).expect("valid image");
    machine.step();
    machine.step();

    let lines: Vec<String> = machine.hook().entries().map(ToString::to_string).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("8000  A9 80     LDA #$80"));
    assert!(lines[1].starts_with("8002  8D 00 20  STA $2000"));
}
