// Common test utilities for machine-level integration tests
//
// This module builds synthetic iNES images in memory, so most integration
// tests need no ROM files, and runs blargg-style test ROMs when they are
// present on disk.

#![allow(dead_code)]

use madnes::Machine;
use std::fs;
use std::path::Path;

/// 16KB PRG-ROM bank
pub const PRG_BANK: usize = 0x4000;

/// 8KB CHR bank
pub const CHR_BANK: usize = 0x2000;

/// Microseconds in one NTSC frame (29780.5 CPU cycles)
pub const FRAME_MICROS: u32 = 16_639;

/// Maximum number of frames to run a test ROM before timing out
pub const MAX_TEST_FRAMES: u32 = 1200; // ~20 seconds at 60 FPS

/// Builder for in-memory iNES images
///
/// PRG-ROM is filled with NOPs. Vectors are written at the end of every 16KB
/// bank, so they are visible whichever bank a mapper maps at $C000-$FFFF.
/// Each byte of CHR-ROM holds the index of its 1KB bank.
pub struct RomBuilder {
    mapper: u8,
    prg: Vec<u8>,
    chr: Vec<u8>,
    flags6: u8,
}

impl RomBuilder {
    pub fn new(mapper: u8, prg_banks: usize, chr_banks: usize) -> Self {
        RomBuilder {
            mapper,
            prg: vec![0xEA; prg_banks * PRG_BANK],
            chr: (0..chr_banks * CHR_BANK).map(|i| (i / 0x400) as u8).collect(),
            flags6: 0,
        }
        .vectors(0x8000, 0x8000, 0x8000)
    }

    pub fn vertical(mut self) -> Self {
        self.flags6 |= 0x01;
        self
    }

    pub fn battery(mut self) -> Self {
        self.flags6 |= 0x02;
        self
    }

    /// Place bytes at an absolute PRG-ROM offset
    pub fn code(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.prg[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Place bytes at the same offset inside every 16KB bank
    pub fn code_in_every_bank(mut self, offset: usize, bytes: &[u8]) -> Self {
        for bank in 0..self.prg.len() / PRG_BANK {
            let start = bank * PRG_BANK + offset;
            self.prg[start..start + bytes.len()].copy_from_slice(bytes);
        }
        self
    }

    /// Write the bank index at `offset` inside every `unit`-sized PRG chunk
    pub fn mark_banks(mut self, unit: usize, offset: usize) -> Self {
        for bank in 0..self.prg.len() / unit {
            self.prg[bank * unit + offset] = bank as u8;
        }
        self
    }

    pub fn vectors(self, nmi: u16, reset: u16, irq: u16) -> Self {
        let mut table = [0u8; 6];
        table[0..2].copy_from_slice(&nmi.to_le_bytes());
        table[2..4].copy_from_slice(&reset.to_le_bytes());
        table[4..6].copy_from_slice(&irq.to_le_bytes());
        self.code_in_every_bank(PRG_BANK - 6, &table)
    }

    pub fn build(self) -> Vec<u8> {
        let mut data = vec![
            0x4E,
            0x45,
            0x53,
            0x1A,
            (self.prg.len() / PRG_BANK) as u8,
            (self.chr.len() / CHR_BANK) as u8,
            (self.mapper << 4) | self.flags6,
            self.mapper & 0xF0,
        ];
        data.resize(16, 0);
        data.extend(self.prg);
        data.extend(self.chr);
        data
    }
}

/// NROM-128 image running `program` from $8000
pub fn nrom(program: &[u8]) -> Vec<u8> {
    RomBuilder::new(0, 1, 1).code(0, program).build()
}

/// Route `log` output through the test harness (RUST_LOG=debug to see it)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A machine with `image` inserted
pub fn machine_with(image: &[u8]) -> Machine {
    init_logging();
    let mut machine = Machine::new();
    machine
        .insert_cart(image)
        .expect("test image should be accepted");
    machine
}

/// Run whole frames of emulated time
pub fn run_frames(machine: &mut Machine, frames: u32) -> u64 {
    (0..frames).map(|_| machine.exec(FRAME_MICROS) as u64).sum()
}

/// Result of running a test ROM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// Test passed
    Passed,
    /// Test failed with an error code and the ROM's message
    Failed(u8, String),
    /// Test did not finish in time
    Timeout,
}

/// Run a blargg-style ROM that reports through $6000
///
/// $6001-$6003 hold DE B0 61 once the ROM is reporting; $6000 stays $80
/// while running, $81 when it wants a reset, and then holds the result code. The message is a
/// null-terminated string at $6004.
pub fn run_test_rom(path: &Path) -> Result<TestResult, String> {
    let data =
        fs::read(path).map_err(|e| format!("Failed to load ROM from {}: {}", path.display(), e))?;

    init_logging();
    let mut machine = Machine::new();
    machine
        .insert_cart(&data)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    for _ in 0..MAX_TEST_FRAMES {
        machine.exec(FRAME_MICROS);

        let signature = [machine.peek(0x6001), machine.peek(0x6002), machine.peek(0x6003)];
        if signature != [0xDE, 0xB0, 0x61] {
            continue;
        }

        match machine.peek(0x6000) {
            0x80 => continue,
            // The ROM asks for the reset button after a short delay
            0x81 => {
                machine.exec(FRAME_MICROS * 6);
                machine.reset();
            }
            0x00 => return Ok(TestResult::Passed),
            code => return Ok(TestResult::Failed(code, read_string(&machine, 0x6004, 256))),
        }
    }

    Ok(TestResult::Timeout)
}

/// Read a null-terminated string without side effects
pub fn read_string(machine: &Machine, addr: u16, max_len: usize) -> String {
    (0..max_len as u16)
        .map(|i| machine.peek(addr.wrapping_add(i)))
        .take_while(|&byte| byte != 0)
        .filter(|byte| (0x20..=0x7E).contains(byte) || *byte == b'\n')
        .map(char::from)
        .collect()
}

/// Format test result for display
pub fn format_result(result: &TestResult) -> String {
    match result {
        TestResult::Passed => "PASSED".to_string(),
        TestResult::Failed(code, message) => {
            format!("FAILED (error code: ${:02X}) {}", code, message.trim())
        }
        TestResult::Timeout => "TIMEOUT".to_string(),
    }
}
