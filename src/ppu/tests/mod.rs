//! PPU unit tests
//!
//! Tests drive the PPU through its CPU-facing registers with a CHR-RAM
//! cartridge, organized by functionality.

use super::*;
use crate::cartridge::{Cartridge, Mirroring};

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

pub(crate) const PPUCTRL: u16 = 0x2000;
pub(crate) const PPUMASK: u16 = 0x2001;
pub(crate) const PPUSTATUS: u16 = 0x2002;
pub(crate) const OAMADDR: u16 = 0x2003;
pub(crate) const OAMDATA: u16 = 0x2004;
pub(crate) const PPUSCROLL: u16 = 0x2005;
pub(crate) const PPUADDR: u16 = 0x2006;
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helpers
// ========================================

/// NROM image with 16KB of PRG and 8KB of CHR-RAM
pub(crate) fn chr_ram_cartridge(mirroring: Mirroring) -> Cartridge {
    let flags6 = match mirroring {
        Mirroring::Vertical => 0x01,
        Mirroring::FourScreen => 0x08,
        _ => 0x00,
    };
    let mut rom = vec![0x4E, 0x45, 0x53, 0x1A, 1, 0, flags6, 0];
    rom.resize(16, 0);
    rom.resize(16 + 16 * 1024, 0xEA);
    Cartridge::from_ines_bytes(&rom).unwrap()
}

/// A PPU together with the cartridge the bus would lend it
pub(crate) struct Rig {
    pub ppu: Ppu,
    pub cart: Option<Cartridge>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_mirroring(Mirroring::Horizontal)
    }

    pub fn with_mirroring(mirroring: Mirroring) -> Self {
        Rig {
            ppu: Ppu::new(),
            cart: Some(chr_ram_cartridge(mirroring)),
        }
    }

    pub fn without_cartridge() -> Self {
        Rig {
            ppu: Ppu::new(),
            cart: None,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        self.ppu.write_register(addr, data, &mut self.cart);
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        self.ppu.read_register(addr, &mut self.cart)
    }

    /// Point v at `addr` through $2006
    pub fn set_addr(&mut self, addr: u16) {
        self.write(PPUADDR, (addr >> 8) as u8);
        self.write(PPUADDR, addr as u8);
    }

    /// Write a run of bytes through $2007
    pub fn poke(&mut self, addr: u16, data: &[u8]) {
        self.set_addr(addr);
        for &byte in data {
            self.write(PPUDATA, byte);
        }
    }

    pub fn step(&mut self) -> bool {
        self.ppu.step(&mut self.cart)
    }

    pub fn run(&mut self, dots: u32) {
        for _ in 0..dots {
            self.step();
        }
    }

    /// Step until the PPU is about to process (`scanline`, `cycle`) of frame `frame`
    pub fn run_until(&mut self, frame: u64, scanline: u16, cycle: u16) {
        let mut guard = 0u32;
        while !(self.ppu.frame_count() == frame
            && self.ppu.scanline() == scanline
            && self.ppu.cycle() == cycle)
        {
            self.step();
            guard += 1;
            assert!(guard < CYCLES_PER_FRAME * 4, "Position never reached");
        }
    }

    /// Dots until the next frame boundary
    pub fn run_frame(&mut self) -> u32 {
        let mut dots = 1;
        while !self.step() {
            dots += 1;
        }
        dots
    }

    /// Solid background: every nametable entry on $2000 is tile 1, and tile 1
    /// is pattern color 1 on every pixel
    pub fn setup_solid_background(&mut self) {
        self.poke(0x0010, &[0xFF; 8]);
        self.poke(0x0018, &[0x00; 8]);
        self.poke(0x2000, &[0x01; 960]);
        self.poke(0x3F00, &[0x0F, 0x16]);
        self.poke(0x3F11, &[0x2A]);
        self.write(PPUCTRL, 0x00);
        self.write(PPUSCROLL, 0x00);
        self.write(PPUSCROLL, 0x00);
    }

    /// Write one OAM entry through $2003/$2004
    pub fn set_sprite(&mut self, index: u8, y: u8, tile: u8, attributes: u8, x: u8) {
        self.write(OAMADDR, index * 4);
        for byte in [y, tile, attributes, x] {
            self.write(OAMDATA, byte);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.ppu.frame()[y * SCREEN_WIDTH + x]
    }
}

// ========================================
// Test Modules
// ========================================

mod rendering;
