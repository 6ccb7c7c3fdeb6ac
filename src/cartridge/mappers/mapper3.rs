// Mapper 3 (CNROM) - Fixed PRG-ROM with switchable CHR-ROM
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror if only 16KB total)
// - PPU $0000-$1FFF: 8KB switchable CHR-ROM bank
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the CHR-ROM bank for $0000-$1FFF
//
// Games using Mapper 3:
// - Arkanoid
// - Paperboy
// - Q*bert

use log::debug;
use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage};

/// CHR-ROM bank size (8KB)
const CHR_BANK_SIZE: usize = 8 * 1024;

/// CNROM board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper3 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,

    chr_bank: u8,
}

impl Mapper3 {
    pub fn new(image: RomImage) -> Self {
        Mapper3 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            chr_is_ram: image.chr_is_ram,
            mirroring: image.mirroring,
            chr_bank: 0,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, None)
    }

    fn chr_index(&self, address: u16) -> usize {
        let banks = (self.chr_mem.len() / CHR_BANK_SIZE).max(1);
        ((self.chr_bank as usize % banks) * CHR_BANK_SIZE + (address as usize & 0x1FFF))
            % self.chr_mem.len()
    }
}

impl Mapper for Mapper3 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        match address {
            0x8000..=0xFFFF => {
                let index = (address - 0x8000) as usize;
                Some(self.prg_rom[index % self.prg_rom.len()])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        if address >= 0x8000 {
            self.chr_bank = value;
            debug!("CNROM CHR bank -> {}", value);
        }
    }

    fn ppu_peek(&self, address: u16) -> u8 {
        banked(
            &self.chr_mem,
            self.chr_bank as usize,
            CHR_BANK_SIZE,
            (address & 0x1FFF) as usize,
        )
    }

    fn ppu_write(&mut self, address: u16, value: u8) {
        if self.chr_is_ram {
            let index = self.chr_index(address);
            self.chr_mem[index] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
