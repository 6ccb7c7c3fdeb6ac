// Mapper 11 (Color Dreams) - Simple mapper with PRG and CHR banking
//
// Memory Layout:
// - CPU $8000-$FFFF: 32KB switchable PRG-ROM bank
// - PPU $0000-$1FFF: 8KB switchable CHR-ROM bank
//
// Register Interface:
// - $8000-$FFFF (write): Bank select
//   Bits 0-1: Select 32KB PRG-ROM bank
//   Bits 4-7: Select 8KB CHR-ROM bank
//
// Same idea as GxROM (mapper 66) with the nibbles swapped and wider CHR select.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage};

const PRG_BANK_SIZE: usize = 32 * 1024;

const CHR_BANK_SIZE: usize = 8 * 1024;

/// Color Dreams board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper11 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    mirroring: Mirroring,

    prg_bank: u8,
    chr_bank: u8,
}

impl Mapper11 {
    pub fn new(image: RomImage) -> Self {
        Mapper11 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            mirroring: image.mirroring,
            prg_bank: 0,
            chr_bank: 0,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, None)
    }
}

impl Mapper for Mapper11 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        match address {
            0x8000..=0xFFFF => Some(banked(
                &self.prg_rom,
                self.prg_bank as usize,
                PRG_BANK_SIZE,
                (address & 0x7FFF) as usize,
            )),
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        if address >= 0x8000 {
            self.prg_bank = value & 0x03;
            self.chr_bank = value >> 4;
            debug!("Color Dreams PRG {} CHR {}", self.prg_bank, self.chr_bank);
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

    fn ppu_write(&mut self, _address: u16, _value: u8) {
        // CHR-ROM only
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
