// Mapper 7 (AxROM) - 32KB PRG banking and one-screen mirroring
//
// Memory Layout:
// - CPU $8000-$FFFF: 32KB switchable PRG-ROM bank
// - PPU $0000-$1FFF: 8KB CHR-RAM
//
// Register Interface:
// - $8000-$FFFF (write): Bank select and mirroring
//   Bits 0-2: Select 32KB PRG-ROM bank
//   Bit 4: One-screen mirroring (0 = lower bank, 1 = upper bank)

use log::debug;
use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage};

const PRG_BANK_SIZE: usize = 32 * 1024;

/// AxROM board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper7 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    chr_is_ram: bool,

    prg_bank: u8,
    upper_screen: bool,
}

impl Mapper7 {
    pub fn new(image: RomImage) -> Self {
        Mapper7 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            chr_is_ram: image.chr_is_ram,
            prg_bank: 0,
            upper_screen: false,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, None)
    }
}

impl Mapper for Mapper7 {
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
            self.prg_bank = value & 0x07;
            self.upper_screen = value & 0x10 != 0;
            debug!(
                "AxROM PRG bank -> {}, screen {}",
                self.prg_bank,
                if self.upper_screen { "upper" } else { "lower" }
            );
        }
    }

    fn ppu_peek(&self, address: u16) -> u8 {
        self.chr_mem[(address as usize & 0x1FFF) % self.chr_mem.len()]
    }

    fn ppu_write(&mut self, address: u16, value: u8) {
        if self.chr_is_ram {
            let index = (address as usize & 0x1FFF) % self.chr_mem.len();
            self.chr_mem[index] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        if self.upper_screen {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        }
    }
}
