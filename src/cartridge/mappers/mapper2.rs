// Mapper 2 (UxROM) - Switchable PRG-ROM with fixed CHR-RAM
//
// Memory Layout:
// - CPU $8000-$BFFF: 16KB switchable PRG-ROM bank
// - CPU $C000-$FFFF: 16KB fixed PRG-ROM bank (last bank)
// - PPU $0000-$1FFF: 8KB CHR-RAM (writable)
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the PRG-ROM bank for $8000-$BFFF
// - Last bank is always fixed at $C000-$FFFF
//
// Games using Mapper 2:
// - Mega Man
// - Castlevania
// - Contra
// - Duck Tales

use log::debug;
use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage};

/// PRG-ROM bank size (16KB)
const PRG_BANK_SIZE: usize = 16 * 1024;

/// UxROM board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper2 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,

    /// Bank mapped at $8000-$BFFF
    prg_bank: u8,
}

impl Mapper2 {
    pub fn new(image: RomImage) -> Self {
        Mapper2 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            chr_is_ram: image.chr_is_ram,
            mirroring: image.mirroring,
            prg_bank: 0,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, None)
    }

    fn last_bank(&self) -> usize {
        (self.prg_rom.len() / PRG_BANK_SIZE).saturating_sub(1)
    }
}

impl Mapper for Mapper2 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        let offset = (address & 0x3FFF) as usize;
        match address {
            0x8000..=0xBFFF => Some(banked(&self.prg_rom, self.prg_bank as usize, PRG_BANK_SIZE, offset)),
            0xC000..=0xFFFF => Some(banked(&self.prg_rom, self.last_bank(), PRG_BANK_SIZE, offset)),
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        if address >= 0x8000 {
            self.prg_bank = value;
            debug!("UxROM PRG bank -> {}", value);
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
        self.mirroring
    }
}
