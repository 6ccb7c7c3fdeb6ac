// Mapper 1 (MMC1) - One of the most common NES mappers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (optional, battery-backed)
// - CPU $8000-$BFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - CPU $C000-$FFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - PPU $0000-$0FFF: 4KB CHR bank 0 (switchable)
// - PPU $1000-$1FFF: 4KB CHR bank 1 (switchable)
//
// Register Interface:
// All writes to $8000-$FFFF use a serial shift register:
// - Bit 7 set: Reset shift register and force PRG mode 3
// - Bit 0: Data bit to shift in
// - After 5 writes, the accumulated value is written to the register selected
//   by address bits 13-14 of the fifth write
//
// Control Register ($8000-$9FFF):
//   Bits 0-1: Mirroring (0=one-screen lower, 1=one-screen upper, 2=vertical, 3=horizontal)
//   Bits 2-3: PRG-ROM bank mode
//   Bit 4: CHR-ROM bank mode
//
// CHR Bank 0 ($A000-$BFFF), CHR Bank 1 ($C000-$DFFF): 4KB bank numbers
//
// PRG Bank ($E000-$FFFF):
//   Bits 0-3: Select PRG-ROM bank
//   Bit 4: PRG-RAM chip enable (0=enabled)

use log::debug;
use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage, PRG_RAM_SIZE};

const PRG_BANK_SIZE: usize = 16 * 1024;

const CHR_BANK_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrgBankMode {
    Switch32KB,
    FixFirst,
    FixLast,
}

impl From<u8> for PrgBankMode {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0 | 1 => PrgBankMode::Switch32KB,
            2 => PrgBankMode::FixFirst,
            _ => PrgBankMode::FixLast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChrBankMode {
    Switch8KB,
    Switch4KB,
}

impl From<u8> for ChrBankMode {
    fn from(value: u8) -> Self {
        if value & 1 == 0 {
            ChrBankMode::Switch8KB
        } else {
            ChrBankMode::Switch4KB
        }
    }
}

/// MMC1 board (SxROM)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper1 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_is_ram: bool,

    // Shift register state
    shift_register: u8,
    write_count: u8,

    // Internal registers
    control: u8,
    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,
}

impl Mapper1 {
    pub fn new(image: RomImage) -> Self {
        Mapper1 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            prg_ram: image.prg_ram,
            chr_is_ram: image.chr_is_ram,

            shift_register: 0,
            write_count: 0,

            // Power-on: fix last bank at $C000
            control: 0x0C,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, Some(&self.prg_ram))
    }

    fn reset_shift_register(&mut self) {
        self.shift_register = 0;
        self.write_count = 0;
        self.control |= 0x0C;
    }

    fn write_internal_register(&mut self, address: u16, value: u8) {
        match address {
            0x8000..=0x9FFF => self.control = value & 0x1F,
            0xA000..=0xBFFF => self.chr_bank_0 = value & 0x1F,
            0xC000..=0xDFFF => self.chr_bank_1 = value & 0x1F,
            _ => self.prg_bank = value & 0x1F,
        }
        debug!(
            "MMC1 registers: control={:02X} chr0={:02X} chr1={:02X} prg={:02X}",
            self.control, self.chr_bank_0, self.chr_bank_1, self.prg_bank
        );
    }

    fn prg_bank_mode(&self) -> PrgBankMode {
        PrgBankMode::from((self.control >> 2) & 0b11)
    }

    fn chr_bank_mode(&self) -> ChrBankMode {
        ChrBankMode::from((self.control >> 4) & 1)
    }

    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0
    }

    fn prg_bank_for(&self, address: u16) -> usize {
        let bank = (self.prg_bank & 0x0F) as usize;
        let last_bank = (self.prg_rom.len() / PRG_BANK_SIZE).saturating_sub(1);
        let upper = address >= 0xC000;

        match (self.prg_bank_mode(), upper) {
            (PrgBankMode::Switch32KB, false) => bank & !1,
            (PrgBankMode::Switch32KB, true) => bank | 1,
            (PrgBankMode::FixFirst, false) => 0,
            (PrgBankMode::FixFirst, true) => bank,
            (PrgBankMode::FixLast, false) => bank,
            (PrgBankMode::FixLast, true) => last_bank,
        }
    }

    fn chr_bank_for(&self, address: u16) -> usize {
        let upper = address >= 0x1000;
        match self.chr_bank_mode() {
            ChrBankMode::Switch8KB => (self.chr_bank_0 & 0x1E) as usize | upper as usize,
            ChrBankMode::Switch4KB if upper => self.chr_bank_1 as usize,
            ChrBankMode::Switch4KB => self.chr_bank_0 as usize,
        }
    }
}

impl Mapper for Mapper1 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        match address {
            0x6000..=0x7FFF if self.prg_ram_enabled() => {
                Some(self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE])
            }
            0x8000..=0xFFFF => Some(banked(
                &self.prg_rom,
                self.prg_bank_for(address),
                PRG_BANK_SIZE,
                (address & 0x3FFF) as usize,
            )),
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        match address {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled() {
                    self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE] = value;
                }
            }
            0x8000..=0xFFFF => {
                if value & 0x80 != 0 {
                    self.reset_shift_register();
                    return;
                }

                self.shift_register = (self.shift_register >> 1) | ((value & 1) << 4);
                self.write_count += 1;

                if self.write_count == 5 {
                    let register_value = self.shift_register;
                    self.write_internal_register(address, register_value);
                    self.shift_register = 0;
                    self.write_count = 0;
                }
            }
            _ => {}
        }
    }

    fn ppu_peek(&self, address: u16) -> u8 {
        banked(
            &self.chr_mem,
            self.chr_bank_for(address),
            CHR_BANK_SIZE,
            (address & 0x0FFF) as usize,
        )
    }

    fn ppu_write(&mut self, address: u16, value: u8) {
        if !self.chr_is_ram {
            return;
        }
        let banks = (self.chr_mem.len() / CHR_BANK_SIZE).max(1);
        let bank = self.chr_bank_for(address) % banks;
        let index = (bank * CHR_BANK_SIZE + (address & 0x0FFF) as usize) % self.chr_mem.len();
        self.chr_mem[index] = value;
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }
}
