// Mapper 9 (MMC2) - Latch-based CHR banking (Punch-Out!!)
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$9FFF: 8KB switchable PRG-ROM bank
// - CPU $A000-$FFFF: 24KB PRG-ROM (fixed to last 3 banks)
// - PPU $0000-$0FFF: 4KB CHR bank chosen by latch 0
// - PPU $1000-$1FFF: 4KB CHR bank chosen by latch 1
//
// Register Interface:
// - $A000-$AFFF: PRG-ROM bank select (4 bits)
// - $B000-$BFFF: CHR bank for $0000 when latch 0 = $FD
// - $C000-$CFFF: CHR bank for $0000 when latch 0 = $FE
// - $D000-$DFFF: CHR bank for $1000 when latch 1 = $FD
// - $E000-$EFFF: CHR bank for $1000 when latch 1 = $FE
// - $F000-$FFFF: Mirroring (bit 0: 0=vertical, 1=horizontal)
//
// Latch Behavior (after the fetch completes):
// - $0FD8 sets latch 0 to $FD, $0FE8 sets it to $FE
// - $1FD8-$1FDF sets latch 1 to $FD, $1FE8-$1FEF sets it to $FE

use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage, PRG_RAM_SIZE};

const PRG_BANK_SIZE: usize = 8 * 1024;

const CHR_BANK_SIZE: usize = 4 * 1024;

/// MMC2 board (PxROM)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper9 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    prg_ram: Vec<u8>,

    prg_bank: u8,
    chr_bank_0_fd: u8,
    chr_bank_0_fe: u8,
    chr_bank_1_fd: u8,
    chr_bank_1_fe: u8,
    mirroring: Mirroring,

    /// false = $FD, true = $FE
    latch_0: bool,
    latch_1: bool,
}

impl Mapper9 {
    pub fn new(image: RomImage) -> Self {
        Mapper9 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            prg_ram: image.prg_ram,
            prg_bank: 0,
            chr_bank_0_fd: 0,
            chr_bank_0_fe: 0,
            chr_bank_1_fd: 0,
            chr_bank_1_fe: 0,
            mirroring: image.mirroring,
            latch_0: false,
            latch_1: false,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, Some(&self.prg_ram))
    }

    fn chr_bank_for(&self, address: u16) -> u8 {
        if address < 0x1000 {
            if self.latch_0 {
                self.chr_bank_0_fe
            } else {
                self.chr_bank_0_fd
            }
        } else if self.latch_1 {
            self.chr_bank_1_fe
        } else {
            self.chr_bank_1_fd
        }
    }

    fn update_latch(&mut self, address: u16) {
        match address {
            0x0FD8 => self.latch_0 = false,
            0x0FE8 => self.latch_0 = true,
            0x1FD8..=0x1FDF => self.latch_1 = false,
            0x1FE8..=0x1FEF => self.latch_1 = true,
            _ => {}
        }
    }
}

impl Mapper for Mapper9 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        let offset = (address & 0x1FFF) as usize;
        match address {
            0x6000..=0x7FFF => Some(self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE]),
            0x8000..=0x9FFF => Some(banked(&self.prg_rom, self.prg_bank as usize, PRG_BANK_SIZE, offset)),
            0xA000..=0xFFFF => {
                let banks = (self.prg_rom.len() / PRG_BANK_SIZE).max(3);
                let bank = banks - 3 + ((address - 0xA000) as usize / PRG_BANK_SIZE);
                Some(banked(&self.prg_rom, bank, PRG_BANK_SIZE, offset))
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE] = value,
            0xA000..=0xAFFF => self.prg_bank = value & 0x0F,
            0xB000..=0xBFFF => self.chr_bank_0_fd = value & 0x1F,
            0xC000..=0xCFFF => self.chr_bank_0_fe = value & 0x1F,
            0xD000..=0xDFFF => self.chr_bank_1_fd = value & 0x1F,
            0xE000..=0xEFFF => self.chr_bank_1_fe = value & 0x1F,
            0xF000..=0xFFFF => {
                self.mirroring = if value & 0x01 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                };
            }
            _ => {}
        }
    }

    fn ppu_peek(&self, address: u16) -> u8 {
        banked(
            &self.chr_mem,
            self.chr_bank_for(address) as usize,
            CHR_BANK_SIZE,
            (address & 0x0FFF) as usize,
        )
    }

    fn ppu_read(&mut self, address: u16) -> u8 {
        // The fetch uses the old bank; the latch flips afterwards
        let value = self.ppu_peek(address);
        self.update_latch(address);
        value
    }

    fn ppu_write(&mut self, _address: u16, _value: u8) {
        // CHR-ROM only
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_mapper() -> Mapper9 {
        let prg_rom = (0..16)
            .flat_map(|b| std::iter::repeat_n(b as u8, PRG_BANK_SIZE))
            .collect();
        let chr = (0..32)
            .flat_map(|b| std::iter::repeat_n(0x40 | b as u8, CHR_BANK_SIZE))
            .collect();
        Mapper9::new(RomImage::new(prg_rom, chr, Mirroring::Vertical))
    }

    #[test]
    fn test_prg_layout() {
        let mut mapper = create_test_mapper();
        mapper.cpu_write(0xA000, 4);
        assert_eq!(mapper.cpu_read(0x8000), Some(4));
        assert_eq!(mapper.cpu_read(0xA000), Some(13));
        assert_eq!(mapper.cpu_read(0xC000), Some(14));
        assert_eq!(mapper.cpu_read(0xE000), Some(15));
    }

    #[test]
    fn test_latch_switches_after_fetch() {
        let mut mapper = create_test_mapper();
        mapper.cpu_write(0xB000, 1); // latch 0 = FD
        mapper.cpu_write(0xC000, 2); // latch 0 = FE

        assert_eq!(mapper.ppu_read(0x0000), 0x41);
        assert_eq!(mapper.ppu_read(0x0FE8), 0x41, "Triggering fetch still sees old bank");
        assert_eq!(mapper.ppu_read(0x0000), 0x42);
        mapper.ppu_read(0x0FD8);
        assert_eq!(mapper.ppu_read(0x0000), 0x41);
    }

    #[test]
    fn test_upper_latch_range() {
        let mut mapper = create_test_mapper();
        mapper.cpu_write(0xD000, 5);
        mapper.cpu_write(0xE000, 6);

        assert_eq!(mapper.ppu_peek(0x1000), 0x45);
        mapper.ppu_read(0x1FEF);
        assert_eq!(mapper.ppu_peek(0x1000), 0x46);
    }

    #[test]
    fn test_peek_does_not_move_latch() {
        let mut mapper = create_test_mapper();
        mapper.cpu_write(0xC000, 2);
        mapper.ppu_peek(0x0FE8);
        assert_eq!(mapper.ppu_peek(0x0000), 0x40);
    }
}
