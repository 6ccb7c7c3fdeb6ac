// Mapper 0 (NROM) - The simplest NES mapper with no bank switching
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (Family Basic boards; harmless elsewhere)
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror of first 16KB if only 16KB total)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM
//
// Variants:
// - NROM-128: 16KB PRG-ROM (mirrored to fill 32KB space)
// - NROM-256: 32KB PRG-ROM (no mirroring)

use serde::{Deserialize, Serialize};

use super::check_memory;
use crate::cartridge::{Mapper, Mirroring, RomImage, PRG_RAM_SIZE};

/// NROM board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper0 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Mapper0 {
    pub fn new(image: RomImage) -> Self {
        Mapper0 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            prg_ram: image.prg_ram,
            chr_is_ram: image.chr_is_ram,
            mirroring: image.mirroring,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, Some(&self.prg_ram))
    }
}

impl Mapper for Mapper0 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        match address {
            0x6000..=0x7FFF => Some(self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE]),
            // Modulo mirrors NROM-128 into the upper 16KB
            0x8000..=0xFFFF => {
                let index = (address - 0x8000) as usize;
                Some(self.prg_rom[index % self.prg_rom.len()])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        // No registers; PRG-ROM writes are ignored
        if let 0x6000..=0x7FFF = address {
            self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE] = value;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(prg_rom_size: usize, chr: Vec<u8>) -> RomImage {
        let prg_rom = (0..prg_rom_size).map(|i| (i >> 8) as u8).collect();
        RomImage::new(prg_rom, chr, Mirroring::Vertical)
    }

    #[test]
    fn test_nrom128_mirrors_upper_bank() {
        let mapper = Mapper0::new(create_test_image(16 * 1024, vec![0xBB; 8 * 1024]));

        assert_eq!(mapper.cpu_read(0x8000), mapper.cpu_read(0xC000));
        assert_eq!(mapper.cpu_read(0xBFFF), mapper.cpu_read(0xFFFF));
    }

    #[test]
    fn test_nrom256_maps_linearly() {
        let mapper = Mapper0::new(create_test_image(32 * 1024, vec![0xBB; 8 * 1024]));

        assert_eq!(mapper.cpu_read(0x8000), Some(0x00));
        assert_eq!(mapper.cpu_read(0xC000), Some(0x40));
        assert_eq!(mapper.cpu_read(0xFFFF), Some(0x7F));
    }

    #[test]
    fn test_unmapped_below_6000_is_open_bus() {
        let mapper = Mapper0::new(create_test_image(16 * 1024, vec![0xBB; 8 * 1024]));
        assert_eq!(mapper.cpu_read(0x5000), None);
    }

    #[test]
    fn test_prg_rom_write_ignored() {
        let mut mapper = Mapper0::new(create_test_image(16 * 1024, vec![0xBB; 8 * 1024]));
        let before = mapper.cpu_read(0x8000);
        mapper.cpu_write(0x8000, 0xFF);
        assert_eq!(mapper.cpu_read(0x8000), before);
    }

    #[test]
    fn test_prg_ram_read_write() {
        let mut mapper = Mapper0::new(create_test_image(16 * 1024, vec![0xBB; 8 * 1024]));
        mapper.cpu_write(0x6010, 0x42);
        assert_eq!(mapper.cpu_read(0x6010), Some(0x42));
    }

    #[test]
    fn test_chr_rom_ignores_writes() {
        let mut mapper = Mapper0::new(create_test_image(16 * 1024, vec![0xBB; 8 * 1024]));
        mapper.ppu_write(0x0000, 0x11);
        assert_eq!(mapper.ppu_peek(0x0000), 0xBB);
    }

    #[test]
    fn test_chr_ram_accepts_writes() {
        let mut mapper = Mapper0::new(create_test_image(16 * 1024, Vec::new()));
        mapper.ppu_write(0x1FFF, 0x11);
        assert_eq!(mapper.ppu_peek(0x1FFF), 0x11);
    }

    #[test]
    fn test_mirroring_from_header() {
        let mapper = Mapper0::new(create_test_image(16 * 1024, Vec::new()));
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }
}
