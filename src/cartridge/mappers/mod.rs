// Mappers module - Implementations of various NES cartridge mappers
//
// Each supported board is its own struct implementing `Mapper`. `MapperBoard`
// wraps them in a single enum so the choice is made once at load time and the
// whole board (bank registers and RAM) serializes with the machine state.

mod mapper0;
mod mapper1;
mod mapper11;
mod mapper2;
mod mapper3;
mod mapper4;
mod mapper66;
mod mapper7;
mod mapper9;

pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper11::Mapper11;
pub use mapper2::Mapper2;
pub use mapper3::Mapper3;
pub use mapper4::Mapper4;
pub use mapper66::Mapper66;
pub use mapper7::Mapper7;
pub use mapper9::Mapper9;

use serde::{Deserialize, Serialize};

use super::{CartridgeError, Mapper, Mirroring, RomImage, PRG_RAM_SIZE};

/// Mapper numbers with an implementation in this crate
pub const SUPPORTED_MAPPERS: [u8; 9] = [0, 1, 2, 3, 4, 7, 9, 11, 66];

/// A cartridge board, selected by mapper number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MapperBoard {
    Nrom(Mapper0),
    Mmc1(Mapper1),
    Uxrom(Mapper2),
    Cnrom(Mapper3),
    Mmc3(Mapper4),
    Axrom(Mapper7),
    Mmc2(Mapper9),
    ColorDreams(Mapper11),
    Gxrom(Mapper66),
}

/// Create the board for a mapper number
///
/// # Arguments
/// * `mapper_id` - Mapper number from the iNES header
/// * `image` - PRG/CHR memory split out of the file
///
/// # Errors
/// Returns `CartridgeError::UnsupportedMapper` if the mapper number is not implemented
///
/// # Example
/// ```
/// use madnes::cartridge::{Mirroring, RomImage};
/// use madnes::cartridge::mappers::{create_mapper, MapperBoard};
///
/// let image = RomImage::new(vec![0; 16 * 1024], vec![0; 8 * 1024], Mirroring::Vertical);
/// let board = create_mapper(0, image).unwrap();
/// assert!(matches!(board, MapperBoard::Nrom(_)));
/// ```
pub fn create_mapper(mapper_id: u8, image: RomImage) -> Result<MapperBoard, CartridgeError> {
    let board = match mapper_id {
        0 => MapperBoard::Nrom(Mapper0::new(image)),
        1 => MapperBoard::Mmc1(Mapper1::new(image)),
        2 => MapperBoard::Uxrom(Mapper2::new(image)),
        3 => MapperBoard::Cnrom(Mapper3::new(image)),
        4 => MapperBoard::Mmc3(Mapper4::new(image)),
        7 => MapperBoard::Axrom(Mapper7::new(image)),
        9 => MapperBoard::Mmc2(Mapper9::new(image)),
        11 => MapperBoard::ColorDreams(Mapper11::new(image)),
        66 => MapperBoard::Gxrom(Mapper66::new(image)),
        other => return Err(CartridgeError::UnsupportedMapper(other)),
    };
    Ok(board)
}

/// Forward a call to whichever board is active
macro_rules! dispatch {
    ($self:expr, $board:ident => $call:expr) => {
        match $self {
            MapperBoard::Nrom($board) => $call,
            MapperBoard::Mmc1($board) => $call,
            MapperBoard::Uxrom($board) => $call,
            MapperBoard::Cnrom($board) => $call,
            MapperBoard::Mmc3($board) => $call,
            MapperBoard::Axrom($board) => $call,
            MapperBoard::Mmc2($board) => $call,
            MapperBoard::ColorDreams($board) => $call,
            MapperBoard::Gxrom($board) => $call,
        }
    };
}

impl Mapper for MapperBoard {
    #[inline]
    fn cpu_read(&self, address: u16) -> Option<u8> {
        dispatch!(self, m => m.cpu_read(address))
    }

    #[inline]
    fn cpu_write(&mut self, address: u16, value: u8) {
        dispatch!(self, m => m.cpu_write(address, value))
    }

    #[inline]
    fn ppu_peek(&self, address: u16) -> u8 {
        dispatch!(self, m => m.ppu_peek(address))
    }

    #[inline]
    fn ppu_read(&mut self, address: u16) -> u8 {
        dispatch!(self, m => m.ppu_read(address))
    }

    #[inline]
    fn ppu_write(&mut self, address: u16, value: u8) {
        dispatch!(self, m => m.ppu_write(address, value))
    }

    #[inline]
    fn mirroring(&self) -> Mirroring {
        dispatch!(self, m => m.mirroring())
    }

    #[inline]
    fn irq_pending(&self) -> bool {
        dispatch!(self, m => m.irq_pending())
    }

    #[inline]
    fn clock_scanline(&mut self) {
        dispatch!(self, m => m.clock_scanline())
    }
}

impl MapperBoard {
    /// Check the memories of a decoded board are usable
    pub fn validate(&self) -> Result<(), String> {
        dispatch!(self, m => m.check_memory())
    }
}

/// Banked reads wrap by length, so ROM and CHR must be non-empty; PRG-RAM is
/// always the full 8KB window
pub(crate) fn check_memory(prg_rom: &[u8], chr_mem: &[u8], prg_ram: Option<&[u8]>) -> Result<(), String> {
    if prg_rom.is_empty() {
        return Err("cartridge has no PRG-ROM".to_string());
    }
    if chr_mem.is_empty() {
        return Err("cartridge has no CHR memory".to_string());
    }
    if let Some(ram) = prg_ram {
        if ram.len() != PRG_RAM_SIZE {
            return Err(format!(
                "cartridge PRG-RAM is {} bytes, expected {}",
                ram.len(),
                PRG_RAM_SIZE
            ));
        }
    }
    Ok(())
}

/// Read a byte from a banked region, wrapping out-of-range banks
///
/// Games routinely write bank numbers larger than the ROM; real boards simply
/// ignore the missing address lines.
#[inline]
pub(crate) fn banked(mem: &[u8], bank: usize, bank_size: usize, offset: usize) -> u8 {
    let banks = (mem.len() / bank_size).max(1);
    mem[((bank % banks) * bank_size + offset) % mem.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prg_kb: usize, chr_kb: usize) -> RomImage {
        RomImage::new(
            vec![0; prg_kb * 1024],
            vec![0; chr_kb * 1024],
            Mirroring::Horizontal,
        )
    }

    #[test]
    fn test_unsupported_mapper() {
        let result = create_mapper(99, image(32, 8));
        assert!(matches!(result, Err(CartridgeError::UnsupportedMapper(99))));
    }

    #[test]
    fn test_every_supported_mapper_constructs() {
        for &id in SUPPORTED_MAPPERS.iter() {
            let result = create_mapper(id, image(128, 64));
            assert!(result.is_ok(), "Mapper {} should construct", id);
        }
    }

    #[test]
    fn test_board_survives_json_round_trip() {
        let mut board = create_mapper(2, image(64, 0)).unwrap();
        board.cpu_write(0x8000, 0x02);

        let json = serde_json::to_string(&board).unwrap();
        let restored: MapperBoard = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.cpu_read(0x8000), board.cpu_read(0x8000));
        assert!(matches!(restored, MapperBoard::Uxrom(_)));
    }

    #[test]
    fn test_validate_checks_board_memory() {
        for &id in SUPPORTED_MAPPERS.iter() {
            let board = create_mapper(id, image(32, 8)).unwrap();
            assert!(board.validate().is_ok(), "Mapper {} should validate", id);
        }

        let mut empty_prg = image(32, 8);
        empty_prg.prg_rom.clear();
        let board = create_mapper(2, empty_prg).unwrap();
        assert!(board.validate().is_err());

        let mut short_ram = image(32, 8);
        short_ram.prg_ram.truncate(16);
        let board = create_mapper(4, short_ram).unwrap();
        assert!(board.validate().is_err());

        // Boards without PRG-RAM ignore it
        let mut short_ram = image(32, 8);
        short_ram.prg_ram.clear();
        let board = create_mapper(3, short_ram).unwrap();
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_banked_wraps_bank_number() {
        let mem: Vec<u8> = (0..4).map(|i| i as u8).collect();
        assert_eq!(banked(&mem, 0, 1, 0), 0);
        assert_eq!(banked(&mem, 3, 1, 0), 3);
        assert_eq!(banked(&mem, 5, 1, 0), 1, "Bank 5 of 4 wraps to bank 1");
    }
}
