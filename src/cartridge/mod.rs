// Cartridge module - iNES parsing and the mapper abstraction
//
// A cartridge is parsed once from a complete iNES image. The header fields are
// immutable after parsing; only the mapper's bank registers and RAM contents
// change while the game runs.
//
// # iNES Layout
//
// ```text
// Bytes 0-3:   "NES" followed by MS-DOS EOF ($4E $45 $53 $1A)
// Byte 4:      PRG-ROM size in 16KB units
// Byte 5:      CHR-ROM size in 8KB units (0 means the board uses 8KB CHR-RAM)
// Byte 6:      Flags 6 - mirroring, battery, trainer, four-screen, mapper low nibble
// Byte 7:      Flags 7 - format version bits, mapper high nibble
// Bytes 8-15:  Unused padding
// [512 bytes]  Trainer (present when flags 6 bit 2 is set)
// PRG-ROM data
// CHR-ROM data
// ```

pub mod mappers;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mappers::MapperBoard;

/// iNES magic number: "NES" followed by MS-DOS end-of-file
pub const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// Size of the iNES header in bytes
pub const INES_HEADER_SIZE: usize = 16;

/// Size of the optional trainer block in bytes
pub const TRAINER_SIZE: usize = 512;

/// PRG-ROM bank unit used by the header (16KB)
pub const PRG_ROM_UNIT: usize = 16 * 1024;

/// CHR-ROM bank unit used by the header (8KB)
pub const CHR_ROM_UNIT: usize = 8 * 1024;

/// Size of the cartridge PRG-RAM window at $6000-$7FFF
pub const PRG_RAM_SIZE: usize = 8 * 1024;

/// Offset of the trainer inside PRG-RAM ($7000)
const TRAINER_RAM_OFFSET: usize = 0x1000;

/// Errors raised while inserting a cartridge image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    /// The image is not a usable iNES file (bad magic, truncated data, no PRG-ROM)
    #[error("malformed cartridge image: {0}")]
    Malformed(String),

    /// The header names a mapper with no known implementation
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),
}

/// Nametable mirroring arrangement
///
/// Selects how the PPU's four logical nametables ($2000, $2400, $2800, $2C00)
/// map onto physical nametable RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirroring {
    /// $2000=$2400 and $2800=$2C00 (vertical scrolling games)
    Horizontal,
    /// $2000=$2800 and $2400=$2C00 (horizontal scrolling games)
    Vertical,
    /// All four nametables show the first physical table
    SingleScreenLower,
    /// All four nametables show the second physical table
    SingleScreenUpper,
    /// Four independent nametables backed by extra cartridge VRAM
    FourScreen,
}

/// Parsed iNES header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct INesHeader {
    /// Number of 16KB PRG-ROM banks
    pub prg_rom_banks: u8,
    /// Number of 8KB CHR-ROM banks (0 = CHR-RAM)
    pub chr_rom_banks: u8,
    /// Mapper number assembled from both flag bytes
    pub mapper_id: u8,
    /// Mirroring selected by the header
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM present
    pub has_battery: bool,
    /// 512-byte trainer present before PRG-ROM
    pub has_trainer: bool,
    /// Four-screen VRAM present
    pub four_screen: bool,
    /// Format version bits from flags 7 (2 = NES 2.0)
    pub format_version: u8,
}

impl INesHeader {
    /// Parse the 16-byte header at the start of an iNES image
    ///
    /// # Errors
    /// Returns `CartridgeError::Malformed` if the buffer is shorter than the header
    /// or the magic number does not match.
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < INES_HEADER_SIZE {
            return Err(CartridgeError::Malformed(format!(
                "image is {} bytes, shorter than the {}-byte header",
                data.len(),
                INES_HEADER_SIZE
            )));
        }

        if data[0..4] != INES_MAGIC {
            return Err(CartridgeError::Malformed(
                "missing iNES magic number".to_string(),
            ));
        }

        let flags6 = data[6];
        let flags7 = data[7];

        let four_screen = flags6 & 0x08 != 0;
        let mirroring = if four_screen {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(INesHeader {
            prg_rom_banks: data[4],
            chr_rom_banks: data[5],
            mapper_id: (flags6 >> 4) | (flags7 & 0xF0),
            mirroring,
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
            four_screen,
            format_version: (flags7 >> 2) & 0x03,
        })
    }

    /// Total PRG-ROM size in bytes
    pub fn prg_rom_size(&self) -> usize {
        self.prg_rom_banks as usize * PRG_ROM_UNIT
    }

    /// Total CHR-ROM size in bytes (0 for CHR-RAM boards)
    pub fn chr_rom_size(&self) -> usize {
        self.chr_rom_banks as usize * CHR_ROM_UNIT
    }

    /// Number of bytes the header says must follow it
    pub fn payload_size(&self) -> usize {
        let trainer = if self.has_trainer { TRAINER_SIZE } else { 0 };
        trainer + self.prg_rom_size() + self.chr_rom_size()
    }
}

/// Raw memory split out of an iNES image, handed to a mapper constructor
#[derive(Debug, Clone)]
pub struct RomImage {
    pub prg_rom: Vec<u8>,
    /// CHR-ROM contents, or zeroed CHR-RAM when `chr_is_ram` is set
    pub chr_mem: Vec<u8>,
    pub chr_is_ram: bool,
    /// PRG-RAM contents with the trainer (if any) already placed at $7000
    pub prg_ram: Vec<u8>,
    pub mirroring: Mirroring,
}

impl RomImage {
    /// Build a ROM image from raw banks, with default RAM contents
    ///
    /// An empty `chr_mem` allocates 8KB of CHR-RAM.
    pub fn new(prg_rom: Vec<u8>, chr_mem: Vec<u8>, mirroring: Mirroring) -> Self {
        let chr_is_ram = chr_mem.is_empty();
        let chr_mem = if chr_is_ram {
            vec![0; CHR_ROM_UNIT]
        } else {
            chr_mem
        };

        RomImage {
            prg_rom,
            chr_mem,
            chr_is_ram,
            prg_ram: vec![0; PRG_RAM_SIZE],
            mirroring,
        }
    }
}

/// Capability set every cartridge board implements
///
/// CPU reads return `None` for addresses the board leaves undriven; the bus
/// substitutes the open-bus value.
pub trait Mapper {
    /// Read from CPU space ($4020-$FFFF)
    fn cpu_read(&self, address: u16) -> Option<u8>;

    /// Write to CPU space ($4020-$FFFF); may change bank registers
    fn cpu_write(&mut self, address: u16, value: u8);

    /// Read pattern memory ($0000-$1FFF) without side effects
    fn ppu_peek(&self, address: u16) -> u8;

    /// Read pattern memory as the PPU does while rendering
    ///
    /// Boards that latch on fetch addresses override this.
    fn ppu_read(&mut self, address: u16) -> u8 {
        self.ppu_peek(address)
    }

    /// Write pattern memory ($0000-$1FFF); ignored for CHR-ROM
    fn ppu_write(&mut self, address: u16, value: u8);

    /// Current nametable mirroring
    fn mirroring(&self) -> Mirroring;

    /// Whether the board is holding the CPU IRQ line low
    fn irq_pending(&self) -> bool {
        false
    }

    /// Called once per rendered scanline (PPU cycle 260) while rendering is on
    fn clock_scanline(&mut self) {}
}

/// An inserted cartridge: immutable header plus the live mapper board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartridge {
    header: INesHeader,
    board: MapperBoard,
}

impl Cartridge {
    /// Parse a complete iNES image and construct its mapper
    ///
    /// # Arguments
    /// * `data` - The full contents of a `.nes` file
    ///
    /// # Errors
    /// * `CartridgeError::Malformed` - bad magic, truncated data, or no PRG-ROM
    /// * `CartridgeError::UnsupportedMapper` - mapper number has no implementation
    ///
    /// # Example
    /// ```
    /// use madnes::cartridge::{Cartridge, CartridgeError};
    ///
    /// let result = Cartridge::from_ines_bytes(b"not a rom");
    /// assert!(matches!(result, Err(CartridgeError::Malformed(_))));
    /// ```
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = INesHeader::parse(data).inspect_err(|e| warn!("Rejected cartridge: {}", e))?;

        if header.prg_rom_banks == 0 {
            let err = CartridgeError::Malformed("header declares no PRG-ROM".to_string());
            warn!("Rejected cartridge: {}", err);
            return Err(err);
        }

        let available = data.len() - INES_HEADER_SIZE;
        if available < header.payload_size() {
            let err = CartridgeError::Malformed(format!(
                "expected {} bytes after the header, found {}",
                header.payload_size(),
                available
            ));
            warn!("Rejected cartridge: {}", err);
            return Err(err);
        }

        let mut offset = INES_HEADER_SIZE;

        let mut prg_ram = vec![0; PRG_RAM_SIZE];
        if header.has_trainer {
            prg_ram[TRAINER_RAM_OFFSET..TRAINER_RAM_OFFSET + TRAINER_SIZE]
                .copy_from_slice(&data[offset..offset + TRAINER_SIZE]);
            offset += TRAINER_SIZE;
        }

        let prg_rom = data[offset..offset + header.prg_rom_size()].to_vec();
        offset += header.prg_rom_size();

        let chr_rom = data[offset..offset + header.chr_rom_size()].to_vec();

        let mut image = RomImage::new(prg_rom, chr_rom, header.mirroring);
        image.prg_ram = prg_ram;

        let board = mappers::create_mapper(header.mapper_id, image)
            .inspect_err(|e| warn!("Rejected cartridge: {}", e))?;

        info!(
            "Loaded cartridge: mapper {}, {}x16KB PRG, {}x8KB CHR{}, {:?} mirroring",
            header.mapper_id,
            header.prg_rom_banks,
            header.chr_rom_banks,
            if header.chr_rom_banks == 0 { " (RAM)" } else { "" },
            header.mirroring
        );

        Ok(Cartridge { header, board })
    }

    /// Check a decoded cartridge agrees with its header and its board memory is usable
    pub fn validate(&self) -> Result<(), String> {
        if !mappers::SUPPORTED_MAPPERS.contains(&self.header.mapper_id) {
            return Err(format!("cartridge mapper {} is not supported", self.header.mapper_id));
        }
        self.board.validate()
    }

    /// The parsed header
    pub fn header(&self) -> &INesHeader {
        &self.header
    }

    /// The mapper number of this cartridge
    pub fn mapper_id(&self) -> u8 {
        self.header.mapper_id
    }

    /// The live mapper board
    pub fn board(&self) -> &MapperBoard {
        &self.board
    }
}

impl Mapper for Cartridge {
    #[inline]
    fn cpu_read(&self, address: u16) -> Option<u8> {
        self.board.cpu_read(address)
    }

    #[inline]
    fn cpu_write(&mut self, address: u16, value: u8) {
        self.board.cpu_write(address, value);
    }

    #[inline]
    fn ppu_peek(&self, address: u16) -> u8 {
        self.board.ppu_peek(address)
    }

    #[inline]
    fn ppu_read(&mut self, address: u16) -> u8 {
        self.board.ppu_read(address)
    }

    #[inline]
    fn ppu_write(&mut self, address: u16, value: u8) {
        self.board.ppu_write(address, value);
    }

    #[inline]
    fn mirroring(&self) -> Mirroring {
        // Four-screen wiring on the board overrides whatever the mapper selects
        if self.header.four_screen {
            Mirroring::FourScreen
        } else {
            self.board.mirroring()
        }
    }

    #[inline]
    fn irq_pending(&self) -> bool {
        self.board.irq_pending()
    }

    #[inline]
    fn clock_scanline(&mut self) {
        self.board.clock_scanline();
    }
}
