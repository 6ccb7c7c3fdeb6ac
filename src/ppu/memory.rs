// PPU memory access methods
//
// ```text
// $0000-$1FFF  pattern tables    cartridge CHR (via mapper)
// $2000-$2FFF  nametables        internal RAM, folded by the cart's mirroring
// $3000-$3EFF  mirror of $2000-$2EFF
// $3F00-$3FFF  palette RAM       32 bytes, mirrored every 32
// ```

use super::constants::NAMETABLE_SIZE;
use super::Ppu;
use crate::cartridge::{Cartridge, Mapper, Mirroring};

/// Mirroring with no cartridge inserted
const DEFAULT_MIRRORING: Mirroring = Mirroring::Horizontal;

/// Map a nametable address to an offset in nametable RAM
///
/// # Arguments
///
/// * `mirroring` - Arrangement selected by the cartridge
/// * `addr` - Nametable address ($2000-$3EFF)
pub(super) fn nametable_offset(mirroring: Mirroring, addr: u16) -> usize {
    let addr = (addr & 0x0FFF) as usize;
    let table = addr / NAMETABLE_SIZE;
    let offset = addr % NAMETABLE_SIZE;

    let physical = match mirroring {
        // $2000=$2400, $2800=$2C00
        Mirroring::Horizontal => table / 2,
        // $2000=$2800, $2400=$2C00
        Mirroring::Vertical => table % 2,
        Mirroring::SingleScreenLower => 0,
        Mirroring::SingleScreenUpper => 1,
        Mirroring::FourScreen => table,
    };

    physical * NAMETABLE_SIZE + offset
}

/// Map a palette address to palette RAM
///
/// $3F10/$3F14/$3F18/$3F1C mirror $3F00/$3F04/$3F08/$3F0C.
pub(super) fn palette_offset(addr: u16) -> usize {
    let addr = (addr & 0x001F) as usize;
    if addr >= 16 && addr % 4 == 0 {
        addr - 16
    } else {
        addr
    }
}

fn mirroring_of(cart: &Option<Cartridge>) -> Mirroring {
    cart.as_ref().map_or(DEFAULT_MIRRORING, |c| c.mirroring())
}

impl Ppu {
    /// Read PPU memory with mapper side effects (MMC2 latches)
    pub(crate) fn read_vram(&mut self, addr: u16, cart: &mut Option<Cartridge>) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.as_mut().map_or(0, |c| c.ppu_read(addr)),
            _ => self.peek_vram(addr, cart),
        }
    }

    /// Read PPU memory without side effects
    ///
    /// # Arguments
    ///
    /// * `addr` - PPU address ($0000-$3FFF, higher addresses mirror down)
    /// * `cart` - Cartridge supplying pattern memory; `None` reads 0 there
    pub fn peek_vram(&self, addr: u16, cart: &Option<Cartridge>) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.as_ref().map_or(0, |c| c.ppu_peek(addr)),
            0x2000..=0x3EFF => self.nametables[nametable_offset(mirroring_of(cart), addr)],
            _ => self.palette_ram[palette_offset(addr)],
        }
    }

    /// Write PPU memory
    ///
    /// Pattern writes go to the mapper, which drops them for CHR-ROM.
    pub fn write_vram(&mut self, addr: u16, data: u8, cart: &mut Option<Cartridge>) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                if let Some(cart) = cart.as_mut() {
                    cart.ppu_write(addr, data);
                }
            }
            0x2000..=0x3EFF => {
                let offset = nametable_offset(mirroring_of(cart), addr);
                self.nametables[offset] = data;
            }
            _ => self.palette_ram[palette_offset(addr)] = data & 0x3F,
        }
    }
}
