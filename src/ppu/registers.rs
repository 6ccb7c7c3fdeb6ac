// PPU register handling
//
// ```text
// $2000 PPUCTRL    VPHB SINN   write
// $2001 PPUMASK    BGRs bMmG   write
// $2002 PPUSTATUS  VSO- ----   read
// $2003 OAMADDR                write
// $2004 OAMDATA                read/write
// $2005 PPUSCROLL  x2          write
// $2006 PPUADDR    x2          write
// $2007 PPUDATA                read/write
// ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::Ppu;
use crate::cartridge::Cartridge;

bitflags! {
    /// $2000 PPUCTRL
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_X    = 0b0000_0001;
        const NAMETABLE_Y    = 0b0000_0010;
        const INCREMENT_32   = 0b0000_0100;
        const SPRITE_TABLE   = 0b0000_1000;
        const BG_TABLE       = 0b0001_0000;
        const SPRITE_8X16    = 0b0010_0000;
        const MASTER_SLAVE   = 0b0100_0000;
        const NMI_ENABLE     = 0b1000_0000;
    }
}

bitflags! {
    /// $2001 PPUMASK
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct PpuMask: u8 {
        const GRAYSCALE         = 0b0000_0001;
        const SHOW_BG_LEFT      = 0b0000_0010;
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        const SHOW_BG           = 0b0000_1000;
        const SHOW_SPRITES      = 0b0001_0000;
        const EMPHASIZE_RED     = 0b0010_0000;
        const EMPHASIZE_GREEN   = 0b0100_0000;
        const EMPHASIZE_BLUE    = 0b1000_0000;
    }
}

bitflags! {
    /// $2002 PPUSTATUS (top 3 bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VBLANK          = 0b1000_0000;
    }
}

impl PpuCtrl {
    /// VRAM address step for $2007 accesses
    pub fn vram_increment(self) -> u16 {
        if self.contains(PpuCtrl::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    pub fn sprite_height(self) -> u16 {
        if self.contains(PpuCtrl::SPRITE_8X16) {
            16
        } else {
            8
        }
    }

    pub fn bg_table(self) -> u16 {
        if self.contains(PpuCtrl::BG_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Pattern table for 8x8 sprites
    pub fn sprite_table(self) -> u16 {
        if self.contains(PpuCtrl::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }
}

impl PpuMask {
    /// Background or sprites enabled; the fetch pipeline only runs when true
    pub fn rendering_enabled(self) -> bool {
        self.intersects(PpuMask::SHOW_BG | PpuMask::SHOW_SPRITES)
    }
}

impl Ppu {
    /// Read from a PPU register
    ///
    /// # Arguments
    ///
    /// * `addr` - Any CPU address in $2000-$3FFF
    /// * `cart` - Cartridge supplying pattern memory
    ///
    /// # Register Behaviors
    ///
    /// - PPUSTATUS ($2002): status in bits 7-5, I/O latch in bits 4-0; clears VBlank and the write toggle
    /// - OAMDATA ($2004): OAM at the current OAM address
    /// - PPUDATA ($2007): buffered below $3F00, immediate for palette
    /// - Write-only registers: return the I/O latch
    pub fn read_register(&mut self, addr: u16, cart: &mut Option<Cartridge>) -> u8 {
        let value = match addr & super::constants::PPU_REGISTER_MASK {
            2 => {
                let value = (self.status.bits() & 0xE0) | (self.io_latch & 0x1F);
                self.status.remove(PpuStatus::VBLANK);
                self.write_latch = false;
                value
            }
            4 => self.read_oam_data(),
            7 => {
                let addr = self.v & 0x3FFF;
                let value = if addr >= 0x3F00 {
                    // The buffer is refilled from the nametable underneath the palette
                    self.read_buffer = self.read_vram(addr & 0x2FFF, cart);
                    (self.read_vram(addr, cart) & 0x3F) | (self.io_latch & 0xC0)
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.read_vram(addr, cart);
                    buffered
                };
                self.increment_vram_address();
                value
            }
            _ => self.io_latch,
        };

        self.io_latch = value;
        value
    }

    /// Side-effect-free register read for debuggers
    pub fn peek_register(&self, addr: u16, cart: &Option<Cartridge>) -> u8 {
        match addr & super::constants::PPU_REGISTER_MASK {
            2 => (self.status.bits() & 0xE0) | (self.io_latch & 0x1F),
            4 => self.read_oam_data(),
            7 => {
                let addr = self.v & 0x3FFF;
                if addr >= 0x3F00 {
                    self.peek_vram(addr, cart) & 0x3F
                } else {
                    self.read_buffer
                }
            }
            _ => self.io_latch,
        }
    }

    /// Write to a PPU register
    ///
    /// # Arguments
    ///
    /// * `addr` - Any CPU address in $2000-$3FFF
    /// * `data` - The value to write
    /// * `cart` - Cartridge supplying pattern memory
    ///
    /// # Register Behaviors
    ///
    /// - PPUCTRL ($2000): nametable bits go to t; enabling NMI during VBlank raises a new NMI edge
    /// - PPUSCROLL ($2005) / PPUADDR ($2006): share the write toggle
    /// - PPUDATA ($2007): writes at v, then increments v by 1 or 32
    /// - PPUSTATUS ($2002): only refreshes the I/O latch
    pub fn write_register(&mut self, addr: u16, data: u8, cart: &mut Option<Cartridge>) {
        self.io_latch = data;

        match addr & super::constants::PPU_REGISTER_MASK {
            0 => {
                let was_enabled = self.ctrl.contains(PpuCtrl::NMI_ENABLE);
                self.ctrl = PpuCtrl::from_bits_retain(data);

                // t: ...GH.. ........ <- d: ......GH
                self.t = (self.t & 0xF3FF) | (((data as u16) & 0x03) << 10);

                if !was_enabled
                    && self.ctrl.contains(PpuCtrl::NMI_ENABLE)
                    && self.status.contains(PpuStatus::VBLANK)
                {
                    self.nmi_edge = true;
                }
            }
            1 => self.mask = PpuMask::from_bits_retain(data),
            3 => self.oam_addr = data,
            4 => self.write_oam_data(data),
            5 => {
                if !self.write_latch {
                    // t: ....... ...ABCDE <- d: ABCDE...
                    // x:              FGH <- d: .....FGH
                    self.t = (self.t & 0xFFE0) | ((data as u16) >> 3);
                    self.fine_x = data & 0x07;
                } else {
                    // t: FGH..AB CDE..... <- d: ABCDEFGH
                    self.t = (self.t & 0x8FFF) | (((data as u16) & 0x07) << 12);
                    self.t = (self.t & 0xFC1F) | (((data as u16) & 0xF8) << 2);
                }
                self.write_latch = !self.write_latch;
            }
            6 => {
                if !self.write_latch {
                    // t: .CDEFGH ........ <- d: ..CDEFGH, bit 14 cleared
                    self.t = (self.t & 0x80FF) | (((data as u16) & 0x3F) << 8);
                } else {
                    self.t = (self.t & 0xFF00) | (data as u16);
                    self.v = self.t;
                }
                self.write_latch = !self.write_latch;
            }
            7 => {
                self.write_vram(self.v, data, cart);
                self.increment_vram_address();
            }
            // $2002 is read-only
            _ => {}
        }
    }

    /// OAM DMA and $2004 writes: store at OAMADDR and advance it
    pub fn write_oam_data(&mut self, data: u8) {
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    fn read_oam_data(&self) -> u8 {
        let value = self.oam[self.oam_addr as usize];
        // Attribute bits 2-4 do not exist
        if self.oam_addr & 0x03 == 0x02 {
            value & 0xE3
        } else {
            value
        }
    }

    fn increment_vram_address(&mut self) {
        self.v = self.v.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
    }
}
