// PPU module - Picture Processing Unit (2C02) implementation
//
// The PPU advances one dot per `step`. Three dots elapse per CPU cycle. Each
// frame is 262 scanlines of 341 dots:
//
// ```text
// 0-239    visible lines: background/sprite pipeline, one pixel per dot 1-256
// 240      post-render: idle
// 241-260  vertical blank: flag set at (241, 1), NMI if enabled
// 261      pre-render: flags cleared at dot 1, vertical scroll reloaded;
//          on odd frames with rendering enabled the line ends after dot 339
// ```
//
// Pattern memory lives on the cartridge. The bus lends the cartridge for the
// duration of each call instead of the PPU holding a shared reference.

mod constants;
mod memory;
mod registers;
mod rendering;

#[cfg(test)]
mod tests;

pub use constants::{
    CYCLES_PER_FRAME, CYCLES_PER_SCANLINE, SCANLINES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH,
};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};

use serde::{Deserialize, Serialize};

use crate::cartridge::{Cartridge, Mapper};
use constants::{
    FIRST_VBLANK_SCANLINE, LAST_VISIBLE_SCANLINE, MAPPER_SCANLINE_CLOCK_CYCLE,
    NAMETABLE_RAM_SIZE, OAM_SIZE, PALETTE_SIZE, PRERENDER_SCANLINE,
};
use rendering::{BackgroundPipeline, SpriteLine};

/// PPU structure representing the Picture Processing Unit state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ppu {
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    oam_addr: u8,

    /// Object attribute memory: 64 sprites x (Y, tile, attributes, X)
    oam: Vec<u8>,
    nametables: Vec<u8>,
    palette_ram: [u8; PALETTE_SIZE],

    // Loopy scroll registers
    /// Current VRAM address (15 bits: yyy NN YYYYY XXXXX)
    v: u16,
    /// Temporary VRAM address
    t: u16,
    fine_x: u8,
    /// Shared first/second write toggle for $2005/$2006
    write_latch: bool,

    /// $2007 read buffer
    read_buffer: u8,
    /// Last value driven on the PPU's CPU-facing data bus
    io_latch: u8,

    scanline: u16,
    cycle: u16,
    frame: u64,
    odd_frame: bool,

    /// NMI edge waiting to be collected by the bus
    nmi_edge: bool,

    background: BackgroundPipeline,
    sprites: SpriteLine,

    /// Palette indices (0-63), 256x240 row-major
    frame_buffer: Vec<u8>,
}

impl Ppu {
    /// Create a new PPU in its power-on state at scanline 0, dot 0
    pub fn new() -> Self {
        Ppu {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            oam: vec![0; OAM_SIZE],
            nametables: vec![0; NAMETABLE_RAM_SIZE],
            palette_ram: [0; PALETTE_SIZE],
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            read_buffer: 0,
            io_latch: 0,
            scanline: 0,
            cycle: 0,
            frame: 0,
            odd_frame: false,
            nmi_edge: false,
            background: BackgroundPipeline::default(),
            sprites: SpriteLine::default(),
            frame_buffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Reset button: registers and timing restart, memories are kept
    pub fn reset(&mut self) {
        self.ctrl = PpuCtrl::empty();
        self.mask = PpuMask::empty();
        self.status = PpuStatus::empty();
        self.write_latch = false;
        self.read_buffer = 0;
        self.fine_x = 0;
        self.t = 0;
        self.scanline = 0;
        self.cycle = 0;
        self.odd_frame = false;
        self.nmi_edge = false;
        self.background = BackgroundPipeline::default();
        self.sprites = SpriteLine::default();
    }

    /// Advance one dot
    ///
    /// # Arguments
    ///
    /// * `cart` - Cartridge supplying pattern memory and the scanline clock
    ///
    /// # Returns
    ///
    /// `true` when this dot completed a frame (wrapped to scanline 0)
    pub fn step(&mut self, cart: &mut Option<Cartridge>) -> bool {
        let visible = self.scanline <= LAST_VISIBLE_SCANLINE;
        let prerender = self.scanline == PRERENDER_SCANLINE;

        if visible || prerender {
            self.render_dot(visible, cart);

            if self.cycle == MAPPER_SCANLINE_CLOCK_CYCLE && self.rendering_enabled() {
                if let Some(cart) = cart.as_mut() {
                    cart.clock_scanline();
                }
            }
        }

        if self.cycle == 1 {
            if self.scanline == FIRST_VBLANK_SCANLINE {
                self.status.insert(PpuStatus::VBLANK);
                if self.nmi_enabled() {
                    self.nmi_edge = true;
                }
            } else if prerender {
                self.status.remove(
                    PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
                );
            }
        }

        self.advance()
    }

    fn advance(&mut self) -> bool {
        // Odd frames drop the last dot of the pre-render line
        let skip = self.scanline == PRERENDER_SCANLINE
            && self.cycle == 339
            && self.odd_frame
            && self.rendering_enabled();

        self.cycle += 1;
        if self.cycle < CYCLES_PER_SCANLINE && !skip {
            return false;
        }

        self.cycle = 0;
        self.scanline += 1;
        if self.scanline < SCANLINES_PER_FRAME {
            return false;
        }

        self.scanline = 0;
        self.frame += 1;
        self.odd_frame = !self.odd_frame;
        true
    }

    /// Collect a pending NMI edge (at most one per rising edge)
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_edge)
    }

    /// NMI edge raised and not yet collected
    pub fn nmi_pending(&self) -> bool {
        self.nmi_edge
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    /// Frames completed since power-on
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn is_odd_frame(&self) -> bool {
        self.odd_frame
    }

    /// Palette-index frame buffer (256x240)
    pub fn frame(&self) -> &[u8] {
        &self.frame_buffer
    }

    pub fn ctrl(&self) -> PpuCtrl {
        self.ctrl
    }

    pub fn mask(&self) -> PpuMask {
        self.mask
    }

    pub fn status(&self) -> PpuStatus {
        self.status
    }

    pub fn oam(&self) -> &[u8] {
        &self.oam
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    pub fn palette_ram(&self) -> &[u8; PALETTE_SIZE] {
        &self.palette_ram
    }

    /// Current VRAM address (v)
    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    /// Temporary VRAM address (t)
    pub fn temp_vram_addr(&self) -> u16 {
        self.t
    }

    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    /// Check memory sizes and pipeline indices of a decoded PPU
    pub fn validate(&self) -> Result<(), String> {
        let memories = [
            ("OAM", self.oam.len(), OAM_SIZE),
            ("nametable RAM", self.nametables.len(), NAMETABLE_RAM_SIZE),
            ("frame buffer", self.frame_buffer.len(), SCREEN_WIDTH * SCREEN_HEIGHT),
        ];
        for (name, len, expected) in memories {
            if len != expected {
                return Err(format!("PPU {} is {} bytes, expected {}", name, len, expected));
            }
        }
        if !self.sprites.fits_slots() {
            return Err("PPU sprite line holds more than 8 sprites".to_string());
        }
        Ok(())
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
