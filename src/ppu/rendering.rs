// PPU rendering logic
//
// Per-dot pipeline for visible and pre-render lines:
//
// ```text
// cycle 1-256     fetch NT, AT, pattern low, pattern high every 8 dots; emit one pixel per dot
// cycle 256       increment fine/coarse Y
// cycle 257       copy horizontal scroll bits t -> v; evaluate and fetch sprites for the next line
// cycle 280-304   (pre-render only) copy vertical scroll bits t -> v
// cycle 321-336   prefetch the first two tiles of the next line
// ```

use serde::{Deserialize, Serialize};

use super::constants::{MAX_SPRITES_PER_LINE, SCREEN_WIDTH};
use super::registers::{PpuCtrl, PpuMask, PpuStatus};
use super::Ppu;
use crate::cartridge::Cartridge;

/// Sprites selected for the line being drawn, with their pattern rows already fetched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct SpriteLine {
    count: usize,
    x: [u8; MAX_SPRITES_PER_LINE],
    attributes: [u8; MAX_SPRITES_PER_LINE],
    /// Pattern rows with horizontal flip already applied; bit 7 is the leftmost pixel
    pattern_low: [u8; MAX_SPRITES_PER_LINE],
    pattern_high: [u8; MAX_SPRITES_PER_LINE],
    /// Slot 0 holds OAM entry 0
    has_sprite_zero: bool,
}

impl SpriteLine {
    /// Selected sprites fit the per-line slots
    pub(super) fn fits_slots(&self) -> bool {
        self.count <= MAX_SPRITES_PER_LINE
    }
}

/// Background fetch latches and shift registers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct BackgroundPipeline {
    next_tile: u8,
    next_attribute: u8,
    next_low: u8,
    next_high: u8,
    pattern_low: u16,
    pattern_high: u16,
    attribute_low: u16,
    attribute_high: u16,
}

impl BackgroundPipeline {
    fn shift(&mut self) {
        self.pattern_low <<= 1;
        self.pattern_high <<= 1;
        self.attribute_low <<= 1;
        self.attribute_high <<= 1;
    }

    /// Move the fetched tile into the low byte of the shifters
    fn reload(&mut self) {
        self.pattern_low = (self.pattern_low & 0xFF00) | self.next_low as u16;
        self.pattern_high = (self.pattern_high & 0xFF00) | self.next_high as u16;
        let attribute = self.next_attribute;
        let fill = |bit: u8| if attribute & bit != 0 { 0x00FF } else { 0x0000 };
        self.attribute_low = (self.attribute_low & 0xFF00) | fill(0x01);
        self.attribute_high = (self.attribute_high & 0xFF00) | fill(0x02);
    }

    /// 4-bit palette index (attribute << 2 | pattern) for the pixel at fine X
    fn pixel(&self, fine_x: u8) -> u8 {
        let mux = 0x8000 >> fine_x;
        let bit = |reg: u16| u8::from(reg & mux != 0);
        (bit(self.attribute_high) << 3)
            | (bit(self.attribute_low) << 2)
            | (bit(self.pattern_high) << 1)
            | bit(self.pattern_low)
    }
}

impl Ppu {
    /// One dot of a visible (`visible == true`) or pre-render line
    pub(super) fn render_dot(&mut self, visible: bool, cart: &mut Option<Cartridge>) {
        let cycle = self.cycle;
        let rendering = self.mask.rendering_enabled();

        if rendering {
            if (2..=257).contains(&cycle) || (321..=337).contains(&cycle) {
                self.background.shift();
                match (cycle - 1) % 8 {
                    0 => {
                        self.background.reload();
                        self.fetch_nametable_byte(cart);
                    }
                    2 => self.fetch_attribute_byte(cart),
                    4 => self.background.next_low = self.fetch_pattern_byte(0, cart),
                    6 => self.background.next_high = self.fetch_pattern_byte(8, cart),
                    7 => self.increment_coarse_x(),
                    _ => {}
                }
            }

            match cycle {
                256 => self.increment_y(),
                257 => {
                    self.copy_horizontal_scroll();
                    if visible {
                        self.evaluate_sprites(cart);
                    } else {
                        // No evaluation on the pre-render line, so line 0 has no sprites
                        self.sprites = SpriteLine::default();
                    }
                }
                280..=304 if !visible => self.copy_vertical_scroll(),
                _ => {}
            }
        }

        if visible && (1..=256).contains(&cycle) {
            self.output_pixel(cycle - 1);
        }
    }

    fn fetch_nametable_byte(&mut self, cart: &mut Option<Cartridge>) {
        let addr = 0x2000 | (self.v & 0x0FFF);
        self.background.next_tile = self.read_vram(addr, cart);
    }

    fn fetch_attribute_byte(&mut self, cart: &mut Option<Cartridge>) {
        let v = self.v;
        let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
        let shift = ((v >> 4) & 0x04) | (v & 0x02);
        self.background.next_attribute = (self.read_vram(addr, cart) >> shift) & 0x03;
    }

    fn fetch_pattern_byte(&mut self, plane: u16, cart: &mut Option<Cartridge>) -> u8 {
        let fine_y = (self.v >> 12) & 0x07;
        let addr = self.ctrl.bg_table() + self.background.next_tile as u16 * 16 + fine_y + plane;
        self.read_vram(addr, cart)
    }

    /// Coarse X increment, wrapping into the horizontally adjacent nametable
    fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y increment, carrying into coarse Y; row 29 wraps into the vertically adjacent nametable
    fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }

        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        match coarse_y {
            29 => {
                coarse_y = 0;
                self.v ^= 0x0800;
            }
            // Rows 30-31 are attribute data; wrap without switching nametables
            31 => coarse_y = 0,
            _ => coarse_y += 1,
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }

    fn copy_horizontal_scroll(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    fn copy_vertical_scroll(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }

    /// Select up to 8 sprites on the current line for drawing on the next one
    ///
    /// A ninth in-range sprite sets the overflow flag.
    fn evaluate_sprites(&mut self, cart: &mut Option<Cartridge>) {
        let height = self.ctrl.sprite_height();
        let line = self.scanline;
        let mut next = SpriteLine::default();

        for index in 0..64 {
            let base = index * 4;
            let y = self.oam[base] as u16;
            if line < y || line - y >= height {
                continue;
            }

            if next.count == MAX_SPRITES_PER_LINE {
                self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                break;
            }

            let tile = self.oam[base + 1];
            let attributes = self.oam[base + 2];
            let (low, high) = self.fetch_sprite_row(tile, attributes, line - y, cart);

            let slot = next.count;
            next.x[slot] = self.oam[base + 3];
            next.attributes[slot] = attributes;
            next.pattern_low[slot] = low;
            next.pattern_high[slot] = high;
            if index == 0 {
                next.has_sprite_zero = true;
            }
            next.count += 1;
        }

        self.sprites = next;
    }

    fn fetch_sprite_row(
        &mut self,
        tile: u8,
        attributes: u8,
        row: u16,
        cart: &mut Option<Cartridge>,
    ) -> (u8, u8) {
        let height = self.ctrl.sprite_height();
        let row = if attributes & 0x80 != 0 {
            height - 1 - row
        } else {
            row
        };

        let addr = if height == 16 {
            // 8x16: bit 0 of the tile picks the table, the top tile is even
            let table = (tile as u16 & 0x01) * 0x1000;
            let tile = (tile & 0xFE) as u16 + row / 8;
            table + tile * 16 + row % 8
        } else {
            self.ctrl.sprite_table() + tile as u16 * 16 + row
        };

        let low = self.read_vram(addr, cart);
        let high = self.read_vram(addr + 8, cart);
        if attributes & 0x40 != 0 {
            (low.reverse_bits(), high.reverse_bits())
        } else {
            (low, high)
        }
    }

    /// First opaque sprite pixel at `x` in OAM order: (slot, 4-bit palette index)
    fn sprite_pixel(&self, x: u16) -> Option<(usize, u8)> {
        let sprites = &self.sprites;
        (0..sprites.count).find_map(|slot| {
            let dx = x.checked_sub(sprites.x[slot] as u16)?;
            if dx >= 8 {
                return None;
            }
            let shift = 7 - dx;
            let low = (sprites.pattern_low[slot] >> shift) & 0x01;
            let high = (sprites.pattern_high[slot] >> shift) & 0x01;
            let pattern = (high << 1) | low;
            (pattern != 0).then(|| (slot, ((sprites.attributes[slot] & 0x03) << 2) | pattern))
        })
    }

    fn output_pixel(&mut self, x: u16) {
        let left_column = x < 8;
        let show_bg = self.mask.contains(PpuMask::SHOW_BG)
            && (!left_column || self.mask.contains(PpuMask::SHOW_BG_LEFT));
        let show_sprites = self.mask.contains(PpuMask::SHOW_SPRITES)
            && (!left_column || self.mask.contains(PpuMask::SHOW_SPRITES_LEFT));

        let bg = if show_bg {
            self.background.pixel(self.fine_x)
        } else {
            0
        };
        let bg_opaque = bg & 0x03 != 0;

        let sprite = if show_sprites {
            self.sprite_pixel(x)
        } else {
            None
        };

        if let Some((slot, _)) = sprite {
            if slot == 0 && self.sprites.has_sprite_zero && bg_opaque && x != 255 {
                self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
            }
        }

        let palette_addr = match sprite {
            Some((slot, color)) => {
                let behind = self.sprites.attributes[slot] & 0x20 != 0;
                if behind && bg_opaque {
                    bg
                } else {
                    0x10 | color
                }
            }
            None if bg_opaque => bg,
            None => 0,
        };

        let mut color = self.palette_ram[super::memory::palette_offset(palette_addr as u16)];
        if self.mask.contains(PpuMask::GRAYSCALE) {
            color &= 0x30;
        }

        let index = self.scanline as usize * SCREEN_WIDTH + x as usize;
        self.frame_buffer[index] = color & 0x3F;
    }

    /// Rendering flag for the mapper scanline clock and odd-frame skip
    pub(super) fn rendering_enabled(&self) -> bool {
        self.mask.rendering_enabled()
    }

    /// Sprite height as selected by PPUCTRL bit 5
    pub fn sprite_height(&self) -> u16 {
        self.ctrl.sprite_height()
    }

    pub(super) fn nmi_enabled(&self) -> bool {
        self.ctrl.contains(PpuCtrl::NMI_ENABLE)
    }
}
