// Frame view - the PPU's finished picture as the host sees it
//
// The PPU renders 256x240 palette indices (0-63). `DisplayInfo` borrows them
// together with the master palette so the host can convert to whatever
// surface format it presents.

use super::palette::{palette_to_rgba, NES_PALETTE};

pub use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Total number of pixels in a frame
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Borrowed description of the current frame
#[derive(Debug, Clone, Copy)]
pub struct DisplayInfo<'a> {
    pub width: usize,
    pub height: usize,
    /// Row-major palette indices
    pub pixels: &'a [u8],
    pub palette: &'static [u32; 64],
    /// Completed frames so far; changes when a new picture is ready
    pub frame: u64,
}

impl<'a> DisplayInfo<'a> {
    pub fn new(pixels: &'a [u8], frame: u64) -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            pixels,
            palette: &NES_PALETTE,
            frame,
        }
    }

    /// Palette index at (x, y), or `None` outside the picture
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// 0xRRGGBB at (x, y)
    pub fn rgb(&self, x: usize, y: usize) -> Option<u32> {
        self.pixel(x, y)
            .map(|index| self.palette[(index & 0x3F) as usize])
    }

    /// Convert into RGBA bytes
    ///
    /// Converts as many whole pixels as fit in `output` and returns how many
    /// were written.
    pub fn to_rgba(&self, output: &mut [u8]) -> usize {
        let mut written = 0;
        for (&index, out) in self.pixels.iter().zip(output.chunks_exact_mut(4)) {
            out.copy_from_slice(&palette_to_rgba(index));
            written += 1;
        }
        written
    }

    /// RGBA bytes for the whole frame
    pub fn to_rgba_vec(&self) -> Vec<u8> {
        let mut output = vec![0; self.pixels.len() * 4];
        self.to_rgba(&mut output);
        output
    }

    /// Packed RGB bytes for the whole frame
    pub fn to_rgb_vec(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&index| {
                let [r, g, b, _] = palette_to_rgba(index);
                [r, g, b]
            })
            .collect()
    }
}
