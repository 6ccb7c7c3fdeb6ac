// PPU constants

/// PPU registers are 8 bytes ($2000-$2007) mirrored through $2000-$3FFF
pub(super) const PPU_REGISTER_MASK: u16 = 0x0007;

/// One nametable (1KB)
pub(super) const NAMETABLE_SIZE: usize = 1024;

/// Nametable RAM: 2KB on the console, 4KB when a four-screen cart adds its own
pub(super) const NAMETABLE_RAM_SIZE: usize = 4 * NAMETABLE_SIZE;

pub(super) const PALETTE_SIZE: usize = 32;

pub(super) const OAM_SIZE: usize = 256;

/// Sprites per scanline
pub(super) const MAX_SPRITES_PER_LINE: usize = 8;

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU cycles per scanline
pub const CYCLES_PER_SCANLINE: u16 = 341;

/// Number of scanlines per frame (NTSC)
pub const SCANLINES_PER_FRAME: u16 = 262;

/// Total PPU cycles per frame (NTSC)
/// 341 cycles/scanline × 262 scanlines = 89,342 cycles
pub const CYCLES_PER_FRAME: u32 = (CYCLES_PER_SCANLINE as u32) * (SCANLINES_PER_FRAME as u32);

/// Pre-render scanline (-1 in some documentation)
pub(super) const PRERENDER_SCANLINE: u16 = 261;

/// Last visible scanline
pub(super) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// First VBlank scanline
pub(super) const FIRST_VBLANK_SCANLINE: u16 = 241;

/// Cycle on visible and pre-render lines where mappers see the scanline clock
pub(super) const MAPPER_SCANLINE_CLOCK_CYCLE: u16 = 260;
