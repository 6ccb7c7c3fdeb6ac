// Display module - What the host needs to present a frame
//
// This module provides:
// - NES master palette (64 entries, NTSC approximation)
// - `DisplayInfo`, a borrowed view of the PPU's indexed frame
// - PNG encoding of the current frame for screenshots
//
// Windowing and presentation belong to the host.

pub mod frame;
pub mod palette;
pub mod screenshot;

pub use frame::{DisplayInfo, SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH};
pub use palette::{palette_to_rgb, palette_to_rgba, rgb_to_rgba, NES_PALETTE};
pub use screenshot::{encode_png, ScreenshotError};
