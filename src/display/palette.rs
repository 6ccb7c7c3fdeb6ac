// NES Color Palette - RGB values for the 64 PPU color indices
//
// The PPU outputs a 6-bit index per pixel: bits 4-5 select the luminance row,
// bits 0-3 the hue. Hues $E and $F are black in every row, and $0D is the
// "blacker than black" level some TVs misread as sync.

/// Master palette as 0xRRGGBB, one entry per PPU color index
pub const NES_PALETTE: [u32; 64] = [
    // $00-$0F
    0x666666, 0x002A88, 0x1412A7, 0x3B00A4, 0x5C007E, 0x6E0040, 0x6C0600, 0x561D00,
    0x333500, 0x0B4800, 0x005200, 0x004F08, 0x00404D, 0x000000, 0x000000, 0x000000,
    // $10-$1F
    0xADADAD, 0x155FD9, 0x4240FF, 0x7527FE, 0xA01ACC, 0xB71E7B, 0xB53120, 0x994E00,
    0x6B6D00, 0x388700, 0x0C9300, 0x008F32, 0x007C8D, 0x000000, 0x000000, 0x000000,
    // $20-$2F
    0xFFFEFF, 0x64B0FF, 0x9290FF, 0xC676FF, 0xF36AFF, 0xFE6ECC, 0xFE8170, 0xEA9E22,
    0xBCBE00, 0x88D800, 0x5CE430, 0x45E082, 0x48CDDE, 0x4F4F4F, 0x000000, 0x000000,
    // $30-$3F
    0xFFFEFF, 0xC0DFFF, 0xD3D2FF, 0xE8C8FF, 0xFBC2FF, 0xFEC4EA, 0xFECCC5, 0xF7D8A5,
    0xE4E594, 0xCFEF96, 0xBDF4AB, 0xB3F3CC, 0xB5EBF2, 0xB8B8B8, 0x000000, 0x000000,
];

/// RGB for a color index; bits 6-7 are ignored
#[inline]
pub fn palette_to_rgb(index: u8) -> u32 {
    NES_PALETTE[(index & 0x3F) as usize]
}

/// Split 0xRRGGBB into opaque RGBA bytes
#[inline]
pub fn rgb_to_rgba(rgb: u32) -> [u8; 4] {
    [
        ((rgb >> 16) & 0xFF) as u8, // Red
        ((rgb >> 8) & 0xFF) as u8,  // Green
        (rgb & 0xFF) as u8,         // Blue
        0xFF,                       // Alpha (fully opaque)
    ]
}

/// RGBA bytes for a color index
#[inline]
pub fn palette_to_rgba(index: u8) -> [u8; 4] {
    rgb_to_rgba(palette_to_rgb(index))
}
