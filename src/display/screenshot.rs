// Screenshot encoding
//
// Encodes a frame as an 8-bit RGB PNG in memory. Writing the bytes somewhere
// is up to the host.

use std::io::Write;

use thiserror::Error;

use super::frame::DisplayInfo;

/// Errors that can occur while encoding a screenshot
#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    #[error("frame has {found} pixels, expected {expected}")]
    FrameSize { expected: usize, found: usize },
}

/// Encode the frame as PNG into `out`
pub fn write_png<W: Write>(frame: &DisplayInfo<'_>, out: W) -> Result<(), ScreenshotError> {
    let expected = frame.width * frame.height;
    if frame.pixels.len() != expected {
        return Err(ScreenshotError::FrameSize {
            expected,
            found: frame.pixels.len(),
        });
    }

    let mut encoder = png::Encoder::new(out, frame.width as u32, frame.height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.to_rgb_vec())?;
    writer.finish()?;
    Ok(())
}

/// Encode the frame as PNG bytes
///
/// # Example
///
/// ```
/// use madnes::display::{encode_png, DisplayInfo, SCREEN_SIZE};
///
/// let pixels = vec![0x0F; SCREEN_SIZE];
/// let png = encode_png(&DisplayInfo::new(&pixels, 0)).expect("encode");
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn encode_png(frame: &DisplayInfo<'_>) -> Result<Vec<u8>, ScreenshotError> {
    let mut bytes = Vec::new();
    write_png(frame, &mut bytes)?;
    Ok(bytes)
}
