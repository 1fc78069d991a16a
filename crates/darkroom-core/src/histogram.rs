//! Histogram computation from RGBA pixel data.
//!
//! Feeds the histogram panel of the editor, which plots the rendered
//! (adjusted) image rather than the original.

use crate::decode::{PixelBuffer, BYTES_PER_PIXEL};
use crate::luminance::luma_u8;
use crate::Histogram;

/// Compute RGB and luma histograms from RGBA pixel data.
///
/// Alpha is ignored. A trailing partial pixel is ignored.
pub fn compute_histogram(pixels: &[u8], width: u32, height: u32) -> Histogram {
    let mut hist = Histogram::new();

    let expected_len = (width as usize) * (height as usize) * BYTES_PER_PIXEL;

    // Early return for empty or invalid data
    if pixels.is_empty() || expected_len == 0 {
        return hist;
    }

    debug_assert!(
        pixels.len() == expected_len,
        "Pixel data size mismatch. Expected {}, got {}",
        expected_len,
        pixels.len()
    );

    for chunk in pixels.chunks_exact(BYTES_PER_PIXEL) {
        hist.red[chunk[0] as usize] += 1;
        hist.green[chunk[1] as usize] += 1;
        hist.blue[chunk[2] as usize] += 1;

        let lum = luma_u8(chunk[0], chunk[1], chunk[2]);
        hist.luminance[lum as usize] += 1;
    }

    hist
}

/// Histogram of a whole buffer.
pub fn histogram_of(buffer: &PixelBuffer) -> Histogram {
    compute_histogram(&buffer.pixels, buffer.width, buffer.height)
}
