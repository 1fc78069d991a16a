//! Brightness and luma helpers shared by the transform and the histogram.
//!
//! The tonal stages (highlights, shadows, whites, blacks) select pixels by
//! their plain channel average; saturation and vibrance blend around Rec.601
//! luma. Both work in the 0-255 domain.

/// Rec.601 coefficient for red channel in luma calculation.
pub const LUMA_R: f32 = 0.299;

/// Rec.601 coefficient for green channel in luma calculation.
pub const LUMA_G: f32 = 0.587;

/// Rec.601 coefficient for blue channel in luma calculation.
pub const LUMA_B: f32 = 0.114;

/// Rec.601 luma from channel values in the 0-255 range.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Rec.601 luma from u8 channels, rounded to the nearest bin.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    luma(r as f32, g as f32, b as f32).clamp(0.0, 255.0).round() as u8
}

/// Unweighted channel average, used to select tonal ranges.
#[inline]
pub fn average_brightness(r: f32, g: f32, b: f32) -> f32 {
    (r + g + b) / 3.0
}
