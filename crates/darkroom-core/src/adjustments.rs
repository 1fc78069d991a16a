//! Color/tone transform.
//!
//! Applies the tonal and color adjustments to RGBA pixel data.
//!
//! ## Adjustment Order
//! 1. Exposure
//! 2. Contrast
//! 3. Highlights
//! 4. Shadows
//! 5. Whites
//! 6. Blacks
//! 7. Temperature
//! 8. Tint
//! 9. Saturation
//! 10. Vibrance
//!
//! Each stage reads the output of the previous one, so the brightness that
//! selects pixels in stages 3-6 is recomputed from the running values. Every
//! channel is clamped to [0, 255] after each stage that runs. A control at 0
//! skips its stage entirely.
//!
//! `sharpness` and `clarity` are not rendered.

use crate::decode::{PixelBuffer, BYTES_PER_PIXEL};
use crate::luminance::{average_brightness, luma};
use crate::Adjustments;

type Rgb = (f32, f32, f32);

/// Apply adjustments to a source buffer, producing a new buffer.
///
/// The source is never modified. With default adjustments the result is a
/// byte-for-byte copy.
pub fn apply_adjustments(source: &PixelBuffer, adjustments: &Adjustments) -> PixelBuffer {
    let mut pixels = source.pixels.clone();
    apply_all_adjustments(&mut pixels, adjustments);
    PixelBuffer {
        width: source.width,
        height: source.height,
        pixels,
    }
}

/// Apply all adjustments to RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `adjustments` - The adjustment values to apply
///
/// Alpha is left untouched. A trailing partial pixel is ignored.
pub fn apply_all_adjustments(pixels: &mut [u8], adjustments: &Adjustments) {
    // Early exit if no adjustments
    if adjustments.is_default() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        let rgb = (chunk[0] as f32, chunk[1] as f32, chunk[2] as f32);
        let (r, g, b) = adjust_pixel(rgb, adjustments);

        chunk[0] = to_byte(r);
        chunk[1] = to_byte(g);
        chunk[2] = to_byte(b);
    }
}

/// Run one pixel through every stage in order.
#[inline]
pub fn adjust_pixel(rgb: Rgb, adj: &Adjustments) -> Rgb {
    let mut rgb = rgb;
    rgb = apply_exposure(rgb, adj.exposure);
    rgb = apply_contrast(rgb, adj.contrast);
    rgb = apply_highlights(rgb, adj.highlights);
    rgb = apply_shadows(rgb, adj.shadows);
    rgb = apply_whites(rgb, adj.whites);
    rgb = apply_blacks(rgb, adj.blacks);
    rgb = apply_temperature(rgb, adj.temperature);
    rgb = apply_tint(rgb, adj.tint);
    rgb = apply_saturation(rgb, adj.saturation);
    apply_vibrance(rgb, adj.vibrance)
}

/// Round half to even, the way a canvas stores float channel values.
#[inline]
fn to_byte(v: f32) -> u8 {
    v.clamp(0.0, 255.0).round_ties_even() as u8
}

#[inline]
fn clamp_rgb((r, g, b): Rgb) -> Rgb {
    (r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), b.clamp(0.0, 255.0))
}

#[inline]
fn offset((r, g, b): Rgb, amount: f32) -> Rgb {
    clamp_rgb((r + amount, g + amount, b + amount))
}

/// Blend each channel away from (factor > 1) or toward (factor < 1) luma.
#[inline]
fn blend_from_luma((r, g, b): Rgb, factor: f32) -> Rgb {
    let gray = luma(r, g, b);
    clamp_rgb((
        gray + (r - gray) * factor,
        gray + (g - gray) * factor,
        gray + (b - gray) * factor,
    ))
}

/// Exposure in stops: `v * 2^exposure`.
#[inline]
fn apply_exposure(rgb: Rgb, exposure: f32) -> Rgb {
    if exposure == 0.0 {
        return rgb;
    }
    let multiplier = 2.0_f32.powf(exposure);
    clamp_rgb((rgb.0 * multiplier, rgb.1 * multiplier, rgb.2 * multiplier))
}

/// Contrast pivoting on mid-gray.
///
/// `((v/255 - 0.5) * f + 0.5) * 255` with `f = (contrast + 100) / 100`,
/// written as `(v - 127.5) * f + 127.5` so the pivot is exact.
#[inline]
fn apply_contrast(rgb: Rgb, contrast: f32) -> Rgb {
    if contrast == 0.0 {
        return rgb;
    }
    let factor = (contrast + 100.0) / 100.0;
    let pivot = 127.5;
    clamp_rgb((
        (rgb.0 - pivot) * factor + pivot,
        (rgb.1 - pivot) * factor + pivot,
        (rgb.2 - pivot) * factor + pivot,
    ))
}

/// Lifts or pulls pixels brighter than 128, scaled by how far above 128.
#[inline]
fn apply_highlights(rgb: Rgb, highlights: f32) -> Rgb {
    if highlights == 0.0 {
        return rgb;
    }
    let brightness = average_brightness(rgb.0, rgb.1, rgb.2);
    if brightness <= 128.0 {
        return rgb;
    }
    let factor = ((brightness - 128.0) / 127.0) * (highlights / 100.0);
    offset(rgb, factor * 50.0)
}

/// Lifts or pulls pixels darker than 128, scaled by how far below 128.
#[inline]
fn apply_shadows(rgb: Rgb, shadows: f32) -> Rgb {
    if shadows == 0.0 {
        return rgb;
    }
    let brightness = average_brightness(rgb.0, rgb.1, rgb.2);
    if brightness >= 128.0 {
        return rgb;
    }
    let factor = ((128.0 - brightness) / 128.0) * (shadows / 100.0);
    offset(rgb, factor * 50.0)
}

/// Only pixels brighter than 180.
#[inline]
fn apply_whites(rgb: Rgb, whites: f32) -> Rgb {
    if whites == 0.0 {
        return rgb;
    }
    let brightness = average_brightness(rgb.0, rgb.1, rgb.2);
    if brightness <= 180.0 {
        return rgb;
    }
    let factor = ((brightness - 180.0) / 75.0) * (whites / 100.0);
    offset(rgb, factor * 50.0)
}

/// Only pixels darker than 75. Positive values darken.
#[inline]
fn apply_blacks(rgb: Rgb, blacks: f32) -> Rgb {
    if blacks == 0.0 {
        return rgb;
    }
    let brightness = average_brightness(rgb.0, rgb.1, rgb.2);
    if brightness >= 75.0 {
        return rgb;
    }
    let factor = ((75.0 - brightness) / 75.0) * (blacks / 100.0);
    offset(rgb, -factor * 30.0)
}

/// Positive warms (red up, blue down), negative cools.
#[inline]
fn apply_temperature(rgb: Rgb, temperature: f32) -> Rgb {
    if temperature == 0.0 {
        return rgb;
    }
    let shift = (temperature / 100.0) * 40.0;
    clamp_rgb((rgb.0 + shift, rgb.1, rgb.2 - shift))
}

/// Positive shifts toward magenta (red up, green down), negative toward green.
#[inline]
fn apply_tint(rgb: Rgb, tint: f32) -> Rgb {
    if tint == 0.0 {
        return rgb;
    }
    let shift = (tint / 100.0) * 20.0;
    clamp_rgb((rgb.0 + shift, rgb.1 - shift, rgb.2))
}

/// Global saturation around Rec.601 luma. -100 is full grayscale.
#[inline]
fn apply_saturation(rgb: Rgb, saturation: f32) -> Rgb {
    if saturation == 0.0 {
        return rgb;
    }
    blend_from_luma(rgb, (saturation + 100.0) / 100.0)
}

/// Saturation that fades out as the channel spread approaches 128.
///
/// Pixels whose `max - min` spread is already 128 or more are left alone.
#[inline]
fn apply_vibrance(rgb: Rgb, vibrance: f32) -> Rgb {
    if vibrance == 0.0 {
        return rgb;
    }
    let (r, g, b) = rgb;
    let spread = r.max(g).max(b) - r.min(g).min(b);
    if spread >= 128.0 {
        return rgb;
    }
    let factor = 1.0 + (vibrance / 100.0) * ((128.0 - spread) / 128.0);
    blend_from_luma(rgb, factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create a single opaque pixel
    fn pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b, 255]
    }

    /// Helper to apply adjustments and return resulting pixel
    fn apply(pixels: &[u8], adj: &Adjustments) -> Vec<u8> {
        let mut result = pixels.to_vec();
        apply_all_adjustments(&mut result, adj);
        result
    }

    // ===== Identity Tests =====

    #[test]
    fn test_identity_no_adjustments() {
        let pixels = pixel(128, 64, 192);
        let result = apply(&pixels, &Adjustments::default());
        assert_eq!(result, pixels, "Default adjustments should not change pixels");
    }

    #[test]
    fn test_identity_ignores_unrendered_controls() {
        let pixels = pixel(17, 200, 99);
        let adj = Adjustments {
            sharpness: 80.0,
            clarity: 35.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixels, &adj), pixels);
    }

    #[test]
    fn test_source_buffer_not_mutated() {
        let source = PixelBuffer::filled(4, 4, [100, 100, 100, 255]);
        let adj = Adjustments {
            exposure: 1.0,
            ..Default::default()
        };
        let result = apply_adjustments(&source, &adj);

        assert_eq!(source.pixel(0, 0), Some([100, 100, 100, 255]));
        assert_eq!(result.pixel(0, 0), Some([200, 200, 200, 255]));
        assert_eq!((result.width, result.height), (4, 4));
    }

    // ===== Exposure Tests =====

    #[test]
    fn test_exposure_doubles_mid_gray() {
        let adj = Adjustments {
            exposure: 1.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(100, 100, 100), &adj), pixel(200, 200, 200));
    }

    #[test]
    fn test_exposure_negative_one_stop() {
        let adj = Adjustments {
            exposure: -1.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(64, 64, 64));
    }

    #[test]
    fn test_exposure_clips_at_white() {
        let adj = Adjustments {
            exposure: 2.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(200, 200, 200), &adj), pixel(255, 255, 255));
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_pivots_at_midpoint() {
        let adj = Adjustments {
            contrast: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(128, 128, 128));
    }

    #[test]
    fn test_contrast_positive_spreads_values() {
        let adj = Adjustments {
            contrast: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(64, 128, 192), &adj);
        // (64 - 127.5) * 2 + 127.5 = 0.5 -> 0
        assert_eq!(result[0], 0);
        // (192 - 127.5) * 2 + 127.5 = 256.5 -> clamped
        assert_eq!(result[2], 255);
    }

    #[test]
    fn test_contrast_negative_moves_toward_gray() {
        let adj = Adjustments {
            contrast: -50.0,
            ..Default::default()
        };
        let result = apply(&pixel(0, 128, 255), &adj);
        // (0 - 127.5) * 0.5 + 127.5 = 63.75
        assert_eq!(result[0], 64);
        assert_eq!(result[2], 191);
    }

    // ===== Tonal Range Tests =====

    #[test]
    fn test_highlights_only_affects_bright() {
        let adj = Adjustments {
            highlights: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(30, 30, 30), &adj), pixel(30, 30, 30));
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(128, 128, 128));

        // brightness 255: factor = 1, +50
        let result = apply(&pixel(200, 200, 200), &adj);
        // (200 - 128) / 127 * 50 = 28.35
        assert_eq!(result, pixel(228, 228, 228));
    }

    #[test]
    fn test_shadows_only_affects_dark() {
        let adj = Adjustments {
            shadows: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(220, 220, 220), &adj), pixel(220, 220, 220));

        // (128 - 0) / 128 * 50 = 50
        assert_eq!(apply(&pixel(0, 0, 0), &adj), pixel(50, 50, 50));
    }

    #[test]
    fn test_whites_threshold() {
        let adj = Adjustments {
            whites: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(180, 180, 180), &adj), pixel(180, 180, 180));
        // (255 - 180) / 75 * 50 = 50, clamped
        assert_eq!(apply(&pixel(255, 255, 255), &adj), pixel(255, 255, 255));
        // (210 - 180) / 75 * 50 = 20
        assert_eq!(apply(&pixel(210, 210, 210), &adj), pixel(230, 230, 230));
    }

    #[test]
    fn test_blacks_darkens_deep_shadows() {
        let adj = Adjustments {
            blacks: 100.0,
            ..Default::default()
        };
        // (75 - 45) / 75 * 30 = 12
        assert_eq!(apply(&pixel(45, 45, 45), &adj), pixel(33, 33, 33));
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(128, 128, 128));
    }

    #[test]
    fn test_tonal_stages_cascade() {
        // Highlights runs first and sees brightness 100, so only shadows acts.
        let adj = Adjustments {
            highlights: 100.0,
            shadows: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(100, 100, 100), &adj);
        // (128 - 100) / 128 * 50 = 10.9375
        assert_eq!(result, pixel(111, 111, 111));

        // Exposure pushes 100 to 200 before highlights reads brightness.
        let adj = Adjustments {
            exposure: 1.0,
            highlights: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(100, 100, 100), &adj), pixel(228, 228, 228));
    }

    // ===== Color Balance Tests =====

    #[test]
    fn test_temperature_warm() {
        let adj = Adjustments {
            temperature: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(168, 128, 88));
    }

    #[test]
    fn test_temperature_cool() {
        let adj = Adjustments {
            temperature: -50.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(108, 128, 148));
    }

    #[test]
    fn test_tint() {
        let adj = Adjustments {
            tint: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(148, 108, 128));

        let adj = Adjustments {
            tint: -100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(128, 128, 128), &adj), pixel(108, 148, 128));
    }

    // ===== Saturation Tests =====

    #[test]
    fn test_saturation_increase() {
        let adj = Adjustments {
            saturation: 50.0,
            ..Default::default()
        };
        let result = apply(&pixel(200, 128, 100), &adj);
        let orig_diff = 200 - 100;
        let new_diff = result[0] as i32 - result[2] as i32;
        assert!(new_diff > orig_diff, "Color difference should increase");
    }

    #[test]
    fn test_saturation_full_desaturate() {
        let adj = Adjustments {
            saturation: -100.0,
            ..Default::default()
        };
        let result = apply(&pixel(200, 128, 100), &adj);
        // luma = 0.299*200 + 0.587*128 + 0.114*100 = 146.336
        assert_eq!(result, pixel(146, 146, 146));
    }

    #[test]
    fn test_saturation_leaves_gray_alone() {
        let adj = Adjustments {
            saturation: 100.0,
            ..Default::default()
        };
        assert_eq!(apply(&pixel(90, 90, 90), &adj), pixel(90, 90, 90));
    }

    // ===== Vibrance Tests =====

    #[test]
    fn test_vibrance_protects_saturated() {
        let adj = Adjustments {
            vibrance: 100.0,
            ..Default::default()
        };
        // spread 255 >= 128: untouched
        assert_eq!(apply(&pixel(255, 0, 0), &adj), pixel(255, 0, 0));
        // spread exactly 128: untouched
        assert_eq!(apply(&pixel(178, 50, 50), &adj), pixel(178, 50, 50));
    }

    #[test]
    fn test_vibrance_boosts_muted() {
        let adj = Adjustments {
            vibrance: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(140, 130, 120), &adj);
        let new_diff = result[0] as i32 - result[2] as i32;
        assert!(new_diff > 20, "Muted color should get more saturated");
    }

    #[test]
    fn test_vibrance_weaker_than_saturation_on_colorful_pixels() {
        let px = pixel(180, 120, 90);
        let vib = apply(
            &px,
            &Adjustments {
                vibrance: 100.0,
                ..Default::default()
            },
        );
        let sat = apply(
            &px,
            &Adjustments {
                saturation: 100.0,
                ..Default::default()
            },
        );
        assert!(vib[0] < sat[0]);
    }

    // ===== Alpha and Layout Tests =====

    #[test]
    fn test_alpha_passes_through() {
        let adj = Adjustments {
            exposure: 1.5,
            saturation: -40.0,
            ..Default::default()
        };
        let result = apply(&[10, 20, 30, 77], &adj);
        assert_eq!(result[3], 77);
    }

    #[test]
    fn test_extreme_values_stay_in_range() {
        let adj = Adjustments {
            exposure: 2.0,
            contrast: 100.0,
            highlights: 100.0,
            shadows: 100.0,
            whites: 100.0,
            blacks: 100.0,
            temperature: 100.0,
            tint: 100.0,
            saturation: 100.0,
            vibrance: 100.0,
            ..Default::default()
        };
        let result = apply(&pixel(128, 128, 128), &adj);
        assert_eq!(result.len(), 4);
        assert_eq!(result[3], 255);
    }

    #[test]
    fn test_multiple_pixels() {
        let mut pixels = vec![
            255, 0, 0, 255, // Red
            0, 255, 0, 255, // Green
            0, 0, 255, 255, // Blue
            128, 128, 128, 255, // Gray
        ];
        let adj = Adjustments {
            saturation: -100.0,
            ..Default::default()
        };
        apply_all_adjustments(&mut pixels, &adj);

        for px in pixels.chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_empty_pixels() {
        let mut pixels: Vec<u8> = vec![];
        let adj = Adjustments {
            exposure: 1.0,
            ..Default::default()
        };
        apply_all_adjustments(&mut pixels, &adj);
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_incomplete_pixel_ignored() {
        // 6 bytes = 1 complete pixel + 2 byte remainder
        let mut pixels = vec![100, 100, 100, 255, 64, 64];
        let adj = Adjustments {
            exposure: 1.0,
            ..Default::default()
        };
        apply_all_adjustments(&mut pixels, &adj);
        assert_eq!(&pixels[..4], &[200, 200, 200, 255]);
        assert_eq!(&pixels[4..], &[64, 64]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
