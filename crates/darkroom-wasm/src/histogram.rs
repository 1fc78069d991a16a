//! Histogram WASM bindings.
//!
//! Computes RGB and luma histograms from RGBA pixel data for the histogram
//! panel.

use darkroom_core::histogram::compute_histogram as compute_histogram_core;
use darkroom_core::Histogram;
use wasm_bindgen::prelude::*;

/// Histogram result accessible from JavaScript.
///
/// Contains 256-bin histograms for red, green, blue, and luminance channels,
/// plus helper methods for clipping detection and normalization.
#[wasm_bindgen]
pub struct JsHistogram {
    red: Vec<u32>,
    green: Vec<u32>,
    blue: Vec<u32>,
    luminance: Vec<u32>,
    max_value: u32,
    has_highlight_clipping: bool,
    has_shadow_clipping: bool,
}

#[wasm_bindgen]
impl JsHistogram {
    /// Get red channel histogram (256 bins).
    pub fn red(&self) -> Vec<u32> {
        self.red.clone()
    }

    /// Get green channel histogram (256 bins).
    pub fn green(&self) -> Vec<u32> {
        self.green.clone()
    }

    /// Get blue channel histogram (256 bins).
    pub fn blue(&self) -> Vec<u32> {
        self.blue.clone()
    }

    /// Get luminance histogram (256 bins).
    pub fn luminance(&self) -> Vec<u32> {
        self.luminance.clone()
    }

    /// Get maximum bin value across all RGB channels.
    ///
    /// Useful for normalizing histogram display.
    #[wasm_bindgen(getter)]
    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Check if any RGB channel has values at 255 (highlight clipping).
    #[wasm_bindgen(getter)]
    pub fn has_highlight_clipping(&self) -> bool {
        self.has_highlight_clipping
    }

    /// Check if any RGB channel has values at 0 (shadow clipping).
    #[wasm_bindgen(getter)]
    pub fn has_shadow_clipping(&self) -> bool {
        self.has_shadow_clipping
    }
}

impl From<Histogram> for JsHistogram {
    fn from(hist: Histogram) -> Self {
        Self {
            red: hist.red.to_vec(),
            green: hist.green.to_vec(),
            blue: hist.blue.to_vec(),
            luminance: hist.luminance.to_vec(),
            max_value: hist.max_value(),
            has_highlight_clipping: hist.has_highlight_clipping(),
            has_shadow_clipping: hist.has_shadow_clipping(),
        }
    }
}

/// Compute histogram from RGBA pixel data.
///
/// # Arguments
/// * `pixels` - RGBA pixel data, e.g. `ImageData.data` (4 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Example (TypeScript)
/// ```typescript
/// const data = ctx.getImageData(0, 0, w, h).data;
/// const hist = compute_histogram(new Uint8Array(data.buffer), w, h);
/// const redBins = hist.red();        // Uint32Array[256]
/// const max = hist.max_value;        // For normalization
/// hist.free();
/// ```
#[wasm_bindgen]
pub fn compute_histogram(pixels: &[u8], width: u32, height: u32) -> JsHistogram {
    compute_histogram_core(pixels, width, height).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_histogram_creation() {
        let pixels = vec![255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255];
        let hist = compute_histogram(&pixels, 3, 1);

        assert_eq!(hist.red().len(), 256);
        assert_eq!(hist.luminance().len(), 256);
        assert!(hist.has_highlight_clipping);
        assert!(hist.has_shadow_clipping);
    }

    #[test]
    fn test_js_histogram_max_value() {
        let pixels = vec![
            128, 128, 128, 255, //
            128, 128, 128, 255, //
            128, 128, 128, 255, //
            200, 200, 200, 255,
        ];
        let hist = compute_histogram(&pixels, 4, 1);

        assert_eq!(hist.max_value, 3);
        assert_eq!(hist.red()[128], 3);
        assert_eq!(hist.red()[200], 1);
    }

    #[test]
    fn test_js_histogram_alpha_not_counted() {
        // Alpha 255 and 0 must not land in any channel
        let pixels = vec![64, 64, 64, 255, 192, 192, 192, 0];
        let hist = compute_histogram(&pixels, 2, 1);

        assert!(!hist.has_highlight_clipping);
        assert!(!hist.has_shadow_clipping);
        assert_eq!(hist.red().iter().sum::<u32>(), 2);
    }

    #[test]
    fn test_js_histogram_empty() {
        let hist = compute_histogram(&[], 0, 0);

        assert_eq!(hist.max_value, 0);
        assert!(!hist.has_highlight_clipping);
        assert!(!hist.has_shadow_clipping);
    }
}
