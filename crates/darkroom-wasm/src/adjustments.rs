//! Adjustment values for JavaScript.
//!
//! Setters clamp to each control's slider range, the same as manual numeric
//! entry in the editor.

use crate::types::{js_error, JsPixelBuffer};
use darkroom_core::{AdjustmentKey, Adjustments};
use wasm_bindgen::prelude::*;

/// Adjustment values wrapper for JavaScript
#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct JsAdjustments {
    inner: Adjustments,
}

#[wasm_bindgen]
impl JsAdjustments {
    /// Create new adjustments with every control at 0
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    #[wasm_bindgen(getter)]
    pub fn exposure(&self) -> f32 {
        self.inner.exposure
    }

    #[wasm_bindgen(setter)]
    pub fn set_exposure(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Exposure, value);
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Contrast, value);
    }

    #[wasm_bindgen(getter)]
    pub fn highlights(&self) -> f32 {
        self.inner.highlights
    }

    #[wasm_bindgen(setter)]
    pub fn set_highlights(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Highlights, value);
    }

    #[wasm_bindgen(getter)]
    pub fn shadows(&self) -> f32 {
        self.inner.shadows
    }

    #[wasm_bindgen(setter)]
    pub fn set_shadows(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Shadows, value);
    }

    #[wasm_bindgen(getter)]
    pub fn whites(&self) -> f32 {
        self.inner.whites
    }

    #[wasm_bindgen(setter)]
    pub fn set_whites(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Whites, value);
    }

    #[wasm_bindgen(getter)]
    pub fn blacks(&self) -> f32 {
        self.inner.blacks
    }

    #[wasm_bindgen(setter)]
    pub fn set_blacks(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Blacks, value);
    }

    #[wasm_bindgen(getter)]
    pub fn temperature(&self) -> f32 {
        self.inner.temperature
    }

    #[wasm_bindgen(setter)]
    pub fn set_temperature(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Temperature, value);
    }

    #[wasm_bindgen(getter)]
    pub fn tint(&self) -> f32 {
        self.inner.tint
    }

    #[wasm_bindgen(setter)]
    pub fn set_tint(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Tint, value);
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Saturation, value);
    }

    #[wasm_bindgen(getter)]
    pub fn vibrance(&self) -> f32 {
        self.inner.vibrance
    }

    #[wasm_bindgen(setter)]
    pub fn set_vibrance(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Vibrance, value);
    }

    /// Stored only; the transform does not apply sharpening.
    #[wasm_bindgen(getter)]
    pub fn sharpness(&self) -> f32 {
        self.inner.sharpness
    }

    #[wasm_bindgen(setter)]
    pub fn set_sharpness(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Sharpness, value);
    }

    /// Stored only; the transform does not apply clarity.
    #[wasm_bindgen(getter)]
    pub fn clarity(&self) -> f32 {
        self.inner.clarity
    }

    #[wasm_bindgen(setter)]
    pub fn set_clarity(&mut self, value: f32) {
        self.inner.set(AdjustmentKey::Clarity, value);
    }

    /// Read a control by its camelCase name.
    pub fn get(&self, key: &str) -> Result<f32, JsValue> {
        let key = key.parse::<AdjustmentKey>().map_err(js_error)?;
        Ok(self.inner.get(key))
    }

    /// Write a control by its camelCase name.
    pub fn set(&mut self, key: &str, value: f32) -> Result<(), JsValue> {
        let key = key.parse::<AdjustmentKey>().map_err(js_error)?;
        self.inner.set(key, value);
        Ok(())
    }

    /// Check if all adjustments are at default values
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a plain JS object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize from a plain JS object; missing fields are 0, values are clamped
    pub fn from_json(value: JsValue) -> Result<JsAdjustments, JsValue> {
        let inner: Adjustments = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        Ok(Self::from_inner(inner.clamped()))
    }
}

impl JsAdjustments {
    pub(crate) fn from_inner(inner: Adjustments) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Adjustments {
        &self.inner
    }
}

/// Apply adjustments to an image, returning a new image.
///
/// The source image is not modified.
///
/// # Example (TypeScript)
/// ```typescript
/// const adj = new JsAdjustments();
/// adj.exposure = 1.0;  // +1 stop
/// adj.contrast = 20;
///
/// const adjusted = apply_adjustments(sourceImage, adj);
/// ctx.putImageData(new ImageData(adjusted.to_clamped_array(), adjusted.width), 0, 0);
/// ```
#[wasm_bindgen]
pub fn apply_adjustments(image: &JsPixelBuffer, adjustments: &JsAdjustments) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(darkroom_core::apply_adjustments(
        image.buffer(),
        adjustments.inner(),
    ))
}
