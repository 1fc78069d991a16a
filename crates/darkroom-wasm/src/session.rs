//! Editor session bindings.
//!
//! [`JsEditorSession`] is the object the page holds for the open image. The
//! page feeds it user edits and `performance.now()` timestamps; frames come
//! back through [`JsEditorSession::poll_render`] once the debounce window
//! has passed.
//!
//! # Example
//!
//! ```typescript
//! const session = JsEditorSession.load(bytes, file.name, file.type, undefined);
//!
//! slider.oninput = () => session.update_adjustment('exposure', slider.valueAsNumber);
//!
//! function loop(now: number) {
//!   const frame = session.poll_render(now);
//!   if (frame) {
//!     ctx.putImageData(new ImageData(frame.to_clamped_array(), frame.width, frame.height), 0, 0);
//!     frame.free();
//!   }
//!   requestAnimationFrame(loop);
//! }
//! requestAnimationFrame(loop);
//! ```

use std::time::Duration;

use darkroom_core::encode::{ExportFormat, ExportedImage};
use darkroom_core::render::{Frame, ManualClock, RenderDriver, Surface};
use darkroom_core::session::ComparisonMode;
use darkroom_core::{AdjustmentKey, CropAspect, CropHandle, CropRect, EditorConfig, EditorSession};
use js_sys::Uint8ClampedArray;
use wasm_bindgen::prelude::*;

use crate::adjustments::JsAdjustments;
use crate::encode::export_quality;
use crate::histogram::JsHistogram;
use crate::types::js_error;

/// Convert a JS timestamp in milliseconds. Garbage maps to zero.
fn duration_from_ms(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}

/// Keeps the last frame the driver drew.
#[derive(Default)]
struct FrameSlot {
    frame: Option<Frame>,
}

impl Surface for FrameSlot {
    fn draw(&mut self, frame: &Frame) {
        self.frame = Some(frame.clone());
    }
}

/// One rendered frame, ready for `putImageData`.
#[wasm_bindgen]
pub struct JsFrame {
    inner: Frame,
}

#[wasm_bindgen]
impl JsFrame {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.pixels.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.pixels.height
    }

    /// Column of the before/after divider, if the frame has one.
    #[wasm_bindgen(getter)]
    pub fn divider_x(&self) -> Option<u32> {
        self.inner.divider_x
    }

    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.pixels.clone()
    }

    pub fn to_clamped_array(&self) -> Uint8ClampedArray {
        Uint8ClampedArray::from(self.inner.pixels.pixels.as_slice())
    }

    /// Pane captions as `[{ text, x }]`.
    pub fn labels(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.labels).map_err(js_error)
    }
}

impl From<Frame> for JsFrame {
    fn from(inner: Frame) -> Self {
        Self { inner }
    }
}

/// An encoded export, ready to wrap in a `Blob` and download.
#[wasm_bindgen]
pub struct JsExportedImage {
    inner: ExportedImage,
}

#[wasm_bindgen]
impl JsExportedImage {
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }
}

/// The open image and everything edited on it.
#[wasm_bindgen]
pub struct JsEditorSession {
    session: EditorSession,
    driver: RenderDriver<ManualClock>,
    /// Revision most recently handed to the driver
    requested: Option<u64>,
}

#[wasm_bindgen]
impl JsEditorSession {
    /// Decode a user file and open a session on it.
    ///
    /// `config` is an optional `EditorConfig` object (camelCase keys); pass
    /// `undefined` for defaults. Out-of-range values are clamped.
    pub fn load(
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
        config: JsValue,
    ) -> Result<JsEditorSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let session = EditorSession::load(bytes, file_name, mime_type, config).map_err(js_error)?;
        Ok(Self::from_session(session))
    }

    // ===== Image =====

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.session.original().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.session.original().height
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.session.metadata().file_name.clone()
    }

    /// `{ fileName, mimeType, fileSize, width, height, orientation }`
    pub fn metadata(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.session.metadata()).map_err(js_error)
    }

    /// Bumped by every change that needs a new frame.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.session.revision() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn is_processing(&self) -> bool {
        self.session.is_processing()
    }

    // ===== Adjustments =====

    pub fn adjustments(&self) -> JsAdjustments {
        JsAdjustments::from_inner(self.session.adjustments())
    }

    /// Set one control by name (`exposure`, `contrast`, ...). The value is
    /// clamped to the control's range and recorded in history.
    pub fn update_adjustment(&mut self, key: &str, value: f32) -> Result<(), JsValue> {
        let key = key.parse::<AdjustmentKey>().map_err(js_error)?;
        self.session.update_adjustment(key, value);
        Ok(())
    }

    pub fn reset_adjustment(&mut self, key: &str) -> Result<(), JsValue> {
        let key = key.parse::<AdjustmentKey>().map_err(js_error)?;
        self.session.reset_adjustment(key);
        Ok(())
    }

    pub fn reset_all_adjustments(&mut self) {
        self.session.reset_all_adjustments();
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn histogram(&mut self) -> JsHistogram {
        self.session.histogram().into()
    }

    // ===== Crop =====

    /// `{ x, y, width, height }`, normalized to 0..1.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.crop_rect()).map_err(js_error)
    }

    pub fn set_crop_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.session.set_crop_rect(CropRect::new(x, y, width, height));
    }

    /// `free`, `16:9`, `1:1`, `4:3` or `4:5`.
    #[wasm_bindgen(getter)]
    pub fn crop_aspect(&self) -> String {
        self.session.crop_aspect().as_str().to_string()
    }

    pub fn set_crop_aspect(&mut self, aspect: &str) -> Result<(), JsValue> {
        let aspect = aspect.parse::<CropAspect>().map_err(js_error)?;
        self.session.set_crop_aspect(aspect);
        Ok(())
    }

    /// One pointer-move step. `handle` is `move`, `top-left`, `top-right`,
    /// `bottom-left` or `bottom-right`; deltas are fractions of the image.
    pub fn drag_crop(&mut self, handle: &str, dx: f32, dy: f32) -> Result<(), JsValue> {
        let handle = handle.parse::<CropHandle>().map_err(js_error)?;
        self.session.drag_crop(handle, dx, dy);
        Ok(())
    }

    pub fn reset_crop(&mut self) {
        self.session.reset_crop();
    }

    /// Replace the image with the crop window's pixels.
    pub fn apply_crop(&mut self) -> Result<(), JsValue> {
        self.session.apply_crop().map_err(js_error)
    }

    // ===== Comparison =====

    #[wasm_bindgen(getter)]
    pub fn comparison(&self) -> bool {
        self.session.comparison()
    }

    pub fn set_comparison(&mut self, enabled: bool) {
        self.session.set_comparison(enabled);
    }

    pub fn toggle_comparison(&mut self) {
        self.session.toggle_comparison();
    }

    /// `split`, `toggle` or `side-by-side`.
    #[wasm_bindgen(getter)]
    pub fn comparison_mode(&self) -> String {
        self.session.comparison_mode().as_str().to_string()
    }

    pub fn set_comparison_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = mode.parse::<ComparisonMode>().map_err(js_error)?;
        self.session.set_comparison_mode(mode);
        Ok(())
    }

    // ===== Render =====

    /// Schedule a frame for the current state.
    pub fn request_render(&mut self, now_ms: f64) {
        self.driver.clock().set(duration_from_ms(now_ms));
        self.request();
    }

    /// Call once per animation frame. Returns a frame when one is due.
    ///
    /// Changes made since the last call are picked up here, so the page
    /// does not need to call `request_render` after every edit.
    pub fn poll_render(&mut self, now_ms: f64) -> Option<JsFrame> {
        self.driver.clock().set(duration_from_ms(now_ms));

        let revision = self.session.revision();
        if self.requested != Some(revision) && self.driver.last_drawn() != Some(revision) {
            self.request();
        }

        let mut slot = FrameSlot::default();
        self.driver.tick(&mut self.session, &mut slot)?;
        slot.frame.map(JsFrame::from)
    }

    /// Draw immediately, skipping the debounce.
    pub fn render_now(&mut self) -> JsFrame {
        let mut slot = FrameSlot::default();
        self.driver.flush(&mut self.session, &mut slot);
        self.requested = Some(self.session.revision());
        JsFrame::from(slot.frame.unwrap_or_else(|| self.blank_frame()))
    }

    // ===== Export =====

    #[wasm_bindgen(getter)]
    pub fn export_dialog_open(&self) -> bool {
        self.session.export_dialog_open()
    }

    pub fn open_export_dialog(&mut self) {
        self.session.open_export_dialog();
    }

    pub fn close_export_dialog(&mut self) {
        self.session.close_export_dialog();
    }

    /// Encode the adjusted image. `format` is `jpeg` or `png`; `quality`
    /// defaults to the configured export quality and is ignored for PNG.
    pub fn export(&mut self, format: &str, quality: Option<u32>) -> Result<JsExportedImage, JsValue> {
        let format = format.parse::<ExportFormat>().map_err(js_error)?;
        let mut options = self.session.default_export_options(format);
        if let Some(quality) = quality {
            options.quality = export_quality(quality);
        }
        let inner = self.session.export(options).map_err(js_error)?;
        Ok(JsExportedImage { inner })
    }
}

impl JsEditorSession {
    pub(crate) fn from_session(session: EditorSession) -> Self {
        let driver = RenderDriver::from_config(ManualClock::new(), session.config());
        Self {
            session,
            driver,
            requested: None,
        }
    }

    fn request(&mut self) {
        self.driver.notify(&mut self.session);
        self.requested = Some(self.session.revision());
    }

    fn blank_frame(&self) -> Frame {
        Frame {
            pixels: self.session.original().clone(),
            divider_x: None,
            labels: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkroom_core::decode::{LoadedImage, PixelBuffer};
    use darkroom_core::ImageMetadata;

    fn session(width: u32, height: u32) -> JsEditorSession {
        let metadata = ImageMetadata {
            file_name: "photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            file_size: 1234,
            width,
            height,
            ..Default::default()
        };
        let pixels = PixelBuffer::filled(width, height, [100, 100, 100, 255]);
        let core = EditorSession::new(LoadedImage { metadata, pixels }, EditorConfig::default());
        JsEditorSession::from_session(core)
    }

    #[test]
    fn test_poll_render_waits_for_debounce() {
        let mut s = session(4, 4);
        s.update_adjustment("exposure", 1.0).unwrap();

        assert!(s.poll_render(100.0).is_none());
        assert!(s.is_processing());
        assert!(s.poll_render(110.0).is_none());

        let frame = s.poll_render(116.0).expect("frame due");
        assert_eq!((frame.width(), frame.height()), (4, 4));
        assert_eq!(frame.pixels()[0], 200);
        assert!(!s.is_processing());

        // Nothing changed since
        assert!(s.poll_render(500.0).is_none());
    }

    #[test]
    fn test_burst_of_edits_renders_once() {
        let mut s = session(2, 2);
        s.update_adjustment("exposure", 0.2).unwrap();
        assert!(s.poll_render(0.0).is_none());
        s.update_adjustment("exposure", 0.6).unwrap();
        assert!(s.poll_render(10.0).is_none());
        s.update_adjustment("exposure", 1.0).unwrap();
        assert!(s.poll_render(20.0).is_none());

        let frame = s.poll_render(36.0).expect("frame due");
        assert_eq!(frame.pixels()[0], 200);
        assert!(s.poll_render(100.0).is_none());
    }

    #[test]
    fn test_render_now_and_comparison() {
        let mut s = session(10, 2);
        s.update_adjustment("exposure", 1.0).unwrap();
        s.set_comparison(true);
        assert_eq!(s.comparison_mode(), "split");

        let frame = s.render_now();
        assert_eq!(frame.divider_x(), Some(5));
        let px = frame.pixels();
        assert_eq!(px[0], 100);
        assert_eq!(px[9 * 4], 200);

        s.set_comparison_mode("side-by-side").unwrap();
        let frame = s.render_now();
        assert_eq!(frame.width(), 20);
        assert_eq!(frame.divider_x(), Some(10));
    }

    #[test]
    fn test_undo_redo() {
        let mut s = session(2, 2);
        assert!(!s.can_undo());

        s.update_adjustment("contrast", 40.0).unwrap();
        s.update_adjustment("contrast", 80.0).unwrap();
        assert!(s.undo());
        assert_eq!(s.adjustments().contrast(), 40.0);
        assert!(s.redo());
        assert_eq!(s.adjustments().contrast(), 80.0);
        assert!(!s.redo());
    }

    #[test]
    fn test_crop_flow() {
        let mut s = session(100, 50);
        s.set_crop_aspect("1:1").unwrap();
        assert_eq!(s.crop_aspect(), "1:1");

        s.drag_crop("move", -1.0, -1.0).unwrap();
        s.apply_crop().unwrap();

        // Square on a 2:1 image: half the width, full height
        assert_eq!((s.width(), s.height()), (50, 50));
        assert_eq!(s.crop_aspect(), "free");
    }

    #[test]
    fn test_export_png() {
        let mut s = session(3, 3);
        s.open_export_dialog();

        let exported = s.export("png", None).unwrap();
        assert_eq!(exported.mime_type(), "image/png");
        assert_eq!(exported.file_name(), "photo_edited.png");
        assert_eq!(&exported.bytes()[1..4], b"PNG");
        assert!(!s.export_dialog_open());
    }

    #[test]
    fn test_export_jpeg_with_quality() {
        let mut s = session(8, 8);
        let exported = s.export("jpg", Some(50)).unwrap();
        assert_eq!(exported.mime_type(), "image/jpeg");
        assert_eq!(exported.file_name(), "photo_edited.jpeg");
    }

    #[test]
    fn test_export_quality_above_range_clamps() {
        let mut s = session(8, 8);
        let over = s.export("jpeg", Some(300)).unwrap().bytes();
        let max = s.export("jpeg", Some(100)).unwrap().bytes();
        let wrapped = s.export("jpeg", Some(44)).unwrap().bytes();

        assert_eq!(over, max);
        assert_ne!(over, wrapped);
    }

    #[test]
    fn test_histogram_follows_adjustments() {
        let mut s = session(2, 2);
        assert_eq!(s.histogram().red()[100], 4);

        s.update_adjustment("exposure", 1.0).unwrap();
        assert_eq!(s.histogram().red()[200], 4);
    }

    #[test]
    fn test_duration_from_ms() {
        assert_eq!(duration_from_ms(1500.0), Duration::from_millis(1500));
        assert_eq!(duration_from_ms(-3.0), Duration::ZERO);
        assert_eq!(duration_from_ms(f64::NAN), Duration::ZERO);
        assert_eq!(duration_from_ms(f64::INFINITY), Duration::ZERO);
    }
}
