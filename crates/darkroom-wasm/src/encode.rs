//! Image encoding WASM bindings.
//!
//! Low-level encoders for callers that hold raw RGBA data. Sessions export
//! through `JsEditorSession::export`, which also names the file.
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg, export_file_name } from '@darkroom/wasm';
//!
//! const jpeg = encode_jpeg(imageData.data, width, height, 90);
//! const name = export_file_name('beach.jpg', 'jpeg'); // beach_edited.jpeg
//! ```

use crate::types::js_error;
use darkroom_core::encode::{self, ExportFormat, ExportOptions};
use wasm_bindgen::prelude::*;

/// Quality from the page, clamped to 1-100 before it narrows to `u8`.
pub(crate) fn export_quality(quality: u32) -> u8 {
    quality.clamp(1, 100) as u8
}

/// Encode RGBA pixel data to JPEG bytes. Alpha is dropped; quality is
/// clamped to 1-100.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, export_quality(quality)).map_err(js_error)
}

/// Encode RGBA pixel data to PNG bytes.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(js_error)
}

/// Download name for an export: `<base>_edited.<ext>`.
///
/// `format` is `jpeg`, `jpg`, `png` or a matching MIME type.
#[wasm_bindgen]
pub fn export_file_name(source_name: &str, format: &str) -> Result<String, JsValue> {
    let format = format.parse::<ExportFormat>().map_err(js_error)?;
    Ok(encode::export_file_name(source_name, format))
}

/// Rough encoded size in bytes, shown in the export dialog.
#[wasm_bindgen]
pub fn estimate_export_size(width: u32, height: u32, format: &str, quality: u32) -> Result<f64, JsValue> {
    let format = format.parse::<ExportFormat>().map_err(js_error)?;
    let options = ExportOptions::new(format, export_quality(quality));
    Ok(encode::estimate_export_size(width, height, &options) as f64)
}

/// `512 B`, `1.5 KB`, `2.3 MB`.
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    encode::format_file_size(bytes.max(0.0) as u64)
}
