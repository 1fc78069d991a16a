//! Darkroom WASM - WebAssembly bindings for Darkroom
//!
//! This crate exposes darkroom-core to JavaScript/TypeScript. The browser
//! side only hands over file bytes and timestamps, paints the frames it gets
//! back, and triggers downloads.
//!
//! # Module Structure
//!
//! - `session` - The editor session: adjustments, history, crop, render, export
//! - `adjustments` - Standalone adjustment values and transform
//! - `types` - WASM-compatible wrapper types for pixel data
//! - `histogram` - RGB and luma histograms
//! - `encode` - JPEG/PNG encoding and export naming
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditorSession } from '@darkroom/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = JsEditorSession.load(bytes, file.name, file.type, undefined);
//! session.update_adjustment('exposure', 0.5);
//! session.request_render(performance.now());
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod encode;
mod histogram;
mod session;
mod types;

// Re-export public types
pub use adjustments::{apply_adjustments, JsAdjustments};
pub use encode::{
    encode_jpeg, encode_png, estimate_export_size, export_file_name, format_file_size,
};
pub use histogram::{compute_histogram, JsHistogram};
pub use session::{JsEditorSession, JsExportedImage, JsFrame};
pub use types::JsPixelBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Initialize panic hook for better error messages
    console_error_panic_hook::set_once();

    // A second start on the same module keeps the first logger
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("darkroom-wasm {} ready", version());
    }
}

/// Change how much core logging reaches the console
/// (`error`, `warn`, `info`, `debug`, `trace` or `off`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level = level.parse::<log::LevelFilter>().map_err(types::js_error)?;
    log::set_max_level(level);
    Ok(())
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
