//! WASM-compatible wrapper types for pixel data.
//!
//! This module provides JavaScript-friendly types that wrap the core Darkroom
//! types, handling the conversion between Rust and JavaScript representations.

use std::fmt::Display;

use darkroom_core::decode::{PixelBuffer, BYTES_PER_PIXEL};
use js_sys::Uint8ClampedArray;
use wasm_bindgen::prelude::*;

/// Turn any displayable error into a JS string value.
pub(crate) fn js_error<E: Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Byte length of a `width` x `height` RGBA buffer, or None if it overflows
/// `usize` (32 bits on wasm32).
fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// An RGBA image held in WASM memory.
///
/// # Memory Management
///
/// Pixel data stays in WASM memory. `pixels()` and `to_clamped_array()` copy
/// it into JavaScript memory; keep the buffer on the Rust side for as long as
/// further processing is needed.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    inner: PixelBuffer,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    /// Wrap RGBA bytes (4 bytes per pixel, row-major), e.g. from `ImageData.data`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsPixelBuffer, JsValue> {
        match rgba_len(width, height) {
            Some(expected) if pixels.len() == expected => {}
            Some(expected) => {
                return Err(js_error(format_args!(
                    "expected {expected} bytes for {width}x{height} RGBA, got {}",
                    pixels.len()
                )));
            }
            None => {
                return Err(js_error(format_args!(
                    "{width}x{height} RGBA does not fit in memory"
                )));
            }
        }
        Ok(Self::from_buffer(PixelBuffer::new(width, height, pixels)))
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// RGBA pixel data as a Uint8Array copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// RGBA pixel data ready for `new ImageData(array, width, height)`.
    pub fn to_clamped_array(&self) -> Uint8ClampedArray {
        Uint8ClampedArray::from(self.inner.pixels.as_slice())
    }
}

impl JsPixelBuffer {
    pub(crate) fn from_buffer(inner: PixelBuffer) -> Self {
        Self { inner }
    }

    pub(crate) fn buffer(&self) -> &PixelBuffer {
        &self.inner
    }
}
