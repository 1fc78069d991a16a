//! Image load boundary.
//!
//! This module provides functionality for:
//! - Rejecting files whose declared MIME type is not an image
//! - Decoding JPEG and PNG files to full-resolution RGBA buffers
//! - Applying EXIF orientation so pixels match what the user sees
//!
//! All operations are synchronous and single-threaded; a failed decode never
//! produces a partial image.

mod loader;
mod types;

pub use loader::{decode_image, is_image_mime_type, load_image};
pub use types::{
    DecodeError, ImageMetadata, LoadedImage, Orientation, PixelBuffer, BYTES_PER_PIXEL,
};
