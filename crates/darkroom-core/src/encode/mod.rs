//! Export boundary.
//!
//! This module provides functionality for:
//! - Encoding RGBA buffers to JPEG with configurable quality
//! - Encoding RGBA buffers to lossless PNG
//! - Naming the exported file and estimating its size for the export dialog
//!
//! All operations are synchronous and single-threaded.

mod export;
mod jpeg;
mod png;
mod types;

pub use export::{estimate_export_size, export_file_name, export_image, format_file_size};
pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use types::{EncodeError, ExportFormat, ExportOptions, ExportedImage};
