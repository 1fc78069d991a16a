//! Shared types for the export encoders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_EXPORT_QUALITY;
use crate::decode::BYTES_PER_PIXEL;

/// Errors that can occur while encoding an export.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: ExportFormat,
        message: String,
    },

    /// The encoder finished without producing any bytes
    #[error("{0} encoder produced no output")]
    EmptyOutput(ExportFormat),

    /// Format name not recognized
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

/// Check that `pixels` holds exactly `width * height` RGBA pixels.
pub(crate) fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Output container of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Png => "png",
        }
    }

    /// Whether the quality setting has any effect.
    pub fn is_lossy(self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Jpeg => f.write_str("JPEG"),
            ExportFormat::Png => f.write_str("PNG"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = EncodeError;

    /// Accepts `jpeg`, `jpg`, `png` or the matching MIME types, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Ok(ExportFormat::Jpeg),
            "png" | "image/png" => Ok(ExportFormat::Png),
            _ => Err(EncodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// What the export dialog submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// JPEG quality, 1-100. Ignored for PNG.
    pub quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: DEFAULT_EXPORT_QUALITY,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat, quality: u8) -> Self {
        Self { format, quality }
    }

    pub fn png() -> Self {
        Self::new(ExportFormat::Png, DEFAULT_EXPORT_QUALITY)
    }

    pub fn jpeg(quality: u8) -> Self {
        Self::new(ExportFormat::Jpeg, quality)
    }

    /// Quality pulled into 1-100.
    pub fn clamped_quality(&self) -> u8 {
        self.quality.clamp(1, 100)
    }
}

/// An encoded file ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}
