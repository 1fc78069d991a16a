//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per pixel in every buffer handled by the editor (RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;

/// Error types for image loading.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The declared MIME type is not an image type.
    #[error("Unsupported file type: {0}")]
    UnsupportedMimeType(String),

    /// The file contained no bytes.
    #[error("Empty image file")]
    Empty,

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Metadata about the file a session was loaded from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Original file name, including extension.
    pub file_name: String,
    /// MIME type declared by the browser for the file.
    pub mime_type: String,
    /// Size of the encoded file in bytes.
    pub file_size: u64,
    /// Current pixel width (after orientation and any committed crop).
    pub width: u32,
    /// Current pixel height (after orientation and any committed crop).
    pub height: u32,
    /// EXIF orientation that was applied while decoding.
    pub orientation: Orientation,
}

impl ImageMetadata {
    /// Pixel width / height, or 1.0 for a degenerate image. Crop aspect
    /// locks are converted to normalized space with this.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// A grid of RGBA pixels, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order.
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// RGBA value at (x, y), or None when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.pixels.get(idx..idx + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// One row of RGBA bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// A freshly decoded file: its metadata plus the full-resolution pixels.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub metadata: ImageMetadata,
    pub pixels: PixelBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_pixel_buffer_creation() {
        let buf = PixelBuffer::new(100, 50, vec![0u8; 100 * 50 * 4]);

        assert_eq!(buf.width, 100);
        assert_eq!(buf.height, 50);
        assert_eq!(buf.byte_size(), 20000);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_pixel_buffer_empty() {
        let buf = PixelBuffer::new(0, 0, vec![]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let buf = PixelBuffer::filled(3, 2, [10, 20, 30, 255]);
        assert_eq!(buf.byte_size(), 24);
        assert_eq!(buf.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(buf.pixel(3, 0), None);
        assert_eq!(buf.row(1).len(), 12);
    }

    #[test]
    fn test_from_rgba_image() {
        let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 4]));
        assert_eq!(PixelBuffer::from_rgba_image(img), PixelBuffer::filled(4, 3, [1, 2, 3, 4]));
    }

    #[test]
    fn test_metadata_aspect_ratio() {
        let meta = ImageMetadata {
            width: 1600,
            height: 900,
            ..Default::default()
        };
        assert!((meta.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(ImageMetadata::default().aspect_ratio(), 1.0);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnsupportedMimeType("text/plain".to_string());
        assert_eq!(err.to_string(), "Unsupported file type: text/plain");

        let err = DecodeError::InvalidFormat;
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}
