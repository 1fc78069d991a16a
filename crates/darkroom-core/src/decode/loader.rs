//! Image decoding with MIME gating and EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, ImageMetadata, LoadedImage, Orientation, PixelBuffer};

/// Decode an image file from bytes to RGBA pixels, applying EXIF orientation.
///
/// The container format is sniffed from the bytes; `mime_type` only gates
/// whether the file is treated as an image at all.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedMimeType` if `mime_type` is not `image/*`.
/// Returns `DecodeError::Empty` for zero-length input.
/// Returns `DecodeError::CorruptedFile` if the bytes cannot be decoded.
pub fn decode_image(bytes: &[u8], mime_type: &str) -> Result<PixelBuffer, DecodeError> {
    let (pixels, _) = decode_with_orientation(bytes, mime_type)?;
    Ok(pixels)
}

/// Decode a user-supplied file and collect the metadata the editor shows.
pub fn load_image(
    bytes: &[u8],
    file_name: &str,
    mime_type: &str,
) -> Result<LoadedImage, DecodeError> {
    let (pixels, orientation) = decode_with_orientation(bytes, mime_type)?;

    log::debug!(
        "Decoded {} ({} bytes) to {}x{}",
        file_name,
        bytes.len(),
        pixels.width,
        pixels.height
    );

    Ok(LoadedImage {
        metadata: ImageMetadata {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            file_size: bytes.len() as u64,
            width: pixels.width,
            height: pixels.height,
            orientation,
        },
        pixels,
    })
}

/// Returns true if the declared MIME type names an image.
pub fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

fn decode_with_orientation(
    bytes: &[u8],
    mime_type: &str,
) -> Result<(PixelBuffer, Orientation), DecodeError> {
    if !is_image_mime_type(mime_type) {
        return Err(DecodeError::UnsupportedMimeType(mime_type.to_string()));
    }
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgba = apply_orientation(img, orientation).into_rgba8();
    let pixels = PixelBuffer::from_rgba_image(rgba);
    if pixels.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    Ok((pixels, orientation))
}

/// Extract EXIF orientation from the file bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 100, 200])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_valid_png() {
        let bytes = png_bytes(8, 4);
        let result = decode_image(&bytes, "image/png");
        assert!(result.is_ok(), "Failed to decode valid PNG: {:?}", result);

        let buf = result.unwrap();
        assert_eq!(buf.width, 8);
        assert_eq!(buf.height, 4);
        assert_eq!(buf.pixels.len(), 8 * 4 * 4);
        assert_eq!(buf.pixel(3, 2), Some([30, 20, 100, 200]));
    }

    #[test]
    fn test_format_is_sniffed_not_trusted() {
        // PNG bytes declared as JPEG still decode
        let bytes = png_bytes(2, 2);
        assert!(decode_image(&bytes, "image/jpeg").is_ok());
    }

    #[test]
    fn test_rejects_non_image_mime_type() {
        let bytes = png_bytes(2, 2);
        let result = decode_image(&bytes, "application/pdf");
        assert!(matches!(result, Err(DecodeError::UnsupportedMimeType(_))));
    }

    #[test]
    fn test_rejects_empty_bytes() {
        let result = decode_image(&[], "image/png");
        assert!(matches!(result, Err(DecodeError::Empty)));
    }

    #[test]
    fn test_rejects_garbage() {
        let garbage = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05];
        assert!(decode_image(&garbage, "image/png").is_err());
    }

    #[test]
    fn test_rejects_truncated_png() {
        let bytes = png_bytes(16, 16);
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode_image(truncated, "image/png").is_err());
    }

    #[test]
    fn test_load_image_metadata() {
        let bytes = png_bytes(5, 3);
        let loaded = load_image(&bytes, "holiday.png", "image/png").unwrap();

        assert_eq!(loaded.metadata.file_name, "holiday.png");
        assert_eq!(loaded.metadata.mime_type, "image/png");
        assert_eq!(loaded.metadata.file_size, bytes.len() as u64);
        assert_eq!(loaded.metadata.width, 5);
        assert_eq!(loaded.metadata.height, 3);
        assert_eq!(loaded.metadata.orientation, Orientation::Normal);
    }

    #[test]
    fn test_is_image_mime_type() {
        assert!(is_image_mime_type("image/jpeg"));
        assert!(is_image_mime_type("IMAGE/PNG"));
        assert!(!is_image_mime_type("text/html"));
        assert!(!is_image_mime_type(""));
    }

    #[test]
    fn test_apply_orientation_swaps_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 2));
        let rotated = apply_orientation(img, Orientation::Rotate90CW);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
    }
}
