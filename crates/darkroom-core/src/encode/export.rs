//! Export driver: turns a rendered buffer into a named, downloadable file.

use log::{info, warn};

use super::jpeg::encode_jpeg;
use super::png::encode_png;
use super::types::{EncodeError, ExportFormat, ExportOptions, ExportedImage};
use crate::decode::PixelBuffer;

/// Encode `buffer` according to `options`.
///
/// `source_name` is the name of the file the session was loaded from; the
/// result is named `<base>_edited.<ext>`.
pub fn export_image(
    buffer: &PixelBuffer,
    options: &ExportOptions,
    source_name: &str,
) -> Result<ExportedImage, EncodeError> {
    let bytes = match options.format {
        ExportFormat::Jpeg => encode_jpeg(
            &buffer.pixels,
            buffer.width,
            buffer.height,
            options.clamped_quality(),
        ),
        ExportFormat::Png => encode_png(&buffer.pixels, buffer.width, buffer.height),
    }
    .inspect_err(|e| warn!("export of {source_name} failed: {e}"))?;

    let file_name = export_file_name(source_name, options.format);
    info!(
        "exported {file_name} ({}x{}, {})",
        buffer.width,
        buffer.height,
        format_file_size(bytes.len() as u64)
    );

    Ok(ExportedImage {
        bytes,
        mime_type: options.format.mime_type(),
        file_name,
    })
}

/// `<base>_edited.<ext>`, where `<base>` is `source_name` minus its last
/// extension.
///
/// ```text
/// photo.final.jpg + Png -> photo.final_edited.png
/// scan            + Jpeg -> scan_edited.jpeg
/// ```
pub fn export_file_name(source_name: &str, format: ExportFormat) -> String {
    let base = match source_name.rfind('.') {
        Some(dot) if !source_name[dot + 1..].is_empty() && !source_name[dot + 1..].contains('/') => {
            &source_name[..dot]
        }
        _ => source_name,
    };
    format!("{base}_edited.{}", format.extension())
}

/// Rough size of the encoded file in bytes, for the export dialog.
///
/// PNG is estimated at 3 bytes per pixel; JPEG at a tenth of that scaled by
/// quality.
pub fn estimate_export_size(width: u32, height: u32, options: &ExportOptions) -> u64 {
    let raw = width as f64 * height as f64 * 3.0;
    let estimate = match options.format {
        ExportFormat::Png => raw,
        ExportFormat::Jpeg => raw * (options.clamped_quality() as f64 / 100.0) * 0.1,
    };
    estimate.round() as u64
}

/// Human readable size with one decimal: `512 B`, `1.5 KB`, `2.3 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / MB)
    }
}
