//! Editor tunables and their validation.

use serde::{Deserialize, Serialize};

/// Maximum number of adjustment snapshots kept in history.
pub const MAX_HISTORY: usize = 30;

/// Delay between a change and the recompute it triggers.
pub const RENDER_DEBOUNCE_MS: u64 = 16;

/// Export quality used when the caller does not choose one.
pub const DEFAULT_EXPORT_QUALITY: u8 = 90;

/// Tunables for an [`EditorSession`](crate::EditorSession).
///
/// Missing fields fall back to their defaults when deserialized, so a host
/// can override a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Upper bound on history length (including the initial snapshot)
    pub max_history: usize,
    /// Render debounce in milliseconds
    pub render_debounce_ms: u64,
    /// Smallest normalized crop width/height
    pub min_crop_size: f32,
    /// Margin of the default crop rectangle on each side
    pub default_crop_inset: f32,
    /// JPEG quality preselected in the export dialog
    pub default_export_quality: u8,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY,
            render_debounce_ms: RENDER_DEBOUNCE_MS,
            min_crop_size: crate::transform::MIN_CROP_SIZE,
            default_crop_inset: 0.1,
            default_export_quality: DEFAULT_EXPORT_QUALITY,
        }
    }
}

impl EditorConfig {
    /// Pull every value back into a usable range.
    pub fn sanitize(&mut self) {
        self.max_history = self.max_history.clamp(1, 1000);
        self.render_debounce_ms = self.render_debounce_ms.min(1000);
        self.min_crop_size = finite_or(self.min_crop_size, crate::transform::MIN_CROP_SIZE)
            .clamp(0.01, 0.5);
        // The default rect must stay at least min_crop_size wide.
        let max_inset = (1.0 - self.min_crop_size) / 2.0;
        self.default_crop_inset = finite_or(self.default_crop_inset, 0.1).clamp(0.0, max_inset);
        self.default_export_quality = self.default_export_quality.clamp(1, 100);
    }

    /// Sanitized copy.
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
