//! Darkroom Core - Photo editing engine
//!
//! This crate provides the core of the Darkroom photo editor: the per-pixel
//! color/tone transform, crop geometry, the bounded undo/redo history and the
//! editor session that ties them to a loaded image, a render scheduler and
//! the export encoders.

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod encode;
pub mod histogram;
pub mod history;
pub mod luminance;
pub mod render;
pub mod session;
pub mod transform;

use std::fmt;
use std::str::FromStr;

pub use adjustments::{apply_adjustments, apply_all_adjustments};
pub use config::EditorConfig;
pub use decode::{ImageMetadata, PixelBuffer};
pub use history::History;
pub use session::{EditorSession, SessionError};
pub use transform::{CropAspect, CropHandle, CropRect};

/// The tonal and color controls applied to an image.
///
/// Every field defaults to 0, and 0 is a strict no-op for that control.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Adjustments {
    /// Exposure in stops (-2 to 2)
    pub exposure: f32,
    /// Contrast (-100 to 100)
    pub contrast: f32,
    /// Highlights (-100 to 100)
    pub highlights: f32,
    /// Shadows (-100 to 100)
    pub shadows: f32,
    /// Whites (-100 to 100)
    pub whites: f32,
    /// Blacks (-100 to 100)
    pub blacks: f32,
    /// White balance temperature, blue to orange (-100 to 100)
    pub temperature: f32,
    /// White balance tint, green to magenta (-100 to 100)
    pub tint: f32,
    /// Saturation (-100 to 100)
    pub saturation: f32,
    /// Vibrance (-100 to 100)
    pub vibrance: f32,
    /// Sharpness (0 to 100). Stored only, not rendered.
    pub sharpness: f32,
    /// Clarity (0 to 100). Stored only, not rendered.
    pub clarity: f32,
}

impl Adjustments {
    /// Create a new Adjustments with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Read a single control.
    pub fn get(&self, key: AdjustmentKey) -> f32 {
        match key {
            AdjustmentKey::Exposure => self.exposure,
            AdjustmentKey::Contrast => self.contrast,
            AdjustmentKey::Highlights => self.highlights,
            AdjustmentKey::Shadows => self.shadows,
            AdjustmentKey::Whites => self.whites,
            AdjustmentKey::Blacks => self.blacks,
            AdjustmentKey::Temperature => self.temperature,
            AdjustmentKey::Tint => self.tint,
            AdjustmentKey::Saturation => self.saturation,
            AdjustmentKey::Vibrance => self.vibrance,
            AdjustmentKey::Sharpness => self.sharpness,
            AdjustmentKey::Clarity => self.clarity,
        }
    }

    /// Write a single control, clamped to its range.
    pub fn set(&mut self, key: AdjustmentKey, value: f32) {
        let value = key.clamp(value);
        let slot = match key {
            AdjustmentKey::Exposure => &mut self.exposure,
            AdjustmentKey::Contrast => &mut self.contrast,
            AdjustmentKey::Highlights => &mut self.highlights,
            AdjustmentKey::Shadows => &mut self.shadows,
            AdjustmentKey::Whites => &mut self.whites,
            AdjustmentKey::Blacks => &mut self.blacks,
            AdjustmentKey::Temperature => &mut self.temperature,
            AdjustmentKey::Tint => &mut self.tint,
            AdjustmentKey::Saturation => &mut self.saturation,
            AdjustmentKey::Vibrance => &mut self.vibrance,
            AdjustmentKey::Sharpness => &mut self.sharpness,
            AdjustmentKey::Clarity => &mut self.clarity,
        };
        *slot = value;
    }

    /// Copy of `self` with one control replaced.
    pub fn with(mut self, key: AdjustmentKey, value: f32) -> Self {
        self.set(key, value);
        self
    }

    /// Clamp every control into its range.
    pub fn clamped(mut self) -> Self {
        for key in AdjustmentKey::ALL {
            self.set(key, self.get(key));
        }
        self
    }
}

/// Names one control of [`Adjustments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentKey {
    Exposure,
    Contrast,
    Highlights,
    Shadows,
    Whites,
    Blacks,
    Temperature,
    Tint,
    Saturation,
    Vibrance,
    Sharpness,
    Clarity,
}

impl AdjustmentKey {
    pub const ALL: [AdjustmentKey; 12] = [
        AdjustmentKey::Exposure,
        AdjustmentKey::Contrast,
        AdjustmentKey::Highlights,
        AdjustmentKey::Shadows,
        AdjustmentKey::Whites,
        AdjustmentKey::Blacks,
        AdjustmentKey::Temperature,
        AdjustmentKey::Tint,
        AdjustmentKey::Saturation,
        AdjustmentKey::Vibrance,
        AdjustmentKey::Sharpness,
        AdjustmentKey::Clarity,
    ];

    /// The camelCase field name used by the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentKey::Exposure => "exposure",
            AdjustmentKey::Contrast => "contrast",
            AdjustmentKey::Highlights => "highlights",
            AdjustmentKey::Shadows => "shadows",
            AdjustmentKey::Whites => "whites",
            AdjustmentKey::Blacks => "blacks",
            AdjustmentKey::Temperature => "temperature",
            AdjustmentKey::Tint => "tint",
            AdjustmentKey::Saturation => "saturation",
            AdjustmentKey::Vibrance => "vibrance",
            AdjustmentKey::Sharpness => "sharpness",
            AdjustmentKey::Clarity => "clarity",
        }
    }

    /// Slider range `(min, max)` for this control.
    pub fn range(self) -> (f32, f32) {
        match self {
            AdjustmentKey::Exposure => (-2.0, 2.0),
            AdjustmentKey::Sharpness | AdjustmentKey::Clarity => (0.0, 100.0),
            _ => (-100.0, 100.0),
        }
    }

    /// Value that leaves the image untouched.
    pub fn default_value(self) -> f32 {
        0.0
    }

    /// Clamp a manually entered value into range. NaN maps to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

impl fmt::Display for AdjustmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown control name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown adjustment: {0}")]
pub struct UnknownAdjustment(pub String);

impl FromStr for AdjustmentKey {
    type Err = UnknownAdjustment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdjustmentKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownAdjustment(s.to_string()))
    }
}

/// Histogram data for an image
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Red channel histogram (256 bins)
    pub red: [u32; 256],
    /// Green channel histogram (256 bins)
    pub green: [u32; 256],
    /// Blue channel histogram (256 bins)
    pub blue: [u32; 256],
    /// Luma histogram (256 bins)
    pub luminance: [u32; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            red: [0; 256],
            green: [0; 256],
            blue: [0; 256],
            luminance: [0; 256],
        }
    }
}

impl Histogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the maximum value across the RGB channels for normalization
    pub fn max_value(&self) -> u32 {
        let max_r = *self.red.iter().max().unwrap_or(&0);
        let max_g = *self.green.iter().max().unwrap_or(&0);
        let max_b = *self.blue.iter().max().unwrap_or(&0);
        max_r.max(max_g).max(max_b)
    }

    /// Check for highlight clipping (values at 255)
    pub fn has_highlight_clipping(&self) -> bool {
        self.red[255] > 0 || self.green[255] > 0 || self.blue[255] > 0
    }

    /// Check for shadow clipping (values at 0)
    pub fn has_shadow_clipping(&self) -> bool {
        self.red[0] > 0 || self.green[0] > 0 || self.blue[0] > 0
    }
}
