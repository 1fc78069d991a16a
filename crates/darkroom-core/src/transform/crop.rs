//! Crop rectangle geometry and pixel extraction.
//!
//! Crop rectangles use normalized coordinates (0.0 to 1.0) relative to the
//! image dimensions, so they survive a change of preview resolution.
//!
//! # Coordinate System
//!
//! - (0.0, 0.0) = top-left corner
//! - (1.0, 1.0) = bottom-right corner
//! - width/height are relative to the image dimensions
//!
//! Every mutation ends in [`CropRect::clamp_to_bounds`], so a rectangle
//! handed out by this module always satisfies `x, y >= 0`,
//! `x + width <= 1`, `y + height <= 1` and `width, height >= min_size`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::{PixelBuffer, BYTES_PER_PIXEL};

/// Smallest normalized width or height a crop may shrink to.
pub const MIN_CROP_SIZE: f32 = 0.05;

/// Margin of the default crop rectangle on each side.
pub const DEFAULT_CROP_INSET: f32 = 0.1;

/// A normalized crop window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for CropRect {
    /// The `{0.1, 0.1, 0.8, 0.8}` inset rectangle.
    fn default() -> Self {
        Self::inset(DEFAULT_CROP_INSET)
    }
}

impl CropRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Centered rectangle with `margin` on every side.
    pub fn inset(margin: f32) -> Self {
        let margin = if margin.is_finite() {
            margin.clamp(0.0, 0.5)
        } else {
            DEFAULT_CROP_INSET
        };
        Self::new(margin, margin, 1.0 - 2.0 * margin, 1.0 - 2.0 * margin)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle satisfies the bounds invariant, within `1e-5`.
    pub fn is_within_bounds(&self, min_size: f32) -> bool {
        const EPS: f32 = 1e-5;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= 1.0 + EPS
            && self.bottom() <= 1.0 + EPS
            && self.width >= min_size - EPS
            && self.height >= min_size - EPS
    }

    /// Force the rectangle inside the unit square.
    ///
    /// Size is first brought into `[min_size, 1]`, then the position is
    /// shifted so the far edges fit. Shifting happens before shrinking, so a
    /// rectangle that merely overhangs an edge keeps its size.
    pub fn clamp_to_bounds(self, min_size: f32) -> Self {
        let min_size = sanitize_min_size(min_size);

        let width = finite_or(self.width, 1.0).clamp(min_size, 1.0);
        let height = finite_or(self.height, 1.0).clamp(min_size, 1.0);
        let x = finite_or(self.x, 0.0).clamp(0.0, 1.0 - width);
        let y = finite_or(self.y, 0.0).clamp(0.0, 1.0 - height);

        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Snap the rectangle to `aspect`, keeping its center where possible.
    ///
    /// `image_aspect` is the image's pixel `width / height`; aspect ratios are
    /// on-screen ratios, so the normalized ratio is `ratio / image_aspect`.
    /// The width is kept and the height recomputed, unless the height would
    /// exceed 1, in which case the width shrinks instead.
    pub fn adjust_to_aspect(self, aspect: CropAspect, image_aspect: f32, min_size: f32) -> Self {
        let Some(ratio) = aspect.normalized_ratio(image_aspect) else {
            return self.clamp_to_bounds(min_size);
        };
        let min_size = sanitize_min_size(min_size);
        let (cx, cy) = self.center();

        let (width, height) = fit_ratio(
            finite_or(self.width, 1.0).clamp(min_size, 1.0),
            ratio,
            1.0,
            min_size,
        );

        Self::new(cx - width / 2.0, cy - height / 2.0, width, height).clamp_to_bounds(min_size)
    }

    /// Integer pixel window for an image of `width` x `height`.
    ///
    /// Edges are rounded, then the window is clamped so it lies fully inside
    /// the image and covers at least one pixel.
    pub fn to_pixel_region(&self, width: u32, height: u32) -> PixelRegion {
        let src_w = width as f32;
        let src_h = height as f32;

        let px_left = (finite_or(self.x, 0.0).clamp(0.0, 1.0) * src_w).round() as u32;
        let px_top = (finite_or(self.y, 0.0).clamp(0.0, 1.0) * src_h).round() as u32;
        let px_width = (finite_or(self.width, 1.0).clamp(0.0, 1.0) * src_w).round() as u32;
        let px_height = (finite_or(self.height, 1.0).clamp(0.0, 1.0) * src_h).round() as u32;

        // Clamp to image bounds
        let px_left = px_left.min(width.saturating_sub(1));
        let px_top = px_top.min(height.saturating_sub(1));
        let px_right = px_left.saturating_add(px_width).min(width);
        let px_bottom = px_top.saturating_add(px_height).min(height);

        PixelRegion {
            x: px_left,
            y: px_top,
            width: px_right.saturating_sub(px_left).max(1),
            height: px_bottom.saturating_sub(px_top).max(1),
        }
    }
}

/// A crop window in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Locked width:height ratio for the crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropAspect {
    #[default]
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "4:5")]
    Portrait,
}

impl CropAspect {
    pub const ALL: [CropAspect; 5] = [
        CropAspect::Free,
        CropAspect::Wide,
        CropAspect::Square,
        CropAspect::Standard,
        CropAspect::Portrait,
    ];

    /// On-screen width / height, or `None` when unconstrained.
    pub fn ratio(self) -> Option<f32> {
        match self {
            CropAspect::Free => None,
            CropAspect::Wide => Some(16.0 / 9.0),
            CropAspect::Square => Some(1.0),
            CropAspect::Standard => Some(4.0 / 3.0),
            CropAspect::Portrait => Some(4.0 / 5.0),
        }
    }

    /// Ratio expressed in normalized coordinates of an image whose pixel
    /// aspect is `image_aspect`. Invalid image aspects count as square.
    pub fn normalized_ratio(self, image_aspect: f32) -> Option<f32> {
        let image_aspect = if image_aspect.is_finite() && image_aspect > 0.0 {
            image_aspect
        } else {
            1.0
        };
        self.ratio().map(|ratio| ratio / image_aspect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CropAspect::Free => "free",
            CropAspect::Wide => "16:9",
            CropAspect::Square => "1:1",
            CropAspect::Standard => "4:3",
            CropAspect::Portrait => "4:5",
        }
    }
}

impl fmt::Display for CropAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown crop aspect: {0}")]
pub struct UnknownAspect(pub String);

impl FromStr for CropAspect {
    type Err = UnknownAspect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CropAspect::ALL
            .into_iter()
            .find(|aspect| aspect.as_str() == s)
            .ok_or_else(|| UnknownAspect(s.to_string()))
    }
}

/// The part of the crop overlay being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropHandle {
    Move,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CropHandle {
    /// For corner handles, whether the left and top edges move.
    fn moving_edges(self) -> Option<(bool, bool)> {
        match self {
            CropHandle::Move => None,
            CropHandle::TopLeft => Some((true, true)),
            CropHandle::TopRight => Some((false, true)),
            CropHandle::BottomLeft => Some((true, false)),
            CropHandle::BottomRight => Some((false, false)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CropHandle::Move => "move",
            CropHandle::TopLeft => "top-left",
            CropHandle::TopRight => "top-right",
            CropHandle::BottomLeft => "bottom-left",
            CropHandle::BottomRight => "bottom-right",
        }
    }
}

/// Returned when parsing an unknown handle name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown crop handle: {0}")]
pub struct UnknownHandle(pub String);

impl FromStr for CropHandle {
    type Err = UnknownHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            CropHandle::Move,
            CropHandle::TopLeft,
            CropHandle::TopRight,
            CropHandle::BottomLeft,
            CropHandle::BottomRight,
        ]
        .into_iter()
        .find(|handle| handle.as_str() == s)
        .ok_or_else(|| UnknownHandle(s.to_string()))
    }
}

/// Apply one pointer-move step of a crop drag.
///
/// `dx`/`dy` are normalized deltas since the previous step. `Move` translates
/// the window and keeps its size. Corner handles resize with the opposite
/// corner anchored; when `aspect` is locked the width drives the height.
pub fn drag_crop(
    rect: CropRect,
    handle: CropHandle,
    dx: f32,
    dy: f32,
    aspect: CropAspect,
    image_aspect: f32,
    min_size: f32,
) -> CropRect {
    let min_size = sanitize_min_size(min_size);
    let rect = rect.clamp_to_bounds(min_size);
    let dx = finite_or(dx, 0.0);
    let dy = finite_or(dy, 0.0);

    let Some((moves_left, moves_top)) = handle.moving_edges() else {
        return CropRect::new(rect.x + dx, rect.y + dy, rect.width, rect.height)
            .clamp_to_bounds(min_size);
    };

    let anchor_x = if moves_left { rect.right() } else { rect.x };
    let anchor_y = if moves_top { rect.bottom() } else { rect.y };
    let max_width = (if moves_left { anchor_x } else { 1.0 - anchor_x }).max(min_size);
    let max_height = (if moves_top { anchor_y } else { 1.0 - anchor_y }).max(min_size);

    let width = if moves_left { rect.width - dx } else { rect.width + dx };
    let height = if moves_top { rect.height - dy } else { rect.height + dy };
    let mut width = width.clamp(min_size, max_width);
    let mut height = height.clamp(min_size, max_height);

    if let Some(ratio) = aspect.normalized_ratio(image_aspect) {
        (width, height) = fit_ratio(width, ratio, max_height, min_size);
    }

    let x = if moves_left { anchor_x - width } else { anchor_x };
    let y = if moves_top { anchor_y - height } else { anchor_y };
    CropRect::new(x, y, width, height).clamp_to_bounds(min_size)
}

/// Copy the pixels under `rect` into a new buffer.
///
/// The result is at least 1x1. An empty source is returned unchanged.
pub fn extract_pixels(source: &PixelBuffer, rect: &CropRect) -> PixelBuffer {
    if source.is_empty() {
        return source.clone();
    }

    let region = rect.to_pixel_region(source.width, source.height);

    // Fast path: full crop returns a clone
    if region.x == 0
        && region.y == 0
        && region.width == source.width
        && region.height == source.height
    {
        return source.clone();
    }

    let src_stride = source.width as usize * BYTES_PER_PIXEL;
    let row_len = region.width as usize * BYTES_PER_PIXEL;
    let col_offset = region.x as usize * BYTES_PER_PIXEL;
    let mut output = Vec::with_capacity(row_len * region.height as usize);

    // Copy pixel data row by row
    for y in region.y..region.y + region.height {
        let start = y as usize * src_stride + col_offset;
        output.extend_from_slice(&source.pixels[start..start + row_len]);
    }

    PixelBuffer {
        width: region.width,
        height: region.height,
        pixels: output,
    }
}

/// Width/height pair with `width / height == ratio`, starting from `width`.
fn fit_ratio(width: f32, ratio: f32, max_height: f32, min_size: f32) -> (f32, f32) {
    let mut width = width;
    let mut height = width / ratio;
    if height > max_height {
        height = max_height;
        width = height * ratio;
    }
    if height < min_size {
        height = min_size;
        width = height * ratio;
    }
    if width < min_size {
        width = min_size;
        height = width / ratio;
    }
    (width, height)
}

fn sanitize_min_size(min_size: f32) -> f32 {
    finite_or(min_size, MIN_CROP_SIZE).clamp(0.0, 1.0)
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn rect_strategy() -> impl Strategy<Value = CropRect> {
        (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0)
            .prop_map(|(x, y, w, h)| CropRect::new(x, y, w, h).clamp_to_bounds(MIN_CROP_SIZE))
    }

    fn aspect_strategy() -> impl Strategy<Value = CropAspect> {
        prop::sample::select(CropAspect::ALL.to_vec())
    }

    fn handle_strategy() -> impl Strategy<Value = CropHandle> {
        prop::sample::select(vec![
            CropHandle::Move,
            CropHandle::TopLeft,
            CropHandle::TopRight,
            CropHandle::BottomLeft,
            CropHandle::BottomRight,
        ])
    }

    proptest! {
        /// Property: clamping any finite rectangle satisfies the invariant.
        #[test]
        fn prop_clamp_within_bounds(
            x in -2.0f32..=2.0,
            y in -2.0f32..=2.0,
            w in -2.0f32..=2.0,
            h in -2.0f32..=2.0,
        ) {
            let rect = CropRect::new(x, y, w, h).clamp_to_bounds(MIN_CROP_SIZE);
            prop_assert!(rect.is_within_bounds(MIN_CROP_SIZE), "{:?}", rect);
        }

        /// Property: snapping twice to the same aspect changes nothing.
        #[test]
        fn prop_aspect_idempotent(
            rect in rect_strategy(),
            aspect in aspect_strategy(),
            image_aspect in 0.5f32..=2.0,
        ) {
            let once = rect.adjust_to_aspect(aspect, image_aspect, MIN_CROP_SIZE);
            let twice = once.adjust_to_aspect(aspect, image_aspect, MIN_CROP_SIZE);
            prop_assert!((once.x - twice.x).abs() < 1e-4);
            prop_assert!((once.y - twice.y).abs() < 1e-4);
            prop_assert!((once.width - twice.width).abs() < 1e-4);
            prop_assert!((once.height - twice.height).abs() < 1e-4);
            prop_assert!(once.is_within_bounds(MIN_CROP_SIZE));
        }

        /// Property: any drag sequence keeps the rectangle inside the image.
        #[test]
        fn prop_drag_within_bounds(
            start in rect_strategy(),
            aspect in aspect_strategy(),
            steps in prop::collection::vec((handle_strategy(), -0.5f32..=0.5, -0.5f32..=0.5), 1..30),
        ) {
            let mut rect = start;
            for (handle, dx, dy) in steps {
                rect = drag_crop(rect, handle, dx, dy, aspect, 1.0, MIN_CROP_SIZE);
                prop_assert!(rect.is_within_bounds(MIN_CROP_SIZE), "{:?}", rect);
            }
        }

        /// Property: extraction stays inside the source.
        #[test]
        fn prop_extract_within_source(
            w in 1u32..=40,
            h in 1u32..=40,
            rect in rect_strategy(),
        ) {
            let source = PixelBuffer::filled(w, h, [1, 2, 3, 4]);
            let cropped = extract_pixels(&source, &rect);
            prop_assert!(cropped.width >= 1 && cropped.width <= w);
            prop_assert!(cropped.height >= 1 && cropped.height <= h);
            prop_assert_eq!(cropped.pixels.len(), (cropped.width * cropped.height * 4) as usize);
        }
    }
}
