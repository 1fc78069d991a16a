//! Editor session: the state behind one loaded image.
//!
//! A session is created when an image loads and replaced wholesale by the
//! next load; nothing carries over. It owns the original pixels, the live
//! adjustments and their history, the crop window and the UI flags the
//! render and export drivers read.
//!
//! Every change that affects the rendered pixels bumps [`EditorSession::revision`]
//! and drops the cached processed buffer.

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjustments::apply_adjustments;
use crate::config::EditorConfig;
use crate::decode::{load_image, DecodeError, ImageMetadata, LoadedImage, PixelBuffer};
use crate::encode::{export_image, EncodeError, ExportFormat, ExportOptions, ExportedImage};
use crate::histogram::histogram_of;
use crate::history::History;
use crate::transform::{drag_crop, extract_pixels, CropAspect, CropHandle, CropRect};
use crate::{AdjustmentKey, Adjustments, Histogram};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Only one export or crop commit may run at a time
    #[error("cannot start {requested} while {pending} is in progress")]
    Busy {
        requested: OperationKind,
        pending: OperationKind,
    },
}

/// Operations that must not overlap on one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Export,
    CropCommit,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Export => f.write_str("export"),
            OperationKind::CropCommit => f.write_str("crop commit"),
        }
    }
}

/// How before/after comparison is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// Original on the left half, processed on the right
    #[default]
    Split,
    /// Original only
    Toggle,
    /// Both images at full width next to each other
    SideBySide,
}

impl ComparisonMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonMode::Split => "split",
            ComparisonMode::Toggle => "toggle",
            ComparisonMode::SideBySide => "side-by-side",
        }
    }
}

/// Returned when parsing an unknown comparison mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown comparison mode: {0}")]
pub struct UnknownComparisonMode(pub String);

impl FromStr for ComparisonMode {
    type Err = UnknownComparisonMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "split" => Ok(ComparisonMode::Split),
            "toggle" => Ok(ComparisonMode::Toggle),
            "side-by-side" => Ok(ComparisonMode::SideBySide),
            _ => Err(UnknownComparisonMode(s.to_string())),
        }
    }
}

/// Crop window and its aspect lock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropState {
    pub rect: CropRect,
    pub aspect: CropAspect,
}

impl CropState {
    fn initial(config: &EditorConfig) -> Self {
        Self {
            rect: CropRect::inset(config.default_crop_inset),
            aspect: CropAspect::Free,
        }
    }
}

/// State of one open image.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    metadata: ImageMetadata,
    original: PixelBuffer,
    adjustments: Adjustments,
    history: History,
    crop: CropState,
    processing: bool,
    comparison: bool,
    comparison_mode: ComparisonMode,
    export_dialog_open: bool,
    in_flight: Option<OperationKind>,
    revision: u64,
    processed: Option<PixelBuffer>,
}

impl EditorSession {
    /// Start a session on an already decoded image.
    pub fn new(image: LoadedImage, config: EditorConfig) -> Self {
        let config = config.sanitized();
        let meta = &image.metadata;
        info!(
            "loaded {} ({}x{}, {} bytes)",
            meta.file_name, meta.width, meta.height, meta.file_size
        );

        Self {
            history: History::with_capacity(config.max_history),
            crop: CropState::initial(&config),
            config,
            metadata: image.metadata,
            original: image.pixels,
            adjustments: Adjustments::default(),
            processing: false,
            comparison: false,
            comparison_mode: ComparisonMode::default(),
            export_dialog_open: false,
            in_flight: None,
            revision: 0,
            processed: None,
        }
    }

    /// Decode a user file and start a session on it.
    ///
    /// On failure no session exists; callers keep whatever they had.
    pub fn load(
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
        config: EditorConfig,
    ) -> Result<Self, SessionError> {
        let image = load_image(bytes, file_name, mime_type)
            .inspect_err(|e| warn!("failed to load {file_name}: {e}"))?;
        Ok(Self::new(image, config))
    }

    // ===== Accessors =====

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    /// The unadjusted pixels (after any committed crop).
    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn crop(&self) -> CropState {
        self.crop
    }

    pub fn crop_rect(&self) -> CropRect {
        self.crop.rect
    }

    pub fn crop_aspect(&self) -> CropAspect {
        self.crop.aspect
    }

    /// Counter bumped whenever the displayed frame goes stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    pub fn comparison(&self) -> bool {
        self.comparison
    }

    pub fn comparison_mode(&self) -> ComparisonMode {
        self.comparison_mode
    }

    pub fn export_dialog_open(&self) -> bool {
        self.export_dialog_open
    }

    pub fn in_flight(&self) -> Option<OperationKind> {
        self.in_flight
    }

    /// Pixel width / height of the current original.
    pub fn image_aspect(&self) -> f32 {
        self.metadata.aspect_ratio()
    }

    // ===== Adjustments and history =====

    /// Set one control (clamped to its range) and record the result.
    pub fn update_adjustment(&mut self, key: AdjustmentKey, value: f32) {
        self.adjustments.set(key, value);
        self.history.push(self.adjustments);
        debug!(
            "{key} = {} (history {}/{})",
            self.adjustments.get(key),
            self.history.index() + 1,
            self.history.len()
        );
        self.invalidate();
    }

    /// Put one control back to its neutral value, as a recorded edit.
    pub fn reset_adjustment(&mut self, key: AdjustmentKey) {
        self.update_adjustment(key, key.default_value());
    }

    /// Neutral adjustments and a fresh history. Image and crop are kept.
    pub fn reset_all_adjustments(&mut self) {
        self.adjustments = Adjustments::default();
        self.history.reset();
        self.invalidate();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(adjustments) => {
                self.adjustments = adjustments;
                self.invalidate();
                true
            }
            None => false,
        }
    }

    /// Step forward one edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(adjustments) => {
                self.adjustments = adjustments;
                self.invalidate();
                true
            }
            None => false,
        }
    }

    // ===== Crop =====

    /// Replace the crop window; it is snapped to the aspect lock and clamped.
    pub fn set_crop_rect(&mut self, rect: CropRect) {
        self.crop.rect =
            rect.adjust_to_aspect(self.crop.aspect, self.image_aspect(), self.config.min_crop_size);
    }

    /// Change the aspect lock and snap the current window to it.
    pub fn set_crop_aspect(&mut self, aspect: CropAspect) {
        self.crop.aspect = aspect;
        self.set_crop_rect(self.crop.rect);
    }

    /// One pointer-move step of a crop drag, in normalized deltas.
    pub fn drag_crop(&mut self, handle: CropHandle, dx: f32, dy: f32) {
        self.crop.rect = drag_crop(
            self.crop.rect,
            handle,
            dx,
            dy,
            self.crop.aspect,
            self.image_aspect(),
            self.config.min_crop_size,
        );
    }

    /// Default window, no aspect lock.
    pub fn reset_crop(&mut self) {
        self.crop = CropState::initial(&self.config);
    }

    /// Commit the crop window: the original buffer is replaced by the
    /// cropped pixels and the window resets. Adjustments and history stay.
    pub fn apply_crop(&mut self) -> Result<(), SessionError> {
        self.try_begin(OperationKind::CropCommit)?;

        let rect = self.crop.rect;
        let cropped = extract_pixels(&self.original, &rect);
        info!(
            "cropped {}x{} -> {}x{}",
            self.original.width, self.original.height, cropped.width, cropped.height
        );

        self.metadata.width = cropped.width;
        self.metadata.height = cropped.height;
        self.original = cropped;
        self.reset_crop();
        self.invalidate();

        self.finish(OperationKind::CropCommit);
        Ok(())
    }

    // ===== In-flight guard =====

    /// Claim the session for an export or crop commit.
    pub fn try_begin(&mut self, kind: OperationKind) -> Result<(), SessionError> {
        if let Some(pending) = self.in_flight {
            warn!("rejected {kind}: {pending} in progress");
            return Err(SessionError::Busy {
                requested: kind,
                pending,
            });
        }
        self.in_flight = Some(kind);
        Ok(())
    }

    /// Release a claim taken with [`try_begin`](Self::try_begin). Releasing
    /// a different kind than the pending one does nothing.
    pub fn finish(&mut self, kind: OperationKind) {
        if self.in_flight == Some(kind) {
            self.in_flight = None;
        }
    }

    // ===== Comparison =====

    pub fn set_comparison(&mut self, enabled: bool) {
        if self.comparison != enabled {
            self.comparison = enabled;
            self.touch();
        }
    }

    pub fn toggle_comparison(&mut self) {
        self.set_comparison(!self.comparison);
    }

    pub fn set_comparison_mode(&mut self, mode: ComparisonMode) {
        if self.comparison_mode != mode {
            self.comparison_mode = mode;
            if self.comparison {
                self.touch();
            }
        }
    }

    // ===== Rendering and export =====

    /// Adjusted pixels, computed on first use after each change.
    pub fn processed(&mut self) -> &PixelBuffer {
        self.processed
            .get_or_insert_with(|| apply_adjustments(&self.original, &self.adjustments))
    }

    /// Original and adjusted pixels together, for before/after frames.
    pub fn original_and_processed(&mut self) -> (&PixelBuffer, &PixelBuffer) {
        let processed = self
            .processed
            .get_or_insert_with(|| apply_adjustments(&self.original, &self.adjustments));
        (&self.original, processed)
    }

    /// Histogram of the adjusted pixels.
    pub fn histogram(&mut self) -> Histogram {
        histogram_of(self.processed())
    }

    pub fn open_export_dialog(&mut self) {
        self.export_dialog_open = true;
    }

    pub fn close_export_dialog(&mut self) {
        self.export_dialog_open = false;
    }

    /// Export options preselected in the dialog.
    pub fn default_export_options(&self, format: ExportFormat) -> ExportOptions {
        ExportOptions::new(format, self.config.default_export_quality)
    }

    /// Encode the adjusted image.
    ///
    /// The export dialog closes on success and stays open on failure so the
    /// user can retry.
    pub fn export(&mut self, options: ExportOptions) -> Result<ExportedImage, SessionError> {
        self.try_begin(OperationKind::Export)?;

        let source_name = self.metadata.file_name.clone();
        let result = export_image(self.processed(), &options, &source_name);
        self.finish(OperationKind::Export);

        let exported = result?;
        self.export_dialog_open = false;
        Ok(exported)
    }

    /// The rendered pixels changed.
    fn invalidate(&mut self) {
        self.processed = None;
        self.touch();
    }

    /// Only the presentation changed.
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
