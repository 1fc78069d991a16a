//! Crop geometry.
//!
//! Cropping is a destructive commit: the session replaces its original
//! buffer with [`extract_pixels`] output and resets the crop window. Until
//! then the window is pure geometry, updated on every pointer move.
//!
//! # Coordinate System
//!
//! - Crop coordinates are normalized (0.0 to 1.0) relative to image dimensions
//! - Origin is top-left corner

mod crop;

pub use crop::{
    drag_crop, extract_pixels, CropAspect, CropHandle, CropRect, PixelRegion, UnknownAspect,
    UnknownHandle, DEFAULT_CROP_INSET, MIN_CROP_SIZE,
};
