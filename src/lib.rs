//! Face-aware photo filtering: whole-frame filters, brightness adjustment,
//! and face-anchored overlays (eyewear graphics or glyph strings).
//!
//! The pipeline runs detection → filter → brightness → overlay composition
//! over a single exclusively-owned RGB buffer. All stages are pure functions
//! of their inputs, so independent images can be processed concurrently.
//!
//! # Example
//!
//! ```no_run
//! use facefilter::{FaceFilter, FilterKind};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let result = FaceFilter::new()
//!     .filter(FilterKind::Cartoon)
//!     .intensity(7)
//!     .brightness(20)
//!     .process_bytes(&bytes)
//!     .unwrap();
//! println!("processed {}x{}", result.image.width(), result.image.height());
//! ```
#![warn(missing_docs)]

use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

mod brightness;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
mod filters;
mod overlay;
mod pipeline;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;

/// Error type returned by facefilter operations.
pub use error::FaceFilterError;
/// Face detection trait and face bounding-box type.
pub use face_detector::{FaceBox, FaceDetector};
/// Face-anchored overlay content.
pub use overlay::OverlayAsset;
#[cfg(feature = "rustface")]
/// Built-in detector backed by a caller-supplied SeetaFace model.
pub use rustface_backend::RustfaceDetector;

/// The whole-frame filter to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterKind {
    /// Identity: the buffer passes through unchanged.
    #[default]
    NoFilter,
    /// Luminance projection, re-expanded to three channels.
    Grayscale,
    /// Edge-masked bilateral smoothing for a posterized look.
    Cartoon,
    /// Gaussian blur with an intensity-sized kernel.
    Blur,
    /// Canny edge extraction with intensity-scaled thresholds.
    EdgeDetection,
    /// Stylized grayscale-pencil rendering.
    PencilSketch,
    /// Fixed sepia color-mixing matrix scaled by intensity.
    Sepia,
    /// Per-channel complement.
    InvertColors,
    /// 3×3 emboss convolution weighted by intensity.
    Emboss,
    /// 3×3 sharpen convolution weighted by intensity.
    Sharpen,
    /// Round-trip through HSV and back (no net visual effect).
    Hsv,
}

impl FilterKind {
    /// Every filter, in presentation order.
    pub const ALL: [FilterKind; 11] = [
        FilterKind::NoFilter,
        FilterKind::Grayscale,
        FilterKind::Cartoon,
        FilterKind::Blur,
        FilterKind::EdgeDetection,
        FilterKind::PencilSketch,
        FilterKind::Sepia,
        FilterKind::InvertColors,
        FilterKind::Emboss,
        FilterKind::Sharpen,
        FilterKind::Hsv,
    ];

    /// The display name of this filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::NoFilter => "No Filter",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Cartoon => "Cartoon",
            FilterKind::Blur => "Blur",
            FilterKind::EdgeDetection => "Edge Detection",
            FilterKind::PencilSketch => "Pencil Sketch",
            FilterKind::Sepia => "Sepia",
            FilterKind::InvertColors => "Invert Colors",
            FilterKind::Emboss => "Emboss",
            FilterKind::Sharpen => "Sharpen",
            FilterKind::Hsv => "HSV",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FaceFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FaceFilterError::UnknownFilter(s.to_string()))
    }
}

/// A filter selection with its strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Which filter to apply.
    pub kind: FilterKind,
    /// Filter strength, 1..=10. Ignored by filters that take no parameter.
    pub intensity: u8,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            kind: FilterKind::NoFilter,
            intensity: 5,
        }
    }
}

/// Result of a single pipeline run.
#[derive(Debug)]
pub struct ProcessedImage {
    /// The processed buffer, same dimensions as the input.
    pub image: RgbImage,

    /// Faces found by the overlay stage's detection pass, in no particular
    /// order. Empty when no overlay was configured or no detector was set.
    pub faces: Vec<FaceBox>,
}

/// Builder for the face filter pipeline.
///
/// Holds the immutable per-run configuration; `process` can be called any
/// number of times with independent buffers.
pub struct FaceFilter {
    spec: FilterSpec,
    brightness: i32,
    overlay: Option<OverlayAsset>,
    /// User-provided face detector. When `None`, overlay composition is
    /// skipped (with a warning) since there is nothing to anchor to.
    detector: Option<Box<dyn FaceDetector>>,
}

impl FaceFilter {
    /// Create a pipeline with no filter, neutral brightness, and no overlay.
    pub fn new() -> Self {
        Self {
            spec: FilterSpec::default(),
            brightness: 0,
            overlay: None,
            detector: None,
        }
    }

    /// Select the whole-frame filter (default: `FilterKind::NoFilter`).
    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.spec.kind = kind;
        self
    }

    /// Set the filter strength from 1 to 10 (default: 5).
    pub fn intensity(mut self, intensity: u8) -> Self {
        self.spec.intensity = intensity;
        self
    }

    /// Set the brightness offset from −100 to 100 (default: 0).
    pub fn brightness(mut self, offset: i32) -> Self {
        self.brightness = offset;
        self
    }

    /// Set the face-anchored overlay (default: none).
    pub fn overlay(mut self, asset: OverlayAsset) -> Self {
        self.overlay = Some(asset);
        self
    }

    /// Provide a face detector for the overlay stage.
    ///
    /// With the `rustface` feature enabled, [`RustfaceDetector`] is the
    /// built-in choice; any [`FaceDetector`] implementation works.
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Process one image with the configured settings.
    ///
    /// Takes ownership of the buffer and returns a new one of identical
    /// dimensions. Fails only on invalid input (zero-sized buffer, intensity
    /// or brightness out of range) or a detector backend failure; degraded
    /// overlay conditions are logged and skipped.
    pub fn process(&self, image: RgbImage) -> Result<ProcessedImage, FaceFilterError> {
        pipeline::run(
            image,
            &self.spec,
            self.brightness,
            self.overlay.as_ref(),
            self.detector.as_deref(),
        )
    }

    /// Decode raw image bytes (JPEG, PNG, or WebP), flatten any alpha channel
    /// over white, and process the result.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<ProcessedImage, FaceFilterError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| FaceFilterError::Decode(e.to_string()))?;
        self.process(pipeline::flatten_alpha(&decoded))
    }
}

impl Default for FaceFilter {
    fn default() -> Self {
        Self::new()
    }
}
