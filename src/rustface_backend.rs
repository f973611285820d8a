use std::io::Cursor;
use std::path::Path;

use crate::error::FaceFilterError;
use crate::face_detector::{FaceBox, FaceDetector};

/// Smallest face the cascade will report, in pixels.
const MIN_FACE_SIZE: u32 = 20;

/// Classifier score below which a window is rejected.
const SCORE_THRESH: f64 = 2.0;

/// Per-level shrink factor of the detection pyramid.
const PYRAMID_SCALE_FACTOR: f32 = 0.8;

/// Sliding-window step in pixels (horizontal, vertical).
const SLIDE_WINDOW_STEP: (u32, u32) = (4, 4);

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The cascade parameters above are tuned defaults balancing false positives
/// against missed faces; they are deliberately not configurable. The SeetaFace
/// model file is supplied by the caller at construction time.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Create a detector from the raw bytes of a SeetaFace model file.
    pub fn from_model_bytes(bytes: &[u8]) -> Result<Self, FaceFilterError> {
        let model = rustface::read_model(Cursor::new(bytes))
            .map_err(|e| FaceFilterError::Detection(format!("failed to read model: {e}")))?;
        Ok(Self { model })
    }

    /// Create a detector by reading a SeetaFace model file from disk.
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self, FaceFilterError> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| FaceFilterError::Detection(format!("failed to read model file: {e}")))?;
        Self::from_model_bytes(&bytes)
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceBox>, FaceFilterError> {
        let expected = width as usize * height as usize;
        if gray.len() != expected {
            return Err(FaceFilterError::Detection(format!(
                "grayscale buffer has {} bytes, expected {expected} for {width}x{height}",
                gray.len()
            )));
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP.0, SLIDE_WINDOW_STEP.1);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect())
    }
}
