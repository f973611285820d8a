use crate::error::FaceFilterError;

/// Bounding box of a detected face within an image.
#[derive(Debug, Clone)]
pub struct FaceBox {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib, etc.)
/// and pass it to [`crate::FaceFilter::face_detector`]. Returned boxes carry
/// no ordering guarantee, and an empty list is a valid result (no faces).
///
/// ```no_run
/// use facefilter::{FaceBox, FaceDetector, FaceFilterError};
///
/// struct MyDetector;
/// impl FaceDetector for MyDetector {
///     fn detect(
///         &self,
///         gray: &[u8],
///         width: u32,
///         height: u32,
///     ) -> Result<Vec<FaceBox>, FaceFilterError> {
///         // Your detection logic here
///         Ok(vec![])
///     }
/// }
/// ```
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32)
        -> Result<Vec<FaceBox>, FaceFilterError>;
}
