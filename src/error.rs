use thiserror::Error;

/// Error type returned by facefilter operations.
#[derive(Debug, Error)]
pub enum FaceFilterError {
    /// The input bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The input image has a zero width or height.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// Filter intensity outside the supported range.
    #[error("filter intensity must be between 1 and 10, got {0}")]
    InvalidIntensity(u8),

    /// Brightness offset outside the supported range.
    #[error("brightness offset must be between -100 and 100, got {0}")]
    InvalidBrightness(i32),

    /// A filter name that does not match any known filter.
    #[error("unknown filter name: {0}")]
    UnknownFilter(String),

    /// The overlay asset bytes could not be decoded as an image.
    #[error("failed to decode overlay asset: {0}")]
    AssetDecode(String),

    /// The overlay font bytes are not a parseable font.
    #[error("overlay font data is not a valid font")]
    InvalidFont,

    /// A requested operation is unavailable; the pipeline degrades
    /// to the unmodified buffer instead of aborting.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// The face detection backend failed.
    #[error("face detection failed: {0}")]
    Detection(String),
}
