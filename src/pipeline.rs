use image::{imageops, DynamicImage, Rgb, RgbImage, RgbaImage};
use tracing::{debug, warn};

use crate::error::FaceFilterError;
use crate::face_detector::{FaceBox, FaceDetector};
use crate::overlay::OverlayAsset;
use crate::{brightness, filters, overlay, FilterSpec, ProcessedImage};

/// Full processing pipeline: validate → filter → brightness → detect → overlay.
///
/// The buffer is owned and threaded linearly through each stage; no stage
/// holds a reference past its own run. Face detection happens immediately
/// before overlay placement, on the filtered and brightness-adjusted buffer,
/// since filters change the pixel statistics the detector depends on.
pub(crate) fn run(
    image: RgbImage,
    spec: &FilterSpec,
    brightness_offset: i32,
    overlay_asset: Option<&OverlayAsset>,
    detector: Option<&dyn FaceDetector>,
) -> Result<ProcessedImage, FaceFilterError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(FaceFilterError::ZeroDimensions);
    }
    if !(1..=10).contains(&spec.intensity) {
        return Err(FaceFilterError::InvalidIntensity(spec.intensity));
    }
    if !(-100..=100).contains(&brightness_offset) {
        return Err(FaceFilterError::InvalidBrightness(brightness_offset));
    }

    debug!(
        filter = %spec.kind,
        intensity = spec.intensity,
        brightness = brightness_offset,
        width,
        height,
        "running filter pipeline"
    );

    let filtered = filters::apply(image, spec);
    let mut current = brightness::adjust(filtered, brightness_offset);

    let mut faces: Vec<FaceBox> = Vec::new();
    if let Some(asset) = overlay_asset {
        match detector {
            None => {
                warn!("overlay requested but no face detector configured; skipping overlay");
            }
            Some(detector) => {
                let gray = imageops::grayscale(&current);
                faces = detector.detect(gray.as_raw(), width, height)?;
                debug!(faces = faces.len(), "face detection complete");

                match asset {
                    OverlayAsset::Eyewear(glasses) => {
                        overlay::composite_eyewear(&mut current, glasses, &faces);
                    }
                    OverlayAsset::Glyph { text, font } => {
                        if let Err(e) = overlay::composite_glyph(&mut current, text, font, &faces)
                        {
                            warn!(error = %e, "glyph overlay skipped");
                        }
                    }
                }
            }
        }
    }

    Ok(ProcessedImage {
        image: current,
        faces,
    })
}

/// Flatten any alpha channel by compositing onto a white background.
pub(crate) fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba: RgbaImage = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let mut rgb = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let out_r = (r as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        let out_g = (g as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        let out_b = (b as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        rgb.put_pixel(x, y, Rgb([out_r, out_g, out_b]));
    }

    rgb
}
