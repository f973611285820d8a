use std::fmt;

use ab_glyph::{Font, FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::error::FaceFilterError;
use crate::face_detector::FaceBox;

/// Overlay width as a fraction of the face box width.
const EYEWEAR_WIDTH_RATIO: f64 = 0.9;

/// Overlay height as a fraction of the face box height.
const EYEWEAR_HEIGHT_RATIO: f64 = 0.3;

/// Horizontal placement offset as a fraction of the face box width.
const EYEWEAR_X_OFFSET_RATIO: f64 = 0.05;

/// Vertical placement offset as a fraction of the face box height.
const EYEWEAR_Y_OFFSET_RATIO: f64 = 0.2;

/// Point size glyph overlays are drawn at.
const GLYPH_SCALE: f32 = 72.0;

/// Fill color glyph overlays are drawn with.
const GLYPH_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Face-anchored overlay content.
///
/// Exactly one overlay is active per pipeline run; configuring none skips the
/// composition stage entirely.
pub enum OverlayAsset {
    /// An RGBA raster (eyewear graphic) composited by binary alpha test.
    Eyewear(RgbaImage),
    /// A glyph string drawn onto each detected face.
    Glyph {
        /// The text to draw, typically a single emoji or short symbol.
        text: String,
        /// Font used to render the text.
        font: FontVec,
    },
}

impl OverlayAsset {
    /// Decode an eyewear overlay from raw image bytes (PNG with transparency).
    pub fn eyewear_from_bytes(bytes: &[u8]) -> Result<Self, FaceFilterError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| FaceFilterError::AssetDecode(e.to_string()))?;
        Ok(Self::Eyewear(decoded.to_rgba8()))
    }

    /// Build an eyewear overlay from an already-decoded RGBA raster.
    pub fn eyewear(image: RgbaImage) -> Self {
        Self::Eyewear(image)
    }

    /// Build a glyph overlay from text and raw font bytes (TTF/OTF).
    ///
    /// Symbol fonts may not render multi-codepoint emoji sequences correctly;
    /// the glyph is drawn with whatever coverage the supplied font has.
    pub fn glyph(text: impl Into<String>, font_bytes: Vec<u8>) -> Result<Self, FaceFilterError> {
        let font = FontVec::try_from_vec(font_bytes).map_err(|_| FaceFilterError::InvalidFont)?;
        Ok(Self::Glyph {
            text: text.into(),
            font,
        })
    }
}

impl fmt::Debug for OverlayAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eyewear(image) => f
                .debug_struct("Eyewear")
                .field("width", &image.width())
                .field("height", &image.height())
                .finish(),
            Self::Glyph { text, .. } => f.debug_struct("Glyph").field("text", text).finish(),
        }
    }
}

/// Where an eyewear overlay lands for one face, clamped to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    /// Top-left corner of the visible region within the frame.
    pub dst_x: u32,
    pub dst_y: u32,
    /// Full resize target for the overlay asset.
    pub width: u32,
    pub height: u32,
    /// Offset into the resized overlay when the face pokes past the
    /// left or top frame edge.
    pub src_x: u32,
    pub src_y: u32,
    /// Extent of the region that is actually written.
    pub visible_width: u32,
    pub visible_height: u32,
}

/// Compute the eyewear placement for one face box.
///
/// The overlay spans 0.9×w by 0.3×h, offset (0.05×w, 0.2×h) from the box
/// origin. Returns `None` when the computed region has no visible pixels,
/// so a face at the frame edge can never cause an out-of-bounds write.
pub(crate) fn eyewear_placement(
    face: &FaceBox,
    frame_width: u32,
    frame_height: u32,
) -> Option<Placement> {
    let width = (face.width * EYEWEAR_WIDTH_RATIO).round() as i64;
    let height = (face.height * EYEWEAR_HEIGHT_RATIO).round() as i64;
    if width <= 0 || height <= 0 {
        return None;
    }

    let x = (face.x + face.width * EYEWEAR_X_OFFSET_RATIO).round() as i64;
    let y = (face.y + face.height * EYEWEAR_Y_OFFSET_RATIO).round() as i64;

    // Detectors may report boxes poking past any frame edge; clamp all four.
    let src_x = (-x).max(0);
    let src_y = (-y).max(0);
    if src_x >= width || src_y >= height {
        return None;
    }
    let dst_x = x.max(0);
    let dst_y = y.max(0);
    if dst_x >= frame_width as i64 || dst_y >= frame_height as i64 {
        return None;
    }

    let visible_width = (width - src_x).min(frame_width as i64 - dst_x);
    let visible_height = (height - src_y).min(frame_height as i64 - dst_y);

    Some(Placement {
        dst_x: dst_x as u32,
        dst_y: dst_y as u32,
        width: width as u32,
        height: height as u32,
        src_x: src_x as u32,
        src_y: src_y as u32,
        visible_width: visible_width as u32,
        visible_height: visible_height as u32,
    })
}

/// Composite an eyewear raster onto every detected face.
///
/// The asset is resized to the per-face target size, then copied pixel by
/// pixel wherever its alpha channel is non-zero. Bilinear resampling keeps
/// fully transparent regions transparent after the resize.
pub(crate) fn composite_eyewear(frame: &mut RgbImage, glasses: &RgbaImage, faces: &[FaceBox]) {
    for face in faces {
        let Some(p) = eyewear_placement(face, frame.width(), frame.height()) else {
            continue;
        };
        let resized = imageops::resize(glasses, p.width, p.height, FilterType::Triangle);
        for dy in 0..p.visible_height {
            for dx in 0..p.visible_width {
                let src = resized.get_pixel(p.src_x + dx, p.src_y + dy).0;
                if src[3] > 0 {
                    frame.put_pixel(p.dst_x + dx, p.dst_y + dy, Rgb([src[0], src[1], src[2]]));
                }
            }
        }
    }
}

/// Draw a glyph string onto every detected face at `(x + w/3, y + h/2)`.
///
/// Returns `UnsupportedOperation` when the font covers none of the text's
/// characters (symbol fonts and multi-codepoint emoji); the caller is
/// expected to degrade gracefully rather than abort.
pub(crate) fn composite_glyph(
    frame: &mut RgbImage,
    text: &str,
    font: &FontVec,
    faces: &[FaceBox],
) -> Result<(), FaceFilterError> {
    if !text.chars().any(|c| font.glyph_id(c).0 != 0) {
        return Err(FaceFilterError::UnsupportedOperation(
            "font has no glyphs for the overlay text",
        ));
    }
    for face in faces {
        let x = (face.x + face.width / 3.0).round() as i32;
        let y = (face.y + face.height / 2.0).round() as i32;
        draw_text_mut(frame, GLYPH_COLOR, x, y, PxScale::from(GLYPH_SCALE), font, text);
    }
    Ok(())
}
