use image::imageops;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::contrast::adaptive_threshold;
use imageproc::edges::canny;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32, median_filter};

use crate::{FilterKind, FilterSpec};

/// Block radius of the adaptive threshold used by the cartoon edge mask
/// (a 9×9 neighborhood).
const CARTOON_EDGE_BLOCK_RADIUS: u32 = 4;

/// Range sigma of the cartoon bilateral smoothing.
const CARTOON_SIGMA_COLOR: f32 = 250.0;

/// Spatial sigma of the cartoon bilateral smoothing.
const CARTOON_SIGMA_SPATIAL: f32 = 250.0;

/// Apply the selected filter to `image`.
///
/// Pure function of `(image, spec)`: same dimensions out as in, deterministic.
/// `NoFilter` is the identity. Intensity is assumed validated (1..=10) by the
/// pipeline before this is called.
pub(crate) fn apply(image: RgbImage, spec: &FilterSpec) -> RgbImage {
    match spec.kind {
        FilterKind::NoFilter => image,
        FilterKind::Grayscale => grayscale(&image),
        FilterKind::Cartoon => cartoon(&image, spec.intensity),
        FilterKind::Blur => blur(&image, spec.intensity),
        FilterKind::EdgeDetection => edge_detection(&image, spec.intensity),
        FilterKind::PencilSketch => pencil_sketch(&image, spec.intensity),
        FilterKind::Sepia => sepia(&image, spec.intensity),
        FilterKind::InvertColors => invert_colors(image),
        FilterKind::Emboss => emboss(&image, spec.intensity),
        FilterKind::Sharpen => sharpen(&image, spec.intensity),
        FilterKind::Hsv => hsv_round_trip(&image),
    }
}

/// Gaussian blur kernel size for an intensity: `2 * intensity + 1`, always odd.
pub(crate) fn blur_kernel_size(intensity: u8) -> u32 {
    2 * intensity as u32 + 1
}

/// Median blur kernel size for an intensity: the intensity itself, rounded up
/// to the next odd value when even.
pub(crate) fn median_kernel_size(intensity: u8) -> u32 {
    let k = intensity as u32;
    if k % 2 == 0 {
        k + 1
    } else {
        k
    }
}

/// Derive a Gaussian sigma from an odd kernel size, matching the usual
/// kernel-size-to-sigma mapping: `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
fn gaussian_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size - 1) as f32 * 0.5 - 1.0) + 0.8
}

/// Luminance projection, re-expanded to three channels.
fn grayscale(image: &RgbImage) -> RgbImage {
    gray_to_rgb(&imageops::grayscale(image))
}

/// Median-blur the luminance channel, adaptive-threshold it into a binary edge
/// mask, bilateral-smooth the color image, then keep the smoothed color only
/// where the mask is set.
fn cartoon(image: &RgbImage, intensity: u8) -> RgbImage {
    let gray = imageops::grayscale(image);
    let median_radius = median_kernel_size(intensity) / 2;
    // A 1x1 median window is the identity.
    let smoothed_gray = if median_radius == 0 {
        gray.clone()
    } else {
        median_filter(&gray, median_radius, median_radius)
    };
    let edges = adaptive_threshold(&smoothed_gray, CARTOON_EDGE_BLOCK_RADIUS);

    let window = 2 * intensity as u32;
    let mut out = bilateral_rgb(image, window);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if edges.get_pixel(x, y).0[0] == 0 {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    out
}

/// Gaussian blur with kernel size `2 * intensity + 1`.
fn blur(image: &RgbImage, intensity: u8) -> RgbImage {
    gaussian_blur_f32(image, gaussian_sigma(blur_kernel_size(intensity)))
}

/// Canny edge extraction with thresholds `10 * intensity` / `20 * intensity`,
/// re-expanded to three channels.
fn edge_detection(image: &RgbImage, intensity: u8) -> RgbImage {
    let gray = imageops::grayscale(image);
    let low = 10.0 * intensity as f32;
    let high = 20.0 * intensity as f32;
    gray_to_rgb(&canny(&gray, low, high))
}

/// Stylized pencil rendering: invert the luminance, blur it with a smoothing
/// radius of `10 * intensity`, then color-dodge the original luminance by the
/// blurred inverse.
fn pencil_sketch(image: &RgbImage, intensity: u8) -> RgbImage {
    let gray = imageops::grayscale(image);
    let radius = 10.0 * intensity as f32;
    let mut inverted = gray.clone();
    imageops::invert(&mut inverted);
    let blurred = gaussian_blur_f32(&inverted, radius / 3.0);

    let (width, height) = gray.dimensions();
    let mut sketch = GrayImage::new(width, height);
    for (x, y, pixel) in sketch.enumerate_pixels_mut() {
        let g = gray.get_pixel(x, y).0[0] as u32;
        let b = blurred.get_pixel(x, y).0[0] as u32;
        // Color dodge with a guard against the saturated denominator.
        let v = if b >= 255 {
            255
        } else {
            (g * 255 / (255 - b)).min(255)
        };
        pixel.0[0] = v as u8;
    }
    gray_to_rgb(&sketch)
}

/// Fixed sepia color-mixing matrix, rows in R, G, B output order.
const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Sepia matrix scaled by `intensity / 10`, applied per pixel and clamped.
fn sepia(image: &RgbImage, intensity: u8) -> RgbImage {
    let scale = intensity as f32 / 10.0;
    let (width, height) = image.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (r, g, b) = (r as f32, g as f32, b as f32);
        let mut mixed = [0u8; 3];
        for (channel, row) in mixed.iter_mut().zip(SEPIA_MATRIX.iter()) {
            let v = scale * (row[0] * r + row[1] * g + row[2] * b);
            *channel = v.round().clamp(0.0, 255.0) as u8;
        }
        out.put_pixel(x, y, Rgb(mixed));
    }
    out
}

/// Per-channel complement.
fn invert_colors(mut image: RgbImage) -> RgbImage {
    imageops::invert(&mut image);
    image
}

/// 3×3 emboss correlation with off-diagonal weights `±intensity`.
fn emboss(image: &RgbImage, intensity: u8) -> RgbImage {
    let i = intensity as f32;
    #[rustfmt::skip]
    let kernel = [
        0.0, -i, -i,
          i, 0.0, -i,
          i,   i, 0.0,
    ];
    convolve3x3(image, &kernel)
}

/// 3×3 sharpen correlation with center `5 * intensity` and neighbors
/// `-intensity`.
fn sharpen(image: &RgbImage, intensity: u8) -> RgbImage {
    let i = intensity as f32;
    #[rustfmt::skip]
    let kernel = [
        0.0,      -i, 0.0,
         -i, 5.0 * i,  -i,
        0.0,      -i, 0.0,
    ];
    convolve3x3(image, &kernel)
}

/// Round-trip through HSV and back.
///
/// Converts each pixel to HSV and immediately back with no intermediate
/// adjustment, so the net visual effect is (within rounding) a no-op.
fn hsv_round_trip(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (h, s, v) = rgb_to_hsv(r, g, b);
        let (r, g, b) = hsv_to_rgb(h, s, v);
        out.put_pixel(x, y, Rgb([r, g, b]));
    }
    out
}

/// Expand a single-channel image back to three identical channels.
fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    let (width, height) = gray.dimensions();
    let mut rgb = RgbImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let v = pixel.0[0];
        rgb.put_pixel(x, y, Rgb([v, v, v]));
    }
    rgb
}

/// Bilateral-smooth a color image by filtering each channel independently.
fn bilateral_rgb(image: &RgbImage, window: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut channels = Vec::with_capacity(3);
    for c in 0..3 {
        let plane = GrayImage::from_fn(width, height, |x, y| {
            image::Luma([image.get_pixel(x, y).0[c]])
        });
        channels.push(bilateral_filter(
            &plane,
            window,
            CARTOON_SIGMA_COLOR,
            CARTOON_SIGMA_SPATIAL,
        ));
    }
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            channels[0].get_pixel(x, y).0[0],
            channels[1].get_pixel(x, y).0[0],
            channels[2].get_pixel(x, y).0[0],
        ])
    })
}

/// 3×3 correlation over all three channels with replicate border handling.
/// Results are rounded and clamped to the channel range.
fn convolve3x3(image: &RgbImage, kernel: &[f32; 9]) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for ky in 0..3i64 {
                for kx in 0..3i64 {
                    let sx = (x as i64 + kx - 1).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + ky - 1).clamp(0, height as i64 - 1) as u32;
                    let sample = image.get_pixel(sx, sy).0;
                    let weight = kernel[(ky * 3 + kx) as usize];
                    for c in 0..3 {
                        acc[c] += weight * sample[c] as f32;
                    }
                }
            }
            out.put_pixel(
                x,
                y,
                Rgb([
                    acc[0].round().clamp(0.0, 255.0) as u8,
                    acc[1].round().clamp(0.0, 255.0) as u8,
                    acc[2].round().clamp(0.0, 255.0) as u8,
                ]),
            );
        }
    }
    out
}

fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_rgb(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        img
    }

    #[test]
    fn no_filter_is_identity() {
        let img = make_test_rgb(20, 16);
        let spec = FilterSpec {
            kind: FilterKind::NoFilter,
            intensity: 5,
        };
        let out = apply(img.clone(), &spec);
        assert_eq!(out, img);
    }

    #[test]
    fn every_filter_preserves_dimensions() {
        let img = make_test_rgb(26, 22);
        for kind in FilterKind::ALL {
            for intensity in 1..=10u8 {
                let spec = FilterSpec { kind, intensity };
                let out = apply(img.clone(), &spec);
                assert_eq!(
                    out.dimensions(),
                    img.dimensions(),
                    "{kind:?} at intensity {intensity} changed dimensions"
                );
            }
        }
    }

    #[test]
    fn invert_is_an_involution() {
        let img = make_test_rgb(12, 12);
        let spec = FilterSpec {
            kind: FilterKind::InvertColors,
            intensity: 5,
        };
        let twice = apply(apply(img.clone(), &spec), &spec);
        assert_eq!(twice, img);
    }

    #[test]
    fn grayscale_output_has_equal_channels() {
        let img = make_test_rgb(10, 10);
        let spec = FilterSpec {
            kind: FilterKind::Grayscale,
            intensity: 5,
        };
        let out = apply(img, &spec);
        for pixel in out.pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }

    #[test]
    fn blur_kernel_size_is_odd_for_every_intensity() {
        for intensity in 1..=10u8 {
            assert_eq!(blur_kernel_size(intensity) % 2, 1);
        }
        // intensity 4 must give 9, not 8
        assert_eq!(blur_kernel_size(4), 9);
    }

    #[test]
    fn median_kernel_size_rounds_up_to_odd() {
        for intensity in 1..=10u8 {
            assert_eq!(median_kernel_size(intensity) % 2, 1);
        }
        assert_eq!(median_kernel_size(4), 5);
        assert_eq!(median_kernel_size(5), 5);
    }

    #[test]
    fn sepia_full_intensity_matches_matrix() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([100, 150, 200]));
        let spec = FilterSpec {
            kind: FilterKind::Sepia,
            intensity: 10,
        };
        let out = apply(img, &spec);
        // R = 0.393*100 + 0.769*150 + 0.189*200 = 192.45 → 192
        // G = 0.349*100 + 0.686*150 + 0.168*200 = 171.4  → 171
        // B = 0.272*100 + 0.534*150 + 0.131*200 = 133.5, on the rounding edge
        let pixel = out.get_pixel(0, 0);
        assert_eq!(pixel.0[0], 192);
        assert_eq!(pixel.0[1], 171);
        assert!((133..=134).contains(&pixel.0[2]));
    }

    #[test]
    fn sepia_clamps_bright_pixels() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        let spec = FilterSpec {
            kind: FilterKind::Sepia,
            intensity: 10,
        };
        let out = apply(img, &spec);
        // Sepia rows for white sum past 255 on R and G
        assert_eq!(out.get_pixel(0, 0).0[0], 255);
        assert_eq!(out.get_pixel(0, 0).0[1], 255);
    }

    #[test]
    fn hsv_round_trip_is_visually_identity() {
        let img = make_test_rgb(16, 16);
        let spec = FilterSpec {
            kind: FilterKind::Hsv,
            intensity: 5,
        };
        let out = apply(img.clone(), &spec);
        for (a, b) in img.pixels().zip(out.pixels()) {
            for c in 0..3 {
                let diff = (a.0[c] as i16 - b.0[c] as i16).abs();
                assert!(diff <= 1, "channel drifted by {diff}");
            }
        }
    }

    #[test]
    fn emboss_of_uniform_image_is_black() {
        let img = RgbImage::from_pixel(8, 8, Rgb([90, 90, 90]));
        let spec = FilterSpec {
            kind: FilterKind::Emboss,
            intensity: 3,
        };
        let out = apply(img, &spec);
        // Emboss weights sum to zero, so a flat region has no response.
        for pixel in out.pixels() {
            assert_eq!(pixel, &Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn sharpen_scales_flat_regions_by_intensity() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 10, 10]));
        let spec = FilterSpec {
            kind: FilterKind::Sharpen,
            intensity: 2,
        };
        let out = apply(img, &spec);
        // Kernel weights sum to the intensity on a flat region: 10 * 2 = 20.
        assert_eq!(out.get_pixel(4, 4), &Rgb([20, 20, 20]));
    }

    #[test]
    fn edge_detection_of_uniform_image_is_black() {
        let img = RgbImage::from_pixel(20, 20, Rgb([128, 128, 128]));
        let spec = FilterSpec {
            kind: FilterKind::EdgeDetection,
            intensity: 5,
        };
        let out = apply(img, &spec);
        for pixel in out.pixels() {
            assert_eq!(pixel, &Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn convolve_identity_kernel_preserves_image() {
        let img = make_test_rgb(9, 7);
        #[rustfmt::skip]
        let identity = [
            0.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        assert_eq!(convolve3x3(&img, &identity), img);
    }

    #[test]
    fn hsv_conversion_round_trips_primaries() {
        for (r, g, b) in [
            (255u8, 0u8, 0u8),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 255),
            (0, 0, 0),
            (128, 64, 32),
        ] {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r2, g2, b2) = hsv_to_rgb(h, s, v);
            assert!((r as i16 - r2 as i16).abs() <= 1);
            assert!((g as i16 - g2 as i16).abs() <= 1);
            assert!((b as i16 - b2 as i16).abs() <= 1);
        }
    }
}
