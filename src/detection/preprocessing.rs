use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::edges::canny;
use serde::{Deserialize, Serialize};

/// HSV triple using 8-bit conventions: hue in 0..=179, saturation and value in 0..=255
pub type Hsv = [u8; 3];

/// Inclusive HSV bounds, compared per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvRange {
    pub const fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    /// Exactly H=0, S=0, V=255: pure white
    pub const PURE_WHITE: HsvRange = HsvRange::new([0, 0, 255], [0, 0, 255]);

    pub fn contains(&self, hsv: Hsv) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Convert one RGB pixel to HSV
pub fn rgb_to_hsv(Rgb([r, g, b]): Rgb<u8>) -> Hsv {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = max - min;

    let v = max;
    let s = if max > 0.0 { diff * 255.0 / max } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / diff
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    // Halve the hue so it fits a byte; 360 wraps back to 0
    let h = ((h / 2.0).round() as u32 % 180) as u8;
    [h, s.round() as u8, v as u8]
}

/// Convert a whole image to HSV, stored channel-wise in an RGB buffer
pub fn to_hsv(img: &RgbImage) -> RgbImage {
    let mut hsv = RgbImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        hsv.put_pixel(x, y, Rgb(rgb_to_hsv(*pixel)));
    }
    hsv
}

/// 255 where the HSV pixel lies inside `range`, 0 elsewhere
pub fn in_range(hsv: &RgbImage, range: &HsvRange) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (x, y, pixel) in hsv.enumerate_pixels() {
        if range.contains(pixel.0) {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }
    mask
}

/// Values strictly above `cutoff` become 255, the rest 0
pub fn binarize(img: &GrayImage, cutoff: u8) -> GrayImage {
    threshold(img, cutoff, ThresholdType::Binary)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
