use crate::models::Region;
use image::RgbImage;
use image::imageops;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

/// Where the redaction goes relative to a detected field, and how hard to blur
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MosaicSpec {
    /// Offset from the detected region's top-left corner
    pub offset_x: u32,
    pub offset_y: u32,
    pub width: u32,
    pub height: u32,
    /// Gaussian sigma; large enough that glyphs of ~20px stop being legible
    pub sigma: f32,
}

impl Default for MosaicSpec {
    fn default() -> Self {
        Self {
            offset_x: 8,
            offset_y: 4,
            width: 220,
            height: 32,
            sigma: 8.0,
        }
    }
}

impl MosaicSpec {
    /// The unclipped target rectangle for a detected region
    pub fn target(&self, detected: &Region) -> Region {
        Region::new(
            detected.x.saturating_add(self.offset_x),
            detected.y.saturating_add(self.offset_y),
            self.width,
            self.height,
        )
    }
}

/// Blur exactly the pixels inside `rect`, which must already lie within the image
pub fn blur_region(img: &mut RgbImage, rect: Region, sigma: f32) {
    let patch = imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image();
    let blurred = gaussian_blur_f32(&patch, sigma);
    imageops::replace(img, &blurred, rect.x as i64, rect.y as i64);
}
