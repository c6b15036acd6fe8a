pub mod font;
pub mod mosaic;

use crate::models::{DetectedRegion, Region};
use image::{Rgb, RgbImage};
use log::warn;
use mosaic::MosaicSpec;
use std::time::SystemTime;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Screenshot size the fixed overlay positions were tuned for
pub const REFERENCE_WIDTH: u32 = 1920;
pub const REFERENCE_HEIGHT: u32 = 1080;
/// Allowed relative deviation from the reference size before warning
pub const REFERENCE_TOLERANCE: f32 = 0.5;

/// Placement and look of one overlay text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub x: i32,
    pub y: i32,
    /// Pixels per font cell
    pub scale: u32,
    pub color: Rgb<u8>,
    pub shadow_color: Rgb<u8>,
    pub shadow_offset: (i32, i32),
}

impl TextStyle {
    pub fn sequence() -> Self {
        Self {
            x: 24,
            y: 24,
            scale: 4,
            color: Rgb([220, 20, 20]),
            shadow_color: Rgb([255, 255, 255]),
            shadow_offset: (2, 2),
        }
    }

    pub fn timestamp() -> Self {
        Self {
            x: 24,
            y: 72,
            scale: 3,
            color: Rgb([20, 60, 220]),
            shadow_color: Rgb([255, 255, 255]),
            shadow_offset: (2, 2),
        }
    }
}

/// Draws sequence numbers, timestamps and mosaics onto images in place.
///
/// None of the operations change the image dimensions, and they can be
/// applied in any order.
#[derive(Debug, Clone)]
pub struct Annotator {
    pub sequence: TextStyle,
    pub timestamp: TextStyle,
    pub mosaic: MosaicSpec,
    /// Offset used when rendering file times
    pub utc_offset: UtcOffset,
}

impl Annotator {
    pub fn new(utc_offset: UtcOffset) -> Self {
        Self {
            sequence: TextStyle::sequence(),
            timestamp: TextStyle::timestamp(),
            mosaic: MosaicSpec::default(),
            utc_offset,
        }
    }

    /// Render the 1-based sequence number for an original list index
    pub fn draw_sequence(&self, img: &mut RgbImage, index: usize) {
        draw_shadowed_text(img, &(index + 1).to_string(), &self.sequence);
    }

    /// Render a file's modification time
    pub fn draw_timestamp(&self, img: &mut RgbImage, modified: SystemTime) {
        match format_timestamp(modified, self.utc_offset) {
            Ok(text) => draw_shadowed_text(img, &text, &self.timestamp),
            Err(e) => warn!("Could not format timestamp: {:#}", e),
        }
    }

    /// The clipped rectangle a mosaic would cover, if any
    pub fn mosaic_rect(&self, img: &RgbImage, detected: &DetectedRegion) -> Option<Region> {
        let region = detected.region()?;
        let target = self.mosaic.target(&region);
        let (width, height) = img.dimensions();
        match target.clip_to(width, height) {
            Some(clipped) => {
                if clipped != target {
                    warn!(
                        "Mosaic {:?} extends past the {}x{} image, clipped to {:?}",
                        target, width, height, clipped
                    );
                }
                Some(clipped)
            }
            None => {
                warn!(
                    "Mosaic {:?} lies outside the {}x{} image, skipped",
                    target, width, height
                );
                None
            }
        }
    }

    /// Blur the field next to a detected region; no-op when nothing was detected
    pub fn apply_mosaic(&self, img: &mut RgbImage, detected: &DetectedRegion) {
        if let Some(rect) = self.mosaic_rect(img, detected) {
            mosaic::blur_region(img, rect, self.mosaic.sigma);
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

/// Shadow first, then the glyphs on top
fn draw_shadowed_text(img: &mut RgbImage, text: &str, style: &TextStyle) {
    let (dx, dy) = style.shadow_offset;
    font::draw_text(img, text, style.x + dx, style.y + dy, style.scale, style.shadow_color);
    font::draw_text(img, text, style.x, style.y, style.scale, style.color);
}

/// `YYYY-MM-DD HH:MM:SS` in the given offset
pub fn format_timestamp(time: SystemTime, offset: UtcOffset) -> anyhow::Result<String> {
    let local = OffsetDateTime::from(time).to_offset(offset);
    let text = local.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))?;
    Ok(text)
}

/// Warn when an image is far from the size the overlay offsets assume.
/// Returns whether the image is within tolerance.
pub fn check_reference_size(label: &str, width: u32, height: u32) -> bool {
    let deviates = |actual: u32, expected: u32| {
        (actual as f32 - expected as f32).abs() / expected as f32 > REFERENCE_TOLERANCE
    };
    if deviates(width, REFERENCE_WIDTH) || deviates(height, REFERENCE_HEIGHT) {
        warn!(
            "{}: {}x{} is far from the {}x{} layout the overlay positions assume",
            label, width, height, REFERENCE_WIDTH, REFERENCE_HEIGHT
        );
        false
    } else {
        true
    }
}
