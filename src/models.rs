use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Axis-aligned rectangle in image pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a region from inclusive min/max corners
    pub fn from_corners(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && (x as u64) < self.right() && y >= self.y && (y as u64) < self.bottom()
    }

    /// Clip to an image of the given size; `None` if nothing is left
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Region> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clipped_w = (self.right().min(width as u64) - self.x as u64) as u32;
        let clipped_h = (self.bottom().min(height as u64) - self.y as u64) as u32;
        let clipped = Region::new(self.x, self.y, clipped_w, clipped_h);
        if clipped.is_empty() { None } else { Some(clipped) }
    }

    /// Convert to an imageproc rectangle for drawing
    pub fn to_rect(&self) -> Option<imageproc::rect::Rect> {
        if self.is_empty() {
            return None;
        }
        Some(imageproc::rect::Rect::at(self.x as i32, self.y as i32).of_size(self.width, self.height))
    }
}

/// Outcome of running the region detector on one image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectedRegion {
    pub found: bool,
    pub rect: Region,
}

impl DetectedRegion {
    pub fn found(rect: Region) -> Self {
        Self { found: true, rect }
    }

    /// Not-found result with a zero-area rectangle
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Option<Region> {
        if self.found && !self.rect.is_empty() {
            Some(self.rect)
        } else {
            None
        }
    }
}

/// A decoded source image together with where it came from.
///
/// `index` is the position in the caller's original path list, so that
/// sequence numbers and timestamps stay attached to the right file even when
/// earlier paths failed to decode.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub index: usize,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub image: RgbImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// File name used in log lines and debug dumps
    pub fn label(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        format!("{:03}_{}", self.index + 1, stem)
    }
}
