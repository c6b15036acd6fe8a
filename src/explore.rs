//! Developer utility for picking HSV thresholds.
//!
//! Converts an image to HSV once, then produces a mask frame for every range
//! it is fed, so ranges can be tuned by watching the output file change.

use crate::detection::preprocessing::{self, Hsv, HsvRange};
use anyhow::{Context, bail};
use image::{GrayImage, RgbImage};

/// One filtered frame
#[derive(Debug, Clone)]
pub struct ExplorerFrame {
    pub range: HsvRange,
    pub mask: GrayImage,
    pub matched_pixels: usize,
}

pub struct HsvExplorer {
    hsv: RgbImage,
}

impl HsvExplorer {
    pub fn new(img: &RgbImage) -> Self {
        Self {
            hsv: preprocessing::to_hsv(img),
        }
    }

    pub fn frame(&self, range: HsvRange) -> ExplorerFrame {
        let mask = preprocessing::in_range(&self.hsv, &range);
        let matched_pixels = mask.pixels().filter(|p| p[0] > 0).count();
        ExplorerFrame {
            range,
            mask,
            matched_pixels,
        }
    }

    /// Lazily filter the image with each range in turn
    pub fn stream<'a, I>(&'a self, ranges: I) -> impl Iterator<Item = ExplorerFrame> + 'a
    where
        I: IntoIterator<Item = HsvRange>,
        I::IntoIter: 'a,
    {
        ranges.into_iter().map(move |range| self.frame(range))
    }
}

fn check_hsv(values: [u32; 3]) -> anyhow::Result<Hsv> {
    let [h, s, v] = values;
    if h > 179 {
        bail!("hue {} out of range 0..=179", h);
    }
    if s > 255 || v > 255 {
        bail!("saturation/value out of range 0..=255");
    }
    Ok([h as u8, s as u8, v as u8])
}

fn parse_numbers(text: &str, expected: usize) -> anyhow::Result<Vec<u32>> {
    let numbers = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<u32>().with_context(|| format!("'{}' is not a number", t)))
        .collect::<anyhow::Result<Vec<u32>>>()?;
    if numbers.len() != expected {
        bail!("expected {} numbers, got {}", expected, numbers.len());
    }
    Ok(numbers)
}

/// Parse `h,s,v`
pub fn parse_hsv(text: &str) -> anyhow::Result<Hsv> {
    let n = parse_numbers(text, 3)?;
    check_hsv([n[0], n[1], n[2]])
}

/// Parse `hmin smin vmin hmax smax vmax` (commas or whitespace)
pub fn parse_range_line(line: &str) -> anyhow::Result<HsvRange> {
    let n = parse_numbers(line, 6)?;
    let lower = check_hsv([n[0], n[1], n[2]])?;
    let upper = check_hsv([n[3], n[4], n[5]])?;
    Ok(HsvRange::new(lower, upper))
}
