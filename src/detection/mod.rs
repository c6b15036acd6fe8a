pub mod contours;
pub mod filters;
pub mod preprocessing;
pub mod steps;

use crate::models::DetectedRegion;
use crate::pipeline::Pipeline;
use anyhow::Result;
use filters::AspectPolicy;
use image::RgbImage;
use log::debug;
use preprocessing::HsvRange;
use std::path::PathBuf;
use std::sync::Arc;

/// Finds the wide, flat, pure-white input field in a screenshot.
///
/// This is a heuristic tuned to one visual layout. On images without such an
/// element it simply reports nothing found.
#[derive(Debug, Clone)]
pub struct RegionDetector {
    pub hsv_range: HsvRange,
    pub binary_cutoff: u8,
    pub canny_low: f32,
    pub canny_high: f32,
    pub max_aspect_ratio: u32,
    pub aspect_policy: AspectPolicy,
    pub debug_dir: Option<PathBuf>,
}

impl RegionDetector {
    pub fn new() -> Self {
        Self {
            hsv_range: HsvRange::PURE_WHITE,
            binary_cutoff: 200,
            canny_low: 50.0,
            canny_high: 150.0,
            max_aspect_ratio: 30,
            aspect_policy: AspectPolicy::IntegerDivision,
            debug_dir: None,
        }
    }

    pub fn with_aspect_policy(mut self, policy: AspectPolicy) -> Self {
        self.aspect_policy = policy;
        self
    }

    /// Dump every stage to `dir` (must be empty or missing)
    pub fn with_debug(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    /// Assemble the detection steps
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let pipeline = build_standard_pipeline(self);
        match &self.debug_dir {
            Some(dir) => pipeline.with_debug(dir.clone()),
            None => Ok(pipeline),
        }
    }

    /// Convenience wrapper that builds a fresh pipeline for a single image.
    ///
    /// With a debug directory set only the first call succeeds, because the
    /// directory must start out empty. To dump several images, build the
    /// pipeline once and call [`detect_with`] with a distinct label per image.
    pub fn detect(&self, img: &RgbImage) -> Result<DetectedRegion> {
        let pipeline = self.build_pipeline()?;
        detect_with(&pipeline, Arc::new(img.clone()), "image")
    }
}

impl Default for RegionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Run an already built detection pipeline on one image
pub fn detect_with(pipeline: &Pipeline, img: Arc<RgbImage>, label: &str) -> Result<DetectedRegion> {
    let data = pipeline.run(img, label)?;
    let result = match data.candidates.first() {
        Some(rect) if !rect.is_empty() => DetectedRegion::found(*rect),
        _ => DetectedRegion::not_found(),
    };
    debug!("[{}] detection: {:?}", label, result);
    Ok(result)
}

/// Build the standard detection pipeline using the composable pipeline system
pub fn build_standard_pipeline(params: &RegionDetector) -> Pipeline {
    use steps::*;

    Pipeline::new()
        .add_step(Arc::new(HsvFilterStep { range: params.hsv_range }))
        .add_step(Arc::new(BinarizeStep { cutoff: params.binary_cutoff }))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: params.canny_low,
            high_threshold: params.canny_high,
        }))
        .add_step(Arc::new(ContourDetectionStep))
        .add_step(Arc::new(AspectFilterStep {
            max_ratio: params.max_aspect_ratio,
            policy: params.aspect_policy,
        }))
        .add_step(Arc::new(WidestCandidateStep))
}
