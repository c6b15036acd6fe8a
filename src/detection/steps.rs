use crate::detection::filters::{self, AspectPolicy};
use crate::detection::preprocessing::{self, HsvRange};
use crate::detection::contours;
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;

/// Keep pixels whose HSV value lies in a range
pub struct HsvFilterStep {
    pub range: HsvRange,
}

impl PipelineStep for HsvFilterStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let hsv = preprocessing::to_hsv(&data.original);
        data.image = preprocessing::in_range(&hsv, &self.range);
        let matched = data.image.pixels().filter(|p| p[0] > 0).count();
        data.metadata
            .insert("matched_pixels".to_string(), MetadataValue::Int(matched as i64));
        Ok(data)
    }

    fn name(&self) -> &str {
        "HSV Filter"
    }
}

/// Fixed binary threshold
pub struct BinarizeStep {
    pub cutoff: u8,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.image = preprocessing::binarize(&data.image, self.cutoff);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Binarize"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.image = preprocessing::detect_edges(&data.image, self.low_threshold, self.high_threshold);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Bounding rectangles of the outermost contours become the candidates
pub struct ContourDetectionStep;

impl PipelineStep for ContourDetectionStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.candidates = contours::find_external_rects(&data.image);
        data.metadata.insert(
            "contour_count".to_string(),
            MetadataValue::Int(data.candidates.len() as i64),
        );
        Ok(data)
    }

    fn name(&self) -> &str {
        "Contour Detection"
    }
}

/// Reject flat shapes whose width/height ratio is above `max_ratio`
pub struct AspectFilterStep {
    pub max_ratio: u32,
    pub policy: AspectPolicy,
}

impl PipelineStep for AspectFilterStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.candidates = filters::filter_aspect(&data.candidates, self.max_ratio, self.policy);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Aspect Filter"
    }
}

/// Reduce the candidates to the single widest one
pub struct WidestCandidateStep;

impl PipelineStep for WidestCandidateStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let widest = filters::select_widest(&data.candidates);
        data.candidates = widest.into_iter().collect();
        data.metadata
            .insert("found".to_string(), MetadataValue::Bool(widest.is_some()));
        Ok(data)
    }

    fn name(&self) -> &str {
        "Widest Candidate"
    }
}
