use crate::models::Region;
use anyhow::Result;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Data that flows through the detection pipeline
#[derive(Clone)]
pub struct PipelineData {
    /// Raster produced by the most recent step (mask, binary, edges...)
    pub image: GrayImage,

    /// The source image (shared efficiently via Arc)
    pub original: Arc<RgbImage>,

    /// Candidate rectangles found so far, in scan order
    pub candidates: Vec<Region>,

    /// Metadata for tracking properties (e.g., "contour_count", "white_pixels")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
}

impl PipelineData {
    /// Start from a source image. The working raster stays empty until the
    /// first step writes its mask.
    pub fn from_image(original: Arc<RgbImage>) -> Self {
        Self {
            image: GrayImage::new(0, 0),
            original,
            candidates: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    fn step_dir(&self, step_idx: usize, step_name: &str) -> PathBuf {
        let dir_name = format!("{:02}_{}", step_idx, step_name.to_lowercase().replace(' ', "_"));
        self.output_dir.join(dir_name)
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Debug)]
pub struct PipelineContext {
    /// Name of the image being processed, used for debug file names
    pub label: String,
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug folder names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    debug: Option<DebugConfig>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on one source image
    pub fn run(&self, input: Arc<RgbImage>, label: &str) -> Result<PipelineData> {
        self.run_partial(input, label, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: Arc<RgbImage>, label: &str, num_steps: usize) -> Result<PipelineData> {
        let context = PipelineContext {
            label: label.to_string(),
            debug: self.debug.clone(),
        };

        if let Some(debug_config) = &context.debug {
            let input_dir = debug_config.step_dir(0, "input");
            std::fs::create_dir_all(&input_dir)?;
            let input_path = input_dir.join(format!("{}.png", label));
            input
                .save(&input_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
        }

        let mut data = PipelineData::from_image(input);

        for (i, step) in self.steps.iter().take(num_steps).enumerate() {
            data = step.process(data, &context)?;
            debug!(
                "[{}] {} -> {} candidates",
                label,
                step.name(),
                data.candidates.len()
            );

            if let Some(debug_config) = &context.debug {
                save_debug_output(debug_config, i + 1, step.name(), &context.label, &data)?;
            }
        }

        Ok(data)
    }
}

/// Write a step's raster, plus its candidates drawn over the source image
fn save_debug_output(
    debug_config: &DebugConfig,
    step_idx: usize,
    step_name: &str,
    label: &str,
    data: &PipelineData,
) -> Result<()> {
    let step_dir = debug_config.step_dir(step_idx, step_name);
    std::fs::create_dir_all(&step_dir)?;

    let raster_path = step_dir.join(format!("{}.png", label));
    data.image
        .save(&raster_path)
        .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

    if !data.candidates.is_empty() {
        let mut overlay = data.original.as_ref().clone();
        for rect in data.candidates.iter().filter_map(|c| c.to_rect()) {
            draw_hollow_rect_mut(&mut overlay, rect, Rgb([255, 0, 255]));
        }
        let overlay_path = step_dir.join(format!("{}_candidates.png", label));
        overlay
            .save(&overlay_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug overlay: {}", e))?;
    }

    debug!("Debug: saved {}", raster_path.display());
    Ok(())
}
