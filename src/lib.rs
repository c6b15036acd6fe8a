pub mod annotate;
pub mod detection;
pub mod error;
pub mod explore;
pub mod grid;
pub mod loader;
pub mod models;
pub mod options;
pub mod pipeline;
pub mod runner;

pub use annotate::Annotator;
pub use detection::RegionDetector;
pub use error::{LayoutError, SheetError};
pub use grid::{GridLayout, compose, compose_grid, compute_layout};
pub use models::{DetectedRegion, LoadedImage, Region};
pub use options::{OutputFormat, ProcessingOptions};
pub use pipeline::{DebugConfig, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use runner::{CancelToken, PipelineHandle, PipelineResult, ProgressEvent};
