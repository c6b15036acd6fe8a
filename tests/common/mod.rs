#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from contact_sheet for tests
pub use contact_sheet::{
    DetectedRegion, LayoutError, OutputFormat, PipelineResult, ProcessingOptions, ProgressEvent,
    Region,
};
