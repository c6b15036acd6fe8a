use std::path::PathBuf;
use thiserror::Error;

/// Grid configuration problems, detected before any canvas is allocated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("No images to compose")]
    Empty,

    #[error("Grid of {rows} rows x {cols} columns cannot hold {count} images")]
    InsufficientCells { rows: u32, cols: u32, count: usize },

    #[error("Canvas of {cols} columns x {rows} rows with {cell_width}x{cell_height} cells is too large")]
    CanvasTooLarge {
        rows: u32,
        cols: u32,
        cell_width: u32,
        cell_height: u32,
    },
}

/// Failures that end a contact sheet run
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("None of the {0} input images could be loaded")]
    NoImages(usize),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Run cancelled after {processed} of {total} images")]
    Cancelled { processed: usize, total: usize },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to create output file {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
