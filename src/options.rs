use anyhow::Context;
use image::ImageFormat;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Encoding of the composed sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[value(alias = "jpg")]
    #[serde(alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }

    /// Guess the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }
}

/// Everything a single run needs besides the input paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    pub add_sequence: bool,
    pub add_date_time: bool,
    pub add_mosaic: bool,
    /// Gap between cells in pixels
    pub margin: u32,
    /// 0 = derive from the image count
    pub rows: u32,
    /// 0 = derive from the image count
    pub cols: u32,
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub jpeg_quality: u8,
    /// Dump region detector stages here when set
    pub debug_dir: Option<PathBuf>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            add_sequence: true,
            add_date_time: true,
            add_mosaic: false,
            margin: 10,
            rows: 0,
            cols: 0,
            output_path: PathBuf::from("stitched_image.png"),
            format: OutputFormat::Png,
            jpeg_quality: 95,
            debug_dir: None,
        }
    }
}

impl ProcessingOptions {
    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let options = serde_json::from_str(&text)
            .with_context(|| format!("Invalid options file {}", path.display()))?;
        Ok(options)
    }

    pub fn any_overlay(&self) -> bool {
        self.add_sequence || self.add_date_time || self.add_mosaic
    }

    /// Output path whose extension agrees with `format`.
    ///
    /// A missing extension gets the format's one, an image extension naming the
    /// other format is replaced, and any other extension is left alone.
    pub fn resolved_output_path(&self) -> PathBuf {
        match OutputFormat::from_path(&self.output_path) {
            Some(ext_format) if ext_format == self.format => self.output_path.clone(),
            Some(ext_format) => {
                let resolved = self.output_path.with_extension(self.format.extension());
                warn!(
                    "Output {} names {:?} but the format is {:?}; writing {}",
                    self.output_path.display(),
                    ext_format,
                    self.format,
                    resolved.display()
                );
                resolved
            }
            None if self.output_path.extension().is_none() => {
                self.output_path.with_extension(self.format.extension())
            }
            None => self.output_path.clone(),
        }
    }
}

/// `<dir of first input>/<that dir's name>.<ext>`, or `stitched_image.<ext>`
/// in the current directory when the first input has no named parent
pub fn default_output_path(first_input: &Path, format: OutputFormat) -> PathBuf {
    let parent = first_input.parent().filter(|p| !p.as_os_str().is_empty());
    let stem = parent
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stitched_image".to_string());
    let file_name = format!("{}.{}", stem, format.extension());
    match parent {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
