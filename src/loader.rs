use crate::models::LoadedImage;
use anyhow::Context;
use image::ImageReader;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Decode a single image, keeping its original list index
pub fn load_image(index: usize, path: &Path) -> anyhow::Result<LoadedImage> {
    let image = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?
        .to_rgb8();

    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(e) => {
            warn!("No modification time for {}: {}", path.display(), e);
            None
        }
    };

    Ok(LoadedImage {
        index,
        path: path.to_path_buf(),
        modified,
        image,
    })
}

/// Decode every path in order, skipping (and logging) the ones that fail
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> Vec<LoadedImage> {
    let mut images = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        match load_image(index, path) {
            Ok(img) => {
                debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
                images.push(img);
            }
            Err(e) => warn!("Skipping image #{}: {:#}", index + 1, e),
        }
    }
    images
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Expand directories into their image files, keeping plain files as given.
///
/// Directory entries are sorted by file name. Only `.jpg`, `.jpeg` and `.png`
/// files (any case) are picked up from directories.
pub fn expand_inputs(inputs: &[PathBuf], recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let before = paths.len();
        for entry in WalkDir::new(input)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("Failed to read directory {}", input.display()))?;
            if entry.file_type().is_file() && has_image_extension(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        debug!("Expanded {} into {} images", input.display(), paths.len() - before);
    }
    Ok(paths)
}
