//! Runs a whole contact sheet job: load, annotate, compose, save.
//!
//! A run reports progress through [`ProgressEvent`]s sent over an mpsc channel,
//! so a caller on another thread sees them in emission order. [`spawn`] runs
//! the job on its own worker thread; [`PipelineHandle::join`] is the barrier
//! after which the caller may start another run.

use crate::annotate::{self, Annotator};
use crate::detection::{self, RegionDetector};
use crate::error::SheetError;
use crate::grid;
use crate::loader;
use crate::models::{DetectedRegion, LoadedImage};
use crate::options::{OutputFormat, ProcessingOptions};
use crate::pipeline::Pipeline;
use anyhow::Context;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use time::UtcOffset;

/// Notification from the worker to whoever is presenting progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status(String),
    ProgressRange { min: u32, max: u32 },
    Progress(u32),
    Complete { success: bool, message: String },
}

/// Final outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    Success { output_path: PathBuf },
    Failure { message: String },
}

impl PipelineResult {
    pub fn success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            PipelineResult::Success { output_path } => Some(output_path),
            PipelineResult::Failure { .. } => None,
        }
    }

    /// Output path on success, reason on failure
    pub fn message(&self) -> String {
        match self {
            PipelineResult::Success { output_path } => {
                format!("Saved to {}", output_path.display())
            }
            PipelineResult::Failure { message } => message.clone(),
        }
    }
}

/// Cooperative cancellation flag, checked between images
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sends events, ignoring a receiver that has gone away
struct Reporter<'a> {
    events: &'a Sender<ProgressEvent>,
    step: u32,
}

impl Reporter<'_> {
    fn send(&self, event: ProgressEvent) {
        if self.events.send(event).is_err() {
            debug!("Progress receiver dropped");
        }
    }

    fn status(&self, text: impl Into<String>) {
        let text = text.into();
        info!("{}", text);
        self.send(ProgressEvent::Status(text));
    }

    fn range(&self, min: u32, max: u32) {
        self.send(ProgressEvent::ProgressRange { min, max });
    }

    fn advance(&mut self) {
        self.step += 1;
        self.send(ProgressEvent::Progress(self.step));
    }
}

/// Everything needed to annotate one run's images
pub struct SheetBuilder {
    pub options: ProcessingOptions,
    pub annotator: Annotator,
    pub detector: RegionDetector,
}

impl SheetBuilder {
    pub fn new(options: ProcessingOptions, utc_offset: UtcOffset) -> Self {
        let mut detector = RegionDetector::new();
        if let Some(dir) = &options.debug_dir {
            detector = detector.with_debug(dir.clone());
        }
        Self {
            options,
            annotator: Annotator::new(utc_offset),
            detector,
        }
    }

    /// Apply the enabled overlays in order: sequence, timestamp, mosaic
    pub fn annotate(&self, item: &mut LoadedImage, detection: Option<&Pipeline>) -> anyhow::Result<()> {
        let label = item.label();
        if self.options.any_overlay() {
            annotate::check_reference_size(&label, item.width(), item.height());
        }

        // Detect on the untouched pixels so the text overlays cannot confuse it
        let detected = if self.options.add_mosaic {
            match detection {
                Some(pipeline) => {
                    detection::detect_with(pipeline, Arc::new(item.image.clone()), &label)?
                }
                None => DetectedRegion::not_found(),
            }
        } else {
            DetectedRegion::not_found()
        };

        if self.options.add_sequence {
            self.annotator.draw_sequence(&mut item.image, item.index);
        }

        if self.options.add_date_time {
            match item.modified {
                Some(modified) => self.annotator.draw_timestamp(&mut item.image, modified),
                None => warn!("{}: no modification time, timestamp skipped", label),
            }
        }

        if self.options.add_mosaic {
            if detected.found {
                self.annotator.apply_mosaic(&mut item.image, &detected);
            } else {
                warn!("{}: no input field found, mosaic skipped", label);
            }
        }

        Ok(())
    }

    fn run(&self, paths: &[PathBuf], reporter: &mut Reporter, cancel: &CancelToken) -> anyhow::Result<PathBuf> {
        reporter.status("Loading images...");
        let mut images = loader::load_images(paths);
        if images.is_empty() {
            return Err(SheetError::NoImages(paths.len()).into());
        }
        info!("Loaded {} of {} images", images.len(), paths.len());

        let total = images.len() as u32;
        reporter.range(0, total + 2);
        reporter.advance();

        // Reject a bad grid before spending time on annotation
        let dims: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
        let options = &self.options;
        let layout = grid::compute_layout(&dims, options.rows, options.cols, options.margin)
            .map_err(SheetError::from)?;
        debug!("Grid layout: {:?}", layout);

        let detection = if options.add_mosaic {
            Some(self.detector.build_pipeline()?)
        } else {
            None
        };

        reporter.status("Annotating...");
        for (done, item) in images.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                return Err(SheetError::Cancelled {
                    processed: done,
                    total: total as usize,
                }
                .into());
            }
            self.annotate(item, detection.as_ref())
                .with_context(|| format!("Failed to annotate {}", item.path.display()))?;
            reporter.advance();
        }

        let canvas = {
            let refs: Vec<&RgbImage> = images.iter().map(|i| &i.image).collect();
            grid::compose(&refs, &layout)
        };
        drop(images);

        reporter.status("Saving...");
        let output_path = options.resolved_output_path();
        let saved = save_canvas(&canvas, &output_path, options.format, options.jpeg_quality);
        reporter.advance();
        saved?;
        Ok(output_path)
    }
}

/// Encode the sheet to `path` in the requested format
pub fn save_canvas(canvas: &RgbImage, path: &Path, format: OutputFormat, jpeg_quality: u8) -> Result<(), SheetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SheetError::CreateOutput {
            path: path.to_path_buf(),
            source,
        })?;
    }

    match format {
        OutputFormat::Png => canvas
            .save_with_format(path, format.image_format())
            .map_err(|source| SheetError::Write {
                path: path.to_path_buf(),
                source,
            }),
        OutputFormat::Jpeg => {
            let file = File::create(path).map_err(|source| SheetError::CreateOutput {
                path: path.to_path_buf(),
                source,
            })?;
            let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), jpeg_quality.clamp(1, 100));
            canvas.write_with_encoder(encoder).map_err(|source| SheetError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Run a job on the current thread, reporting through `events`.
///
/// Every outcome, including panics inside the job, ends with a
/// `Complete` event and a matching [`PipelineResult`].
pub fn run(
    paths: &[PathBuf],
    options: &ProcessingOptions,
    utc_offset: UtcOffset,
    events: &Sender<ProgressEvent>,
    cancel: &CancelToken,
) -> PipelineResult {
    let mut reporter = Reporter { events, step: 0 };
    let builder = SheetBuilder::new(options.clone(), utc_offset);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| builder.run(paths, &mut reporter, cancel)));

    let result = match outcome {
        Ok(Ok(output_path)) => PipelineResult::Success { output_path },
        Ok(Err(e)) => PipelineResult::Failure {
            message: format!("{:#}", e),
        },
        Err(payload) => PipelineResult::Failure {
            message: format!("Unexpected failure: {}", panic_message(payload.as_ref())),
        },
    };

    match &result {
        PipelineResult::Success { output_path } => {
            reporter.status(format!("Saved to {}", output_path.display()));
        }
        PipelineResult::Failure { message } => {
            error!("{}", message);
            reporter.send(ProgressEvent::Status(format!("Failed: {}", message)));
        }
    }
    reporter.send(ProgressEvent::Complete {
        success: result.success(),
        message: result.message(),
    });

    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// A run executing on its own worker thread
pub struct PipelineHandle {
    events: Receiver<ProgressEvent>,
    worker: JoinHandle<PipelineResult>,
}

impl PipelineHandle {
    /// Events in emission order; the iterator ends once the worker is done
    pub fn events(&self) -> mpsc::Iter<'_, ProgressEvent> {
        self.events.iter()
    }

    /// Wait for the worker to finish. Unread events are discarded.
    pub fn join(self) -> PipelineResult {
        match self.worker.join() {
            Ok(result) => result,
            Err(payload) => PipelineResult::Failure {
                message: format!("Worker thread panicked: {}", panic_message(payload.as_ref())),
            },
        }
    }
}

/// Start a run on a dedicated worker thread. Keep a clone of `cancel` to stop
/// it between images.
pub fn spawn(
    paths: Vec<PathBuf>,
    options: ProcessingOptions,
    utc_offset: UtcOffset,
    cancel: CancelToken,
) -> anyhow::Result<PipelineHandle> {
    let (sender, receiver) = mpsc::channel();

    let worker = thread::Builder::new()
        .name("contact-sheet-worker".to_string())
        .spawn(move || run(&paths, &options, utc_offset, &sender, &cancel))
        .context("Failed to start worker thread")?;

    Ok(PipelineHandle {
        events: receiver,
        worker,
    })
}
