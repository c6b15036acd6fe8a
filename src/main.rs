use clap::{Args, Parser, Subcommand};
use image::ImageReader;
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use time::UtcOffset;

use contact_sheet::detection::preprocessing::{Hsv, HsvRange};
use contact_sheet::explore::{self, HsvExplorer};
use contact_sheet::loader;
use contact_sheet::options::{OutputFormat, ProcessingOptions, default_output_path};
use contact_sheet::runner::{self, CancelToken, ProgressEvent};

#[derive(Parser)]
#[command(name = "contact-sheet")]
#[command(about = "Annotate screenshots and tile them into a single contact sheet")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose images into one grid image
    Compose(ComposeArgs),
    /// Write the HSV mask of an image, for tuning the field detector
    Explore(ExploreArgs),
}

#[derive(Args)]
struct ComposeArgs {
    /// Image files or directories (directories contribute their .jpg/.jpeg/.png files)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Also descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Number of rows (0 = derive from image count)
    #[arg(long)]
    rows: Option<u32>,

    /// Number of columns (0 = derive from image count)
    #[arg(long)]
    cols: Option<u32>,

    /// Gap between images in pixels
    #[arg(short, long)]
    margin: Option<u32>,

    /// Output file (defaults to <input dir>/<input dir name>.<ext>)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (defaults to the output extension, else png)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// JPEG quality, 1-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Do not draw sequence numbers
    #[arg(long)]
    no_sequence: bool,

    /// Do not draw file timestamps
    #[arg(long)]
    no_datetime: bool,

    /// Blur the field next to the detected input box
    #[arg(long)]
    mosaic: bool,

    /// Read base options from a JSON file; flags override it
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Save detector debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

#[derive(Args)]
struct ExploreArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Mask output file, rewritten for every range
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,

    /// Lower bound as h,s,v
    #[arg(long, value_parser = parse_hsv_arg, default_value = "0,0,255")]
    lower: Hsv,

    /// Upper bound as h,s,v
    #[arg(long, value_parser = parse_hsv_arg, default_value = "0,0,255")]
    upper: Hsv,

    /// Keep reading "hmin smin vmin hmax smax vmax" lines from stdin
    #[arg(long)]
    stdin: bool,
}

fn parse_hsv_arg(text: &str) -> Result<Hsv, String> {
    explore::parse_hsv(text).map_err(|e| format!("{:#}", e))
}

fn main() -> ExitCode {
    let args = Cli::parse();

    // Must be read before any thread exists
    let utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let outcome = match args.command {
        Command::Compose(compose) => run_compose(compose, utc_offset),
        Command::Explore(explore) => run_explore(explore),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Merge the options file (if any) with the command-line flags
fn build_options(args: &ComposeArgs, inputs: &[PathBuf]) -> anyhow::Result<ProcessingOptions> {
    let mut options = match &args.options {
        Some(path) => ProcessingOptions::from_json_file(path)?,
        None => ProcessingOptions::default(),
    };

    if let Some(rows) = args.rows {
        options.rows = rows;
    }
    if let Some(cols) = args.cols {
        options.cols = cols;
    }
    if let Some(margin) = args.margin {
        options.margin = margin;
    }
    if let Some(quality) = args.jpeg_quality {
        options.jpeg_quality = quality;
    }
    if args.no_sequence {
        options.add_sequence = false;
    }
    if args.no_datetime {
        options.add_date_time = false;
    }
    if args.mosaic {
        options.add_mosaic = true;
    }
    if let Some(dir) = &args.debug_out {
        options.debug_dir = Some(dir.clone());
    }

    if let Some(format) = args.format {
        options.format = format;
    } else if let Some(format) = args.output.as_deref().and_then(OutputFormat::from_path) {
        options.format = format;
    }

    match (&args.output, &args.options) {
        (Some(output), _) => options.output_path = output.clone(),
        (None, None) => {
            if let Some(first) = inputs.first() {
                options.output_path = default_output_path(first, options.format);
            }
        }
        (None, Some(_)) => {}
    }

    Ok(options)
}

fn run_compose(args: ComposeArgs, utc_offset: UtcOffset) -> anyhow::Result<bool> {
    let inputs = loader::expand_inputs(&args.inputs, args.recursive)?;
    if inputs.is_empty() {
        anyhow::bail!("No input images found");
    }
    let options = build_options(&args, &inputs)?;
    debug!("Options: {:?}", options);
    info!("Composing {} images", inputs.len());

    let handle = runner::spawn(inputs, options, utc_offset, CancelToken::new())?;
    let mut max = 0;
    for event in handle.events() {
        match event {
            ProgressEvent::ProgressRange { max: m, .. } => max = m,
            ProgressEvent::Progress(current) => debug!("Progress {}/{}", current, max),
            ProgressEvent::Status(_) => {}
            ProgressEvent::Complete { success, message } => {
                if success {
                    println!("{}", message);
                } else {
                    eprintln!("Failed: {}", message);
                }
            }
        }
    }

    let result = handle.join();
    Ok(result.success())
}

fn run_explore(args: ExploreArgs) -> anyhow::Result<bool> {
    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?
        .to_rgb8();
    info!("Image loaded: {}x{}", img.width(), img.height());

    let explorer = HsvExplorer::new(&img);
    let first = HsvRange::new(args.lower, args.upper);

    let ranges: Box<dyn Iterator<Item = HsvRange>> = if args.stdin {
        let lines = std::io::stdin().lock().lines().map_while(Result::ok);
        let parsed = lines.filter_map(|line| {
            if line.trim().is_empty() {
                return None;
            }
            match explore::parse_range_line(&line) {
                Ok(range) => Some(range),
                Err(e) => {
                    warn!("Ignoring '{}': {:#}", line.trim(), e);
                    None
                }
            }
        });
        Box::new(std::iter::once(first).chain(parsed))
    } else {
        Box::new(std::iter::once(first))
    };

    for frame in explorer.stream(ranges) {
        frame
            .mask
            .save(&args.out)
            .map_err(|e| anyhow::anyhow!("Failed to save mask: {}", e))?;
        println!(
            "{:?}-{:?}: {} pixels -> {}",
            frame.range.lower,
            frame.range.upper,
            frame.matched_pixels,
            args.out.display()
        );
    }

    Ok(true)
}
