use clap::{Parser, Subcommand};
use media_prep::config::{self, BackendKind, PrepConfig};
use media_prep::fetch::Fetcher;
use media_prep::error::PrepError;
use media_prep::imaging::{AspectRatio, Backend, CropRegion, Dimensions, ImageAsset, ImageHandle};
use media_prep::model::PendingImage;
use media_prep::output;
use media_prep::transform::{ManipulationRequest, TransformState, plan_manipulation};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "media-prep")]
#[command(about = "Prepare photos for upload under a size and byte budget")]
#[command(long_about = "\
Prepare photos for upload under a size and byte budget

Edits (flip, rotate, crop, aspect ratio) are applied to the original image at
full quality, scaled into the upload bounding box, then re-encoded as JPEG at
descending quality until the file is strictly smaller than the byte budget.

Aspect ratios: 4:3, 1:1, 3:4, or None (keep the source ratio).
Crop regions are fractions of the image: x,y,width,height (e.g. 0,0,0.5,1).

Run 'media-prep gen-config' to generate a documented media-prep.toml.")]
#[command(version = env!("MEDIA_PREP_VERSION"))]
struct Cli {
    /// Directory containing media-prep.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Override the output directory for the file backend
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Geometry flags shared by `prepare` and `plan`.
#[derive(clap::Args, Clone)]
struct GeometryArgs {
    /// Aspect ratio policy: 4:3, 1:1, 3:4, None
    #[arg(long, default_value = "1:1")]
    aspect: AspectRatio,

    /// Crop region as fractions: x,y,width,height
    #[arg(long)]
    crop: Option<CropRegion>,

    /// Rotation in degrees (quarter turns)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Edit, resize and compress one image (path, data: URI, or http(s) URL)
    Prepare {
        source: String,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Mirror left-right
        #[arg(long)]
        flip_h: bool,

        /// Mirror top-bottom
        #[arg(long)]
        flip_v: bool,

        /// Byte budget (defaults to limits.upload_max_bytes)
        #[arg(long)]
        max_bytes: Option<u64>,

        /// Return a data: URI instead of writing a file
        #[arg(long)]
        inline: bool,

        /// Print the upload asset as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show planned dimensions and ops for a source size, without encoding
    Plan {
        width: u32,
        height: u32,

        #[command(flatten)]
        geometry: GeometryArgs,
    },
    /// Print a stock media-prep.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Prepare {
            source,
            geometry,
            flip_h,
            flip_v,
            max_bytes,
            inline,
            json,
        } => {
            let mut config = config::load_config(&cli.config_dir)?;
            if let Some(dir) = cli.output_dir {
                config.output_dir = dir;
            }
            if inline {
                config.backend = BackendKind::Inline;
            }
            let max_bytes = max_bytes.unwrap_or(config.limits.upload_max_bytes);
            let upload = prepare(&config, &source, &geometry, flip_h, flip_v, max_bytes).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&upload)?);
            } else {
                println!();
                output::print_asset(&upload);
            }
        }
        Command::Plan {
            width,
            height,
            geometry,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let source = Dimensions::new(width, height)
                .ok_or(PrepError::InvalidDimensions { width, height })?;
            let state = TransformState {
                rotate_degrees: geometry.rotate,
                aspect_ratio: geometry.aspect,
                crop: geometry.crop,
                ..Default::default()
            };
            let plan = plan_manipulation(source, &state, config.limits.max_dimensions());
            output::print_plan(source, &plan);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Run one image through edit → compress and return the upload asset.
///
/// Only the fetch runs on the async runtime; decoding and encoding go to the
/// blocking pool.
async fn prepare(
    config: &PrepConfig,
    source: &str,
    geometry: &GeometryArgs,
    flip_h: bool,
    flip_v: bool,
    max_bytes: u64,
) -> Result<ImageAsset, Box<dyn std::error::Error>> {
    let handle = Fetcher::new(config.fetch.timeout())?.resolve(source).await?;
    let config = config.clone();
    let geometry = geometry.clone();

    let upload = tokio::task::spawn_blocking(move || {
        prepare_blocking(&config, handle, &geometry, flip_h, flip_v, max_bytes)
    })
    .await
    .map_err(|e| PrepError::TaskFailed(format!("Prepare task panicked: {e}")))??;
    Ok(upload)
}

fn prepare_blocking(
    config: &PrepConfig,
    handle: ImageHandle,
    geometry: &GeometryArgs,
    flip_h: bool,
    flip_v: bool,
    max_bytes: u64,
) -> Result<ImageAsset, PrepError> {
    let backend = Backend::from_config(config);
    let mut image = PendingImage::from_handle(&backend, handle)?
        .with_max_dimensions(config.limits.max_dimensions())
        .with_ladder(config.compression.ladder());
    let events = image.subscribe();
    let printer = std::thread::spawn(move || {
        for event in events {
            for line in output::format_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = edit_and_compress(&mut image, &backend, geometry, flip_h, flip_v, max_bytes);

    // Consuming the image releases its working file and closes the event
    // channel, which ends the printer loop.
    image.finish(&backend);
    printer
        .join()
        .map_err(|_| PrepError::TaskFailed("event printer panicked".to_string()))?;
    result
}

fn edit_and_compress(
    image: &mut PendingImage,
    backend: &Backend,
    geometry: &GeometryArgs,
    flip_h: bool,
    flip_v: bool,
    max_bytes: u64,
) -> Result<ImageAsset, PrepError> {
    image.set_ratio(geometry.aspect);
    if flip_h {
        image.flip_horizontal(backend)?;
    }
    if flip_v {
        image.flip_vertical(backend)?;
    }
    if geometry.rotate != 0.0 {
        image.set_rotate(backend, geometry.rotate)?;
    }
    image.manipulate(
        backend,
        &ManipulationRequest {
            crop: geometry.crop,
            ..Default::default()
        },
    )?;
    Ok(image.compress(backend, max_bytes)?.clone())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
