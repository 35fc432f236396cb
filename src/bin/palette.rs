use anyhow::{Context, Result, bail};
use clap::Parser;
use image::ImageFormat;
use image_to_palette_wasm::{
    Algorithm, Completion, ExtractConfig, Swatch, UploadController, UploadState,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Extract dominant-color palettes from images (native wrapper).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Maximum number of colors in the palette
    #[arg(short = 'k', long)]
    colors: Option<usize>,

    /// Sample every Nth pixel (1 = every pixel)
    #[arg(short, long)]
    quality: Option<usize>,

    /// Quantizer: median-cut or kmeans
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    file: String,
    status: String,
    swatches: &'a [Swatch],
}

fn load_config(args: &Args) -> Result<ExtractConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ExtractConfig::from_json(&json)?
        }
        None => ExtractConfig::default(),
    };
    if let Some(colors) = args.colors {
        config.color_count = colors;
    }
    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    config.validate()?;
    Ok(config)
}

/// MIME type from the file extension, as a browser would declare it.
fn declared_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let mut controller = UploadController::new(&config)?;

    let mut failures = 0;
    for input in &args.inputs {
        let name = input.display().to_string();
        let ticket = match controller.select_file(&name, declared_type(input)) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                log::warn!("{name}: {e}");
                None
            }
        };

        if let Some(ticket) = ticket {
            let completion = match fs::read(input) {
                Ok(bytes) => controller.complete_read(ticket, &bytes),
                Err(e) => {
                    log::warn!("{name}: {e}");
                    controller.fail_read(ticket)
                }
            };
            if completion != Completion::Applied(UploadState::Ready) {
                failures += 1;
            }
        } else {
            failures += 1;
        }

        let status = controller.status().to_string();
        if args.json {
            let report = Report {
                file: name,
                status,
                swatches: controller.swatches(),
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{name}: {status}");
            for swatch in controller.swatches() {
                let [r, g, b] = swatch.rgb;
                println!(
                    "  {}  rgb({r}, {g}, {b})  {:5.1}%",
                    swatch.hex,
                    swatch.share * 100.0
                );
            }
        }
        controller.clear();
    }

    if failures > 0 {
        bail!("{failures} of {} files failed", args.inputs.len());
    }
    Ok(())
}
