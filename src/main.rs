// Command-line runner for the ink engine: decode an image, analyze it, print the
// metrics and optionally export the heatmap and the comparison panel as PNG.

use clap::Parser;
use ink_alchemist::core_modules::heatmap::DEFAULT_BASE_OPACITY;
use ink_alchemist::core_modules::morphology::{DEFAULT_KERNEL_SIZE, DEFAULT_THRESHOLD};
use ink_alchemist::core_modules::utils::image_helper::image_helper;
use ink_alchemist::pipeline::{AnalyzerConfig, DenoiseConfig, analyze_file};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Highlight ink-like strokes in an image and report coverage")]
struct Args {
    /// Input image path (png/jpg/etc)
    input: PathBuf,

    /// Where to write the heatmap PNG
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Where to write the source | mask | heatmap comparison PNG
    #[arg(long)]
    panel: Option<PathBuf>,

    /// Opacity of the source beneath the heatmap
    #[arg(long, default_value_t = DEFAULT_BASE_OPACITY)]
    opacity: f32,

    /// Denoise the mask with a morphological opening and closing
    #[arg(long)]
    denoise: bool,

    /// Intensity (0-1) a pixel must exceed to survive denoising
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    denoise_threshold: f32,

    /// Side of the square denoising kernel
    #[arg(long, default_value_t = DEFAULT_KERNEL_SIZE)]
    kernel_size: usize,
}

impl Args {
    fn config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            base_opacity: self.opacity,
            denoise: self.denoise.then_some(DenoiseConfig {
                threshold: self.denoise_threshold,
                kernel_size: self.kernel_size,
            }),
        }
    }
}

async fn run(args: Args) -> ink_alchemist::Result<()> {
    let (source, analysis) = analyze_file(&args.input, args.config()).await?;
    let result = &analysis.result;

    println!("Image:    {} ({}x{})", args.input.display(), result.width, result.height);
    println!("Coverage: {:.2}%", result.coverage_percent);
    println!("Regions:  {}", result.region_count);

    if let Some(path) = &args.heatmap {
        let heat = &analysis.heatmap;
        image_helper::save_png(path, heat.width, heat.height, &heat.pixels)?;
        println!("Heatmap saved to {}", path.display());
    }

    if let Some(path) = &args.panel {
        let panel = image_helper::comparison_panel(&source.pixels, &result.mask, &analysis.heatmap)?;
        image_helper::save_png(path, panel.width, panel.height, &panel.pixels)?;
        println!("Comparison panel saved to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("analysis failed: {err}");
            ExitCode::FAILURE
        }
    }
}
