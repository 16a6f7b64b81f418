use clap::{Parser, Subcommand};
use imgfit::batch::{self, Operation};
use imgfit::config::{self, Config};
use imgfit::imaging::{Color, Dimensions, Padding, Scale, save_image, solid_image};
use imgfit::output;
use std::path::{Path, PathBuf};

/// Shared flags for commands that process many images.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// Image files or directories (walked recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for results
    #[arg(long, short = 'o', default_value = "out")]
    out_dir: PathBuf,

    /// Write a JSON report of every processed file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "imgfit")]
#[command(about = "Pad, resize and aspect-fill crop images")]
#[command(long_about = "\
Pad, resize and aspect-fill crop images

Every command writes new files; inputs are never modified.

  imgfit solid --color '#ff0000' --output red.png
  imgfit pad photos/ --horizontal 10 --vertical 5
  imgfit scale photo.jpg --factor 0.5
  imgfit edge photos/ --longest 1024
  imgfit fill photos/ --width 400 --height 500

Settings (filter, output format, border color, limits, workers) come from
imgfit.toml in the working directory or the file given with --config.
Run 'imgfit gen-config' to print a documented imgfit.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./imgfit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write an image filled with one color
    Solid {
        /// Fill color: #rgb, #rgba, #rrggbb or #rrggbbaa
        #[arg(long)]
        color: Color,
        #[arg(long, default_value_t = 1)]
        width: u32,
        #[arg(long, default_value_t = 1)]
        height: u32,
        /// Output file; the format follows the extension
        #[arg(long, short = 'o')]
        output: PathBuf,
    },
    /// Add a border around each image
    Pad {
        #[command(flatten)]
        batch: BatchArgs,
        /// Border width on the left and right, in pixels
        #[arg(long, default_value_t = 0)]
        horizontal: u32,
        /// Border height on the top and bottom, in pixels
        #[arg(long, default_value_t = 0)]
        vertical: u32,
        /// Border color (overrides padding.fill from the config)
        #[arg(long)]
        fill: Option<Color>,
    },
    /// Resize each image by a uniform factor
    Scale {
        #[command(flatten)]
        batch: BatchArgs,
        /// Factor applied to both sides, greater than zero
        #[arg(long, value_parser = parse_scale)]
        factor: Scale,
    },
    /// Resize each image so its longer side has the given length
    Edge {
        #[command(flatten)]
        batch: BatchArgs,
        /// Length of the longer side, in pixels
        #[arg(long)]
        longest: u32,
    },
    /// Resize each image to cover the given size, then center-crop to it
    Fill {
        #[command(flatten)]
        batch: BatchArgs,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Print a stock imgfit.toml with all options documented
    GenConfig,
}

fn parse_scale(s: &str) -> Result<Scale, String> {
    let factor: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Scale::new(factor).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let load_config = || match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    };

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Solid {
            color,
            width,
            height,
            output: path,
        } => {
            let config = load_config()?;
            let dims = Dimensions::new(width, height);
            let image = solid_image(&config.backend(), color, dims)?;
            save_image(&image, &path, config.quality())?;
            output::print_solid(&path, dims, color);
        }
        Command::Pad {
            batch,
            horizontal,
            vertical,
            fill,
        } => {
            let config = load_config()?;
            let operation = Operation::Pad {
                padding: Padding::new(horizontal, vertical),
                fill: fill.unwrap_or(config.padding.fill),
            };
            run(&batch, operation, &config)?;
        }
        Command::Scale { batch, factor } => {
            run(&batch, Operation::Scale(factor), &load_config()?)?;
        }
        Command::Edge { batch, longest } => {
            run(&batch, Operation::LongestEdge(longest), &load_config()?)?;
        }
        Command::Fill {
            batch,
            width,
            height,
        } => {
            let operation = Operation::Fill(Dimensions::new(width, height));
            run(&batch, operation, &load_config()?)?;
        }
    }

    Ok(())
}

/// Run one batch operation, streaming per-file lines as they finish.
fn run(
    args: &BatchArgs,
    operation: Operation,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = batch::run_batch(&args.inputs, &args.out_dir, operation, config, Some(tx));
    printer
        .join()
        .map_err(|_| "output thread panicked".to_string())?;
    let report = result?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    output::print_batch_summary(&report);

    if report.failed() > 0 {
        return Err(format!("{} of {} images failed", report.failed(), report.jobs.len()).into());
    }
    Ok(())
}

/// Size the global rayon pool from `[processing]`, never above the core count.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
