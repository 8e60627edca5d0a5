//! ALPR recognizer CLI
//!
//! # Usage
//!
//! ```bash
//! alpr-recognizer recognize --image assets/images/lic_us_1280x720.jpg --assets assets --tokenfile dev.lic
//! alpr-recognizer benchmark --positive plate.jpg --negative empty.jpg --loops 100 --rate 0.2
//! alpr-recognizer runtime-key --assets assets --json true
//! ```

mod cli;
mod config;

use clap::{ArgAction, Parser, Subcommand};
use config::{EngineArgs, OutputFormat};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "alpr-recognizer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "License plate recognition from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize plates in a single image
    Recognize {
        /// Image (JPEG/PNG/BMP) to process
        #[arg(long)]
        image: PathBuf,

        /// Pass the image's EXIF orientation to the engine (true/false)
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        exif: bool,

        /// Raw configuration override, repeatable (e.g. --set detect_minscore=0.4)
        #[arg(long = "set", value_parser = cli::parse_override)]
        overrides: Vec<(String, Value)>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Measure recognition speed over positive and negative images
    Benchmark {
        /// Image containing at least one plate
        #[arg(long)]
        positive: PathBuf,

        /// Image without any plate
        #[arg(long)]
        negative: PathBuf,

        /// Number of recognitions (at least 1)
        #[arg(long, default_value_t = 100)]
        loops: usize,

        /// Share of positive images, within [0, 1]
        #[arg(long, default_value_t = 0.2)]
        rate: f64,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Print the runtime key used to activate a license
    RuntimeKey {
        /// Folder containing the configuration files and models
        #[arg(long, env = "ALPR_ASSETS")]
        assets: Option<PathBuf>,

        /// Print the key wrapped in JSON (true/false)
        #[arg(long, action = ArgAction::Set, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    alpr_sdk::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recognize {
            image,
            exif,
            overrides,
            output,
            engine,
        } => {
            info!("Processing file: {}", image.display());
            cli::recognize(image, exif, overrides, &engine, output)?;
        }
        Commands::Benchmark {
            positive,
            negative,
            loops,
            rate,
            engine,
        } => {
            info!("Benchmarking {} loop(s) at rate {}", loops, rate);
            cli::benchmark(positive, negative, loops, rate, &engine)?;
        }
        Commands::RuntimeKey { assets, json } => {
            cli::runtime_key(assets.as_deref(), !json)?;
        }
    }

    Ok(())
}
