//! Subcommand implementations.

use crate::config::{EngineArgs, OutputFormat};
use alpr_sdk::engine::ReferenceEngine;
use alpr_sdk::recognizer::{
    Benchmark, BenchmarkOptions, RecognitionReport, Recognizer, RecognizerOptions,
    request_runtime_key,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Parses a `key=value` override. The value is read as JSON when possible
/// and as a plain string otherwise.
pub fn parse_override(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Recognize plates in a single image file
pub fn recognize(
    image: PathBuf,
    honor_exif: bool,
    overrides: Vec<(String, Value)>,
    args: &EngineArgs,
    output: OutputFormat,
) -> CliResult {
    let mut options = RecognizerOptions::new(image)
        .with_charset(&args.charset)
        .with_license(args.license()?)
        .with_features(args.features())
        .with_rectify(args.rectify)
        .with_honor_exif(honor_exif);
    if let Some(assets) = &args.assets {
        options = options.with_assets_folder(assets);
    }
    options.overrides = overrides;

    let report = Recognizer::new(options).run(ReferenceEngine::new())?;
    output_report(&report, output)?;
    Ok(())
}

/// Measure recognition throughput
pub fn benchmark(
    positive: PathBuf,
    negative: PathBuf,
    loops: usize,
    rate: f64,
    args: &EngineArgs,
) -> CliResult {
    let mut options = BenchmarkOptions::new(positive, negative)
        .with_loops(loops)
        .with_rate(rate)
        .with_charset(&args.charset)
        .with_license(args.license()?)
        .with_features(args.features())
        .with_rectify(args.rectify);
    if let Some(assets) = &args.assets {
        options = options.with_assets_folder(assets);
    }

    let report = Benchmark::new(options).run(ReferenceEngine::new())?;

    println!("\n=== Benchmark ===");
    println!("Loops: {} ({} positive)", report.loops, report.positives);
    println!("Elapsed: {:.2}ms", report.elapsed_ms);
    println!("Estimated speed: {:.2} fps", report.fps);
    if !report.last_positive.is_empty() {
        println!("Last positive result:");
        print!("{}", report.last_positive);
    }
    Ok(())
}

/// Print the device-bound runtime key
pub fn runtime_key(assets: Option<&Path>, raw: bool) -> CliResult {
    let key = request_runtime_key(ReferenceEngine::new(), assets, raw)?;
    info!("Runtime key requested");
    println!("{key}");
    Ok(())
}

fn output_report(report: &RecognitionReport, format: OutputFormat) -> CliResult {
    match format {
        OutputFormat::Json => {
            println!("{}", report.process.json());
        }
        OutputFormat::Pretty => {
            println!("\n=== ALPR Results ===");
            println!("Init: {}", report.init.phrase());
            println!(
                "Timings: load {:.2}ms, init {:.2}ms, process {:.2}ms, deinit {:.2}ms",
                report.timings.load_ms,
                report.timings.init_ms,
                report.timings.process_ms,
                report.timings.deinit_ms
            );
            println!();
            if report.payload.is_empty() {
                println!("No plate detected.");
            } else {
                print!("{}", report.payload);
            }
            println!("Deinit: {}", report.deinit.phrase());
        }
    }
    Ok(())
}
