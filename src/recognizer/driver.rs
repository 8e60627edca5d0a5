//! Single-shot recognizer driver.
//!
//! Loads one image file, builds the engine configuration, and runs the
//! init → process → deinit sequence once. Input problems (missing file,
//! undecodable or unsupported image) abort before the engine is touched.

use crate::core::config::{ConfigBuilder, EngineConfig, FeatureToggles, LicenseToken};
use crate::core::errors::AlprResult;
use crate::core::traits::AlprEngine;
use crate::domain::recognition::RecognitionPayload;
use crate::domain::result::EngineResult;
use crate::session::Session;
use crate::utils::load_image;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Inputs of a single recognition run.
#[derive(Debug, Clone)]
pub struct RecognizerOptions {
    /// Image file to recognize.
    pub image: PathBuf,
    pub assets_folder: Option<PathBuf>,
    pub charset: String,
    pub license: LicenseToken,
    pub features: FeatureToggles,
    /// Enables the rectification layer.
    pub rectify: bool,
    /// Passes the file's EXIF orientation to the engine. When false the
    /// stored pixels are treated as upright.
    pub honor_exif: bool,
    /// Raw configuration overrides applied after everything else.
    pub overrides: Vec<(String, Value)>,
}

impl RecognizerOptions {
    /// Options for `image` with the recognizer defaults.
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            assets_folder: None,
            charset: "latin".to_string(),
            license: LicenseToken::Evaluation,
            features: FeatureToggles::default(),
            rectify: false,
            honor_exif: true,
            overrides: Vec::new(),
        }
    }

    pub fn with_assets_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.assets_folder = Some(folder.into());
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_license(mut self, license: LicenseToken) -> Self {
        self.license = license;
        self
    }

    pub fn with_features(mut self, features: FeatureToggles) -> Self {
        self.features = features;
        self
    }

    pub fn with_rectify(mut self, rectify: bool) -> Self {
        self.rectify = rectify;
        self
    }

    pub fn with_honor_exif(mut self, honor_exif: bool) -> Self {
        self.honor_exif = honor_exif;
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Builds the engine configuration described by these options.
    pub fn config(&self) -> EngineConfig {
        engine_config(
            self.assets_folder.as_deref(),
            &self.charset,
            &self.license,
            self.features,
            self.rectify,
            self.overrides.iter().cloned(),
        )
    }
}

/// Shared configuration assembly for the recognizer and benchmark drivers.
pub(crate) fn engine_config(
    assets_folder: Option<&Path>,
    charset: &str,
    license: &LicenseToken,
    features: FeatureToggles,
    rectify: bool,
    overrides: impl IntoIterator<Item = (String, Value)>,
) -> EngineConfig {
    let mut builder = ConfigBuilder::new()
        .charset(charset)
        .license(license)
        .features(features)
        .rectify(rectify);
    if let Some(folder) = assets_folder {
        builder = builder.assets_folder(folder);
    }
    builder.overrides(overrides).build()
}

/// Wall-clock time spent in each step, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepTimings {
    pub load_ms: f64,
    pub init_ms: f64,
    pub process_ms: f64,
    pub deinit_ms: f64,
}

/// Everything a recognition run produced.
#[derive(Debug, Clone)]
pub struct RecognitionReport {
    pub init: EngineResult,
    pub process: EngineResult,
    pub deinit: EngineResult,
    pub payload: RecognitionPayload,
    pub timings: StepTimings,
}

/// Runs one recognition over an image file.
#[derive(Debug, Clone)]
pub struct Recognizer {
    options: RecognizerOptions,
}

impl Recognizer {
    pub fn new(options: RecognizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecognizerOptions {
        &self.options
    }

    /// Runs the full sequence with `engine`.
    ///
    /// # Errors
    ///
    /// Input errors are returned before `init`. Engine failures carry the
    /// failing stage. A failed `process` still deinitializes the engine.
    pub fn run<E: AlprEngine>(&self, engine: E) -> AlprResult<RecognitionReport> {
        let mut timings = StepTimings::default();

        info!("Loading image {}...", self.options.image.display());
        let start = Instant::now();
        let image = load_image(&self.options.image)?;
        timings.load_ms = elapsed_ms(start);
        info!(
            "Loaded {}x{} {} in {:.2}ms",
            image.width, image.height, image.image_type, timings.load_ms
        );

        let config = self.options.config();

        info!("Initializing engine...");
        let start = Instant::now();
        let mut session = Session::init(engine, &config)?;
        timings.init_ms = elapsed_ms(start);
        info!("Engine initialized in {:.2}ms", timings.init_ms);

        let buffer = if self.options.honor_exif {
            image.as_buffer()
        } else {
            image.as_upright_buffer()
        };

        info!("Processing image...");
        let start = Instant::now();
        let recognition = session.process(&buffer)?;
        timings.process_ms = elapsed_ms(start);
        info!(
            "Recognition completed in {:.2}ms: {} plate(s), {} car(s)",
            timings.process_ms,
            recognition.result.num_plates(),
            recognition.result.num_cars()
        );

        let init = session.init_result().clone();
        let start = Instant::now();
        let deinit = session.deinit()?;
        timings.deinit_ms = elapsed_ms(start);
        info!("Engine released in {:.2}ms", timings.deinit_ms);

        Ok(RecognitionReport {
            init,
            process: recognition.result,
            deinit,
            payload: recognition.payload,
            timings,
        })
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
