//! Throughput benchmark.
//!
//! Runs `loops` recognitions alternating between an image containing a
//! plate (positive) and one without (negative). The share of positives is
//! set by `rate`; positives are spread evenly over the run so that two runs
//! with the same options feed the engine the same sequence.

use super::driver::{elapsed_ms, engine_config};
use crate::core::config::{ConfigValidator, EngineConfig, FeatureToggles, LicenseToken};
use crate::core::errors::{AlprError, AlprResult};
use crate::core::traits::AlprEngine;
use crate::domain::recognition::RecognitionPayload;
use crate::session::Session;
use crate::utils::load_image;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Default number of recognitions.
pub const DEFAULT_LOOPS: usize = 100;

/// Default share of positive images.
pub const DEFAULT_RATE: f64 = 0.2;

/// Inputs of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    /// Image containing at least one plate.
    pub positive: PathBuf,
    /// Image without any plate.
    pub negative: PathBuf,
    /// Number of recognitions, at least 1.
    pub loops: usize,
    /// Share of positive images, within `[0, 1]`.
    pub rate: f64,
    pub assets_folder: Option<PathBuf>,
    pub charset: String,
    pub license: LicenseToken,
    pub features: FeatureToggles,
    pub rectify: bool,
}

impl BenchmarkOptions {
    pub fn new(positive: impl Into<PathBuf>, negative: impl Into<PathBuf>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
            loops: DEFAULT_LOOPS,
            rate: DEFAULT_RATE,
            assets_folder: None,
            charset: "latin".to_string(),
            license: LicenseToken::Evaluation,
            features: FeatureToggles::default(),
            rectify: false,
        }
    }

    pub fn with_loops(mut self, loops: usize) -> Self {
        self.loops = loops;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
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

    /// Number of positive recognitions: `loops * rate`, at least one.
    pub fn num_positives(&self) -> usize {
        ((self.loops as f64 * self.rate) as usize).clamp(1, self.loops.max(1))
    }

    /// Engine configuration for the run.
    pub fn config(&self) -> EngineConfig {
        engine_config(
            self.assets_folder.as_deref(),
            &self.charset,
            &self.license,
            self.features,
            self.rectify,
            std::iter::empty(),
        )
    }
}

impl ConfigValidator for BenchmarkOptions {
    fn validate(&self) -> Result<(), AlprError> {
        if self.loops < 1 {
            return Err(AlprError::invalid_field(
                "loops",
                "at least 1",
                self.loops.to_string(),
            ));
        }
        if !self.rate.is_finite() || !(0.0..=1.0).contains(&self.rate) {
            return Err(AlprError::invalid_field(
                "rate",
                "a number within [0, 1]",
                self.rate.to_string(),
            ));
        }
        Ok(())
    }
}

/// Which image each iteration feeds: `true` for the positive one.
///
/// Exactly `positives` entries are `true`, evenly spaced.
pub fn positive_schedule(loops: usize, positives: usize) -> Vec<bool> {
    let positives = positives.min(loops);
    (0..loops)
        .map(|i| (i + 1) * positives / loops != i * positives / loops)
        .collect()
}

/// Outcome of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub loops: usize,
    pub positives: usize,
    /// Time spent in the recognition loop, warm-up excluded.
    pub elapsed_ms: f64,
    /// Estimated frames per second: `1000 / (elapsed_ms / loops)`.
    pub fps: f64,
    /// Payload of the last positive recognition.
    pub last_positive: RecognitionPayload,
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loop(s), {} positive(s): {:.2} ms elapsed, estimated {:.2} fps",
            self.loops, self.positives, self.elapsed_ms, self.fps
        )
    }
}

/// Benchmark driver.
#[derive(Debug, Clone)]
pub struct Benchmark {
    options: BenchmarkOptions,
}

impl Benchmark {
    pub fn new(options: BenchmarkOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BenchmarkOptions {
        &self.options
    }

    /// Runs the benchmark with `engine`.
    pub fn run<E: AlprEngine>(&self, engine: E) -> AlprResult<BenchmarkReport> {
        self.options.validate()?;

        let positive = load_image(&self.options.positive)?;
        let negative = load_image(&self.options.negative)?;
        let positives = self.options.num_positives();
        let schedule = positive_schedule(self.options.loops, positives);

        let mut session = Session::init(engine, &self.options.config())?;

        if self.options.loops > 1 {
            info!("Warming up with {}...", positive.image_type);
            session.warm_up(positive.image_type)?;
        }

        info!(
            "Running {} recognition(s), {} positive...",
            self.options.loops, positives
        );
        let mut last_positive = RecognitionPayload::default();
        let start = Instant::now();
        for (index, is_positive) in schedule.iter().enumerate() {
            let image = if *is_positive { &positive } else { &negative };
            let recognition = session.process(&image.as_buffer())?;
            if *is_positive {
                last_positive = recognition.payload;
            }
            debug!("iteration {index} done");
        }
        let elapsed = elapsed_ms(start);

        session.deinit()?;

        let per_frame = elapsed / self.options.loops as f64;
        let fps = if per_frame > 0.0 {
            1000.0 / per_frame
        } else {
            f64::INFINITY
        };
        let report = BenchmarkReport {
            loops: self.options.loops,
            positives,
            elapsed_ms: elapsed,
            fps,
            last_positive,
        };
        info!("{report}");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_positives() {
        let options = BenchmarkOptions::new("p.jpg", "n.jpg");
        assert_eq!(options.num_positives(), 20);
        assert_eq!(options.clone().with_rate(0.0).num_positives(), 1);
        assert_eq!(options.clone().with_loops(3).with_rate(1.0).num_positives(), 3);
        assert_eq!(options.with_loops(1).with_rate(0.2).num_positives(), 1);
    }

    #[test]
    fn test_schedule_is_even_and_exact() {
        let schedule = positive_schedule(10, 3);
        assert_eq!(schedule.iter().filter(|p| **p).count(), 3);
        assert_eq!(schedule, positive_schedule(10, 3));

        assert!(positive_schedule(5, 5).into_iter().all(|p| p));
        assert_eq!(positive_schedule(4, 9).iter().filter(|p| **p).count(), 4);
        assert_eq!(positive_schedule(4, 2), vec![false, true, false, true]);
    }

    #[test]
    fn test_validate() {
        let options = BenchmarkOptions::new("p.jpg", "n.jpg");
        assert!(options.is_valid());
        assert!(!options.clone().with_loops(0).is_valid());
        assert!(!options.clone().with_rate(1.5).is_valid());
        assert!(!options.with_rate(f64::NAN).is_valid());
    }
}
