//! # alpr-sdk
//!
//! Typed configuration, session management and result validation for
//! automatic license plate recognition (ALPR) engines.
//!
//! The crate wraps an engine exposing a flat JSON configuration and an
//! init → process → deinit lifecycle:
//!
//! - [`core::config::ConfigBuilder`] assembles the engine configuration from
//!   documented defaults, typed options and raw key overrides.
//! - [`session::Session`] owns an initialized engine, validates image buffers
//!   before they reach it, turns every failed call into an
//!   [`core::errors::AlprError`] and deinitializes the engine when dropped.
//! - [`domain::recognition::RecognitionPayload`] is the typed view of the
//!   plates, countries and vehicles an engine reports.
//! - [`engine::ReferenceEngine`] implements the engine contract in Rust with
//!   a pluggable [`engine::PlateDetector`].
//! - [`recognizer`] holds the ready-made drivers used by the
//!   `alpr-recognizer` binary.
//!
//! # Example
//!
//! ```
//! use alpr_sdk::prelude::*;
//!
//! let config = ConfigBuilder::new().charset("latin").build();
//! let mut session = Session::init(ReferenceEngine::new(), &config)?;
//!
//! let pixels = vec![0u8; 640 * 480 * 3];
//! let image = ImageBuffer::new(ImageType::Rgb24, &pixels, 640, 480);
//! let recognition = session.process(&image)?;
//! println!("{} plate(s)", recognition.payload.num_plates());
//!
//! session.deinit()?;
//! # Ok::<(), alpr_sdk::core::AlprError>(())
//! ```

pub mod core;
pub mod domain;
pub mod engine;
pub mod recognizer;
pub mod session;
pub mod utils;

/// Commonly used types.
pub mod prelude {
    pub use crate::core::config::{
        ConfigBuilder, DetectRoi, EngineConfig, FeatureToggles, LicenseToken, ScoreType,
    };
    pub use crate::core::errors::{AlprError, AlprResult};
    pub use crate::core::traits::AlprEngine;
    pub use crate::domain::image::{ExifOrientation, ImageBuffer, ImageType, OwnedImage};
    pub use crate::domain::recognition::{Plate, RecognitionPayload};
    pub use crate::domain::result::EngineResult;
    pub use crate::engine::{NullDetector, PlateCandidate, PlateDetector, ReferenceEngine};
    pub use crate::recognizer::{Benchmark, BenchmarkOptions, Recognizer, RecognizerOptions};
    pub use crate::session::{Session, SessionState};
}
