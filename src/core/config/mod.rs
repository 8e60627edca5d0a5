//! Configuration management for the recognizer.
//!
//! This module provides the typed engine options, the validation trait,
//! license token sources, and the builder that turns them into the JSON
//! configuration consumed by engine initialization.

pub mod builder;
pub mod engine;
pub mod license;
pub mod validation;

// Re-export commonly used types
pub use builder::{ConfigBuilder, EngineConfig, FeatureToggles};
pub use engine::{AlprConfig, DebugLevel, DetectRoi, ScoreType};
pub use license::LicenseToken;
pub use validation::ConfigValidator;
