//! The core module of the recognizer.
//!
//! This module contains the fundamental components shared by every layer:
//! - Configuration management
//! - Error handling
//! - The engine trait the session drives
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{
    AlprConfig, ConfigBuilder, ConfigValidator, DebugLevel, DetectRoi, EngineConfig,
    FeatureToggles, LicenseToken, ScoreType,
};
pub use errors::{AlprError, AlprResult, EngineStage};
pub use traits::AlprEngine;
