//! Core error types for the recognition layer.
//!
//! This module defines [`AlprError`], the single error type surfaced by the
//! configuration builder, the session driver and the recognizer drivers, and
//! [`EngineStage`], which names the engine call that produced a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Engine calls that can report a failure.
///
/// Used to tag [`AlprError::Engine`] so callers know which step of the
/// init → process → deinit sequence was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStage {
    /// Engine initialization with the JSON configuration.
    Init,
    /// Recognition pass over one image buffer.
    Process,
    /// Engine release.
    DeInit,
    /// Model warm-up with a synthetic frame.
    WarmUp,
    /// Runtime license key request.
    RuntimeKey,
}

impl std::fmt::Display for EngineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineStage::Init => write!(f, "init"),
            EngineStage::Process => write!(f, "process"),
            EngineStage::DeInit => write!(f, "deinit"),
            EngineStage::WarmUp => write!(f, "warm-up"),
            EngineStage::RuntimeKey => write!(f, "runtime key request"),
        }
    }
}

/// Errors that can occur while preparing inputs for, or talking to, a
/// recognition engine.
#[derive(Error, Debug)]
pub enum AlprError {
    /// The image file to recognize does not exist.
    #[error("image file doesn't exist: {}", path.display())]
    ImageNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// Error occurred while decoding an image file.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// The decoded image uses a pixel layout the engine cannot ingest.
    #[error("unsupported pixel mode: {mode}")]
    UnsupportedPixelMode {
        /// Name of the decoded color type.
        mode: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// The image buffer length does not match its declared geometry.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual} bytes")]
    BufferSizeMismatch {
        /// Length implied by the type, dimensions and stride.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// EXIF orientation outside the 1..=8 range.
    #[error("invalid EXIF orientation {value}: must be within [1, 8]")]
    InvalidOrientation {
        /// The rejected value.
        value: i32,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// The engine returned a non-success result.
    #[error("{stage} failed (code {code}): {phrase}")]
    Engine {
        /// The call that failed.
        stage: EngineStage,
        /// Engine result code (never 0).
        code: i32,
        /// Human-readable status phrase reported by the engine.
        phrase: String,
    },

    /// The session was used in a state that does not allow the call.
    #[error("session: {message}")]
    Session {
        /// A message describing the state violation.
        message: String,
    },

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for AlprError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl AlprError {
    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a configuration error for an invalid field value.
    ///
    /// # Arguments
    ///
    /// * `field` - The name of the field with an invalid value
    /// * `expected` - Description of what was expected
    /// * `actual` - Description of what was actually provided
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a session state error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Returns the engine result code when this error came from the engine.
    pub fn engine_code(&self) -> Option<i32> {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }
}
