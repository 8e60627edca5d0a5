//! Error handling for the recognition layer.

mod types;

pub use types::{AlprError, EngineStage};

/// Result alias used across the crate.
pub type AlprResult<T> = Result<T, AlprError>;
