//! Utility functions for the recognizer.
//!
//! This module provides image file loading and logging setup.

pub mod image;

pub use self::image::{load_image, owned_from_dynamic, read_orientation};

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber printing to stderr.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Calling this
/// more than once is harmless: later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
