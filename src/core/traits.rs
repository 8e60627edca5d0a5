//! The engine seam.
//!
//! [`AlprEngine`] is the contract the session driver relies on. A backend
//! answers every call with an [`EngineResult`]; it never panics and never
//! returns a Rust error, so that the caller decides what a failure means.

use crate::domain::image::{ImageBuffer, ImageType};
use crate::domain::result::EngineResult;
use std::fmt::Debug;

/// A license plate recognition engine.
///
/// Implementations are process-wide in spirit: one `init` configures the
/// engine, any number of `process` calls follow, and `deinit` releases it.
/// Calling `process` or `deinit` before a successful `init` must yield a
/// non-success result.
pub trait AlprEngine: Send + Debug {
    /// Initializes the engine with a flat JSON configuration object.
    fn init(&mut self, config_json: &str) -> EngineResult;

    /// Runs recognition over one image buffer.
    ///
    /// The buffer is borrowed for the duration of the call only.
    fn process(&mut self, image: &ImageBuffer<'_>) -> EngineResult;

    /// Releases everything acquired by `init`.
    fn deinit(&mut self) -> EngineResult;

    /// Pushes a synthetic frame of the given type through the pipeline so
    /// that the first real call does not pay for lazy setup.
    fn warm_up(&mut self, image_type: ImageType) -> EngineResult;

    /// Requests the device-bound key used to activate a license.
    ///
    /// With `raw` the key is returned as-is in the result JSON field,
    /// otherwise it is wrapped in a JSON object.
    fn request_runtime_license_key(&mut self, raw: bool) -> EngineResult;
}

impl<E: AlprEngine + ?Sized> AlprEngine for Box<E> {
    fn init(&mut self, config_json: &str) -> EngineResult {
        (**self).init(config_json)
    }

    fn process(&mut self, image: &ImageBuffer<'_>) -> EngineResult {
        (**self).process(image)
    }

    fn deinit(&mut self) -> EngineResult {
        (**self).deinit()
    }

    fn warm_up(&mut self, image_type: ImageType) -> EngineResult {
        (**self).warm_up(image_type)
    }

    fn request_runtime_license_key(&mut self, raw: bool) -> EngineResult {
        (**self).request_runtime_license_key(raw)
    }
}
