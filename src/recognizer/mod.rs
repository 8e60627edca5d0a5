//! Recognition drivers.
//!
//! - [`Recognizer`]: one image, one init → process → deinit sequence
//! - [`Benchmark`]: repeated recognitions with throughput measurement
//! - [`request_runtime_key`]: device key retrieval for license activation

pub mod benchmark;
pub mod driver;
pub mod runtime_key;

pub use benchmark::{Benchmark, BenchmarkOptions, BenchmarkReport, positive_schedule};
pub use driver::{RecognitionReport, Recognizer, RecognizerOptions, StepTimings};
pub use runtime_key::request_runtime_key;
