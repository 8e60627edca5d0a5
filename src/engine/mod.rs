//! Engine backends.
//!
//! The crate ships a single backend, [`ReferenceEngine`], which enforces the
//! full engine contract and delegates plate localization to a
//! [`PlateDetector`].

pub mod detector;
pub mod preprocess;
pub mod reference;

pub use detector::{NullDetector, PlateCandidate, PlateDetector};
pub use preprocess::{PreparedFrame, prepare_frame};
pub use reference::ReferenceEngine;
