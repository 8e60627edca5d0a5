#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from alpr_sdk for tests
pub use alpr_sdk::prelude::*;
