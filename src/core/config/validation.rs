//! Validation trait shared by configuration types.

use crate::core::errors::AlprError;

/// Configuration types that can check their own invariants.
///
/// Builders never call this: malformed values are allowed to reach the
/// engine, which is the one that rejects them.
pub trait ConfigValidator {
    /// Validates the configuration, returning the first violation found.
    fn validate(&self) -> Result<(), AlprError>;

    /// Returns true when [`ConfigValidator::validate`] succeeds.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
