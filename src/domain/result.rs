//! Engine call results.

use crate::core::errors::{AlprError, AlprResult, EngineStage};
use std::fmt;

/// Failure codes reported by engines in [`EngineResult::code`].
///
/// `0` is success; every other value is a failure. Backends may report codes
/// outside this list, which [`ResultCode::from_code`] maps to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    Ok = 0,
    InvalidConfiguration = 1,
    NotInitialized = 2,
    AlreadyInitialized = 3,
    LicenseRejected = 4,
    InvalidImage = 5,
    AssetsNotFound = 6,
    Internal = 7,
}

impl ResultCode {
    /// Numeric value of the code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Default phrase attached to results carrying this code.
    pub fn phrase(self) -> &'static str {
        match self {
            ResultCode::Ok => "OK",
            ResultCode::InvalidConfiguration => "invalid configuration",
            ResultCode::NotInitialized => "engine not initialized or no license active",
            ResultCode::AlreadyInitialized => "engine already initialized",
            ResultCode::LicenseRejected => "license token rejected",
            ResultCode::InvalidImage => "invalid image",
            ResultCode::AssetsNotFound => "assets folder not found",
            ResultCode::Internal => "internal error",
        }
    }

    /// Maps a numeric code back to a known variant.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ResultCode::Ok),
            1 => Some(ResultCode::InvalidConfiguration),
            2 => Some(ResultCode::NotInitialized),
            3 => Some(ResultCode::AlreadyInitialized),
            4 => Some(ResultCode::LicenseRejected),
            5 => Some(ResultCode::InvalidImage),
            6 => Some(ResultCode::AssetsNotFound),
            7 => Some(ResultCode::Internal),
            _ => None,
        }
    }
}

/// Outcome of one engine call.
///
/// `json` is empty for bodyless results (init, deinit and failures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResult {
    code: i32,
    phrase: String,
    json: String,
    num_plates: usize,
    num_cars: usize,
}

impl EngineResult {
    /// A successful result carrying a payload.
    pub fn ok(json: impl Into<String>, num_plates: usize, num_cars: usize) -> Self {
        Self {
            code: ResultCode::Ok.code(),
            phrase: ResultCode::Ok.phrase().to_string(),
            json: json.into(),
            num_plates,
            num_cars,
        }
    }

    /// A result without payload.
    pub fn bodyless(code: i32, phrase: impl Into<String>) -> Self {
        Self {
            code,
            phrase: phrase.into(),
            json: String::new(),
            num_plates: 0,
            num_cars: 0,
        }
    }

    /// A successful result without payload.
    pub fn bodyless_ok() -> Self {
        Self::bodyless(ResultCode::Ok.code(), ResultCode::Ok.phrase())
    }

    /// A failure with a known code and a specific phrase.
    pub fn failure(code: ResultCode, detail: impl fmt::Display) -> Self {
        Self::bodyless(code.code(), format!("{}: {detail}", code.phrase()))
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok.code()
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn num_plates(&self) -> usize {
        self.num_plates
    }

    pub fn num_cars(&self) -> usize {
        self.num_cars
    }

    /// Converts a failure into [`AlprError::Engine`] tagged with `stage`.
    pub fn check(self, stage: EngineStage) -> AlprResult<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(AlprError::Engine {
                stage,
                code: self.code,
                phrase: self.phrase,
            })
        }
    }
}

impl fmt::Display for EngineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={} phrase=\"{}\"", self.code, self.phrase)?;
        if !self.json.is_empty() {
            write!(f, " json={}", self.json)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_maps_failure_to_engine_error() {
        assert!(EngineResult::bodyless_ok().check(EngineStage::Init).is_ok());

        let err = EngineResult::failure(ResultCode::NotInitialized, "call init first")
            .check(EngineStage::Process)
            .unwrap_err();
        match err {
            AlprError::Engine { stage, code, phrase } => {
                assert_eq!(stage, EngineStage::Process);
                assert_eq!(code, 2);
                assert!(phrase.ends_with("call init first"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_result_code_round_trip_and_unknown() {
        for code in 0..=7 {
            assert_eq!(ResultCode::from_code(code).map(ResultCode::code), Some(code));
        }
        assert_eq!(ResultCode::from_code(42), None);
        assert!(!EngineResult::bodyless(42, "vendor specific").is_ok());
    }
}
