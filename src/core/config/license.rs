//! License token sources.

use crate::core::errors::AlprError;
use std::path::{Path, PathBuf};

/// Where the engine reads its license token from.
///
/// At most one source may be given. Without a token the engine runs in
/// evaluation mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LicenseToken {
    /// No token supplied.
    #[default]
    Evaluation,
    /// Path to a file holding the base64 token.
    File(PathBuf),
    /// Inline base64 token data.
    Data(String),
}

impl LicenseToken {
    /// Resolves the token from the two optional command-line sources.
    ///
    /// Empty values count as absent. Supplying both a file and inline data is
    /// rejected.
    pub fn from_sources(file: Option<PathBuf>, data: Option<String>) -> Result<Self, AlprError> {
        let file = file.filter(|p| !p.as_os_str().is_empty());
        let data = data.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

        match (file, data) {
            (Some(_), Some(_)) => Err(AlprError::config_error(
                "provide either a license token file or inline token data, not both",
            )),
            (Some(path), None) => Ok(Self::File(path)),
            (None, Some(data)) => Ok(Self::Data(data)),
            (None, None) => Ok(Self::Evaluation),
        }
    }

    /// Returns true when no token was supplied.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation)
    }

    /// Returns the token file path, if any.
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }

    /// Returns the inline token data, if any.
    pub fn data(&self) -> Option<&str> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sources() {
        assert_eq!(
            LicenseToken::from_sources(None, None).unwrap(),
            LicenseToken::Evaluation
        );
        assert_eq!(
            LicenseToken::from_sources(Some(PathBuf::from("a.lic")), Some(String::new())).unwrap(),
            LicenseToken::File(PathBuf::from("a.lic"))
        );
        assert_eq!(
            LicenseToken::from_sources(None, Some(" QUJD ".to_string())).unwrap(),
            LicenseToken::Data("QUJD".to_string())
        );
        assert!(
            LicenseToken::from_sources(Some(PathBuf::from("a.lic")), Some("QUJD".to_string()))
                .is_err()
        );
    }
}
