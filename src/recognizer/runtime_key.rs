//! Runtime license key request.
//!
//! The key identifies the device the engine runs on; it is exchanged for a
//! license token out of band.

use crate::core::config::ConfigBuilder;
use crate::core::errors::AlprResult;
use crate::core::traits::AlprEngine;
use crate::session::Session;
use std::path::Path;
use tracing::info;

/// Initializes `engine`, requests the runtime key and releases the engine.
///
/// # Arguments
///
/// * `engine` - Engine to query
/// * `assets_folder` - Optional assets folder passed to `init`
/// * `raw` - Return the key verbatim instead of extracting it from JSON
pub fn request_runtime_key<E: AlprEngine>(
    engine: E,
    assets_folder: Option<&Path>,
    raw: bool,
) -> AlprResult<String> {
    let mut builder = ConfigBuilder::new();
    if let Some(folder) = assets_folder {
        builder = builder.assets_folder(folder);
    }

    let mut session = Session::init(engine, &builder.build())?;
    let key = session.runtime_license_key(raw)?;
    session.deinit()?;

    info!("runtime key obtained ({} characters)", key.len());
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReferenceEngine;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn test_raw_and_json_keys_match() {
        let raw = request_runtime_key(ReferenceEngine::new(), None, true).unwrap();
        let extracted = request_runtime_key(ReferenceEngine::new(), None, false).unwrap();
        assert_eq!(raw, extracted);

        let decoded = String::from_utf8(STANDARD.decode(&raw).unwrap()).unwrap();
        assert!(decoded.contains(std::env::consts::OS));
    }

    #[test]
    fn test_missing_assets_folder_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("assets");
        assert!(request_runtime_key(ReferenceEngine::new(), Some(&missing), true).is_err());
    }
}
