//! Configuration builder.
//!
//! [`ConfigBuilder`] starts from the default option set ([`AlprConfig::default`]),
//! applies typed setters and raw key overrides, and produces an
//! [`EngineConfig`]: the flat key/value object handed once to engine
//! initialization.
//!
//! The builder never fails and never validates. Unknown keys are passed
//! through untouched; malformed values only surface when the engine rejects
//! them during `init`.

use super::engine::{AlprConfig, DebugLevel, DetectRoi, ScoreType};
use super::license::LicenseToken;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Independently enableable recognition features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureToggles {
    /// Image enhancement for night vision (`ienv_enabled`).
    pub night_vision: bool,
    /// License plate country identification (`klass_lpci_enabled`).
    pub country_identification: bool,
    /// Vehicle color recognition (`klass_vcr_enabled`).
    pub vehicle_color: bool,
    /// Vehicle make/model/year recognition (`klass_vmmr_enabled`).
    pub vehicle_make_model: bool,
    /// Vehicle body style recognition (`klass_vbsr_enabled`).
    pub vehicle_body_style: bool,
    /// Report cars even when no plate is found (`car_noplate_detect_enabled`).
    pub car_without_plate: bool,
}

impl FeatureToggles {
    /// All features enabled.
    pub fn all() -> Self {
        Self {
            night_vision: true,
            country_identification: true,
            vehicle_color: true,
            vehicle_make_model: true,
            vehicle_body_style: true,
            car_without_plate: true,
        }
    }
}

/// Complete engine configuration, ready to be serialized for `init`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    entries: Map<String, Value>,
}

impl EngineConfig {
    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns true when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no option is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Serializes the options into the compact JSON string passed to `init`.
    pub fn to_json(&self) -> String {
        Value::Object(self.entries.clone()).to_string()
    }

    /// Consumes the configuration, returning the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

/// Builder for [`EngineConfig`].
///
/// Typed setters write into the default option set; raw overrides set with
/// [`ConfigBuilder::set`] are applied last and always win.
///
/// # Example
///
/// ```
/// use alpr_sdk::core::config::{ConfigBuilder, FeatureToggles};
///
/// let config = ConfigBuilder::new()
///     .assets_folder("/opt/alpr/assets")
///     .charset("korean")
///     .features(FeatureToggles { vehicle_color: true, ..Default::default() })
///     .set("detect_minscore", 0.25)
///     .build();
///
/// assert_eq!(config.get("charset").unwrap(), "korean");
/// assert_eq!(config.get("klass_vcr_enabled").unwrap(), true);
/// assert_eq!(config.get("detect_minscore").unwrap(), 0.25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    base: AlprConfig,
    overrides: Map<String, Value>,
}

impl ConfigBuilder {
    /// Creates a builder seeded with the default option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded with an explicit option set.
    pub fn from_config(base: AlprConfig) -> Self {
        Self {
            base,
            overrides: Map::new(),
        }
    }

    /// Sets the folder holding the engine's models and configuration files.
    pub fn assets_folder(mut self, path: impl AsRef<Path>) -> Self {
        self.base.assets_folder = Some(path_to_config_string(path.as_ref()));
        self
    }

    /// Sets the recognition charset (alphabet).
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.base.charset = charset.into();
        self
    }

    /// Sets the license token source.
    ///
    /// [`LicenseToken::Evaluation`] clears both token keys.
    pub fn license(mut self, token: &LicenseToken) -> Self {
        self.base.license_token_file = token.file().map(path_to_config_string);
        self.base.license_token_data = token.data().map(str::to_string);
        self
    }

    /// Applies the feature toggles.
    pub fn features(mut self, features: FeatureToggles) -> Self {
        self.base.ienv_enabled = features.night_vision;
        self.base.klass_lpci_enabled = features.country_identification;
        self.base.klass_vcr_enabled = features.vehicle_color;
        self.base.klass_vmmr_enabled = features.vehicle_make_model;
        self.base.klass_vbsr_enabled = features.vehicle_body_style;
        self.base.car_noplate_detect_enabled = features.car_without_plate;
        self
    }

    /// Enables or disables the rectification layer.
    pub fn rectify(mut self, enabled: bool) -> Self {
        self.base.recogn_rectify_enabled = enabled;
        self
    }

    /// Sets the engine's console verbosity.
    pub fn debug_level(mut self, level: DebugLevel) -> Self {
        self.base.debug_level = level;
        self
    }

    /// Enables dumping the transformed input image into `path`.
    pub fn debug_write_input_image(mut self, path: impl AsRef<Path>) -> Self {
        self.base.debug_write_input_image_enabled = true;
        self.base.debug_internal_data_path = path_to_config_string(path.as_ref());
        self
    }

    /// Sets the number of worker threads (`-1` = auto).
    pub fn num_threads(mut self, threads: i32) -> Self {
        self.base.num_threads = threads;
        self
    }

    /// Enables or disables GPGPU acceleration.
    pub fn gpgpu(mut self, enabled: bool) -> Self {
        self.base.gpgpu_enabled = enabled;
        self
    }

    /// Sets the latency budget in milliseconds (`-1` = unbounded).
    pub fn max_latency(mut self, millis: i32) -> Self {
        self.base.max_latency = millis;
        self
    }

    /// Sets the detector region of interest.
    pub fn detect_roi(mut self, roi: DetectRoi) -> Self {
        self.base.detect_roi = roi;
        self
    }

    /// Sets the detection and recognition score thresholds.
    pub fn min_scores(mut self, detect: f64, recogn: f64) -> Self {
        self.base.detect_minscore = detect;
        self.base.recogn_minscore = recogn;
        self
    }

    /// Sets the recognition score aggregation mode.
    pub fn score_type(mut self, score_type: ScoreType) -> Self {
        self.base.recogn_score_type = score_type;
        self
    }

    /// Configures pyramidal (multi-scale) search.
    pub fn pyramidal_search(
        mut self,
        enabled: bool,
        sensitivity: f64,
        min_score: f64,
        min_image_size: u32,
    ) -> Self {
        self.base.pyramidal_search_enabled = enabled;
        self.base.pyramidal_search_sensitivity = sensitivity;
        self.base.pyramidal_search_minscore = min_score;
        self.base.pyramidal_search_min_image_size_inpixels = min_image_size;
        self
    }

    /// Overrides a single key with a raw value.
    ///
    /// Keys are replaced exactly; unknown keys are added as-is.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Overrides several keys at once.
    pub fn overrides<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in entries {
            self.overrides.insert(key.into(), value);
        }
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> EngineConfig {
        let mut entries = match serde_json::to_value(&self.base) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("default options serialized to a non-object value: {other}");
                Map::new()
            }
            Err(err) => {
                warn!("failed to serialize default options: {err}");
                Map::new()
            }
        };

        for (key, value) in self.overrides {
            entries.insert(key, value);
        }

        EngineConfig { entries }
    }
}

/// Converts a path into the forward-slash form the engine expects.
fn path_to_config_string(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}
