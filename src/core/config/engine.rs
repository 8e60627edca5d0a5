//! Typed engine options and their defaults.
//!
//! [`AlprConfig`] mirrors the flat JSON object accepted by engine
//! initialization. The same type is used on both sides of the seam: the
//! builder serializes it, and the reference engine deserializes whatever JSON
//! it receives back into it (missing keys fall back to the defaults, unknown
//! keys are ignored).

use super::validation::ConfigValidator;
use crate::core::errors::AlprError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verbosity of the engine's own console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    Verbose,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl DebugLevel {
    /// Returns the JSON spelling of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugLevel::Verbose => "verbose",
            DebugLevel::Info => "info",
            DebugLevel::Warn => "warn",
            DebugLevel::Error => "error",
            DebugLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebugLevel {
    type Err = AlprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verbose" => Ok(DebugLevel::Verbose),
            "info" => Ok(DebugLevel::Info),
            "warn" => Ok(DebugLevel::Warn),
            "error" => Ok(DebugLevel::Error),
            "fatal" => Ok(DebugLevel::Fatal),
            other => Err(AlprError::invalid_field(
                "debug_level",
                "verbose | info | warn | error | fatal",
                other,
            )),
        }
    }
}

/// How per-character recognition scores are folded into one plate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    /// Minimum score; every character must reach the threshold.
    #[default]
    Min,
    /// Arithmetic mean.
    Mean,
    /// Median.
    Median,
    /// Maximum score.
    Max,
    /// `(max + min) / 2`.
    Minmax,
}

impl ScoreType {
    /// Returns the JSON spelling of the score type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreType::Min => "min",
            ScoreType::Mean => "mean",
            ScoreType::Median => "median",
            ScoreType::Max => "max",
            ScoreType::Minmax => "minmax",
        }
    }

    /// Aggregates character scores according to this score type.
    ///
    /// Returns `None` for an empty slice or when any score is not finite.
    pub fn aggregate(&self, scores: &[f32]) -> Option<f32> {
        if scores.is_empty() || scores.iter().any(|s| !s.is_finite()) {
            return None;
        }

        let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let value = match self {
            ScoreType::Min => min,
            ScoreType::Max => max,
            ScoreType::Minmax => (min + max) * 0.5,
            ScoreType::Mean => scores.iter().sum::<f32>() / scores.len() as f32,
            ScoreType::Median => {
                let mut sorted = scores.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) * 0.5
                } else {
                    sorted[mid]
                }
            }
        };

        Some(value)
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreType {
    type Err = AlprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" => Ok(ScoreType::Min),
            "mean" => Ok(ScoreType::Mean),
            "median" => Ok(ScoreType::Median),
            "max" => Ok(ScoreType::Max),
            "minmax" => Ok(ScoreType::Minmax),
            other => Err(AlprError::invalid_field(
                "recogn_score_type",
                "min | mean | median | max | minmax",
                other,
            )),
        }
    }
}

/// Detector region of interest, encoded on the wire as
/// `[left, right, top, bottom]`.
///
/// All four values at zero disable the ROI (full frame).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct DetectRoi {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl DetectRoi {
    /// Creates a region of interest from its four edges.
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Returns true when the ROI is the all-zero "disabled" value.
    pub fn is_disabled(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.top == 0.0 && self.bottom == 0.0
    }

    /// Resolves the ROI against a frame, returning `(x, y, width, height)`.
    ///
    /// A disabled ROI covers the whole frame. Edges are clipped to the frame;
    /// `None` is returned when nothing of the ROI remains inside it.
    pub fn resolve(&self, frame_width: u32, frame_height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.is_disabled() {
            return Some((0, 0, frame_width, frame_height));
        }

        let clamp = |v: f32, max: u32| -> u32 { v.round().clamp(0.0, max as f32) as u32 };
        let left = clamp(self.left, frame_width);
        let right = clamp(self.right, frame_width);
        let top = clamp(self.top, frame_height);
        let bottom = clamp(self.bottom, frame_height);

        if right <= left || bottom <= top {
            return None;
        }
        Some((left, top, right - left, bottom - top))
    }
}

impl From<[f32; 4]> for DetectRoi {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<DetectRoi> for [f32; 4] {
    fn from(roi: DetectRoi) -> Self {
        [roi.left, roi.right, roi.top, roi.bottom]
    }
}

/// Complete set of engine options.
///
/// Field names are the JSON keys. `Default` yields the recognizer's
/// documented default configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlprConfig {
    pub debug_level: DebugLevel,
    pub debug_write_input_image_enabled: bool,
    pub debug_internal_data_path: String,

    /// Worker threads; `-1` lets the engine choose.
    pub num_threads: i32,
    pub gpgpu_enabled: bool,
    /// Latency budget in milliseconds; `-1` means unbounded.
    pub max_latency: i32,

    /// Recognition alphabet (`latin`, `korean`, `chinese`, ...).
    pub charset: String,

    pub detect_roi: DetectRoi,
    pub detect_minscore: f64,

    pub car_noplate_detect_enabled: bool,
    pub car_noplate_detect_min_score: f64,

    pub pyramidal_search_enabled: bool,
    pub pyramidal_search_sensitivity: f64,
    pub pyramidal_search_minscore: f64,
    pub pyramidal_search_min_image_size_inpixels: u32,

    pub recogn_minscore: f64,
    pub recogn_score_type: ScoreType,
    pub recogn_rectify_enabled: bool,

    /// Image enhancement for night vision.
    pub ienv_enabled: bool,
    pub openvino_enabled: bool,
    pub openvino_device: String,

    /// License plate country identification.
    pub klass_lpci_enabled: bool,
    /// Vehicle color recognition.
    pub klass_vcr_enabled: bool,
    /// Vehicle make/model/year recognition.
    pub klass_vmmr_enabled: bool,
    /// Vehicle body style recognition.
    pub klass_vbsr_enabled: bool,
    pub klass_vcr_gamma: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_token_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_token_data: Option<String>,
}

impl Default for AlprConfig {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::Info,
            debug_write_input_image_enabled: false,
            debug_internal_data_path: ".".to_string(),
            num_threads: -1,
            gpgpu_enabled: true,
            max_latency: -1,
            charset: "latin".to_string(),
            detect_roi: DetectRoi::default(),
            detect_minscore: 0.1,
            car_noplate_detect_enabled: false,
            car_noplate_detect_min_score: 0.8,
            pyramidal_search_enabled: true,
            pyramidal_search_sensitivity: 0.28,
            pyramidal_search_minscore: 0.3,
            pyramidal_search_min_image_size_inpixels: 800,
            recogn_minscore: 0.3,
            recogn_score_type: ScoreType::Min,
            recogn_rectify_enabled: false,
            ienv_enabled: false,
            openvino_enabled: true,
            openvino_device: "CPU".to_string(),
            klass_lpci_enabled: false,
            klass_vcr_enabled: false,
            klass_vmmr_enabled: false,
            klass_vbsr_enabled: false,
            klass_vcr_gamma: 1.5,
            assets_folder: None,
            license_token_file: None,
            license_token_data: None,
        }
    }
}

fn check_unit_interval(field: &str, value: f64) -> Result<(), AlprError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AlprError::invalid_field(
            field,
            "a number within [0, 1]",
            value.to_string(),
        ));
    }
    Ok(())
}

impl ConfigValidator for AlprConfig {
    fn validate(&self) -> Result<(), AlprError> {
        check_unit_interval("detect_minscore", self.detect_minscore)?;
        check_unit_interval("recogn_minscore", self.recogn_minscore)?;
        check_unit_interval("pyramidal_search_minscore", self.pyramidal_search_minscore)?;
        check_unit_interval(
            "pyramidal_search_sensitivity",
            self.pyramidal_search_sensitivity,
        )?;
        check_unit_interval(
            "car_noplate_detect_min_score",
            self.car_noplate_detect_min_score,
        )?;

        if !self.klass_vcr_gamma.is_finite() || self.klass_vcr_gamma < 0.0 {
            return Err(AlprError::invalid_field(
                "klass_vcr_gamma",
                "a non-negative number",
                self.klass_vcr_gamma.to_string(),
            ));
        }

        let roi: [f32; 4] = self.detect_roi.into();
        if roi.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AlprError::invalid_field(
                "detect_roi",
                "four non-negative numbers",
                format!("{roi:?}"),
            ));
        }
        if !self.detect_roi.is_disabled()
            && (self.detect_roi.right <= self.detect_roi.left
                || self.detect_roi.bottom <= self.detect_roi.top)
        {
            return Err(AlprError::invalid_field(
                "detect_roi",
                "[left, right, top, bottom] with right > left and bottom > top",
                format!("{roi:?}"),
            ));
        }

        if self.charset.trim().is_empty() {
            return Err(AlprError::invalid_field(
                "charset",
                "a non-empty alphabet name",
                "\"\"",
            ));
        }

        if self.debug_write_input_image_enabled && self.debug_internal_data_path.is_empty() {
            return Err(AlprError::invalid_field(
                "debug_internal_data_path",
                "a folder path when debug_write_input_image_enabled is true",
                "\"\"",
            ));
        }

        if self.license_token_file.is_some() && self.license_token_data.is_some() {
            return Err(AlprError::config_error(
                "license_token_file and license_token_data are mutually exclusive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_type_aggregate() {
        let scores = [0.9, 0.5, 0.7, 0.8];
        assert_eq!(ScoreType::Min.aggregate(&scores), Some(0.5));
        assert_eq!(ScoreType::Max.aggregate(&scores), Some(0.9));
        assert!((ScoreType::Minmax.aggregate(&scores).unwrap() - 0.7).abs() < 1e-6);
        assert!((ScoreType::Mean.aggregate(&scores).unwrap() - 0.725).abs() < 1e-6);
        assert!((ScoreType::Median.aggregate(&scores).unwrap() - 0.75).abs() < 1e-6);
        assert_eq!(ScoreType::Median.aggregate(&[0.2, 0.9, 0.4]), Some(0.4));
        assert_eq!(ScoreType::Min.aggregate(&[]), None);
        assert_eq!(ScoreType::Mean.aggregate(&[0.5, f32::NAN]), None);
    }

    #[test]
    fn test_score_type_parse() {
        assert_eq!("MinMax".parse::<ScoreType>().unwrap(), ScoreType::Minmax);
        assert!("average".parse::<ScoreType>().is_err());
        assert_eq!("warn".parse::<DebugLevel>().unwrap(), DebugLevel::Warn);
    }

    #[test]
    fn test_roi_wire_format_and_resolve() {
        let roi = DetectRoi::new(100.0, 500.0, 50.0, 250.0);
        let json = serde_json::to_value(roi).unwrap();
        assert_eq!(json, serde_json::json!([100.0, 500.0, 50.0, 250.0]));

        assert_eq!(roi.resolve(1280, 720), Some((100, 50, 400, 200)));
        assert_eq!(DetectRoi::default().resolve(640, 480), Some((0, 0, 640, 480)));
        // Entirely outside the frame.
        assert_eq!(DetectRoi::new(700.0, 800.0, 0.0, 10.0).resolve(640, 480), None);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: AlprConfig =
            serde_json::from_str(r#"{"assets_folder": "/opt/assets", "unknown_key": 3}"#).unwrap();
        assert_eq!(config.assets_folder.as_deref(), Some("/opt/assets"));
        assert_eq!(config.recogn_score_type, ScoreType::Min);
        assert_eq!(config.num_threads, -1);
    }

    #[test]
    fn test_validate_rejects_out_of_range_scores() {
        let config = AlprConfig {
            detect_minscore: 1.5,
            ..AlprConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AlprConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_roi_and_double_token() {
        let config = AlprConfig {
            detect_roi: DetectRoi::new(500.0, 100.0, 0.0, 100.0),
            ..AlprConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AlprConfig {
            license_token_file: Some("token.lic".to_string()),
            license_token_data: Some("QUJD".to_string()),
            ..AlprConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
