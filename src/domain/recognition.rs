//! Recognition payload carried in the JSON of a successful `process` call.
//!
//! # Coordinate System
//!
//! Every `warpedBox` holds four corners as eight floats
//! (`x1, y1, x2, y2, x3, y3, x4, y4`) in the coordinate system of the
//! upright input frame, after the EXIF orientation has been applied.
//!
//! # Confidences
//!
//! Scores are percentages in `[0, 100]`. A plate's `confidences` array
//! starts with the aggregated recognition score, then the detection score,
//! followed by one score per recognized character.

use crate::core::errors::AlprResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Country (or state) a plate was issued in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub confidence: f32,
    pub klass: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

/// A generic classifier output (vehicle color, body style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarAttribute {
    pub confidence: f32,
    pub klass: i32,
    pub name: String,
}

/// Vehicle make, model and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeModelYear {
    pub confidence: f32,
    pub klass: i32,
    pub make: String,
    pub model: String,
    /// Either a number or a range such as `"2012-2015"`.
    pub year: Value,
}

/// The vehicle a plate belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub confidence: f32,
    #[serde(default)]
    pub warped_box: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<CarAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make_model_year: Option<Vec<MakeModelYear>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_style: Option<Vec<CarAttribute>>,
}

/// One detected plate, or a car detected without a readable plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plate {
    /// Recognized text. `None` for a car without plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub confidences: Vec<f32>,
    #[serde(default)]
    pub warped_box: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<Country>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<Car>,
}

impl Plate {
    /// Returns true when a plate was read (as opposed to a car alone).
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Aggregated recognition score.
    pub fn recognition_confidence(&self) -> Option<f32> {
        self.text.as_ref().and(self.confidences.first().copied())
    }

    /// Detection score.
    pub fn detection_confidence(&self) -> Option<f32> {
        if self.has_text() {
            self.confidences.get(1).copied()
        } else {
            self.confidences.first().copied()
        }
    }

    /// Per-character recognition scores.
    pub fn character_confidences(&self) -> &[f32] {
        if self.has_text() {
            self.confidences.get(2..).unwrap_or(&[])
        } else {
            &[]
        }
    }

    /// Most likely country, if country identification ran.
    pub fn best_country(&self) -> Option<&Country> {
        self.country.as_ref()?.first()
    }
}

/// Parsed JSON payload of a `process` result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionPayload {
    /// Processing time in milliseconds.
    #[serde(default, alias = "latency", alias = "lantency")]
    pub duration: f64,
    #[serde(default)]
    pub frame_id: u64,
    #[serde(default)]
    pub plates: Vec<Plate>,
}

impl RecognitionPayload {
    /// Parses a payload from the engine's JSON string.
    ///
    /// An empty string (bodyless result) yields an empty payload.
    pub fn from_json(json: &str) -> AlprResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the payload back to compact JSON.
    pub fn to_json(&self) -> AlprResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of entries carrying plate text.
    pub fn num_plates(&self) -> usize {
        self.plates.iter().filter(|p| p.has_text()).count()
    }

    /// Number of entries carrying a car.
    pub fn num_cars(&self) -> usize {
        self.plates.iter().filter(|p| p.car.is_some()).count()
    }

    /// Recognized plate strings in detection order.
    pub fn plate_texts(&self) -> Vec<&str> {
        self.plates.iter().filter_map(|p| p.text.as_deref()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }
}

impl fmt::Display for RecognitionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "frame {} ({:.1} ms): {} plate(s), {} car(s)",
            self.frame_id,
            self.duration,
            self.num_plates(),
            self.num_cars()
        )?;
        for (index, plate) in self.plates.iter().enumerate() {
            match (&plate.text, plate.recognition_confidence()) {
                (Some(text), Some(score)) => write!(f, "  [{index}] {text} ({score:.2}%)")?,
                (Some(text), None) => write!(f, "  [{index}] {text}")?,
                (None, _) => write!(f, "  [{index}] <car without plate>")?,
            }
            if let Some(country) = plate.best_country() {
                write!(f, " country={}", country.code)?;
            }
            if let Some(car) = &plate.car {
                write!(f, " car={:.2}%", car.confidence)?;
                if let Some(color) = car.color.as_ref().and_then(|c| c.first()) {
                    write!(f, " color={}", color.name)?;
                }
                if let Some(mmy) = car.make_model_year.as_ref().and_then(|m| m.first()) {
                    write!(f, " make={} model={} year={}", mmy.make, mmy.model, mmy.year)?;
                }
                if let Some(style) = car.body_style.as_ref().and_then(|b| b.first()) {
                    write!(f, " body={}", style.name)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
