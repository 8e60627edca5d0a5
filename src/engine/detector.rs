//! The inference seam of the reference engine.
//!
//! A [`PlateDetector`] turns an upright luma frame into raw plate
//! candidates. It reports everything it sees; thresholds, classifier
//! toggles and coordinate mapping are applied afterwards by the engine.

use crate::core::config::AlprConfig;
use crate::core::errors::AlprError;
use crate::domain::recognition::{Car, Country};
use image::GrayImage;
use std::fmt::Debug;

/// A raw detection produced by a [`PlateDetector`].
///
/// Scores are percentages. The box is expressed in the coordinates of the
/// frame handed to the detector (the ROI crop, when one is configured).
#[derive(Debug, Clone, PartialEq)]
pub struct PlateCandidate {
    /// Recognized text, `None` for a car without a readable plate.
    pub text: Option<String>,
    /// One recognition score per character of `text`.
    pub char_confidences: Vec<f32>,
    pub detection_confidence: f32,
    pub warped_box: [f32; 8],
    /// Found by the pyramidal (small plate) search rather than the main pass.
    pub pyramidal: bool,
    pub country: Option<Vec<Country>>,
    pub car: Option<Car>,
}

impl PlateCandidate {
    /// A plate with text and per-character scores.
    pub fn plate(
        text: impl Into<String>,
        char_confidences: Vec<f32>,
        detection_confidence: f32,
        warped_box: [f32; 8],
    ) -> Self {
        Self {
            text: Some(text.into()),
            char_confidences,
            detection_confidence,
            warped_box,
            pyramidal: false,
            country: None,
            car: None,
        }
    }

    /// A car found without any readable plate.
    pub fn car_only(car: Car) -> Self {
        let mut warped_box = [0.0; 8];
        for (dst, src) in warped_box.iter_mut().zip(&car.warped_box) {
            *dst = *src;
        }
        Self {
            text: None,
            char_confidences: Vec::new(),
            detection_confidence: car.confidence,
            warped_box,
            pyramidal: false,
            country: None,
            car: Some(car),
        }
    }

    pub fn with_country(mut self, country: Vec<Country>) -> Self {
        self.country = Some(country);
        self
    }

    pub fn with_car(mut self, car: Car) -> Self {
        self.car = Some(car);
        self
    }

    /// Marks the candidate as coming from the pyramidal search.
    pub fn pyramidal(mut self) -> Self {
        self.pyramidal = true;
        self
    }
}

/// Plate localization and recognition backend.
pub trait PlateDetector: Send + Debug {
    /// Finds plate candidates in an upright luma frame.
    ///
    /// # Arguments
    ///
    /// * `frame` - Upright, ROI-cropped grayscale frame
    /// * `config` - Options the engine was initialized with (charset,
    ///   rectification, night vision enhancement)
    fn detect(
        &self,
        frame: &GrayImage,
        config: &AlprConfig,
    ) -> Result<Vec<PlateCandidate>, AlprError>;
}

/// Detector that never finds anything.
///
/// Used when no inference backend is linked in; the engine contract
/// (initialization, validation, license handling) still runs in full.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDetector;

impl PlateDetector for NullDetector {
    fn detect(
        &self,
        _frame: &GrayImage,
        _config: &AlprConfig,
    ) -> Result<Vec<PlateCandidate>, AlprError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_only_takes_car_box_and_score() {
        let car = Car {
            confidence: 92.0,
            warped_box: vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 1.0, 4.0],
            color: None,
            make_model_year: None,
            body_style: None,
        };
        let candidate = PlateCandidate::car_only(car);
        assert!(candidate.text.is_none());
        assert_eq!(candidate.detection_confidence, 92.0);
        assert_eq!(candidate.warped_box, [1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 1.0, 4.0]);
    }

    #[test]
    fn test_null_detector_finds_nothing() {
        let frame = GrayImage::new(16, 16);
        let found = NullDetector.detect(&frame, &AlprConfig::default()).unwrap();
        assert!(found.is_empty());
    }
}
