//! Reference engine.
//!
//! [`ReferenceEngine`] implements the engine side of the recognition
//! contract in Rust: configuration parsing and validation, license token
//! checks, buffer validation, frame preparation, score thresholds and
//! classifier toggles. Plate localization itself is delegated to a
//! [`PlateDetector`].

use super::detector::{NullDetector, PlateCandidate, PlateDetector};
use super::preprocess::{PreparedFrame, prepare_frame};
use crate::core::config::{AlprConfig, ConfigValidator};
use crate::core::errors::AlprError;
use crate::core::traits::AlprEngine;
use crate::domain::image::{ImageBuffer, ImageType};
use crate::domain::recognition::{Car, Plate, RecognitionPayload};
use crate::domain::result::{EngineResult, ResultCode};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Side length of the synthetic warm-up frame.
const WARM_UP_SIZE: u32 = 64;

/// How the engine was licensed at init time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum License {
    Evaluation,
    Token { len: usize },
}

#[derive(Debug)]
struct Active {
    config: AlprConfig,
    license: License,
    next_frame_id: u64,
}

/// Engine backend driven by a pluggable [`PlateDetector`].
#[derive(Debug, Default)]
pub struct ReferenceEngine<D: PlateDetector = NullDetector> {
    detector: D,
    active: Option<Active>,
}

impl ReferenceEngine<NullDetector> {
    /// Creates an engine without an inference backend.
    pub fn new() -> Self {
        Self::with_detector(NullDetector)
    }
}

impl<D: PlateDetector> ReferenceEngine<D> {
    /// Creates an engine using `detector` for plate localization.
    pub fn with_detector(detector: D) -> Self {
        Self {
            detector,
            active: None,
        }
    }

    /// Returns true between a successful `init` and `deinit`.
    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    /// Returns true when the engine runs without a license token.
    pub fn is_evaluation(&self) -> bool {
        matches!(
            self.active.as_ref().map(|a| &a.license),
            Some(License::Evaluation)
        )
    }

    /// Options the engine was initialized with.
    pub fn config(&self) -> Option<&AlprConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    fn parse_config(config_json: &str) -> Result<AlprConfig, EngineResult> {
        let value: Value = serde_json::from_str(config_json)
            .map_err(|e| EngineResult::failure(ResultCode::InvalidConfiguration, e))?;
        if !value.is_object() {
            return Err(EngineResult::failure(
                ResultCode::InvalidConfiguration,
                "configuration must be a JSON object",
            ));
        }

        let config: AlprConfig = serde_json::from_value(value)
            .map_err(|e| EngineResult::failure(ResultCode::InvalidConfiguration, e))?;
        config
            .validate()
            .map_err(|e| EngineResult::failure(ResultCode::InvalidConfiguration, e))?;
        Ok(config)
    }

    fn check_license(config: &AlprConfig) -> Result<License, EngineResult> {
        let token = match (&config.license_token_file, &config.license_token_data) {
            (Some(path), _) => std::fs::read_to_string(path).map_err(|e| {
                EngineResult::failure(
                    ResultCode::LicenseRejected,
                    format!("cannot read token file {path}: {e}"),
                )
            })?,
            (None, Some(data)) => data.clone(),
            (None, None) => {
                warn!("no license token supplied, running in evaluation mode");
                return Ok(License::Evaluation);
            }
        };

        let token = token.trim();
        if token.is_empty() {
            return Err(EngineResult::failure(
                ResultCode::LicenseRejected,
                "token is empty",
            ));
        }
        let decoded = STANDARD
            .decode(token)
            .map_err(|e| EngineResult::failure(ResultCode::LicenseRejected, e))?;
        if decoded.is_empty() {
            return Err(EngineResult::failure(
                ResultCode::LicenseRejected,
                "token decodes to nothing",
            ));
        }
        Ok(License::Token { len: decoded.len() })
    }

    fn dump_frame(config: &AlprConfig, frame: &PreparedFrame, frame_id: u64) {
        let folder = Path::new(&config.debug_internal_data_path);
        if let Err(e) = std::fs::create_dir_all(folder) {
            warn!("cannot create debug folder {}: {e}", folder.display());
            return;
        }
        let path = folder.join(format!("alpr_input_{frame_id:06}.png"));
        match frame.luma.save(&path) {
            Ok(()) => debug!("wrote input frame to {}", path.display()),
            Err(e) => warn!("cannot write input frame {}: {e}", path.display()),
        }
    }

    fn run_detector(
        &self,
        config: &AlprConfig,
        frame: &PreparedFrame,
    ) -> Result<Vec<PlateCandidate>, AlprError> {
        if frame.is_empty() {
            debug!("detection ROI lies outside the frame, skipping detection");
            return Ok(Vec::new());
        }
        self.detector.detect(&frame.luma, config)
    }
}

/// Applies thresholds and feature toggles to one raw candidate.
fn accept_candidate(
    config: &AlprConfig,
    frame: &PreparedFrame,
    pyramidal_active: bool,
    candidate: PlateCandidate,
) -> Option<Plate> {
    if candidate.pyramidal && !pyramidal_active {
        return None;
    }

    let confidences = match &candidate.text {
        Some(text) => {
            let min_detect = if candidate.pyramidal {
                config.pyramidal_search_minscore
            } else {
                config.detect_minscore
            };
            if f64::from(candidate.detection_confidence) < min_detect * 100.0 {
                debug!(
                    "dropping {text}: detection {:.1} below threshold",
                    candidate.detection_confidence
                );
                return None;
            }

            let recognition = config
                .recogn_score_type
                .aggregate(&candidate.char_confidences)?;
            if f64::from(recognition) < config.recogn_minscore * 100.0 {
                debug!("dropping {text}: recognition {recognition:.1} below threshold");
                return None;
            }

            let mut confidences = Vec::with_capacity(candidate.char_confidences.len() + 2);
            confidences.push(recognition);
            confidences.push(candidate.detection_confidence);
            confidences.extend_from_slice(&candidate.char_confidences);
            confidences
        }
        None => {
            let car = candidate.car.as_ref()?;
            if !config.car_noplate_detect_enabled
                || f64::from(car.confidence) < config.car_noplate_detect_min_score * 100.0
            {
                return None;
            }
            vec![candidate.detection_confidence]
        }
    };

    let country = candidate.country.filter(|_| config.klass_lpci_enabled);
    let car = candidate.car.map(|car| Car {
        warped_box: frame.map_box(&car.warped_box),
        color: car.color.filter(|_| config.klass_vcr_enabled),
        make_model_year: car.make_model_year.filter(|_| config.klass_vmmr_enabled),
        body_style: car.body_style.filter(|_| config.klass_vbsr_enabled),
        ..car
    });

    Some(Plate {
        text: candidate.text,
        confidences,
        warped_box: frame.map_box(&candidate.warped_box),
        country,
        car,
    })
}

fn pyramidal_search_active(config: &AlprConfig, frame: &PreparedFrame) -> bool {
    let longest = frame.full_size.0.max(frame.full_size.1);
    config.pyramidal_search_enabled
        && config.pyramidal_search_sensitivity > 0.0
        && longest >= config.pyramidal_search_min_image_size_inpixels
}

impl<D: PlateDetector> AlprEngine for ReferenceEngine<D> {
    fn init(&mut self, config_json: &str) -> EngineResult {
        if self.active.is_some() {
            return EngineResult::failure(ResultCode::AlreadyInitialized, "call deinit first");
        }

        let config = match Self::parse_config(config_json) {
            Ok(config) => config,
            Err(result) => return result,
        };

        if let Some(assets) = &config.assets_folder
            && !Path::new(assets).is_dir()
        {
            return EngineResult::failure(ResultCode::AssetsNotFound, assets);
        }

        let license = match Self::check_license(&config) {
            Ok(license) => license,
            Err(result) => return result,
        };

        info!(
            "engine initialized: charset={}, score_type={}, rectify={}, license={}",
            config.charset,
            config.recogn_score_type,
            config.recogn_rectify_enabled,
            match license {
                License::Evaluation => "evaluation".to_string(),
                License::Token { len } => format!("token ({len} bytes)"),
            }
        );

        self.active = Some(Active {
            config,
            license,
            next_frame_id: 0,
        });
        EngineResult::bodyless_ok()
    }

    fn process(&mut self, image: &ImageBuffer<'_>) -> EngineResult {
        let start = Instant::now();
        let Some(active) = self.active.as_ref() else {
            return EngineResult::failure(ResultCode::NotInitialized, "call init first");
        };
        let config = &active.config;
        let frame_id = active.next_frame_id;

        let frame = match prepare_frame(image, config) {
            Ok(frame) => frame,
            Err(e) => return EngineResult::failure(ResultCode::InvalidImage, e),
        };

        if config.debug_write_input_image_enabled {
            Self::dump_frame(config, &frame, frame_id);
        }

        let candidates = match self.run_detector(config, &frame) {
            Ok(candidates) => candidates,
            Err(e) => return EngineResult::failure(ResultCode::Internal, e),
        };
        let found = candidates.len();

        let pyramidal_active = pyramidal_search_active(config, &frame);
        let plates: Vec<Plate> = candidates
            .into_iter()
            .filter_map(|c| accept_candidate(config, &frame, pyramidal_active, c))
            .collect();

        let duration = start.elapsed().as_secs_f64() * 1000.0;
        if config.max_latency >= 0 && duration > f64::from(config.max_latency) {
            debug!(
                "frame {frame_id} took {duration:.1} ms, over the {} ms budget",
                config.max_latency
            );
        }

        let payload = RecognitionPayload {
            duration,
            frame_id,
            plates,
        };
        let json = match payload.to_json() {
            Ok(json) => json,
            Err(e) => return EngineResult::failure(ResultCode::Internal, e),
        };
        debug!(
            "frame {frame_id}: {found} candidate(s), {} plate(s) kept",
            payload.plates.len()
        );

        if let Some(active) = self.active.as_mut() {
            active.next_frame_id += 1;
        }
        EngineResult::ok(json, payload.num_plates(), payload.num_cars())
    }

    fn deinit(&mut self) -> EngineResult {
        match self.active.take() {
            Some(active) => {
                info!(
                    "engine deinitialized after {} frame(s)",
                    active.next_frame_id
                );
                EngineResult::bodyless_ok()
            }
            None => EngineResult::failure(ResultCode::NotInitialized, "nothing to release"),
        }
    }

    fn warm_up(&mut self, image_type: ImageType) -> EngineResult {
        let Some(active) = self.active.as_ref() else {
            return EngineResult::failure(ResultCode::NotInitialized, "call init first");
        };

        let Some(len) = image_type.required_len(WARM_UP_SIZE, WARM_UP_SIZE, 0) else {
            return EngineResult::failure(ResultCode::Internal, "warm-up frame size overflow");
        };
        let data = vec![0u8; len];
        let buffer = ImageBuffer::new(image_type, &data, WARM_UP_SIZE, WARM_UP_SIZE);

        let result = prepare_frame(&buffer, &active.config)
            .and_then(|frame| self.run_detector(&active.config, &frame));
        match result {
            Ok(_) => {
                debug!("warm-up with {image_type} done");
                EngineResult::bodyless_ok()
            }
            Err(e) => EngineResult::failure(ResultCode::Internal, e),
        }
    }

    fn request_runtime_license_key(&mut self, raw: bool) -> EngineResult {
        if self.active.is_none() {
            return EngineResult::failure(ResultCode::NotInitialized, "call init first");
        }

        let fingerprint = format!(
            "{}:{}:{}:{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        let key = STANDARD.encode(fingerprint);
        if raw {
            EngineResult::ok(key, 0, 0)
        } else {
            EngineResult::ok(json!({ "key": key }).to_string(), 0, 0)
        }
    }
}
