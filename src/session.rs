//! Owned engine session.
//!
//! A [`Session`] ties an engine's lifetime to a Rust value:
//!
//! ```text
//! Uninitialized --init--> Initialized --process--> Processed --process--> Processed
//!                              |                       |
//!                              +-------deinit----------+--> Deinitialized
//! ```
//!
//! A session only exists once `init` has succeeded, so a failed init never
//! leads to a `deinit`. Dropping a live session deinitializes the engine.

use crate::core::config::EngineConfig;
use crate::core::errors::{AlprError, AlprResult, EngineStage};
use crate::core::traits::AlprEngine;
use crate::domain::image::{ImageBuffer, ImageType};
use crate::domain::recognition::RecognitionPayload;
use crate::domain::result::EngineResult;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle state of an engine session.
///
/// `Uninitialized` is never observed on a [`Session`]: before a successful
/// `init` there is no session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Processed,
    Deinitialized,
}

impl SessionState {
    /// Returns true while the engine holds resources.
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Initialized | SessionState::Processed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::Processed => "processed",
            SessionState::Deinitialized => "deinitialized",
        };
        f.write_str(name)
    }
}

/// Output of one successful `process` call.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Raw engine result.
    pub result: EngineResult,
    /// Parsed payload.
    pub payload: RecognitionPayload,
}

/// An initialized engine.
#[derive(Debug)]
pub struct Session<E: AlprEngine> {
    engine: E,
    state: SessionState,
    init_result: EngineResult,
}

impl<E: AlprEngine> Session<E> {
    /// Initializes `engine` with `config`.
    ///
    /// On failure the engine is dropped without being deinitialized.
    pub fn init(mut engine: E, config: &EngineConfig) -> AlprResult<Self> {
        let json = config.to_json();
        debug!("initializing engine with {} option(s)", config.len());

        let result = engine.init(&json).check(EngineStage::Init)?;
        info!("engine initialized: {}", result.phrase());

        Ok(Self {
            engine,
            state: SessionState::Initialized,
            init_result: result,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Result of the successful `init` call.
    pub fn init_result(&self) -> &EngineResult {
        &self.init_result
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn ensure_live(&self, operation: &str) -> AlprResult<()> {
        if self.state.is_live() {
            Ok(())
        } else {
            Err(AlprError::session(format!(
                "cannot {operation} in state {}",
                self.state
            )))
        }
    }

    /// Runs recognition over one image.
    ///
    /// The buffer is validated before it reaches the engine, so size,
    /// stride and orientation errors surface as their own error variants.
    pub fn process(&mut self, image: &ImageBuffer<'_>) -> AlprResult<Recognition> {
        self.ensure_live("process")?;
        image.validate()?;

        let result = self.engine.process(image).check(EngineStage::Process)?;
        self.state = SessionState::Processed;

        let payload = RecognitionPayload::from_json(result.json())?;
        if payload.num_plates() != result.num_plates() || payload.num_cars() != result.num_cars() {
            warn!(
                "engine reported {} plate(s) and {} car(s), payload holds {} and {}",
                result.num_plates(),
                result.num_cars(),
                payload.num_plates(),
                payload.num_cars()
            );
        }
        debug!(
            "{}x{} {} processed: {result}",
            image.width(),
            image.height(),
            image.image_type()
        );

        Ok(Recognition { result, payload })
    }

    /// Warms the engine up for images of `image_type`.
    pub fn warm_up(&mut self, image_type: ImageType) -> AlprResult<()> {
        self.ensure_live("warm up")?;
        self.engine
            .warm_up(image_type)
            .check(EngineStage::WarmUp)
            .map(|_| ())
    }

    /// Requests the device-bound runtime license key.
    ///
    /// With `raw` the key is returned verbatim; otherwise the key is taken
    /// from the engine's JSON answer.
    pub fn runtime_license_key(&mut self, raw: bool) -> AlprResult<String> {
        self.ensure_live("request a runtime key")?;
        let result = self
            .engine
            .request_runtime_license_key(raw)
            .check(EngineStage::RuntimeKey)?;
        if raw {
            return Ok(result.json().to_string());
        }

        let value: Value = serde_json::from_str(result.json())?;
        value
            .get("key")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AlprError::Engine {
                stage: EngineStage::RuntimeKey,
                code: result.code(),
                phrase: "answer carries no \"key\" field".to_string(),
            })
    }

    /// Releases the engine.
    pub fn deinit(mut self) -> AlprResult<EngineResult> {
        self.state = SessionState::Deinitialized;
        let result = self.engine.deinit().check(EngineStage::DeInit)?;
        info!("engine deinitialized");
        Ok(result)
    }
}

impl<E: AlprEngine> Drop for Session<E> {
    fn drop(&mut self) {
        if !self.state.is_live() {
            return;
        }
        self.state = SessionState::Deinitialized;
        let result = self.engine.deinit();
        if result.is_ok() {
            debug!("engine deinitialized on drop");
        } else {
            warn!("deinit on drop failed: {result}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigBuilder;
    use crate::domain::result::ResultCode;
    use std::sync::{Arc, Mutex};

    /// Engine recording the calls it receives.
    #[derive(Debug, Clone, Default)]
    struct RecordingEngine {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_init: bool,
    }

    impl RecordingEngine {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl AlprEngine for RecordingEngine {
        fn init(&mut self, config_json: &str) -> EngineResult {
            self.record("init");
            assert!(config_json.starts_with('{'));
            if self.fail_init {
                EngineResult::failure(ResultCode::LicenseRejected, "expired")
            } else {
                EngineResult::bodyless_ok()
            }
        }

        fn process(&mut self, _image: &ImageBuffer<'_>) -> EngineResult {
            self.record("process");
            EngineResult::ok(r#"{"frame_id":0,"duration":1.0,"plates":[]}"#, 0, 0)
        }

        fn deinit(&mut self) -> EngineResult {
            self.record("deinit");
            EngineResult::bodyless_ok()
        }

        fn warm_up(&mut self, _image_type: ImageType) -> EngineResult {
            self.record("warm_up");
            EngineResult::bodyless_ok()
        }

        fn request_runtime_license_key(&mut self, raw: bool) -> EngineResult {
            self.record("runtime_key");
            if raw {
                EngineResult::ok("S0VZ", 0, 0)
            } else {
                EngineResult::ok(r#"{"key":"S0VZ"}"#, 0, 0)
            }
        }
    }

    #[test]
    fn test_state_transitions() {
        let engine = RecordingEngine::default();
        let observer = engine.clone();
        let config = ConfigBuilder::new().build();

        let mut session = Session::init(engine, &config).unwrap();
        assert_eq!(session.state(), SessionState::Initialized);

        let data = vec![0u8; 4 * 4 * 3];
        let buffer = ImageBuffer::new(ImageType::Rgb24, &data, 4, 4);
        let first = session.process(&buffer).unwrap();
        assert!(first.payload.is_empty());
        assert_eq!(session.state(), SessionState::Processed);
        session.process(&buffer).unwrap();
        assert_eq!(session.state(), SessionState::Processed);

        session.deinit().unwrap();
        assert_eq!(observer.calls(), vec!["init", "process", "process", "deinit"]);
    }

    #[test]
    fn test_failed_init_never_deinitializes() {
        let engine = RecordingEngine {
            fail_init: true,
            ..Default::default()
        };
        let observer = engine.clone();

        let err = Session::init(engine, &ConfigBuilder::new().build()).unwrap_err();
        assert_eq!(err.engine_code(), Some(ResultCode::LicenseRejected.code()));
        assert_eq!(observer.calls(), vec!["init"]);
    }

    #[test]
    fn test_drop_deinitializes_live_session() {
        let engine = RecordingEngine::default();
        let observer = engine.clone();
        {
            let _session = Session::init(engine, &ConfigBuilder::new().build()).unwrap();
        }
        assert_eq!(observer.calls(), vec!["init", "deinit"]);
    }

    #[test]
    fn test_invalid_buffer_never_reaches_engine() {
        let engine = RecordingEngine::default();
        let observer = engine.clone();
        let mut session = Session::init(engine, &ConfigBuilder::new().build()).unwrap();

        let data = vec![0u8; 10];
        let err = session
            .process(&ImageBuffer::new(ImageType::Rgb24, &data, 2, 2))
            .unwrap_err();
        assert!(matches!(err, AlprError::BufferSizeMismatch { .. }));
        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(observer.calls(), vec!["init"]);
    }

    #[test]
    fn test_warm_up_and_runtime_key() {
        let engine = RecordingEngine::default();
        let mut session = Session::init(engine, &ConfigBuilder::new().build()).unwrap();

        session.warm_up(ImageType::Rgb24).unwrap();
        assert_eq!(session.runtime_license_key(true).unwrap(), "S0VZ");
        assert_eq!(session.runtime_license_key(false).unwrap(), "S0VZ");
    }
}
