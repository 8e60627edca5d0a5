//! Domain types exchanged with the engine.
//!
//! - [`image`]: borrowed pixel buffers, pixel layouts and EXIF orientation
//! - [`result`]: the status object returned by every engine call
//! - [`recognition`]: the typed view of a successful recognition payload

pub mod image;
pub mod recognition;
pub mod result;

pub use self::image::{ExifOrientation, ImageBuffer, ImageType, OwnedImage};
pub use recognition::{Car, CarAttribute, Country, MakeModelYear, Plate, RecognitionPayload};
pub use result::{EngineResult, ResultCode};
