use alpr_sdk::core::config::AlprConfig;
use alpr_sdk::core::errors::AlprError;
use alpr_sdk::domain::{Car, CarAttribute, Country};
use alpr_sdk::engine::{PlateCandidate, PlateDetector};
use image::{GrayImage, ImageBuffer, Rgb};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

/// Base64 of "alpr-sdk test token".
pub const TEST_TOKEN: &str = "YWxwci1zZGsgdGVzdCB0b2tlbg==";

/// Writes a valid license token file into a fresh temp dir.
/// Returns both the token path and the directory (which must be kept alive).
pub fn create_token_file() -> (PathBuf, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("dev.lic");
    let mut file = std::fs::File::create(&path).expect("Failed to create token file");
    writeln!(file, "{TEST_TOKEN}").expect("Failed to write token file");
    (path, dir)
}

/// Creates a `width`x`height` RGB PNG filled with `value` on every channel.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image(width: u32, height: u32, value: u8) -> NamedTempFile {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb([value, value, value]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// A 1280x720 image the scripted detector reads a plate from.
pub fn create_plate_image() -> NamedTempFile {
    create_test_image(1280, 720, 200)
}

/// A 1280x720 image the scripted detector finds nothing in.
pub fn create_empty_image() -> NamedTempFile {
    create_test_image(1280, 720, 0)
}

/// Detector that reports one US plate on a car whenever the frame is
/// mostly bright, and nothing on dark frames.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector;

pub const SCRIPTED_PLATE: &str = "3PEDLM4";

impl PlateDetector for ScriptedDetector {
    fn detect(
        &self,
        frame: &GrayImage,
        _config: &AlprConfig,
    ) -> Result<Vec<PlateCandidate>, AlprError> {
        let pixels = frame.as_raw();
        if pixels.is_empty() {
            return Ok(Vec::new());
        }
        let mean = pixels.iter().map(|p| u64::from(*p)).sum::<u64>() / pixels.len() as u64;
        if mean < 100 {
            return Ok(Vec::new());
        }

        let car = Car {
            confidence: 97.0,
            warped_box: vec![400.0, 200.0, 900.0, 200.0, 900.0, 600.0, 400.0, 600.0],
            color: Some(vec![CarAttribute {
                confidence: 88.0,
                klass: 3,
                name: "white".to_string(),
            }]),
            make_model_year: None,
            body_style: None,
        };
        let country = vec![Country {
            code: "USA".to_string(),
            confidence: 99.0,
            klass: 84,
            name: "United States of America".to_string(),
            state: Some("California".to_string()),
            other: None,
        }];

        Ok(vec![
            PlateCandidate::plate(
                SCRIPTED_PLATE,
                vec![92.0, 95.5, 88.0, 97.0, 91.5, 90.0, 94.0],
                99.0,
                [560.0, 480.0, 720.0, 480.0, 720.0, 520.0, 560.0, 520.0],
            )
            .with_country(country)
            .with_car(car),
        ])
    }
}
