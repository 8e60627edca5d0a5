mod common;

use alpr_sdk::domain::ResultCode;
use common::*;
use image::{Rgb, RgbImage};

fn initialized_session() -> Session<ReferenceEngine<ScriptedDetector>> {
    let config = ConfigBuilder::new()
        .license(&LicenseToken::Data(TEST_TOKEN.to_string()))
        .build();
    Session::init(ReferenceEngine::with_detector(ScriptedDetector), &config).unwrap()
}

#[test]
fn process_before_init_fails() {
    let mut engine = ReferenceEngine::new();
    let pixels = vec![0u8; 8 * 8 * 3];
    let result = engine.process(&ImageBuffer::new(ImageType::Rgb24, &pixels, 8, 8));

    assert!(!result.is_ok());
    assert_eq!(result.code(), ResultCode::NotInitialized.code());
    assert!(result.json().is_empty());
}

#[test]
fn buffer_length_mismatch_fails_process() {
    let mut session = initialized_session();
    let pixels = vec![200u8; 1280 * 720 * 3 - 1];

    let err = session
        .process(&ImageBuffer::new(ImageType::Rgb24, &pixels, 1280, 720))
        .unwrap_err();
    match err {
        AlprError::BufferSizeMismatch { expected, actual } => {
            assert_eq!(expected, 1280 * 720 * 3);
            assert_eq!(actual, 1280 * 720 * 3 - 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn orientation_out_of_range_is_rejected() {
    let mut session = initialized_session();
    let pixels = vec![200u8; 16 * 16];

    for orientation in [0, 9] {
        let buffer = ImageBuffer::new(ImageType::Y, &pixels, 16, 16).with_orientation(orientation);
        assert!(matches!(
            session.process(&buffer),
            Err(AlprError::InvalidOrientation { .. })
        ));
    }
    let buffer = ImageBuffer::new(ImageType::Y, &pixels, 16, 16).with_orientation(8);
    assert!(session.process(&buffer).is_ok());
}

#[test]
fn strided_nv12_frame_is_recognized() {
    let mut session = initialized_session();
    // 1280x720 luma with 64 bytes of row padding, followed by interleaved chroma.
    let (width, height, stride) = (1280u32, 720u32, 1344u32);
    let len = ImageType::Nv12.required_len(width, height, stride).unwrap();
    let pixels = vec![200u8; len];

    let recognition = session
        .process(&ImageBuffer::new(ImageType::Nv12, &pixels, width, height).with_stride(stride))
        .unwrap();
    assert_eq!(recognition.result.num_plates(), 1);
    assert_eq!(recognition.payload.num_cars(), 1);
}

fn session_with_roi(roi: DetectRoi) -> Session<ReferenceEngine<ScriptedDetector>> {
    let config = ConfigBuilder::new().detect_roi(roi).build();
    Session::init(ReferenceEngine::with_detector(ScriptedDetector), &config).unwrap()
}

#[test]
fn exif_orientation_is_applied_before_detection() {
    // Stored sideways as 720x1280 with only the top half bright. Orientation 6
    // turns it into a 1280x720 frame whose right half is bright.
    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    RgbImage::from_fn(720, 1280, |_, y| {
        if y < 640 { Rgb([200, 200, 200]) } else { Rgb([0, 0, 0]) }
    })
    .save(file.path())
    .unwrap();
    let mut image = alpr_sdk::utils::load_image(file.path()).unwrap();
    image.orientation = ExifOrientation::new(6).unwrap();

    let left_half = DetectRoi::new(0.0, 640.0, 0.0, 720.0);
    let right_half = DetectRoi::new(640.0, 1280.0, 0.0, 720.0);

    let recognition = session_with_roi(left_half)
        .process(&image.as_buffer())
        .unwrap();
    assert!(recognition.payload.is_empty());

    let recognition = session_with_roi(right_half)
        .process(&image.as_buffer())
        .unwrap();
    assert_eq!(recognition.payload.plate_texts(), vec![SCRIPTED_PLATE]);
    // Boxes are reported in upright frame coordinates.
    assert_eq!(recognition.payload.plates[0].warped_box[0], 560.0 + 640.0);

    // Ignoring the orientation, the left half holds bright pixels.
    let recognition = session_with_roi(left_half)
        .process(&image.as_upright_buffer())
        .unwrap();
    assert_eq!(recognition.payload.num_plates(), 1);
}

#[test]
fn both_token_sources_are_rejected() {
    let result = LicenseToken::from_sources(Some("dev.lic".into()), Some(TEST_TOKEN.to_string()));
    assert!(matches!(result, Err(AlprError::ConfigError { .. })));

    let mut engine = ReferenceEngine::new();
    let json = format!(
        r#"{{"license_token_file": "dev.lic", "license_token_data": "{TEST_TOKEN}"}}"#
    );
    assert_eq!(engine.init(&json).code(), ResultCode::InvalidConfiguration.code());
}

#[test]
fn dropped_session_releases_engine() {
    let session = initialized_session();
    drop(session);

    // A fresh engine can be initialized and released again afterwards.
    let session = initialized_session();
    assert!(session.deinit().is_ok());
}
