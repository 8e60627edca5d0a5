mod common;

use alpr_sdk::core::errors::EngineStage;
use common::*;

#[test]
fn recognizes_plate_in_1280x720_image() {
    let (token, _dir) = create_token_file();
    let image = create_plate_image();

    let options = RecognizerOptions::new(image.path()).with_license(LicenseToken::File(token));
    let report = Recognizer::new(options)
        .run(ReferenceEngine::with_detector(ScriptedDetector))
        .expect("recognition should succeed");

    assert!(report.init.is_ok());
    assert!(report.process.is_ok());
    assert!(report.deinit.is_ok());
    assert!(report.process.num_plates() >= 1);
    assert_eq!(report.payload.plate_texts(), vec![SCRIPTED_PLATE]);

    let plate = &report.payload.plates[0];
    assert_eq!(plate.warped_box.len(), 8);
    assert_eq!(plate.recognition_confidence(), Some(88.0));
    assert_eq!(plate.detection_confidence(), Some(99.0));
    // Classifiers are off by default.
    assert!(plate.country.is_none());
    assert!(plate.car.as_ref().unwrap().color.is_none());
}

#[test]
fn feature_toggles_reach_the_engine() {
    let image = create_plate_image();
    let options = RecognizerOptions::new(image.path()).with_features(FeatureToggles {
        country_identification: true,
        vehicle_color: true,
        ..Default::default()
    });

    let report = Recognizer::new(options)
        .run(ReferenceEngine::with_detector(ScriptedDetector))
        .unwrap();
    let plate = &report.payload.plates[0];
    assert_eq!(plate.best_country().unwrap().code, "USA");
    assert_eq!(
        plate.car.as_ref().unwrap().color.as_ref().unwrap()[0].name,
        "white"
    );
}

#[test]
fn init_then_deinit_without_process() {
    let (token, _dir) = create_token_file();
    let config = ConfigBuilder::new()
        .license(&LicenseToken::File(token))
        .build();

    let session = Session::init(ReferenceEngine::new(), &config).unwrap();
    assert_eq!(session.state(), SessionState::Initialized);
    assert!(session.deinit().unwrap().is_ok());
}

#[test]
fn missing_image_fails_before_init() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("lic_us_1280x720.jpg");

    // An assets folder that does not exist would make init fail; the
    // missing image must be reported first.
    let options = RecognizerOptions::new(&missing).with_assets_folder(dir.path().join("nope"));
    let err = Recognizer::new(options)
        .run(ReferenceEngine::new())
        .unwrap_err();
    assert!(matches!(err, AlprError::ImageNotFound { .. }), "{err}");
}

#[test]
fn rejected_license_surfaces_init_failure() {
    let dir = tempfile::tempdir().unwrap();
    let token = dir.path().join("empty.lic");
    std::fs::write(&token, "").unwrap();
    let image = create_plate_image();

    let options = RecognizerOptions::new(image.path()).with_license(LicenseToken::File(token));
    let err = Recognizer::new(options)
        .run(ReferenceEngine::new())
        .unwrap_err();
    match err {
        AlprError::Engine { stage, .. } => assert_eq!(stage, EngineStage::Init),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn benchmark_reports_throughput() {
    let positive = create_plate_image();
    let negative = create_empty_image();

    let options = BenchmarkOptions::new(positive.path(), negative.path())
        .with_loops(5)
        .with_rate(0.4)
        .with_license(LicenseToken::Data(TEST_TOKEN.to_string()));
    let report = Benchmark::new(options)
        .run(ReferenceEngine::with_detector(ScriptedDetector))
        .unwrap();

    assert_eq!(report.loops, 5);
    assert_eq!(report.positives, 2);
    assert!(report.elapsed_ms >= 0.0);
    assert!(report.fps > 0.0);
    assert_eq!(report.last_positive.plate_texts(), vec![SCRIPTED_PLATE]);
}

#[test]
fn benchmark_rejects_invalid_options() {
    let positive = create_plate_image();
    let negative = create_empty_image();

    let options = BenchmarkOptions::new(positive.path(), negative.path()).with_loops(0);
    assert!(matches!(
        Benchmark::new(options).run(ReferenceEngine::new()),
        Err(AlprError::ConfigError { .. })
    ));
}
