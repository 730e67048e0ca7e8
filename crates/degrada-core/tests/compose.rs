//! Integration test: configure a full three-stage pipeline through control
//! interactions and check the request the backend would receive.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use degrada_core::control::{self, Widget};
use degrada_core::payload::CompositeRequest;
use degrada_core::{
    Catalog, MediaFile, MediaKind, ParamValue, PipelineConfig, StageConfig, StageSlot,
    SubmitError, ValidationError,
};

fn uploaded_video() -> MediaFile {
    MediaFile {
        file_path: "uploads/street.mp4".into(),
        name: "street.mp4".into(),
        kind: MediaKind::Video,
        size_human: None,
    }
}

/// Feed raw control input through the renderer and apply the resulting
/// update, the way the compound page does.
fn interact(
    catalog: &Catalog,
    pipeline: &mut PipelineConfig,
    slot: StageSlot,
    type_key: &str,
    key: &str,
    raw: &str,
) {
    let schema = catalog.find(type_key).unwrap();
    let stage = match slot {
        StageSlot::Third => StageConfig {
            enabled: true,
            params: pipeline.optional().unwrap().params.clone(),
        },
        _ => pipeline.composite(slot).unwrap().get(type_key).unwrap().clone(),
    };
    let update = control::change(slot, schema, &stage, key, raw).unwrap();
    pipeline.apply(catalog, &update).unwrap();
}

#[test]
fn configured_pipeline_produces_backend_payload() {
    let catalog = Catalog::builtin().unwrap();
    let mut pipeline = PipelineConfig::new(&catalog);

    interact(&catalog, &mut pipeline, StageSlot::First, "blur", "kernel_size", "52");
    interact(&catalog, &mut pipeline, StageSlot::First, "blur", "sigma", "3.7");
    interact(&catalog, &mut pipeline, StageSlot::Second, "noise", "noise_type", "salt_pepper");
    interact(&catalog, &mut pipeline, StageSlot::Second, "noise", "density", "0.12");
    interact(&catalog, &mut pipeline, StageSlot::Second, "compression", "codec", "h265");
    pipeline
        .select_optional(&catalog, MediaKind::Video, Some("motion_blur"))
        .unwrap();
    interact(&catalog, &mut pipeline, StageSlot::Third, "motion_blur", "angle", "45");

    let request = pipeline
        .to_request(&catalog, Some(&uploaded_video()))
        .unwrap();
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["media_path"], "uploads/street.mp4");
    assert_eq!(json["media_type"], "video");

    let first = &json["first_degradation_config"];
    assert_eq!(first["name"], "composite");
    assert_eq!(first["params"]["blur"]["enabled"], true);
    assert_eq!(first["params"]["blur"]["params"]["kernel_size"], 51);
    assert_eq!(first["params"]["blur"]["params"]["sigma"], 3.7);

    let second = &json["second_degradation_config"]["params"];
    assert_eq!(second["noise"]["params"]["noise_type"], "salt_pepper");
    assert_eq!(second["noise"]["params"]["density"], 0.12);
    assert_eq!(second["compression"]["params"]["codec"], "h265");

    let third = &json["third_degradation_config"];
    assert_eq!(third["name"], "motion_blur");
    assert_eq!(third["params"]["angle"], 45);
    assert_eq!(third["params"]["length"], 15);
}

#[test]
fn unused_optional_stage_is_null() {
    let catalog = Catalog::builtin().unwrap();
    let pipeline = PipelineConfig::new(&catalog);
    let request = pipeline
        .to_request(&catalog, Some(&uploaded_video()))
        .unwrap();
    let json = serde_json::to_value(&request).unwrap();
    assert!(json["third_degradation_config"].is_null());
    assert!(json.as_object().unwrap().contains_key("third_degradation_config"));
}

#[test]
fn payload_round_trip_is_exact() {
    let catalog = Catalog::builtin().unwrap();
    let mut pipeline = PipelineConfig::new(&catalog);
    interact(&catalog, &mut pipeline, StageSlot::First, "resample", "scale_factor", "0.3");
    interact(&catalog, &mut pipeline, StageSlot::First, "noise", "intensity", "7.1");
    interact(&catalog, &mut pipeline, StageSlot::Second, "blur", "sigma", "0.30000000000000004");
    pipeline
        .select_optional(&catalog, MediaKind::Video, Some("flicker"))
        .unwrap();
    interact(&catalog, &mut pipeline, StageSlot::Third, "flicker", "amplitude", "0.7");

    let request = pipeline
        .to_request(&catalog, Some(&uploaded_video()))
        .unwrap();
    let text = serde_json::to_string(&request).unwrap();
    let back: CompositeRequest = serde_json::from_str(&text).unwrap();
    assert_eq!(back, request);

    let sigma = back.second_degradation_config.params.get("blur").unwrap().params["sigma"].clone();
    assert_eq!(sigma, ParamValue::Float(0.300_000_000_000_000_04));

    let keys: Vec<&str> = back
        .first_degradation_config
        .params
        .iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, degrada_core::COMPOSITE_TYPES);
}

#[test]
fn disabled_required_entry_yields_no_request() {
    let catalog = Catalog::builtin().unwrap();
    let mut pipeline = PipelineConfig::new(&catalog);
    pipeline
        .set_enabled(StageSlot::Second, "noise", false)
        .unwrap();

    let err = pipeline
        .to_request(&catalog, Some(&uploaded_video()))
        .unwrap_err();
    assert_eq!(
        err,
        SubmitError::Validation(ValidationError::RequiredStageDisabled {
            stage: StageSlot::Second,
            type_name: "噪声".into(),
        })
    );

    pipeline.set_enabled(StageSlot::Second, "noise", true).unwrap();
    assert!(pipeline.to_request(&catalog, Some(&uploaded_video())).is_ok());
}

#[test]
fn switching_optional_type_resets_params() {
    let catalog = Catalog::builtin().unwrap();
    let mut pipeline = PipelineConfig::new(&catalog);
    pipeline
        .select_optional(&catalog, MediaKind::Video, Some("shake"))
        .unwrap();
    interact(&catalog, &mut pipeline, StageSlot::Third, "shake", "frequency", "9");

    pipeline
        .select_optional(&catalog, MediaKind::Video, Some("flicker"))
        .unwrap();
    let flicker = catalog.optional(MediaKind::Video, "flicker").unwrap();
    assert_eq!(pipeline.optional().unwrap().params, flicker.defaults());

    pipeline
        .select_optional(&catalog, MediaKind::Video, Some("shake"))
        .unwrap();
    let shake = catalog.optional(MediaKind::Video, "shake").unwrap();
    assert_eq!(pipeline.optional().unwrap().params, shake.defaults());
}

#[test]
fn noise_kind_switch_changes_intensity_control() {
    let catalog = Catalog::builtin().unwrap();
    let mut pipeline = PipelineConfig::new(&catalog);
    let schema = catalog.composite("noise").unwrap();

    let render = |pipeline: &PipelineConfig| {
        let stage = pipeline.composite(StageSlot::First).unwrap().get("noise").unwrap();
        control::render(schema, stage)
    };

    let before = render(&pipeline);
    assert!(!before.iter().any(|c| c.key == "density"));

    interact(&catalog, &mut pipeline, StageSlot::First, "noise", "noise_type", "salt_pepper");
    let after = render(&pipeline);
    let intensity = after.iter().find(|c| c.key == "intensity").unwrap();
    let Widget::Slider(slider) = &intensity.widget else {
        panic!("intensity should be a slider");
    };
    assert!((slider.max - 20.0).abs() < f64::EPSILON);
    assert!(slider.display.ends_with('%'));
    assert!(after.iter().any(|c| c.key == "density"));
}

#[test]
fn unlisted_select_value_is_a_no_op() {
    let catalog = Catalog::builtin().unwrap();
    let pipeline = PipelineConfig::new(&catalog);
    let schema = catalog.composite("compression").unwrap();
    let stage = pipeline
        .composite(StageSlot::First)
        .unwrap()
        .get("compression")
        .unwrap();
    assert!(control::change(StageSlot::First, schema, stage, "codec", "av1").is_err());
    assert_eq!(
        stage.params["codec"],
        ParamValue::Text("jpeg".into())
    );
}
