use super::*;

#[test]
fn defaults_match_reference_tool() {
    let cfg = MorphConfig::default();
    assert_eq!((cfg.width, cfg.height, cfg.fps), (512, 512, 30));
    assert_eq!(cfg.hold_secs, 0.5);
    assert_eq!(cfg.transition_secs, 1.0);
    assert_eq!(cfg.flow.algorithm, FlowAlgorithmKind::Dis);
    assert!(cfg.flow.retry);
    assert_eq!(cfg.flow.pyramid_levels, 3);
    assert!(cfg.flow.strong_smoothing);
    assert_eq!(cfg.mask.fb_max_px_err, 1.5);
    assert_eq!(cfg.mask.blur_kernel, 7);
    assert_eq!(cfg.encoder.keyframe_interval(cfg.fps), 60);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg = MorphConfig::from_json_str(
        r#"{ "fps": 10, "flow": { "algorithm": "farneback", "retry": false } }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps, 10);
    assert_eq!(cfg.flow.algorithm, FlowAlgorithmKind::Farneback);
    assert!(!cfg.flow.retry);
    assert_eq!(cfg.flow.pyramid_levels, 3);
    assert_eq!(cfg.width, 512);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = MorphConfig::from_json_str(r#"{ "fsp": 10 }"#).unwrap_err();
    assert!(matches!(err, MorphError::Serde(_)));
}

#[test]
fn validation_catches_bad_values() {
    let non_square = MorphConfig {
        width: 512,
        height: 256,
        ..MorphConfig::default()
    };
    assert!(non_square.validate().is_err());

    let zero_fps = MorphConfig {
        fps: 0,
        ..MorphConfig::default()
    };
    assert!(zero_fps.validate().is_err());

    let negative_hold = MorphConfig {
        hold_secs: -1.0,
        ..MorphConfig::default()
    };
    assert!(negative_hold.validate().is_err());

    let mut bad_levels = MorphConfig::default();
    bad_levels.flow.pyramid_levels = 0;
    assert!(bad_levels.validate().is_err());

    let mut bad_tol = MorphConfig::default();
    bad_tol.mask.fb_max_px_err = f32::NAN;
    assert!(bad_tol.validate().is_err());
}

#[test]
fn alternate_algorithm_swaps() {
    assert_eq!(
        FlowAlgorithmKind::Dis.alternate(),
        FlowAlgorithmKind::Farneback
    );
    assert_eq!(
        FlowAlgorithmKind::Farneback.alternate(),
        FlowAlgorithmKind::Dis
    );
}
