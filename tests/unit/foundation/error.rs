use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MorphError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MorphError::flow("x").to_string().contains("flow error:"));
    assert!(MorphError::encode("x").to_string().contains("encode error:"));
    assert!(
        MorphError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn decode_error_names_the_path() {
    let err = MorphError::decode(Path::new("assets/plans/a.png"), "missing file");
    let msg = err.to_string();
    assert!(msg.contains("decode error:"));
    assert!(msg.contains("assets/plans/a.png"));
    assert!(msg.contains("missing file"));
}

#[test]
fn insufficient_images_reports_group_and_count() {
    let msg = MorphError::insufficient_images("plans", 1).to_string();
    assert!(msg.contains("'plans'"));
    assert!(msg.contains("got 1"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MorphError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
