use super::*;

struct Failing;

impl FlowAlgorithm for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn compute(&self, _a: &GrayFrame, _b: &GrayFrame) -> MorphResult<FlowField> {
        Err(MorphError::flow("forced failure"))
    }
}

struct NonFinite;

impl FlowAlgorithm for NonFinite {
    fn name(&self) -> &'static str {
        "nan"
    }

    fn compute(&self, a: &GrayFrame, _b: &GrayFrame) -> MorphResult<FlowField> {
        Ok(FlowField::uniform(a.width, a.height, f32::NAN, 0.0))
    }
}

struct Constant(f32);

impl FlowAlgorithm for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn compute(&self, a: &GrayFrame, _b: &GrayFrame) -> MorphResult<FlowField> {
        Ok(FlowField::uniform(a.width, a.height, self.0, 0.0))
    }
}

fn frame() -> GrayFrame {
    GrayFrame::from_fn(16, 16, |x, y| (x * 3 + y) as f32)
}

#[test]
fn primary_success_skips_fallback() {
    let est = FlowEstimator::with_algorithms(Box::new(Constant(1.0)), Some(Box::new(Failing)));
    let out = est.estimate(&frame(), &frame()).unwrap();
    assert_eq!(out.algorithm, "constant");
    assert_eq!(out.field.get(0, 0), [1.0, 0.0]);
}

#[test]
fn primary_error_uses_fallback() {
    let est = FlowEstimator::with_algorithms(Box::new(Failing), Some(Box::new(Constant(2.0))));
    let out = est.estimate(&frame(), &frame()).unwrap();
    assert_eq!(out.algorithm, "constant");
}

#[test]
fn non_finite_primary_uses_fallback() {
    let est = FlowEstimator::with_algorithms(Box::new(NonFinite), Some(Box::new(Constant(2.0))));
    let out = est.estimate(&frame(), &frame()).unwrap();
    assert_eq!(out.field.get(3, 3), [2.0, 0.0]);
}

#[test]
fn both_failing_is_a_flow_error() {
    let est = FlowEstimator::with_algorithms(Box::new(Failing), Some(Box::new(NonFinite)));
    let err = est.estimate(&frame(), &frame()).unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, MorphError::Flow(_)));
    assert!(msg.contains("failing: flow error: forced failure"));
    assert!(msg.contains("nan: non-finite flow"));
}

#[test]
fn retry_disabled_means_no_fallback() {
    let cfg = FlowConfig {
        retry: false,
        ..FlowConfig::default()
    };
    let est = FlowEstimator::from_config(&cfg);
    assert!(est.fallback.is_none());
    assert_eq!(est.primary.name(), "dis");
}

#[test]
fn config_selects_alternate_as_fallback() {
    let cfg = FlowConfig {
        algorithm: FlowAlgorithmKind::Farneback,
        ..FlowConfig::default()
    };
    let est = FlowEstimator::from_config(&cfg);
    assert_eq!(est.primary.name(), "farneback");
    assert_eq!(est.fallback.as_ref().map(|a| a.name()), Some("dis"));
}

#[test]
fn tiny_frames_fall_back_to_farneback() {
    let est = FlowEstimator::from_config(&FlowConfig::default());
    let g = GrayFrame::from_fn(4, 4, |x, y| (x + y) as f32);
    let out = est.estimate(&g, &g).unwrap();
    assert_eq!(out.algorithm, "farneback");
}
