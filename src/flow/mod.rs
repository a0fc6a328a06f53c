//! Dense optical flow between prepared frames.

pub(crate) mod dis;
pub(crate) mod estimator;
pub(crate) mod farneback;
pub(crate) mod field;
pub(crate) mod gray;
pub(crate) mod variational;

use crate::foundation::error::MorphResult;

/// One dense optical-flow method.
///
/// Implementations are direction-specific: `compute(a, b)` yields the field that carries
/// pixels of `a` onto `b`. Callers that need `b -> a` must call again with swapped inputs.
pub trait FlowAlgorithm: Send + Sync {
    /// Short stable identifier used in logs.
    fn name(&self) -> &'static str;
    /// Estimate flow from `a` to `b`.
    fn compute(&self, a: &gray::GrayFrame, b: &gray::GrayFrame) -> MorphResult<field::FlowField>;
}
