use crate::config::{FlowAlgorithmKind, FlowConfig};
use crate::flow::FlowAlgorithm;
use crate::flow::dis::DisFlow;
use crate::flow::farneback::FarnebackFlow;
use crate::flow::field::FlowField;
use crate::flow::gray::GrayFrame;
use crate::foundation::error::{MorphError, MorphResult};

/// Flow estimate tagged with the algorithm that produced it.
#[derive(Clone, Debug)]
pub struct FlowEstimate {
    /// The displacement field.
    pub field: FlowField,
    /// Name of the algorithm that succeeded.
    pub algorithm: &'static str,
}

/// Primary/fallback policy over [`FlowAlgorithm`]s.
///
/// The primary is tried first; if it errors or yields non-finite vectors the fallback (when
/// present) is tried once. Both failing is reported as [`MorphError::Flow`], which callers
/// treat as "degrade this transition to a cross-dissolve".
pub struct FlowEstimator {
    primary: Box<dyn FlowAlgorithm>,
    fallback: Option<Box<dyn FlowAlgorithm>>,
}

impl std::fmt::Debug for FlowEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowEstimator")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl FlowEstimator {
    /// Build the estimator described by `cfg`.
    pub fn from_config(cfg: &FlowConfig) -> Self {
        let primary = algorithm_for(cfg.algorithm, cfg);
        let fallback = cfg
            .retry
            .then(|| algorithm_for(cfg.algorithm.alternate(), cfg));
        Self { primary, fallback }
    }

    /// Build an estimator from explicit algorithms.
    pub fn with_algorithms(
        primary: Box<dyn FlowAlgorithm>,
        fallback: Option<Box<dyn FlowAlgorithm>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Estimate flow from `a` to `b`, applying the fallback policy.
    #[tracing::instrument(level = "debug", skip_all, fields(w = a.width, h = a.height))]
    pub fn estimate(&self, a: &GrayFrame, b: &GrayFrame) -> MorphResult<FlowEstimate> {
        let mut failures = Vec::with_capacity(2);
        let order = std::iter::once(&self.primary).chain(self.fallback.as_ref());
        for algo in order {
            match algo.compute(a, b) {
                Ok(field) if field.is_finite() => {
                    return Ok(FlowEstimate {
                        field,
                        algorithm: algo.name(),
                    });
                }
                Ok(_) => {
                    tracing::debug!(algorithm = algo.name(), "flow contains non-finite values");
                    failures.push(format!("{}: non-finite flow", algo.name()));
                }
                Err(err) => {
                    tracing::debug!(algorithm = algo.name(), error = %err, "flow algorithm failed");
                    failures.push(format!("{}: {err}", algo.name()));
                }
            }
        }
        Err(MorphError::flow(failures.join("; ")))
    }
}

fn algorithm_for(kind: FlowAlgorithmKind, cfg: &FlowConfig) -> Box<dyn FlowAlgorithm> {
    match kind {
        FlowAlgorithmKind::Dis if cfg.strong_smoothing => {
            Box::new(DisFlow::smooth(cfg.pyramid_levels))
        }
        FlowAlgorithmKind::Dis => Box::new(DisFlow::fast(cfg.pyramid_levels)),
        FlowAlgorithmKind::Farneback => Box::new(FarnebackFlow::new(cfg.pyramid_levels)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/estimator.rs"]
mod tests;
