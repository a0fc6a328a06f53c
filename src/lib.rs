//! Loopmorph turns ordered sets of still images into seamlessly looping videos.
//!
//! Consecutive stills are joined by optical-flow-guided morphs instead of plain crossfades:
//!
//! - Prepare sources with [`prepare`] / [`load_group`] (flatten alpha, crop square, resample)
//! - Estimate flow both ways with a [`FlowEstimator`] (primary algorithm plus fallback)
//! - Derive a [`ConsistencyMask`] and synthesize in-between frames with [`interpolate`]
//! - Drive a whole cyclic loop into a [`FrameSink`] with a [`LoopSequencer`]
//! - Run many manifest groups with a [`BatchRunner`], one video per group
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod foundation;

pub(crate) mod effects;
pub(crate) mod flow;
pub(crate) mod prep;

/// Batch driver over manifest groups.
pub mod batch;
/// Frame sinks: ffmpeg, GIF fallback, in-memory.
pub mod encode;
/// Loop scheduling and the sequencer state machine.
pub mod sequence;

pub use crate::config::{EncoderConfig, FlowAlgorithmKind, FlowConfig, MaskConfig, MorphConfig};
pub use crate::foundation::error::{MorphError, MorphResult};

pub use crate::effects::blend::{PairFlows, blend_weight, cross_dissolve, interpolate, warp_image};
pub use crate::effects::consistency::{ConsistencyMask, consistency_mask};
pub use crate::flow::FlowAlgorithm;
pub use crate::flow::dis::DisFlow;
pub use crate::flow::estimator::{FlowEstimate, FlowEstimator};
pub use crate::flow::farneback::FarnebackFlow;
pub use crate::flow::field::{FlowField, FlowStats};
pub use crate::flow::gray::GrayFrame;
pub use crate::flow::variational::VariationalParams;
pub use crate::prep::decode::{PreparedGroup, center_square, flatten_on_white, load_group, load_prepared, prepare};

pub use crate::batch::manifest::{BatchPlan, GroupJob, Manifest};
pub use crate::batch::runner::{BatchReport, BatchRunner, GroupOutcome, GroupReport};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::gif::GifSink;
pub use crate::encode::select::{EncoderKind, EncoderSelector, OpenedSink, SinkFactory};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::sequence::schedule::{LoopSchedule, Segment};
pub use crate::sequence::sequencer::{LoopSequencer, LoopState, LoopStats};
