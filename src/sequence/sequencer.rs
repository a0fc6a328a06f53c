use image::RgbImage;

use crate::config::MorphConfig;
use crate::effects::blend::{PairFlows, interpolate};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::flow::estimator::FlowEstimator;
use crate::flow::gray::GrayFrame;
use crate::foundation::error::{MorphError, MorphResult};
use crate::sequence::schedule::{LoopSchedule, Segment, transition_time};

/// Where the sequencer is within a loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing emitted yet.
    Idle,
    /// Emitting hold frames of one image.
    Holding {
        /// Image index.
        image: usize,
    },
    /// Emitting interpolated frames between two images.
    Transitioning {
        /// Start image index.
        from: usize,
        /// End image index.
        to: usize,
    },
    /// Every segment has been emitted.
    Done,
}

impl LoopState {
    /// State entered when `segment` starts.
    pub fn entering(segment: &Segment) -> Self {
        match *segment {
            Segment::Hold { image, .. } => Self::Holding { image },
            Segment::Transition { from, to, .. } => Self::Transitioning { from, to },
        }
    }

    /// States visited while playing `schedule` from the start, ending in `Done`.
    pub fn walk(schedule: &LoopSchedule) -> Vec<Self> {
        std::iter::once(Self::Idle)
            .chain(schedule.segments().iter().map(Self::entering))
            .chain(std::iter::once(Self::Done))
            .collect()
    }
}

/// Counters for one rendered loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Of which hold frames.
    pub hold_frames: u64,
    /// Of which interpolated frames.
    pub transition_frames: u64,
    /// Transitions rendered.
    pub transitions: usize,
    /// Transitions that fell back to a cross-dissolve because flow failed.
    pub degraded_transitions: usize,
}

/// Drives one group of prepared images through flow, blending and a sink.
#[derive(Debug)]
pub struct LoopSequencer {
    cfg: MorphConfig,
    estimator: FlowEstimator,
}

impl LoopSequencer {
    /// Sequencer with the estimator described by `cfg.flow`.
    pub fn new(cfg: &MorphConfig) -> Self {
        Self::with_estimator(cfg, FlowEstimator::from_config(&cfg.flow))
    }

    /// Sequencer with an explicit estimator.
    pub fn with_estimator(cfg: &MorphConfig, estimator: FlowEstimator) -> Self {
        Self {
            cfg: cfg.clone(),
            estimator,
        }
    }

    /// Configuration this sequencer renders with.
    pub fn config(&self) -> &MorphConfig {
        &self.cfg
    }

    /// Both flow directions and the mask for one pair.
    ///
    /// Errors here mean the pair's transition should be a plain cross-dissolve.
    pub fn pair_flows(&self, a: &RgbImage, b: &RgbImage) -> MorphResult<PairFlows> {
        let ga = GrayFrame::from_rgb(a);
        let gb = GrayFrame::from_rgb(b);
        let (forward, backward) = rayon::join(
            || self.estimator.estimate(&ga, &gb),
            || self.estimator.estimate(&gb, &ga),
        );
        let (forward, backward) = (forward?, backward?);
        tracing::debug!(
            forward = forward.algorithm,
            backward = backward.algorithm,
            "pair flows estimated"
        );
        PairFlows::new(forward.field, backward.field, &self.cfg.mask)
    }

    /// Render the whole cyclic loop of `images` into `sink`.
    ///
    /// The sink is begun and closed here. A sink or blending error aborts the loop; a flow
    /// failure only degrades the affected transition.
    pub fn render(&self, images: &[RgbImage], sink: &mut dyn FrameSink) -> MorphResult<LoopStats> {
        let (w, h) = (self.cfg.width, self.cfg.height);
        if let Some(bad) = images.iter().find(|img| img.dimensions() != (w, h)) {
            return Err(MorphError::validation(format!(
                "prepared image is {}x{}, expected {w}x{h}",
                bad.width(),
                bad.height()
            )));
        }
        let schedule = LoopSchedule::new(images.len(), &self.cfg)?;

        sink.begin(SinkConfig {
            width: w,
            height: h,
            fps: self.cfg.fps,
        })?;

        let mut stats = LoopStats::default();
        let mut state = LoopState::Idle;
        for segment in schedule.segments() {
            let next = LoopState::entering(segment);
            tracing::trace!(from = ?state, to = ?next, "loop state");
            state = next;

            match *segment {
                Segment::Hold { image, frames } => {
                    for _ in 0..frames {
                        sink.write(&images[image])?;
                    }
                    stats.hold_frames += u64::from(frames);
                }
                Segment::Transition { from, to, frames } => {
                    let (a, b) = (&images[from], &images[to]);
                    let flows = match self.pair_flows(a, b) {
                        Ok(flows) => Some(flows),
                        Err(err) => {
                            tracing::warn!(
                                pair = %format!("{from}->{to}"),
                                error = %err,
                                "flow unavailable; cross-dissolving this transition"
                            );
                            stats.degraded_transitions += 1;
                            None
                        }
                    };
                    for k in 0..frames {
                        let frame = interpolate(a, b, flows.as_ref(), transition_time(k, frames))?;
                        sink.write(&frame)?;
                    }
                    stats.transition_frames += u64::from(frames);
                    stats.transitions += 1;
                }
            }
        }
        tracing::trace!(from = ?state, to = ?LoopState::Done, "loop state");

        sink.close()?;
        stats.frames_written = stats.hold_frames + stats.transition_frames;
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/sequencer.rs"]
mod tests;
