use crate::config::MorphConfig;
use crate::foundation::error::{MorphError, MorphResult};

/// Minimum hold, in seconds, when a group has a single image.
pub const SINGLE_IMAGE_MIN_HOLD_SECS: f64 = 2.0;

/// One contiguous run of output frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    /// `frames` unmodified copies of image `image`.
    Hold {
        /// Index into the group's image list.
        image: usize,
        /// Frame count (may be 0).
        frames: u32,
    },
    /// `frames` interpolated frames from image `from` to image `to`.
    Transition {
        /// Start image index.
        from: usize,
        /// End image index.
        to: usize,
        /// Frame count (at least 1).
        frames: u32,
    },
}

impl Segment {
    /// Number of frames this segment emits.
    pub fn frames(&self) -> u32 {
        match *self {
            Self::Hold { frames, .. } | Self::Transition { frames, .. } => frames,
        }
    }
}

/// Frames for a hold of `secs` at `fps`, rounded to nearest and floored at 0.
pub fn hold_frame_count(fps: u32, secs: f64) -> u32 {
    seconds_to_frames(fps, secs)
}

/// Frames for a transition of `secs` at `fps`, rounded to nearest and floored at 1.
pub fn transition_frame_count(fps: u32, secs: f64) -> u32 {
    seconds_to_frames(fps, secs).max(1)
}

fn seconds_to_frames(fps: u32, secs: f64) -> u32 {
    let frames = (f64::from(fps) * secs).round();
    if frames.is_nan() || frames <= 0.0 {
        0
    } else {
        frames.min(f64::from(u32::MAX)) as u32
    }
}

/// Blend time of transition frame `k` out of `frames`: `(k + 0.5) / frames`.
///
/// Never 0 or 1, so no interpolated frame duplicates a hold frame.
pub fn transition_time(k: u32, frames: u32) -> f32 {
    ((f64::from(k) + 0.5) / f64::from(frames.max(1))) as f32
}

/// Ordered segment list for one cyclic group, computed once and then read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopSchedule {
    segments: Vec<Segment>,
}

impl LoopSchedule {
    /// Schedule `image_count` images: hold then transition for each cyclic pair, the last
    /// pair wrapping back to image 0. A single image gets one extended hold instead.
    pub fn new(image_count: usize, cfg: &MorphConfig) -> MorphResult<Self> {
        let segments = match image_count {
            0 => return Err(MorphError::validation("cannot schedule an empty image list")),
            1 => vec![Segment::Hold {
                image: 0,
                frames: hold_frame_count(cfg.fps, cfg.hold_secs.max(SINGLE_IMAGE_MIN_HOLD_SECS)),
            }],
            n => {
                let hold = hold_frame_count(cfg.fps, cfg.hold_secs);
                let transition = transition_frame_count(cfg.fps, cfg.transition_secs);
                (0..n)
                    .flat_map(|i| {
                        [
                            Segment::Hold {
                                image: i,
                                frames: hold,
                            },
                            Segment::Transition {
                                from: i,
                                to: (i + 1) % n,
                                frames: transition,
                            },
                        ]
                    })
                    .collect()
            }
        };
        Ok(Self { segments })
    }

    /// Segments in playback order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total number of frames the loop emits.
    pub fn total_frames(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.frames())).sum()
    }

    /// Number of transition segments.
    pub fn transition_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Transition { .. }))
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/schedule.rs"]
mod tests;
