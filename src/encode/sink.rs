use image::RgbImage;

use crate::foundation::error::{MorphError, MorphResult};

/// Stream geometry handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback frames per second.
    pub fps: u32,
}

impl SinkConfig {
    /// Reject zero-sized or zero-rate streams.
    pub fn validate(&self) -> MorphResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MorphError::validation("sink width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(MorphError::validation("sink fps must be non-zero"));
        }
        Ok(())
    }

    /// Fail unless `frame` matches the configured geometry.
    pub fn check_frame(&self, frame: &RgbImage) -> MorphResult<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(MorphError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// Destination for loop frames.
///
/// Ordering contract: `begin` once, then `write` in playback order, then `close` once.
/// `close` returns only after the output is complete.
pub trait FrameSink: Send {
    /// Called once before any frames are written.
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()>;
    /// Append one frame.
    fn write(&mut self, frame: &RgbImage) -> MorphResult<()>;
    /// Flush and finalize the output.
    fn close(&mut self) -> MorphResult<()>;
}

/// Sink that keeps every frame in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<RgbImage>,
    closed: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in write order.
    pub fn frames(&self) -> &[RgbImage] {
        &self.frames
    }

    /// Take ownership of the captured frames.
    pub fn into_frames(self) -> Vec<RgbImage> {
        self.frames
    }

    /// Whether `close` has been called since the last `begin`.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.closed = false;
        Ok(())
    }

    fn write(&mut self, frame: &RgbImage) -> MorphResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MorphError::encode("in-memory sink not started"))?;
        if self.closed {
            return Err(MorphError::encode("in-memory sink is already closed"));
        }
        cfg.check_frame(frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> MorphResult<()> {
        if self.cfg.is_none() {
            return Err(MorphError::encode("in-memory sink not started"));
        }
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
