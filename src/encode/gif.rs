use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbImage;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{MorphError, MorphResult};

/// NeuQuant sampling factor: 1 is best quality, 30 fastest.
const QUANT_SPEED: i32 = 10;

/// In-process animated GIF sink, looping forever.
///
/// Each frame gets its own 256-color palette, so gradients band and the output is much
/// larger than an H.264 file of the same loop.
pub struct GifSink {
    out_path: PathBuf,
    overwrite: bool,
    encoder: Option<gif::Encoder<BufWriter<File>>>,
    cfg: Option<SinkConfig>,
    delay: u16,
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("out_path", &self.out_path)
            .field("open", &self.encoder.is_some())
            .finish()
    }
}

impl GifSink {
    /// Sink writing to `out_path`; the file is created in `begin`.
    ///
    /// With `overwrite` unset, `begin` refuses to replace an existing file.
    pub fn new(out_path: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite,
            encoder: None,
            cfg: None,
            delay: 0,
        }
    }

    /// Output path this sink writes.
    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

/// GIF frame delay in hundredths of a second (at least 1).
pub fn frame_delay(fps: u32) -> u16 {
    let cs = (100.0 / f64::from(fps.max(1))).round();
    cs.clamp(1.0, f64::from(u16::MAX)) as u16
}

fn to_u16(v: u32, what: &str) -> MorphResult<u16> {
    u16::try_from(v).map_err(|_| MorphError::validation(format!("gif {what} {v} exceeds 65535")))
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        cfg.validate()?;
        let w = to_u16(cfg.width, "width")?;
        let h = to_u16(cfg.height, "height")?;

        ensure_parent_dir(&self.out_path)?;
        if !self.overwrite && self.out_path.exists() {
            return Err(MorphError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        let file = File::create(&self.out_path)
            .with_context(|| format!("create '{}'", self.out_path.display()))?;
        let mut encoder = gif::Encoder::new(BufWriter::new(file), w, h, &[])
            .map_err(|e| MorphError::encode(format!("gif header: {e}")))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| MorphError::encode(format!("gif loop extension: {e}")))?;

        self.encoder = Some(encoder);
        self.delay = frame_delay(cfg.fps);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn write(&mut self, frame: &RgbImage) -> MorphResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MorphError::encode("gif sink not started"))?;
        cfg.check_frame(frame)?;
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(MorphError::encode("gif sink is already finalized"));
        };

        let mut out = gif::Frame::from_rgb_speed(
            to_u16(cfg.width, "width")?,
            to_u16(cfg.height, "height")?,
            frame.as_raw(),
            QUANT_SPEED,
        );
        out.delay = self.delay;
        encoder
            .write_frame(&out)
            .map_err(|e| MorphError::encode(format!("gif frame: {e}")))?;
        Ok(())
    }

    fn close(&mut self) -> MorphResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| MorphError::encode("gif sink not started"))?;
        let mut writer = encoder
            .into_inner()
            .map_err(|e| MorphError::encode(format!("gif trailer: {e}")))?;
        writer
            .flush()
            .map_err(|e| MorphError::encode(format!("gif flush: {e}")))?;
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
