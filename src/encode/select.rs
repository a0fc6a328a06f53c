use std::path::{Path, PathBuf};

use crate::config::EncoderConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_encoder_on_path};
use crate::encode::gif::GifSink;
use crate::encode::sink::FrameSink;
use crate::foundation::error::MorphResult;

/// Which encoder backs a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderKind {
    /// External `ffmpeg` process, H.264 MP4.
    Ffmpeg,
    /// In-process animated GIF.
    Gif,
    /// Caller-provided sink (tests, embedding).
    Custom,
}

impl std::fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Gif => "gif",
            Self::Custom => "custom",
        })
    }
}

/// A sink ready for `begin`, plus where its output will land.
pub struct OpenedSink {
    /// The sink itself.
    pub sink: Box<dyn FrameSink>,
    /// Encoder behind the sink.
    pub kind: EncoderKind,
    /// Final output path. May differ from the requested one (GIF fallback).
    pub out_path: PathBuf,
    /// Whether the sink may replace a file already at `out_path`.
    ///
    /// When unset, a file present before rendering is never removed on failure.
    pub replaces_existing: bool,
}

impl std::fmt::Debug for OpenedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedSink")
            .field("kind", &self.kind)
            .field("out_path", &self.out_path)
            .field("replaces_existing", &self.replaces_existing)
            .finish()
    }
}

/// Produces one sink per output file.
pub trait SinkFactory: Sync {
    /// Open a sink for the requested output path.
    fn open(&self, requested: &Path) -> MorphResult<OpenedSink>;
}

/// Chooses `ffmpeg` when it can be run, else the GIF fallback.
#[derive(Clone, Debug)]
pub struct EncoderSelector {
    encoder: EncoderConfig,
    external_available: bool,
}

impl EncoderSelector {
    /// Probe the configured encoder binary once.
    pub fn detect(encoder: &EncoderConfig) -> Self {
        let external_available = is_encoder_on_path(&encoder.program);
        if !external_available {
            tracing::warn!(
                program = %encoder.program,
                "external encoder not found; falling back to animated GIF output, which is lossy and not a browser-friendly video container"
            );
        }
        Self::with_availability(encoder, external_available)
    }

    /// Selector with a known availability, skipping the probe.
    pub fn with_availability(encoder: &EncoderConfig, external_available: bool) -> Self {
        Self {
            encoder: encoder.clone(),
            external_available,
        }
    }

    /// Encoder new sinks will use.
    pub fn kind(&self) -> EncoderKind {
        if self.external_available {
            EncoderKind::Ffmpeg
        } else {
            EncoderKind::Gif
        }
    }
}

impl SinkFactory for EncoderSelector {
    fn open(&self, requested: &Path) -> MorphResult<OpenedSink> {
        match self.kind() {
            EncoderKind::Ffmpeg => {
                let opts =
                    FfmpegSinkOpts::new(requested).with_encoder(self.encoder.clone());
                Ok(OpenedSink {
                    sink: Box::new(FfmpegSink::new(opts)),
                    kind: EncoderKind::Ffmpeg,
                    out_path: requested.to_path_buf(),
                    replaces_existing: self.encoder.overwrite,
                })
            }
            _ => {
                let out_path = gif_fallback_path(requested);
                Ok(OpenedSink {
                    sink: Box::new(GifSink::new(&out_path, self.encoder.overwrite)),
                    kind: EncoderKind::Gif,
                    out_path,
                    replaces_existing: self.encoder.overwrite,
                })
            }
        }
    }
}

/// Where the GIF fallback writes for a requested video path.
pub fn gif_fallback_path(requested: &Path) -> PathBuf {
    requested.with_extension("gif")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/select.rs"]
mod tests;
