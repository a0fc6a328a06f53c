use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{MorphError, MorphResult};

/// Full, immutable configuration for one loopmorph run.
///
/// Built once (defaults, optionally overlaid by a JSON file and CLI flags) and passed by
/// reference into the estimator, sequencer and batch runner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MorphConfig {
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels. Must equal `width`.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
    /// How long each still is held before morphing starts.
    pub hold_secs: f64,
    /// Duration of each morph between consecutive stills.
    pub transition_secs: f64,
    /// Optical-flow settings.
    pub flow: FlowConfig,
    /// Forward-backward consistency mask settings.
    pub mask: MaskConfig,
    /// External encoder settings.
    pub encoder: EncoderConfig,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            fps: 30,
            hold_secs: 0.5,
            transition_secs: 1.0,
            flow: FlowConfig::default(),
            mask: MaskConfig::default(),
            encoder: EncoderConfig::default(),
        }
    }
}

/// Which dense-flow algorithm is tried first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowAlgorithmKind {
    /// Dense inverse search with pyramid refinement.
    Dis,
    /// Polynomial-expansion pyramidal flow.
    Farneback,
}

impl FlowAlgorithmKind {
    /// The other algorithm, used as the retry target.
    pub fn alternate(self) -> Self {
        match self {
            Self::Dis => Self::Farneback,
            Self::Farneback => Self::Dis,
        }
    }
}

/// Optical-flow estimator settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Primary algorithm.
    pub algorithm: FlowAlgorithmKind,
    /// Retry once with the alternate algorithm when the primary fails.
    pub retry: bool,
    /// Number of pyramid levels used for coarse-to-fine refinement.
    pub pyramid_levels: u32,
    /// Extra descent iterations plus variational refinement for smoother fields.
    pub strong_smoothing: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            algorithm: FlowAlgorithmKind::Dis,
            retry: true,
            pyramid_levels: 3,
            strong_smoothing: true,
        }
    }
}

/// Consistency-mask settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskConfig {
    /// Maximum forward-backward residual (pixels) for a pixel to count as confident.
    pub fb_max_px_err: f32,
    /// Gaussian kernel size used to soften the binary mask. Values <= 1 disable blurring.
    pub blur_kernel: u32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            fb_max_px_err: 1.5,
            blur_kernel: 7,
        }
    }
}

/// External `ffmpeg` encoder settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Encoder executable, looked up on `PATH` unless absolute.
    pub program: String,
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
    /// Maximum distance between keyframes, in seconds.
    pub keyframe_secs: f64,
    /// Overwrite existing outputs.
    pub overwrite: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            crf: 22,
            preset: "veryfast".to_string(),
            keyframe_secs: 2.0,
            overwrite: true,
        }
    }
}

impl EncoderConfig {
    /// Keyframe interval in frames for a given frame rate (at least 1).
    pub fn keyframe_interval(&self, fps: u32) -> u32 {
        ((f64::from(fps) * self.keyframe_secs).round() as u32).max(1)
    }
}

impl MorphConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> MorphResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text and validate it.
    pub fn from_json_str(text: &str) -> MorphResult<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| MorphError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants every downstream stage relies on.
    pub fn validate(&self) -> MorphResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MorphError::validation("resolution must be non-zero"));
        }
        if self.width != self.height {
            return Err(MorphError::validation(format!(
                "resolution must be square, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(MorphError::validation("fps must be non-zero"));
        }
        for (name, v) in [
            ("hold_secs", self.hold_secs),
            ("transition_secs", self.transition_secs),
            ("encoder.keyframe_secs", self.encoder.keyframe_secs),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(MorphError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if !(1..=8).contains(&self.flow.pyramid_levels) {
            return Err(MorphError::validation(
                "flow.pyramid_levels must be in 1..=8",
            ));
        }
        if !self.mask.fb_max_px_err.is_finite() || self.mask.fb_max_px_err <= 0.0 {
            return Err(MorphError::validation(
                "mask.fb_max_px_err must be finite and > 0",
            ));
        }
        if self.encoder.crf > 51 {
            return Err(MorphError::validation("encoder.crf must be <= 51"));
        }
        if self.encoder.program.trim().is_empty() {
            return Err(MorphError::validation("encoder.program must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
