use crate::config::MaskConfig;
use crate::effects::blur::gaussian_blur_plane;
use crate::flow::field::FlowField;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::sigma_for_kernel;

/// Per-pixel flow confidence in `[0, 1]`, derived from a forward/backward flow pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsistencyMask {
    /// Mask width in pixels.
    pub width: u32,
    /// Mask height in pixels.
    pub height: u32,
    /// Row-major confidence values.
    pub values: Vec<f32>,
}

impl ConsistencyMask {
    /// Confidence at an integer pixel.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Fraction of pixels at or above 0.5 confidence.
    pub fn confident_ratio(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let n = self.values.iter().filter(|v| **v >= 0.5).count();
        n as f32 / self.values.len() as f32
    }
}

/// Forward-backward consistency check.
///
/// Each pixel follows `forward` into the other frame, picks up the (interpolated) `backward`
/// vector there and adds the two. A round trip that lands within `fb_max_px_err` pixels of
/// the origin is confident. The binary result is softened with a Gaussian of
/// `blur_kernel` taps (bumped to odd) and clamped to `[0, 1]`.
pub fn consistency_mask(
    forward: &FlowField,
    backward: &FlowField,
    cfg: &MaskConfig,
) -> MorphResult<ConsistencyMask> {
    if forward.dimensions() != backward.dimensions() {
        return Err(MorphError::validation(format!(
            "flow sizes differ: {:?} vs {:?}",
            forward.dimensions(),
            backward.dimensions()
        )));
    }
    let (w, h) = (forward.width as usize, forward.height as usize);
    let tol = cfg.fb_max_px_err;

    let binary: Vec<f32> = forward
        .vectors
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let px = (i % w) as f32 + f[0];
            let py = (i / w) as f32 + f[1];
            let b = backward.sample(px, py);
            let err = (f[0] + b[0]).hypot(f[1] + b[1]);
            if err <= tol { 1.0 } else { 0.0 }
        })
        .collect();

    let values = if cfg.blur_kernel > 1 && !binary.is_empty() {
        let k = (cfg.blur_kernel | 1) as usize;
        gaussian_blur_plane(&binary, w, h, k / 2, sigma_for_kernel(k))?
    } else {
        binary
    };

    Ok(ConsistencyMask {
        width: forward.width,
        height: forward.height,
        values: values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/consistency.rs"]
mod tests;
