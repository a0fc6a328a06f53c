use image::RgbImage;
use rayon::prelude::*;

use crate::config::MaskConfig;
use crate::effects::consistency::{ConsistencyMask, consistency_mask};
use crate::flow::field::FlowField;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::{Border, bilinear_taps, clamp_u8};

/// Both flow directions of one frame pair plus their consistency mask.
///
/// Computed once per transition and reused for every interpolated frame of it.
#[derive(Clone, Debug)]
pub struct PairFlows {
    /// Flow from the first endpoint to the second.
    pub forward: FlowField,
    /// Flow from the second endpoint back to the first.
    pub backward: FlowField,
    /// Forward-backward confidence.
    pub mask: ConsistencyMask,
}

impl PairFlows {
    /// Bundle a flow pair and derive its consistency mask.
    pub fn new(forward: FlowField, backward: FlowField, cfg: &MaskConfig) -> MorphResult<Self> {
        let mask = consistency_mask(&forward, &backward, cfg)?;
        Ok(Self {
            forward,
            backward,
            mask,
        })
    }
}

/// Time weight for the second endpoint at confidence `m`.
///
/// Starts from the plain linear weight `t` and pulls it a quarter of the way toward 0.5
/// where the flow is trusted.
pub fn blend_weight(t: f32, m: f32) -> f32 {
    t * (1.0 - 0.25 * m) + 0.5 * (0.25 * m)
}

/// Plain linear mix `(1 - t) * a + t * b`, rounded to nearest.
pub fn cross_dissolve(a: &RgbImage, b: &RgbImage, t: f32) -> MorphResult<RgbImage> {
    check_same_size(a, b)?;
    if !t.is_finite() {
        return Err(MorphError::validation("blend time must be finite"));
    }
    let data = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&pa, &pb)| clamp_u8(f32::from(pa) * (1.0 - t) + f32::from(pb) * t))
        .collect();
    to_image(a.width(), a.height(), data)
}

/// Backward-warp `img` along `scale * flow`: output `(x, y)` samples `img` at
/// `(x, y) + scale * flow(x, y)` with bilinear filtering and
/// edge-repeating reflected borders (`fedcba|abcdef`).
pub fn warp_image(img: &RgbImage, flow: &FlowField, scale: f32) -> MorphResult<RgbImage> {
    if img.dimensions() != flow.dimensions() {
        return Err(MorphError::validation(format!(
            "image {:?} and flow {:?} sizes differ",
            img.dimensions(),
            flow.dimensions()
        )));
    }
    let (w, h) = (img.width() as usize, img.height() as usize);
    let src = img.as_raw();
    let mut out = vec![0u8; w * h * 3];
    if w == 0 || h == 0 {
        return to_image(img.width(), img.height(), out);
    }

    out.par_chunks_mut(w * 3).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let v = flow.vectors[y * w + x];
            let sx = x as f32 + v[0] * scale;
            let sy = y as f32 + v[1] * scale;
            let taps = bilinear_taps(w, h, sx, sy, Border::Reflect);
            for c in 0..3 {
                let acc: f32 = taps
                    .idx
                    .iter()
                    .zip(taps.weights)
                    .map(|(&i, wt)| f32::from(src[i * 3 + c]) * wt)
                    .sum();
                row[x * 3 + c] = clamp_u8(acc);
            }
        }
    });
    to_image(img.width(), img.height(), out)
}

/// Synthesize the in-between frame at time `t` (strictly inside `(0, 1)`).
///
/// Without flows this is a cross-dissolve. With flows, `a` is warped by `t * forward`, `b`
/// by `(1 - t) * backward`, and the two are mixed per pixel with [`blend_weight`] driven by
/// the consistency mask.
pub fn interpolate(
    a: &RgbImage,
    b: &RgbImage,
    flows: Option<&PairFlows>,
    t: f32,
) -> MorphResult<RgbImage> {
    if !(t > 0.0 && t < 1.0) {
        return Err(MorphError::validation(format!(
            "interpolation time must be in (0, 1), got {t}"
        )));
    }
    check_same_size(a, b)?;
    let Some(flows) = flows else {
        return cross_dissolve(a, b, t);
    };
    if flows.mask.width != a.width() || flows.mask.height != a.height() {
        return Err(MorphError::validation("flow pair does not match frame size"));
    }

    let a_w = warp_image(a, &flows.forward, t)?;
    let b_w = warp_image(b, &flows.backward, 1.0 - t)?;

    let w = a.width() as usize;
    let mask = &flows.mask.values;
    let (pa, pb) = (a_w.as_raw(), b_w.as_raw());
    let mut out = vec![0u8; pa.len()];
    if w > 0 {
        out.par_chunks_mut(w * 3).enumerate().for_each(|(y, row)| {
            for x in 0..w {
                let wt = blend_weight(t, mask[y * w + x]);
                let base = (y * w + x) * 3;
                for c in 0..3 {
                    let v = f32::from(pa[base + c]) * (1.0 - wt) + f32::from(pb[base + c]) * wt;
                    row[x * 3 + c] = clamp_u8(v);
                }
            }
        });
    }
    to_image(a.width(), a.height(), out)
}

fn check_same_size(a: &RgbImage, b: &RgbImage) -> MorphResult<()> {
    if a.dimensions() != b.dimensions() {
        return Err(MorphError::validation(format!(
            "endpoint sizes differ: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    Ok(())
}

fn to_image(width: u32, height: u32, data: Vec<u8>) -> MorphResult<RgbImage> {
    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| MorphError::validation("pixel buffer does not match frame size"))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
