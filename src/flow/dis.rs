use crate::flow::field::FlowField;
use crate::flow::gray::GrayFrame;
use crate::flow::variational::{VariationalParams, refine};
use crate::flow::FlowAlgorithm;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::solve_sym2;

/// Dense inverse search optical flow.
///
/// Coarse to fine over a Gaussian pyramid: at every level a grid of overlapping patches is
/// aligned independently by inverse-compositional gradient descent, then the patch
/// displacements are blended into a dense field weighted by photometric agreement. An
/// optional variational pass smooths the finest result.
#[derive(Clone, Debug)]
pub struct DisFlow {
    /// Number of pyramid levels (1 = full resolution only).
    pub pyramid_levels: u32,
    /// Square patch side in pixels.
    pub patch_size: usize,
    /// Distance between neighbouring patch origins.
    pub patch_stride: usize,
    /// Gradient-descent iterations per patch.
    pub descent_iterations: u32,
    /// Try neighbouring patch displacements as starting points.
    pub spatial_propagation: bool,
    /// Variational refinement applied at every level, if any.
    pub refinement: Option<VariationalParams>,
}

impl DisFlow {
    /// Fast preset: few descent iterations and no refinement.
    pub fn fast(pyramid_levels: u32) -> Self {
        Self {
            pyramid_levels,
            patch_size: 8,
            patch_stride: 4,
            descent_iterations: 12,
            spatial_propagation: false,
            refinement: None,
        }
    }

    /// Strong-smoothing preset: more descent, spatial propagation and variational refinement.
    pub fn smooth(pyramid_levels: u32) -> Self {
        Self {
            descent_iterations: 40,
            spatial_propagation: true,
            refinement: Some(VariationalParams::default()),
            ..Self::fast(pyramid_levels)
        }
    }

    fn level(
        &self,
        i0: &GrayFrame,
        i1: &GrayFrame,
        init: &FlowField,
    ) -> MorphResult<FlowField> {
        let (w, h) = (i0.w(), i0.h());
        let ps = self.patch_size;
        let (gx, gy) = i0.gradients();

        let xs = patch_origins(w, ps, self.patch_stride);
        let ys = patch_origins(h, ps, self.patch_stride);
        let mut patch_flow = vec![[0.0f32; 2]; xs.len() * ys.len()];

        for (pj, &py) in ys.iter().enumerate() {
            for (pi, &px) in xs.iter().enumerate() {
                let center = init.get((px + ps / 2) as u32, (py + ps / 2) as u32);
                let mut start = center;
                if self.spatial_propagation {
                    let mut best = patch_ssd(i0, i1, px, py, ps, start);
                    let mut candidates = Vec::with_capacity(2);
                    if pi > 0 {
                        candidates.push(patch_flow[pj * xs.len() + pi - 1]);
                    }
                    if pj > 0 {
                        candidates.push(patch_flow[(pj - 1) * xs.len() + pi]);
                    }
                    for cand in candidates {
                        let ssd = patch_ssd(i0, i1, px, py, ps, cand);
                        if ssd < best {
                            best = ssd;
                            start = cand;
                        }
                    }
                }
                patch_flow[pj * xs.len() + pi] =
                    self.align_patch(i0, i1, &gx, &gy, px, py, start);
            }
        }

        densify(i0, i1, init, &xs, &ys, ps, &patch_flow)
    }

    #[allow(clippy::too_many_arguments)]
    fn align_patch(
        &self,
        i0: &GrayFrame,
        i1: &GrayFrame,
        gx: &[f32],
        gy: &[f32],
        px: usize,
        py: usize,
        start: [f32; 2],
    ) -> [f32; 2] {
        let w = i0.w();
        let ps = self.patch_size;
        let (mut hxx, mut hxy, mut hyy) = (0.0f32, 0.0f32, 0.0f32);
        for y in py..py + ps {
            for x in px..px + ps {
                let i = y * w + x;
                hxx += gx[i] * gx[i];
                hxy += gx[i] * gy[i];
                hyy += gy[i] * gy[i];
            }
        }

        let mut u = start;
        for _ in 0..self.descent_iterations {
            let (mut bx, mut by) = (0.0f32, 0.0f32);
            for y in py..py + ps {
                for x in px..px + ps {
                    let i = y * w + x;
                    let r = i1.sample(x as f32 + u[0], y as f32 + u[1]) - i0.data[i];
                    bx += gx[i] * r;
                    by += gy[i] * r;
                }
            }
            // Textureless patches keep their initial hypothesis.
            let Some((dx, dy)) = solve_sym2(hxx, hxy, hyy, bx, by) else {
                break;
            };
            u[0] -= dx;
            u[1] -= dy;
            if dx * dx + dy * dy < 1e-4 {
                break;
            }
        }

        let drift = (u[0] - start[0]).hypot(u[1] - start[1]);
        if !drift.is_finite() || drift > ps as f32 {
            return start;
        }
        u
    }
}

impl FlowAlgorithm for DisFlow {
    fn name(&self) -> &'static str {
        "dis"
    }

    fn compute(&self, a: &GrayFrame, b: &GrayFrame) -> MorphResult<FlowField> {
        if a.dimensions() != b.dimensions() {
            return Err(MorphError::flow("dis: frame sizes differ"));
        }
        if self.patch_size == 0 || self.patch_stride == 0 {
            return Err(MorphError::flow("dis: patch size and stride must be non-zero"));
        }
        let ps = self.patch_size as u32;
        if a.width < ps || a.height < ps {
            return Err(MorphError::flow(format!(
                "dis: frame {}x{} is smaller than the {ps}px patch",
                a.width, a.height
            )));
        }

        let pyr_a = a.pyramid(self.pyramid_levels as usize, 2 * ps)?;
        let pyr_b = b.pyramid(self.pyramid_levels as usize, 2 * ps)?;

        let mut flow: Option<FlowField> = None;
        for (i0, i1) in pyr_a.iter().zip(&pyr_b).rev() {
            let init = match flow.take() {
                Some(coarse) => coarse.resized(i0.width, i0.height),
                None => FlowField::zeros(i0.width, i0.height),
            };
            let mut level = self.level(i0, i1, &init)?;
            if let Some(params) = &self.refinement {
                refine(i0, i1, &mut level, params)?;
            }
            flow = Some(level);
        }

        flow.ok_or_else(|| MorphError::flow("dis: empty pyramid"))
    }
}

/// Patch origins covering `0..len`, with the last patch flush against the far edge.
fn patch_origins(len: usize, patch: usize, stride: usize) -> Vec<usize> {
    let last = len - patch;
    let mut out: Vec<usize> = (0..=last).step_by(stride).collect();
    if out.last() != Some(&last) {
        out.push(last);
    }
    out
}

fn patch_ssd(
    i0: &GrayFrame,
    i1: &GrayFrame,
    px: usize,
    py: usize,
    ps: usize,
    u: [f32; 2],
) -> f32 {
    let w = i0.w();
    let mut acc = 0.0f32;
    for y in py..py + ps {
        for x in px..px + ps {
            let d = i1.sample(x as f32 + u[0], y as f32 + u[1]) - i0.data[y * w + x];
            acc += d * d;
        }
    }
    acc
}

fn densify(
    i0: &GrayFrame,
    i1: &GrayFrame,
    init: &FlowField,
    xs: &[usize],
    ys: &[usize],
    ps: usize,
    patch_flow: &[[f32; 2]],
) -> MorphResult<FlowField> {
    let (w, h) = (i0.w(), i0.h());
    let mut acc = vec![[0.0f32; 2]; w * h];
    let mut weight = vec![0.0f32; w * h];

    for (pj, &py) in ys.iter().enumerate() {
        for (pi, &px) in xs.iter().enumerate() {
            let u = patch_flow[pj * xs.len() + pi];
            for y in py..py + ps {
                for x in px..px + ps {
                    let i = y * w + x;
                    let diff = (i1.sample(x as f32 + u[0], y as f32 + u[1]) - i0.data[i]).abs();
                    let lambda = 1.0 / diff.max(1.0);
                    acc[i][0] += lambda * u[0];
                    acc[i][1] += lambda * u[1];
                    weight[i] += lambda;
                }
            }
        }
    }

    let vectors = acc
        .iter()
        .zip(&weight)
        .zip(&init.vectors)
        .map(|((a, &wt), fallback)| {
            if wt > 0.0 {
                [a[0] / wt, a[1] / wt]
            } else {
                *fallback
            }
        })
        .collect();
    FlowField::from_vectors(i0.width, i0.height, vectors)
}

#[cfg(test)]
#[path = "../../tests/unit/flow/dis.rs"]
mod tests;
