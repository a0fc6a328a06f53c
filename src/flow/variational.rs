use crate::flow::field::FlowField;
use crate::flow::gray::GrayFrame;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::{reflect101, solve_sym2};

/// Weights for the variational refinement energy.
///
/// `alpha` weighs smoothness, `delta` brightness constancy and `gamma` gradient constancy.
#[derive(Clone, Debug, PartialEq)]
pub struct VariationalParams {
    /// Smoothness weight.
    pub alpha: f32,
    /// Brightness-constancy weight.
    pub delta: f32,
    /// Gradient-constancy weight.
    pub gamma: f32,
    /// Outer (re-linearization) iterations.
    pub fixed_point_iterations: u32,
    /// Inner relaxation sweeps per outer iteration.
    pub inner_iterations: u32,
}

impl Default for VariationalParams {
    fn default() -> Self {
        Self {
            alpha: 20.0,
            delta: 5.0,
            gamma: 10.0,
            fixed_point_iterations: 5,
            inner_iterations: 5,
        }
    }
}

/// Refine `flow` in place by minimizing a linearized data + smoothness energy.
pub(crate) fn refine(
    i0: &GrayFrame,
    i1: &GrayFrame,
    flow: &mut FlowField,
    params: &VariationalParams,
) -> MorphResult<()> {
    if i0.dimensions() != i1.dimensions() || flow.dimensions() != i0.dimensions() {
        return Err(MorphError::flow("variational refinement: size mismatch"));
    }
    let (w, h) = (i0.w(), i0.h());
    let n = w * h;
    let (g0x, g0y) = i0.gradients();
    let (alpha, delta, gamma) = (params.alpha, params.delta, params.gamma);

    for _ in 0..params.fixed_point_iterations {
        let warped = i1.warped(flow)?;
        let (ix, iy) = warped.gradients();
        let gx_frame = GrayFrame {
            width: i0.width,
            height: i0.height,
            data: ix.clone(),
        };
        let gy_frame = GrayFrame {
            width: i0.width,
            height: i0.height,
            data: iy.clone(),
        };
        let (ixx, ixy) = gx_frame.gradients();
        let (_, iyy) = gy_frame.gradients();

        let mut a11 = vec![0.0f32; n];
        let mut a12 = vec![0.0f32; n];
        let mut a22 = vec![0.0f32; n];
        let mut b1 = vec![0.0f32; n];
        let mut b2 = vec![0.0f32; n];
        for i in 0..n {
            let it = warped.data[i] - i0.data[i];
            let ixt = ix[i] - g0x[i];
            let iyt = iy[i] - g0y[i];
            a11[i] = delta * ix[i] * ix[i] + gamma * (ixx[i] * ixx[i] + ixy[i] * ixy[i]);
            a12[i] = delta * ix[i] * iy[i] + gamma * (ixx[i] * ixy[i] + ixy[i] * iyy[i]);
            a22[i] = delta * iy[i] * iy[i] + gamma * (ixy[i] * ixy[i] + iyy[i] * iyy[i]);
            b1[i] = -(delta * ix[i] * it + gamma * (ixx[i] * ixt + ixy[i] * iyt));
            b2[i] = -(delta * iy[i] * it + gamma * (ixy[i] * ixt + iyy[i] * iyt));
        }

        // Gauss-Seidel sweeps, updated in place in raster order.
        let mut du = vec![[0.0f32; 2]; n];
        for _ in 0..params.inner_iterations {
            for y in 0..h as i64 {
                for x in 0..w as i64 {
                    let i = (y as usize) * w + x as usize;
                    let mut sum = [0.0f32; 2];
                    for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                        let j = reflect101(ny, h) * w + reflect101(nx, w);
                        sum[0] += flow.vectors[j][0] + du[j][0];
                        sum[1] += flow.vectors[j][1] + du[j][1];
                    }
                    let u = flow.vectors[i];
                    let r1 = b1[i] + alpha * (sum[0] - 4.0 * u[0]);
                    let r2 = b2[i] + alpha * (sum[1] - 4.0 * u[1]);
                    let m11 = a11[i] + 4.0 * alpha;
                    let m22 = a22[i] + 4.0 * alpha;
                    if let Some((dx, dy)) = solve_sym2(m11, a12[i], m22, r1, r2) {
                        du[i] = [dx, dy];
                    }
                }
            }
        }

        for (v, d) in flow.vectors.iter_mut().zip(&du) {
            v[0] += d[0];
            v[1] += d[1];
        }
    }
    Ok(())
}
