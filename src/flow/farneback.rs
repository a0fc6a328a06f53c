use crate::effects::blur::{box_blur_plane, gaussian_kernel};
use crate::flow::field::FlowField;
use crate::flow::gray::GrayFrame;
use crate::flow::FlowAlgorithm;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::{Border, bilinear_taps, invert_6x6, reflect101, solve_sym2};

/// Pyramidal dense flow by polynomial expansion.
///
/// Each pixel neighbourhood is approximated by a quadratic polynomial; displacement is
/// read off how the linear coefficients change between frames, averaged over a window
/// and refined over a few iterations per pyramid level.
#[derive(Clone, Debug)]
pub struct FarnebackFlow {
    /// Number of pyramid levels (each half the size of the previous one).
    pub pyramid_levels: u32,
    /// Neighbourhood radius used for the polynomial fit.
    pub poly_n: usize,
    /// Gaussian applicability sigma for the polynomial fit.
    pub poly_sigma: f32,
    /// Averaging window side in pixels.
    pub window: usize,
    /// Refinement iterations per level.
    pub iterations: u32,
}

impl FarnebackFlow {
    /// Default parameters for a given pyramid depth.
    pub fn new(pyramid_levels: u32) -> Self {
        Self {
            pyramid_levels,
            poly_n: 7,
            poly_sigma: 1.5,
            window: 25,
            iterations: 3,
        }
    }
}

impl FlowAlgorithm for FarnebackFlow {
    fn name(&self) -> &'static str {
        "farneback"
    }

    fn compute(&self, a: &GrayFrame, b: &GrayFrame) -> MorphResult<FlowField> {
        if a.dimensions() != b.dimensions() {
            return Err(MorphError::flow("farneback: frame sizes differ"));
        }
        if a.width == 0 || a.height == 0 {
            return Err(MorphError::flow("farneback: empty frame"));
        }
        let expander = PolyExpander::new(self.poly_n, self.poly_sigma)?;

        let pyr_a = a.pyramid(self.pyramid_levels as usize, 8)?;
        let pyr_b = b.pyramid(self.pyramid_levels as usize, 8)?;

        let mut flow: Option<FlowField> = None;
        for (i0, i1) in pyr_a.iter().zip(&pyr_b).rev() {
            let mut level = match flow.take() {
                Some(coarse) => coarse.resized(i0.width, i0.height),
                None => FlowField::zeros(i0.width, i0.height),
            };
            let p0 = expander.expand(i0)?;
            let p1 = expander.expand(i1)?;
            for _ in 0..self.iterations {
                self.update(i0, &p0, &p1, &mut level)?;
            }
            flow = Some(level);
        }

        flow.ok_or_else(|| MorphError::flow("farneback: empty pyramid"))
    }
}

impl FarnebackFlow {
    fn update(
        &self,
        frame: &GrayFrame,
        p0: &[Poly],
        p1: &[Poly],
        flow: &mut FlowField,
    ) -> MorphResult<()> {
        let (w, h) = (frame.w(), frame.h());
        let n = w * h;
        let mut planes = [
            vec![0.0f32; n],
            vec![0.0f32; n],
            vec![0.0f32; n],
            vec![0.0f32; n],
            vec![0.0f32; n],
        ];

        for i in 0..n {
            let d = flow.vectors[i];
            let x = (i % w) as f32 + d[0];
            let y = (i / w) as f32 + d[1];
            let q = sample_poly(p1, w, h, x, y);
            let r = &p0[i];

            let a11 = 0.5 * (r.a11 + q.a11);
            let a12 = 0.5 * (r.a12 + q.a12);
            let a22 = 0.5 * (r.a22 + q.a22);
            let db1 = -0.5 * (q.b1 - r.b1) + a11 * d[0] + a12 * d[1];
            let db2 = -0.5 * (q.b2 - r.b2) + a12 * d[0] + a22 * d[1];

            planes[0][i] = a11 * a11 + a12 * a12;
            planes[1][i] = a11 * a12 + a12 * a22;
            planes[2][i] = a12 * a12 + a22 * a22;
            planes[3][i] = a11 * db1 + a12 * db2;
            planes[4][i] = a12 * db1 + a22 * db2;
        }

        let radius = self.window / 2;
        let mut smoothed = Vec::with_capacity(planes.len());
        for plane in &planes {
            smoothed.push(box_blur_plane(plane, w, h, radius)?);
        }

        const EPS: f32 = 1e-3;
        for (i, v) in flow.vectors.iter_mut().enumerate() {
            if let Some((dx, dy)) = solve_sym2(
                smoothed[0][i] + EPS,
                smoothed[1][i],
                smoothed[2][i] + EPS,
                smoothed[3][i],
                smoothed[4][i],
            ) {
                *v = [dx, dy];
            }
        }
        Ok(())
    }
}

/// Local quadratic model `x^T A x + b^T x + c` around one pixel (constant term dropped).
#[derive(Clone, Copy, Debug, Default)]
struct Poly {
    b1: f32,
    b2: f32,
    a11: f32,
    a22: f32,
    a12: f32,
}

fn sample_poly(polys: &[Poly], w: usize, h: usize, x: f32, y: f32) -> Poly {
    let taps = bilinear_taps(w, h, x, y, Border::Reflect101);
    let mut out = Poly::default();
    for (&i, wt) in taps.idx.iter().zip(taps.weights) {
        let p = &polys[i];
        out.b1 += wt * p.b1;
        out.b2 += wt * p.b2;
        out.a11 += wt * p.a11;
        out.a22 += wt * p.a22;
        out.a12 += wt * p.a12;
    }
    out
}

/// Weighted least-squares fit of the basis `{1, x, y, x^2, y^2, xy}` over a Gaussian window.
struct PolyExpander {
    radius: usize,
    g: Vec<f32>,
    ginv: [[f64; 6]; 6],
}

impl PolyExpander {
    fn new(radius: usize, sigma: f32) -> MorphResult<Self> {
        if radius == 0 {
            return Err(MorphError::flow("farneback: poly_n must be > 0"));
        }
        let g = gaussian_kernel(radius, sigma)?;
        let r = radius as i64;

        let mut gram = [[0.0f64; 6]; 6];
        for y in -r..=r {
            for x in -r..=r {
                let wt = f64::from(g[(x + r) as usize]) * f64::from(g[(y + r) as usize]);
                let (xf, yf) = (x as f64, y as f64);
                let basis = [1.0, xf, yf, xf * xf, yf * yf, xf * yf];
                for i in 0..6 {
                    for j in 0..6 {
                        gram[i][j] += wt * basis[i] * basis[j];
                    }
                }
            }
        }
        let ginv = invert_6x6(gram)
            .ok_or_else(|| MorphError::flow("farneback: singular polynomial basis"))?;
        Ok(Self { radius, g, ginv })
    }

    fn expand(&self, frame: &GrayFrame) -> MorphResult<Vec<Poly>> {
        let (w, h) = (frame.w(), frame.h());
        let r = self.radius as i64;

        // Horizontal moments: sum g(k) * k^p * f(x + k), p = 0, 1, 2.
        let mut h0 = vec![0.0f32; w * h];
        let mut h1 = vec![0.0f32; w * h];
        let mut h2 = vec![0.0f32; w * h];
        for y in 0..h {
            let row = &frame.data[y * w..(y + 1) * w];
            for x in 0..w {
                let (mut s0, mut s1, mut s2) = (0.0f32, 0.0f32, 0.0f32);
                for k in -r..=r {
                    let v = row[reflect101(x as i64 + k, w)] * self.g[(k + r) as usize];
                    let kf = k as f32;
                    s0 += v;
                    s1 += v * kf;
                    s2 += v * kf * kf;
                }
                let i = y * w + x;
                h0[i] = s0;
                h1[i] = s1;
                h2[i] = s2;
            }
        }

        let mut out = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let mut m = [0.0f64; 6];
                for l in -r..=r {
                    let j = reflect101(y as i64 + l, h) * w + x;
                    let gl = f64::from(self.g[(l + r) as usize]);
                    let lf = l as f64;
                    let (v0, v1, v2) = (f64::from(h0[j]), f64::from(h1[j]), f64::from(h2[j]));
                    m[0] += gl * v0;
                    m[1] += gl * v1;
                    m[2] += gl * lf * v0;
                    m[3] += gl * v2;
                    m[4] += gl * lf * lf * v0;
                    m[5] += gl * lf * v1;
                }
                let mut coef = [0.0f64; 6];
                for (i, c) in coef.iter_mut().enumerate() {
                    *c = (0..6).map(|k| self.ginv[i][k] * m[k]).sum();
                }
                out.push(Poly {
                    b1: coef[1] as f32,
                    b2: coef[2] as f32,
                    a11: coef[3] as f32,
                    a22: coef[4] as f32,
                    a12: (coef[5] * 0.5) as f32,
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/farneback.rs"]
mod tests;
