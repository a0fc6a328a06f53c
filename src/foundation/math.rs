/// Reflect an out-of-range coordinate back into `0..size` without repeating the edge sample
/// (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect101(coord: i64, size: usize) -> usize {
    if size <= 1 {
        return 0;
    }
    let n = size as i64;
    let period = 2 * n - 2;
    let c = coord.rem_euclid(period);
    (if c >= n { period - c } else { c }) as usize
}

/// Reflect an out-of-range coordinate back into `0..size`, repeating the edge sample
/// (`fedcba|abcdefgh|hgfedcb`).
pub(crate) fn reflect(coord: i64, size: usize) -> usize {
    if size <= 1 {
        return 0;
    }
    let n = size as i64;
    let c = coord.rem_euclid(2 * n);
    (if c >= n { 2 * n - 1 - c } else { c }) as usize
}

/// How sampling folds coordinates that fall outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Border {
    /// Mirror including the edge sample.
    Reflect,
    /// Mirror around the edge sample.
    Reflect101,
}

impl Border {
    fn fold(self, coord: i64, size: usize) -> usize {
        match self {
            Self::Reflect => reflect(coord, size),
            Self::Reflect101 => reflect101(coord, size),
        }
    }
}

/// Four source taps and weights for bilinear sampling at a sub-pixel location.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BilinearTaps {
    pub(crate) idx: [usize; 4],
    pub(crate) weights: [f32; 4],
}

/// Compute bilinear taps into a row-major `width * height` grid.
///
/// Non-finite coordinates collapse onto the origin pixel instead of panicking.
pub(crate) fn bilinear_taps(
    width: usize,
    height: usize,
    x: f32,
    y: f32,
    border: Border,
) -> BilinearTaps {
    let (x, y) = if x.is_finite() && y.is_finite() {
        (x, y)
    } else {
        (0.0, 0.0)
    };
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let x0 = x0f as i64;
    let y0 = y0f as i64;

    let xa = border.fold(x0, width);
    let xb = border.fold(x0 + 1, width);
    let ya = border.fold(y0, height);
    let yb = border.fold(y0 + 1, height);

    BilinearTaps {
        idx: [
            ya * width + xa,
            ya * width + xb,
            yb * width + xa,
            yb * width + xb,
        ],
        weights: [
            (1.0 - fx) * (1.0 - fy),
            fx * (1.0 - fy),
            (1.0 - fx) * fy,
            fx * fy,
        ],
    }
}

/// Sample a single-channel f32 plane bilinearly with reflect-101 borders.
pub(crate) fn sample_plane(plane: &[f32], width: usize, height: usize, x: f32, y: f32) -> f32 {
    let taps = bilinear_taps(width, height, x, y, Border::Reflect101);
    taps.idx
        .iter()
        .zip(taps.weights)
        .map(|(&i, w)| plane[i] * w)
        .sum()
}

/// Round and saturate a float sample to u8.
pub(crate) fn clamp_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Gaussian sigma implied by an odd kernel size when no explicit sigma is given.
pub(crate) fn sigma_for_kernel(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Solve the symmetric 2x2 system `[a11 a12; a12 a22] x = [b1 b2]`.
///
/// Returns `None` when the system is (numerically) singular.
pub(crate) fn solve_sym2(a11: f32, a12: f32, a22: f32, b1: f32, b2: f32) -> Option<(f32, f32)> {
    let det = a11 * a22 - a12 * a12;
    if !det.is_finite() || det.abs() <= 1e-9 {
        return None;
    }
    Some(((a22 * b1 - a12 * b2) / det, (a11 * b2 - a12 * b1) / det))
}

/// Invert a small dense matrix with Gauss-Jordan elimination and partial pivoting.
pub(crate) fn invert_6x6(m: [[f64; 6]; 6]) -> Option<[[f64; 6]; 6]> {
    let mut a = m;
    let mut inv = [[0.0f64; 6]; 6];
    for (i, row) in inv.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for col in 0..6 {
        let pivot = (col..6).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let p = a[col][col];
        for k in 0..6 {
            a[col][k] /= p;
            inv[col][k] /= p;
        }
        for r in 0..6 {
            if r == col {
                continue;
            }
            let f = a[r][col];
            if f == 0.0 {
                continue;
            }
            for k in 0..6 {
                a[r][k] -= f * a[col][k];
                inv[r][k] -= f * inv[col][k];
            }
        }
    }
    Some(inv)
}
