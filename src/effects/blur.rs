use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::reflect101;

/// Separable Gaussian blur of a single-channel f32 plane with reflect-101 borders.
pub fn gaussian_blur_plane(
    src: &[f32],
    width: usize,
    height: usize,
    radius: usize,
    sigma: f32,
) -> MorphResult<Vec<f32>> {
    check_plane(src, width, height)?;
    if radius == 0 {
        return Ok(src.to_vec());
    }
    let kernel = gaussian_kernel(radius, sigma)?;
    Ok(separable(src, width, height, &kernel))
}

/// Separable box (mean) filter of a single-channel f32 plane with reflect-101 borders.
pub fn box_blur_plane(
    src: &[f32],
    width: usize,
    height: usize,
    radius: usize,
) -> MorphResult<Vec<f32>> {
    check_plane(src, width, height)?;
    if radius == 0 {
        return Ok(src.to_vec());
    }
    let taps = 2 * radius + 1;
    let kernel = vec![1.0 / taps as f32; taps];
    Ok(separable(src, width, height, &kernel))
}

fn check_plane(src: &[f32], width: usize, height: usize) -> MorphResult<()> {
    let expected = width
        .checked_mul(height)
        .ok_or_else(|| MorphError::validation("blur buffer size overflow"))?;
    if src.len() != expected || expected == 0 {
        return Err(MorphError::validation(
            "blur expects a non-empty plane matching width*height",
        ));
    }
    Ok(())
}

pub(crate) fn gaussian_kernel(radius: usize, sigma: f32) -> MorphResult<Vec<f32>> {
    if radius == 0 {
        return Ok(vec![1.0]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(MorphError::validation("blur sigma must be > 0"));
    }

    let r = radius as i64;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(MorphError::validation("gaussian kernel sum is zero"));
    }
    Ok(weights.into_iter().map(|w| (w / sum) as f32).collect())
}

fn separable(src: &[f32], width: usize, height: usize, k: &[f32]) -> Vec<f32> {
    let mut tmp = vec![0.0f32; src.len()];
    let mut out = vec![0.0f32; src.len()];
    horizontal_pass(src, &mut tmp, width, height, k);
    vertical_pass(&tmp, &mut out, width, height, k);
    out
}

fn horizontal_pass(src: &[f32], dst: &mut [f32], width: usize, height: usize, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0f32;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = reflect101(x as i64 + ki as i64 - radius, width);
                acc += kw * row[sx];
            }
            dst[y * width + x] = acc;
        }
    }
}

fn vertical_pass(src: &[f32], dst: &mut [f32], width: usize, height: usize, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = reflect101(y as i64 + ki as i64 - radius, height);
                acc += kw * src[sy * width + x];
            }
            dst[y * width + x] = acc;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
