use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage, imageops::FilterType};

use crate::foundation::error::{MorphError, MorphResult};

/// Normalize a decoded image into an opaque `size x size` RGB frame.
///
/// Alpha is composited over white, grayscale is expanded to three channels, the largest
/// centered square is kept and the result is resampled with a Lanczos filter.
pub fn prepare(raw: &DynamicImage, size: u32) -> MorphResult<RgbImage> {
    if raw.width() == 0 || raw.height() == 0 {
        return Err(MorphError::validation("cannot prepare an empty image"));
    }
    if size == 0 {
        return Err(MorphError::validation("target size must be non-zero"));
    }

    let flat = flatten_on_white(raw);
    let square = center_square(&flat);
    if square.width() == size {
        return Ok(square);
    }
    Ok(image::imageops::resize(
        &square,
        size,
        size,
        FilterType::Lanczos3,
    ))
}

/// Drop alpha by compositing onto a white background. Luma inputs become gray RGB.
pub fn flatten_on_white(raw: &DynamicImage) -> RgbImage {
    if !raw.color().has_alpha() {
        return raw.to_rgb8();
    }

    let rgba = raw.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = Vec::with_capacity((w as usize) * (h as usize) * 3);
    for px in rgba.pixels() {
        let a = u32::from(px[3]);
        let inv = 255 - a;
        for c in 0..3 {
            let v = (u32::from(px[c]) * a + 255 * inv + 127) / 255;
            out.push(v.min(255) as u8);
        }
    }
    RgbImage::from_raw(w, h, out).unwrap_or_else(|| RgbImage::new(w, h))
}

/// Crop to the largest square centered in `img`.
pub fn center_square(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let side = w.min(h);
    if w == h {
        return img.clone();
    }
    let x0 = (w - side) / 2;
    let y0 = (h - side) / 2;
    image::imageops::crop_imm(img, x0, y0, side, side).to_image()
}

/// Decode and prepare one image from disk.
///
/// Missing and undecodable files are both reported as [`MorphError::Decode`] with distinct
/// reasons so callers can skip the entry and continue.
pub fn load_prepared(path: &Path, size: u32) -> MorphResult<RgbImage> {
    if !path.is_file() {
        return Err(MorphError::decode(path, "missing file"));
    }
    let raw = image::open(path).map_err(|e| MorphError::decode(path, format!("unreadable: {e}")))?;
    prepare(&raw, size).map_err(|e| MorphError::decode(path, e.to_string()))
}

/// Prepared images for one group plus the entries that had to be skipped.
#[derive(Debug, Default)]
pub struct PreparedGroup {
    /// Successfully prepared frames, in input order.
    pub images: Vec<RgbImage>,
    /// Paths that were skipped, with the reason.
    pub skipped: Vec<(PathBuf, MorphError)>,
}

/// Load every path in order, skipping (and logging) the ones that fail.
pub fn load_group(paths: &[PathBuf], size: u32) -> PreparedGroup {
    let mut group = PreparedGroup::default();
    for path in paths {
        match load_prepared(path, size) {
            Ok(img) => group.images.push(img),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping source image");
                group.skipped.push((path.clone(), err));
            }
        }
    }
    group
}

#[cfg(test)]
#[path = "../../tests/unit/prep/decode.rs"]
mod tests;
