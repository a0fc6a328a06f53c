use image::RgbImage;

use crate::effects::blur::gaussian_blur_plane;
use crate::flow::field::FlowField;
use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::{reflect101, sample_plane};

/// Single-channel intensity frame (0..255 floats) used as optical-flow input.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major intensities.
    pub data: Vec<f32>,
}

impl GrayFrame {
    /// BT.601 luma of an RGB frame.
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| 0.299 * f32::from(p[0]) + 0.587 * f32::from(p[1]) + 0.114 * f32::from(p[2]))
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a frame by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// `(width, height)` pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn w(&self) -> usize {
        self.width as usize
    }

    pub(crate) fn h(&self) -> usize {
        self.height as usize
    }

    /// Intensity at an integer pixel with reflect-101 borders.
    pub(crate) fn at(&self, x: i64, y: i64) -> f32 {
        self.data[reflect101(y, self.h()) * self.w() + reflect101(x, self.w())]
    }

    /// Bilinear intensity at a sub-pixel location.
    pub(crate) fn sample(&self, x: f32, y: f32) -> f32 {
        sample_plane(&self.data, self.w(), self.h(), x, y)
    }

    /// Blur and decimate by two.
    pub(crate) fn downsample(&self) -> MorphResult<Self> {
        let blurred = gaussian_blur_plane(&self.data, self.w(), self.h(), 2, 1.0)?;
        let width = self.width.div_ceil(2);
        let height = self.height.div_ceil(2);
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height as usize {
            for x in 0..width as usize {
                data.push(blurred[(2 * y) * self.w() + 2 * x]);
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Gaussian pyramid, finest level first. Stops early once a level would drop below
    /// `min_side` pixels on either axis.
    pub(crate) fn pyramid(&self, levels: usize, min_side: u32) -> MorphResult<Vec<Self>> {
        let mut out = vec![self.clone()];
        while out.len() < levels.max(1) {
            let Some(last) = out.last() else { break };
            if last.width.div_ceil(2) < min_side || last.height.div_ceil(2) < min_side {
                break;
            }
            let next = last.downsample()?;
            out.push(next);
        }
        Ok(out)
    }

    /// Central-difference gradients `(dI/dx, dI/dy)`.
    pub(crate) fn gradients(&self) -> (Vec<f32>, Vec<f32>) {
        let (w, h) = (self.w(), self.h());
        let mut gx = vec![0.0f32; w * h];
        let mut gy = vec![0.0f32; w * h];
        for y in 0..h as i64 {
            for x in 0..w as i64 {
                let i = (y as usize) * w + x as usize;
                gx[i] = 0.5 * (self.at(x + 1, y) - self.at(x - 1, y));
                gy[i] = 0.5 * (self.at(x, y + 1) - self.at(x, y - 1));
            }
        }
        (gx, gy)
    }

    /// Backward-warp: output `(x, y)` samples `self` at `(x, y) + flow(x, y)`.
    pub(crate) fn warped(&self, flow: &FlowField) -> MorphResult<Self> {
        if flow.dimensions() != self.dimensions() {
            return Err(MorphError::validation("flow and frame sizes differ"));
        }
        let w = self.w();
        let data = flow
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = (i % w) as f32 + v[0];
                let y = (i / w) as f32 + v[1];
                self.sample(x, y)
            })
            .collect();
        Ok(Self {
            width: self.width,
            height: self.height,
            data,
        })
    }
}
