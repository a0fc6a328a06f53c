use crate::foundation::error::{MorphError, MorphResult};
use crate::foundation::math::{Border, bilinear_taps};

/// Dense per-pixel displacement field `(dx, dy)` from a source frame to a target frame.
///
/// `vectors[y * width + x]` is where source pixel `(x, y)` moves to reach the target.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    /// Field width in pixels.
    pub width: u32,
    /// Field height in pixels.
    pub height: u32,
    /// Row-major displacement vectors.
    pub vectors: Vec<[f32; 2]>,
}

/// Summary statistics over a flow field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowStats {
    /// Mean horizontal displacement.
    pub mean_dx: f32,
    /// Mean vertical displacement.
    pub mean_dy: f32,
    /// Mean displacement magnitude.
    pub mean_magnitude: f32,
    /// Largest displacement magnitude.
    pub max_magnitude: f32,
}

impl FlowField {
    /// All-zero field (identity motion).
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            vectors: vec![[0.0, 0.0]; (width as usize) * (height as usize)],
        }
    }

    /// Wrap an existing vector buffer, checking its length.
    pub fn from_vectors(width: u32, height: u32, vectors: Vec<[f32; 2]>) -> MorphResult<Self> {
        if vectors.len() != (width as usize) * (height as usize) {
            return Err(MorphError::validation(format!(
                "flow buffer has {} vectors, expected {}x{}",
                vectors.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            vectors,
        })
    }

    /// Constant displacement everywhere.
    pub fn uniform(width: u32, height: u32, dx: f32, dy: f32) -> Self {
        Self {
            width,
            height,
            vectors: vec![[dx, dy]; (width as usize) * (height as usize)],
        }
    }

    /// `(width, height)` pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Displacement at an integer pixel.
    pub fn get(&self, x: u32, y: u32) -> [f32; 2] {
        self.vectors[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Bilinear displacement at a sub-pixel location (edge-repeating reflected borders).
    pub fn sample(&self, x: f32, y: f32) -> [f32; 2] {
        let taps = bilinear_taps(
            self.width as usize,
            self.height as usize,
            x,
            y,
            Border::Reflect,
        );
        let mut out = [0.0f32; 2];
        for (&i, w) in taps.idx.iter().zip(taps.weights) {
            out[0] += self.vectors[i][0] * w;
            out[1] += self.vectors[i][1] * w;
        }
        out
    }

    /// `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.vectors
            .iter()
            .all(|v| v[0].is_finite() && v[1].is_finite())
    }

    /// Resample onto a `width x height` grid, scaling vectors by the size ratio.
    ///
    /// Used to carry a coarse pyramid estimate to the next finer level.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if (width, height) == self.dimensions() {
            return self.clone();
        }
        let sx = width as f32 / self.width.max(1) as f32;
        let sy = height as f32 / self.height.max(1) as f32;
        let mut vectors = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            let src_y = (y as f32 + 0.5) / sy - 0.5;
            for x in 0..width {
                let src_x = (x as f32 + 0.5) / sx - 0.5;
                let [dx, dy] = self.sample(src_x, src_y);
                vectors.push([dx * sx, dy * sy]);
            }
        }
        Self {
            width,
            height,
            vectors,
        }
    }

    /// Mean and peak motion, mostly for diagnostics.
    pub fn stats(&self) -> FlowStats {
        if self.vectors.is_empty() {
            return FlowStats::default();
        }
        let n = self.vectors.len() as f64;
        let (mut sx, mut sy, mut sm) = (0.0f64, 0.0f64, 0.0f64);
        let mut max = 0.0f32;
        for v in &self.vectors {
            let m = v[0].hypot(v[1]);
            sx += f64::from(v[0]);
            sy += f64::from(v[1]);
            sm += f64::from(m);
            max = max.max(m);
        }
        FlowStats {
            mean_dx: (sx / n) as f32,
            mean_dy: (sy / n) as f32,
            mean_magnitude: (sm / n) as f32,
            max_magnitude: max,
        }
    }
}
