//! Cubic B-spline resampling with nearest-edge extension.
//!
//! Samples are first turned into B-spline coefficients with the separable
//! recursive prefilter (pole `sqrt(3) - 2`). Each axis is extended by
//! `EDGE_PAD` copies of its edge sample before filtering, so the coefficients
//! near the border see a flat continuation of the data.

use crate::util::{CorrDistError, CorrDistResult};
use ndarray::{Array3, ArrayView3, Axis};

const EDGE_PAD: usize = 12;
const FILTER_HORIZON: usize = 30;

/// Prefiltered coefficients ready for cubic evaluation.
pub struct CubicSpline {
    coeffs: Array3<f64>,
    dims: [usize; 3],
}

impl CubicSpline {
    /// Prefilters `data` into spline coefficients.
    pub fn new(data: ArrayView3<'_, f64>) -> CorrDistResult<Self> {
        if data.is_empty() {
            return Err(CorrDistError::InvalidInput("spline grid is empty"));
        }
        let (a, b, c) = data.dim();
        let p = EDGE_PAD as isize;
        let clamp = |i: usize, n: usize| (i as isize - p).clamp(0, n as isize - 1) as usize;
        let mut coeffs = Array3::from_shape_fn(
            (a + 2 * EDGE_PAD, b + 2 * EDGE_PAD, c + 2 * EDGE_PAD),
            |(i, j, k)| data[[clamp(i, a), clamp(j, b), clamp(k, c)]],
        );

        let mut lane_buf = Vec::new();
        for axis in 0..3 {
            for mut lane in coeffs.lanes_mut(Axis(axis)) {
                lane_buf.clear();
                lane_buf.extend(lane.iter().copied());
                prefilter(&mut lane_buf);
                for (dst, src) in lane.iter_mut().zip(lane_buf.iter()) {
                    *dst = *src;
                }
            }
        }

        Ok(Self {
            coeffs,
            dims: [a, b, c],
        })
    }

    /// Evaluates the spline at fractional indices of the original grid.
    ///
    /// Coordinates outside `[0, n - 1]` are clamped to the edge.
    pub fn sample(&self, point: [f64; 3]) -> f64 {
        let mut base = [0usize; 3];
        let mut weights = [[0.0f64; 4]; 3];
        for axis in 0..3 {
            let max = (self.dims[axis] - 1) as f64;
            let x = point[axis].clamp(0.0, max);
            let floor = x.floor();
            weights[axis] = cubic_weights(x - floor);
            // coefficient for floor(x) - 1 in padded coordinates
            base[axis] = floor as usize + EDGE_PAD - 1;
        }

        let mut acc = 0.0;
        for (di, wi) in weights[0].iter().enumerate() {
            for (dj, wj) in weights[1].iter().enumerate() {
                let wij = wi * wj;
                for (dk, wk) in weights[2].iter().enumerate() {
                    acc += wij * wk * self.coeffs[[base[0] + di, base[1] + dj, base[2] + dk]];
                }
            }
        }
        acc
    }
}

/// Cubic B-spline weights for offsets -1, 0, +1, +2 around the lower sample.
fn cubic_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let u = 1.0 - t;
    [
        u * u * u / 6.0,
        (4.0 - 6.0 * t2 + 3.0 * t3) / 6.0,
        (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) / 6.0,
        t3 / 6.0,
    ]
}

/// In-place conversion of samples to cubic B-spline coefficients with
/// mirror-symmetric boundaries.
fn prefilter(c: &mut [f64]) {
    let n = c.len();
    if n < 2 {
        return;
    }
    let z = 3.0f64.sqrt() - 2.0;
    let gain = (1.0 - z) * (1.0 - 1.0 / z);
    for v in c.iter_mut() {
        *v *= gain;
    }

    let mut zk = z;
    let mut sum = c[0];
    for v in c.iter().take(n.min(FILTER_HORIZON)).skip(1) {
        sum += zk * v;
        zk *= z;
    }
    c[0] = sum;
    for k in 1..n {
        c[k] += z * c[k - 1];
    }

    c[n - 1] = (z / (z * z - 1.0)) * (c[n - 1] + z * c[n - 2]);
    for k in (0..n - 1).rev() {
        c[k] = z * (c[k + 1] - c[k]);
    }
}
