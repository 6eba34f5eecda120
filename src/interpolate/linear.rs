//! Trilinear evaluation on a regular grid.

use crate::util::{CorrDistError, CorrDistResult};
use ndarray::ArrayView3;

/// Trilinear interpolator over a coarse grid in index coordinates.
///
/// Points are given as fractional indices; each component is clamped to
/// `[0, n - 1]`. NaN samples propagate into every point that touches them.
pub struct GridInterpolator<'a> {
    data: ArrayView3<'a, f64>,
}

impl<'a> GridInterpolator<'a> {
    /// Wraps `data`; every axis must hold at least one sample.
    pub fn new(data: ArrayView3<'a, f64>) -> CorrDistResult<Self> {
        if data.is_empty() {
            return Err(CorrDistError::InvalidInput("interpolation grid is empty"));
        }
        Ok(Self { data })
    }

    /// Evaluates every point in `points` into `out`.
    ///
    /// `out` must be at least as long as `points`.
    pub fn evaluate(&self, points: &[[f64; 3]], out: &mut [f64]) {
        for (dst, point) in out.iter_mut().zip(points) {
            *dst = self.sample(*point);
        }
    }

    /// Evaluates a single point.
    pub fn sample(&self, point: [f64; 3]) -> f64 {
        let (a, b, c) = self.data.dim();
        let (i0, ti) = cell(point[0], a);
        let (j0, tj) = cell(point[1], b);
        let (k0, tk) = cell(point[2], c);
        let i1 = (i0 + 1).min(a - 1);
        let j1 = (j0 + 1).min(b - 1);
        let k1 = (k0 + 1).min(c - 1);

        let d = &self.data;
        let lerp = |x: f64, y: f64, t: f64| x + (y - x) * t;
        let c00 = lerp(d[[i0, j0, k0]], d[[i1, j0, k0]], ti);
        let c10 = lerp(d[[i0, j1, k0]], d[[i1, j1, k0]], ti);
        let c01 = lerp(d[[i0, j0, k1]], d[[i1, j0, k1]], ti);
        let c11 = lerp(d[[i0, j1, k1]], d[[i1, j1, k1]], ti);
        let c0 = lerp(c00, c10, tj);
        let c1 = lerp(c01, c11, tj);
        lerp(c0, c1, tk)
    }
}

/// Lower corner index and fractional offset for a coordinate on an axis of
/// `len` samples.
fn cell(x: f64, len: usize) -> (usize, f64) {
    if len < 2 {
        return (0, 0.0);
    }
    let max = (len - 1) as f64;
    let x = x.clamp(0.0, max);
    let i0 = (x.floor() as usize).min(len - 2);
    (i0, x - i0 as f64)
}

#[cfg(test)]
mod tests {
    use super::GridInterpolator;
    use ndarray::Array3;

    #[test]
    fn empty_grid_is_rejected() {
        let data = Array3::<f64>::zeros((2, 0, 2));
        assert!(GridInterpolator::new(data.view()).is_err());
    }

    #[test]
    fn reproduces_affine_fields() {
        let data = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| {
            1.0 + 2.0 * i as f64 - 0.5 * j as f64 + 0.25 * k as f64
        });
        let interp = GridInterpolator::new(data.view()).unwrap();
        let value = interp.sample([1.5, 2.25, 3.5]);
        assert!((value - (1.0 + 3.0 - 1.125 + 0.875)).abs() < 1e-12);
        assert_eq!(interp.sample([2.0, 3.0, 4.0]), data[[2, 3, 4]]);
    }

    #[test]
    fn single_sample_axes_are_constant() {
        let data = Array3::from_shape_fn((1, 2, 1), |(_, j, _)| j as f64 * 10.0);
        let interp = GridInterpolator::new(data.view()).unwrap();
        assert!((interp.sample([0.7, 0.5, 3.0]) - 5.0).abs() < 1e-12);
    }
}
