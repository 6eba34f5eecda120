//! FFT-based autocovariance of dense 3D blocks.
//!
//! The autocovariance is computed through the power spectrum of the
//! mean-removed block (Wiener-Khinchin), so lags wrap around periodically.
//! Results are center-shifted: the zero lag sits at index `n / 2` on each
//! axis and the lag coordinates run from `-(n / 2) * spacing` upwards.

use crate::util::CorrDistResult;
use ndarray::{Array1, Array3, ArrayView3};

mod plan;

pub use plan::AutocovariancePlan;

/// Centered autocovariance field and its lag coordinates.
#[derive(Clone, Debug)]
pub struct Autocovariance {
    /// Covariance per lag, same shape as the input block.
    pub cov: Array3<f64>,
    /// Physical lag per index along each axis.
    pub lags: [Array1<f64>; 3],
}

impl Autocovariance {
    /// Index of the zero lag.
    pub fn zero_lag_index(&self) -> [usize; 3] {
        let (a, b, c) = self.cov.dim();
        [a / 2, b / 2, c / 2]
    }

    /// Covariance at zero lag (the population variance of the block).
    pub fn variance(&self) -> f64 {
        self.cov[self.zero_lag_index()]
    }

    /// Semivariogram `C(0) - C(h)` on the same lag grid.
    pub fn variogram(&self) -> Array3<f64> {
        let c0 = self.variance();
        self.cov.mapv(|c| c0 - c)
    }
}

/// Computes the centered autocovariance of `data`, planning on the fly.
///
/// Prefer [`AutocovariancePlan`] when many blocks of one shape are processed.
pub fn autocovariance(
    data: ArrayView3<'_, f64>,
    spacing: impl Into<crate::Spacing>,
) -> CorrDistResult<Autocovariance> {
    let spacing = spacing.into();
    spacing.validate()?;
    let (a, b, c) = data.dim();
    let mut plan = AutocovariancePlan::new([a, b, c])?;
    plan.compute(data, spacing.axes())
}

/// Lag coordinates matching the center-shifted sample frequency grid.
pub(crate) fn centered_lags(len: usize, spacing: f64) -> Array1<f64> {
    let half = (len / 2) as f64;
    Array1::from_shape_fn(len, |i| (i as f64 - half) * spacing)
}

/// Rotates each axis so that index 0 moves to index `n / 2`.
pub(crate) fn fftshift(data: &Array3<f64>) -> Array3<f64> {
    let (a, b, c) = data.dim();
    let src = |i: usize, n: usize| (i + n - n / 2) % n;
    Array3::from_shape_fn((a, b, c), |(i, j, k)| {
        data[[src(i, a), src(j, b), src(k, c)]]
    })
}

#[cfg(test)]
mod tests {
    use super::{autocovariance, centered_lags, fftshift};
    use ndarray::Array3;

    #[test]
    fn centered_lags_cover_even_and_odd_lengths() {
        assert_eq!(centered_lags(4, 0.5).to_vec(), vec![-1.0, -0.5, 0.0, 0.5]);
        assert_eq!(centered_lags(5, 2.0).to_vec(), vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
    }

    #[test]
    fn fftshift_moves_origin_to_center() {
        let data = Array3::from_shape_fn((4, 3, 1), |(i, j, _)| (i * 10 + j) as f64);
        let shifted = fftshift(&data);
        assert_eq!(shifted[[2, 1, 0]], data[[0, 0, 0]]);
        assert_eq!(shifted[[0, 0, 0]], data[[2, 2, 0]]);
        assert_eq!(shifted[[3, 2, 0]], data[[1, 1, 0]]);
    }

    #[test]
    fn variogram_vanishes_at_zero_lag() {
        let data = Array3::from_shape_fn((6, 6, 6), |(i, j, k)| ((i * 7 + j * 3 + k) % 5) as f64);
        let acov = autocovariance(data.view(), 1.0).unwrap();
        let gamma = acov.variogram();
        assert!(gamma[acov.zero_lag_index()].abs() < 1e-12);
        assert!(gamma.iter().all(|g| *g >= -1e-9));
    }
}
