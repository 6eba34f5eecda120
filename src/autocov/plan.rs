//! FFT plans for autocovariance over a fixed window shape.

use crate::util::{CorrDistError, CorrDistResult};
use ndarray::{Array3, ArrayView3, Axis};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use super::{centered_lags, fftshift, Autocovariance};

/// Cached forward/inverse transforms for one window shape.
///
/// A plan is built once per subvolume task and reused for every kernel window
/// in it, which keeps per-cell cost down to the transforms themselves.
pub struct AutocovariancePlan {
    shape: [usize; 3],
    forward: [Arc<dyn Fft<f64>>; 3],
    inverse: [Arc<dyn Fft<f64>>; 3],
    spectrum: Array3<Complex<f64>>,
    lane: Vec<Complex<f64>>,
}

impl AutocovariancePlan {
    /// Plans transforms for windows of the given shape.
    pub fn new(shape: [usize; 3]) -> CorrDistResult<Self> {
        if shape.contains(&0) {
            return Err(CorrDistError::InvalidInput("window shape must be non-zero"));
        }
        let mut planner = FftPlanner::new();
        let forward = shape.map(|n| planner.plan_fft_forward(n));
        let inverse = shape.map(|n| planner.plan_fft_inverse(n));
        let longest = shape.iter().copied().max().unwrap_or(1);
        Ok(Self {
            shape,
            forward,
            inverse,
            spectrum: Array3::zeros((shape[0], shape[1], shape[2])),
            lane: Vec::with_capacity(longest),
        })
    }

    /// Returns the window shape this plan accepts.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Computes the centered autocovariance of `data`.
    ///
    /// The zero-lag sample lands at index `n / 2` along each axis and equals
    /// the population variance of `data`.
    pub fn compute(
        &mut self,
        data: ArrayView3<'_, f64>,
        spacing: [f64; 3],
    ) -> CorrDistResult<Autocovariance> {
        let (a, b, c) = data.dim();
        if [a, b, c] != self.shape {
            return Err(CorrDistError::ShapeMismatch {
                shape: self.shape,
                needed: self.shape.iter().product(),
                got: data.len(),
            });
        }

        let count = data.len() as f64;
        let mean = data.sum() / count;
        self.spectrum.zip_mut_with(&data, |dst, &v| *dst = Complex::new(v - mean, 0.0));

        transform_axes(&mut self.spectrum, &self.forward, &mut self.lane);
        self.spectrum.mapv_inplace(|z| Complex::new(z.norm_sqr(), 0.0));
        transform_axes(&mut self.spectrum, &self.inverse, &mut self.lane);

        // rustfft leaves the inverse unnormalized: one factor of N undoes the
        // round trip, the second turns the sum of products into a mean.
        let scale = 1.0 / (count * count);
        let raw = self.spectrum.mapv(|z| z.re * scale);

        Ok(Autocovariance {
            cov: fftshift(&raw),
            lags: [0, 1, 2].map(|axis| centered_lags(self.shape[axis], spacing[axis])),
        })
    }
}

/// Applies a 1D transform along each axis in turn.
fn transform_axes(
    buf: &mut Array3<Complex<f64>>,
    plans: &[Arc<dyn Fft<f64>>; 3],
    lane_buf: &mut Vec<Complex<f64>>,
) {
    for (axis, fft) in plans.iter().enumerate() {
        if fft.len() == 1 {
            continue;
        }
        for mut lane in buf.lanes_mut(Axis(axis)) {
            lane_buf.clear();
            lane_buf.extend(lane.iter().copied());
            fft.process(lane_buf);
            for (dst, src) in lane.iter_mut().zip(lane_buf.iter()) {
                *dst = *src;
            }
        }
    }
}
