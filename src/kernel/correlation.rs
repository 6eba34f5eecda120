//! Correlation-length feature from a centered autocovariance.

use crate::autocov::{Autocovariance, AutocovariancePlan};
use crate::kernel::FeatureKernel;
use crate::util::math::{nan_max, sample_variance};
use crate::util::CorrDistResult;
use crate::Spacing;
use ndarray::ArrayView3;

/// Normalized covariance above which a lag counts as correlated.
pub const CORRELATION_THRESHOLD: f64 = 0.5;

/// Per-axis spread of the lags whose normalized covariance exceeds
/// [`CORRELATION_THRESHOLD`].
///
/// Each component is the sample standard deviation (one degree of freedom
/// removed) of the lag coordinates along that axis. Fewer than two qualifying
/// lags, or a zero/NaN peak, give NaN.
pub fn correlation_lengths(acov: &Autocovariance) -> [f64; 3] {
    let peak = nan_max(acov.cov.iter().copied());
    let mut coords: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for ((i, j, k), &c) in acov.cov.indexed_iter() {
        if c / peak > CORRELATION_THRESHOLD {
            coords[0].push(acov.lags[0][i]);
            coords[1].push(acov.lags[1][j]);
            coords[2].push(acov.lags[2][k]);
        }
    }
    coords.map(|axis| sample_variance(&axis).sqrt())
}

/// Mean of [`correlation_lengths`] across the three axes.
pub fn correlation_length(acov: &Autocovariance) -> f64 {
    let lengths = correlation_lengths(acov);
    lengths.iter().sum::<f64>() / lengths.len() as f64
}

/// Computes the correlation length of a block in one call.
pub fn extract_feature(
    data: ArrayView3<'_, f64>,
    spacing: impl Into<Spacing>,
) -> CorrDistResult<f64> {
    let acov = crate::autocov::autocovariance(data, spacing)?;
    Ok(correlation_length(&acov))
}

/// Production kernel: FFT autocovariance followed by the correlation length.
pub struct CorrelationLength;

/// Task-local state for [`CorrelationLength`].
pub struct CorrelationLengthPlan {
    acov: AutocovariancePlan,
    spacing: [f64; 3],
}

impl FeatureKernel for CorrelationLength {
    type Plan = CorrelationLengthPlan;

    fn plan(kernel_shape: [usize; 3], spacing: [f64; 3]) -> CorrDistResult<Self::Plan> {
        Spacing(spacing).validate()?;
        Ok(CorrelationLengthPlan {
            acov: AutocovariancePlan::new(kernel_shape)?,
            spacing,
        })
    }

    fn evaluate(plan: &mut Self::Plan, window: ArrayView3<'_, f64>) -> CorrDistResult<f64> {
        let acov = plan.acov.compute(window, plan.spacing)?;
        Ok(correlation_length(&acov))
    }
}
