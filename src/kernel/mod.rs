//! Per-window feature kernels.

use crate::util::CorrDistResult;
use ndarray::ArrayView3;

/// Reduces one kernel window to a scalar feature.
///
/// A plan is created inside each subvolume task for the fixed kernel shape of
/// the run and reused for every window of that task.
pub trait FeatureKernel: Send + Sync + 'static {
    type Plan;

    /// Prepares per-task state for windows of `kernel_shape`.
    fn plan(kernel_shape: [usize; 3], spacing: [f64; 3]) -> CorrDistResult<Self::Plan>;

    /// Evaluates the feature for one window.
    fn evaluate(plan: &mut Self::Plan, window: ArrayView3<'_, f64>) -> CorrDistResult<f64>;
}

pub mod correlation;

pub use correlation::{
    correlation_length, correlation_lengths, extract_feature, CorrelationLength,
    CORRELATION_THRESHOLD,
};
