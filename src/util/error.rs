//! Error types for corrdist.

use thiserror::Error;

/// Result alias for corrdist operations.
pub type CorrDistResult<T> = std::result::Result<T, CorrDistError>;

/// Errors that can occur when running corrdist algorithms.
///
/// Variants fall into two families: caller input that was rejected before any
/// work was dispatched, and failures that happened while subvolumes were being
/// processed. [`CorrDistError::is_input_error`] tells them apart.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CorrDistError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A buffer does not hold the number of elements its shape implies.
    #[error("buffer of {got} elements does not match shape {shape:?} ({needed} needed)")]
    ShapeMismatch {
        shape: [usize; 3],
        needed: usize,
        got: usize,
    },
    /// A shape component could not be coerced to a non-negative integer.
    #[error("shape component {axis} is not a valid extent: {value}")]
    InvalidShape { axis: usize, value: f64 },
    /// A spacing component is not finite and strictly positive.
    #[error("spacing component {axis} must be finite and positive, got {value}")]
    InvalidSpacing { axis: usize, value: f64 },
    /// The unit cell does not fit strictly inside the volume.
    #[error("unit shape {unit:?} must be strictly smaller than volume shape {volume:?}")]
    UnitNotSmallerThanVolume { unit: [usize; 3], volume: [usize; 3] },
    /// The kernel window does not strictly enclose the unit cell.
    #[error("kernel shape {kernel:?} must be strictly larger than unit shape {unit:?}")]
    KernelNotLargerThanUnit { kernel: [usize; 3], unit: [usize; 3] },
    /// The worker pool could not be created.
    #[error("worker pool unavailable: {0}")]
    WorkerPool(String),
    /// A subvolume task failed or panicked.
    #[error("subvolume {subvolume} failed: {reason}")]
    WorkerFailed { subvolume: usize, reason: String },
}

impl CorrDistError {
    /// Returns true when the error was caused by caller input rather than by
    /// a failure during computation.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            CorrDistError::WorkerPool(_) | CorrDistError::WorkerFailed { .. }
        )
    }
}
