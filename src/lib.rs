//! CorrDist estimates correlation lengths across large 3D volumes.
//!
//! For every unit cell of a coarse output grid, a kernel window centered on
//! the cell is reduced to its FFT autocovariance, and the spread of the lags
//! whose normalized covariance exceeds one half gives the cell's correlation
//! length. The volume is padded once by reflection, split into unit-aligned
//! subvolumes, processed on a bounded worker pool (`rayon` feature, on by
//! default) and stitched back together. Coarse maps can be resampled onto
//! finer grids with the helpers in [`interpolate`].

pub mod autocov;
pub mod engine;
pub mod interpolate;
pub mod kernel;
pub mod lowlevel;
pub mod tiling;
mod trace;
pub mod util;
pub mod volume;

pub use autocov::{autocovariance, Autocovariance, AutocovariancePlan};
pub use engine::{
    calculate_correlation, padding_for, CorrelationConfig, CorrelationEngine,
    CorrelationGeometry, NoProgress, ProgressSink,
};
pub use interpolate::{resample, Interpolation};
pub use kernel::{correlation_length, extract_feature, CorrelationLength, FeatureKernel};
pub use util::{CorrDistError, CorrDistResult};
pub use volume::{CorrelationMap, IntoShape3, Shape3, Spacing, VolumeBlock};
