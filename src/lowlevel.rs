//! Building blocks for custom correlation pipelines.
//!
//! These items expose the tiling, window walk, stitching and padding steps
//! that `CorrelationEngine` composes. Most users should call
//! `CorrelationEngine::calculate_correlation` instead.

pub use crate::engine::{stitch, SubvolumeResult};
pub use crate::interpolate::{
    resample_linear, resample_linear_chunked, resample_spline, CubicSpline, GridInterpolator,
    DEFAULT_CHUNK,
};
pub use crate::kernel::{correlation_lengths, CORRELATION_THRESHOLD};
pub use crate::tiling::{tile, tile_counts, KernelWindow, KernelWindows, Subvolume};
pub use crate::volume::reflect_pad;
