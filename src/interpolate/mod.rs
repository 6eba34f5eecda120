//! Resampling of coarse correlation maps onto finer grids.
//!
//! All strategies keep the map's spacing unchanged: resampling refines the
//! display grid, it does not re-derive the physical sampling interval. The
//! coarse and target grids share the same extent with endpoints aligned, so
//! target index `t` of `m` samples reads coarse coordinate
//! `t * (n - 1) / (m - 1)`.

mod linear;
mod spline;

pub use linear::GridInterpolator;
pub use spline::CubicSpline;

use crate::util::math::round_extent;
use crate::util::{CorrDistError, CorrDistResult};
use crate::volume::CorrelationMap;
use ndarray::Array3;

/// Default number of points evaluated per batch by
/// [`resample_linear_chunked`].
pub const DEFAULT_CHUNK: usize = 50;

/// Resampling strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    /// Trilinear, evaluated in one bulk call.
    Linear,
    /// Cubic B-spline zoom with a uniform factor.
    Spline,
    /// Trilinear, evaluated `chunk` points at a time.
    ChunkedLinear { chunk: usize },
}

/// Resamples `map` with the chosen strategy.
pub fn resample(
    map: &CorrelationMap,
    target_shape: [usize; 3],
    method: Interpolation,
) -> CorrDistResult<CorrelationMap> {
    match method {
        Interpolation::Linear => resample_linear(map, target_shape),
        Interpolation::Spline => resample_spline(map, target_shape),
        Interpolation::ChunkedLinear { chunk } => {
            resample_linear_chunked(map, target_shape, chunk)
        }
    }
}

/// Trilinear resampling onto `target_shape`.
pub fn resample_linear(
    map: &CorrelationMap,
    target_shape: [usize; 3],
) -> CorrDistResult<CorrelationMap> {
    check_shapes(map, target_shape)?;
    let source = map.shape();
    let points: Vec<[f64; 3]> = (0..target_shape.iter().product())
        .map(|flat| target_point(flat, source, target_shape))
        .collect();
    let mut values = vec![0.0; points.len()];
    GridInterpolator::new(map.values.view())?.evaluate(&points, &mut values);
    into_map(values, target_shape, map.spacing)
}

/// Trilinear resampling that materializes at most `chunk` target points at a
/// time, bounding peak memory on very large target grids.
pub fn resample_linear_chunked(
    map: &CorrelationMap,
    target_shape: [usize; 3],
    chunk: usize,
) -> CorrDistResult<CorrelationMap> {
    check_shapes(map, target_shape)?;
    if chunk == 0 {
        return Err(CorrDistError::InvalidInput("chunk size must be at least 1"));
    }
    let source = map.shape();
    let total: usize = target_shape.iter().product();
    let interp = GridInterpolator::new(map.values.view())?;
    let mut values = vec![0.0; total];
    let mut points = Vec::with_capacity(chunk);
    for (idx, out) in values.chunks_mut(chunk).enumerate() {
        let start = idx * chunk;
        points.clear();
        points.extend(
            (start..start + out.len()).map(|flat| target_point(flat, source, target_shape)),
        );
        interp.evaluate(&points, out);
    }
    into_map(values, target_shape, map.spacing)
}

/// Cubic B-spline zoom towards `target_shape`.
///
/// One zoom factor, the smallest per-axis ratio `target / source`, applies to
/// every axis so the aspect ratio is preserved; the output shape is
/// `round(source * factor)` and may therefore differ from `target_shape`.
pub fn resample_spline(
    map: &CorrelationMap,
    target_shape: [usize; 3],
) -> CorrDistResult<CorrelationMap> {
    check_shapes(map, target_shape)?;
    let source = map.shape();
    let factor = (0..3)
        .map(|axis| target_shape[axis] as f64 / source[axis] as f64)
        .fold(f64::INFINITY, f64::min);
    let mut shape = [0usize; 3];
    for axis in 0..3 {
        let extent = round_extent(source[axis] as f64 * factor)
            .ok_or(CorrDistError::InvalidInput("zoomed shape is not representable"))?;
        shape[axis] = extent.max(1);
    }

    let spline = CubicSpline::new(map.values.view())?;
    let values = (0..shape.iter().product())
        .map(|flat| spline.sample(target_point(flat, source, shape)))
        .collect();
    into_map(values, shape, map.spacing)
}

fn check_shapes(map: &CorrelationMap, target_shape: [usize; 3]) -> CorrDistResult<()> {
    if map.values.is_empty() {
        return Err(CorrDistError::InvalidInput("correlation map is empty"));
    }
    if target_shape.contains(&0) {
        return Err(CorrDistError::InvalidInput("target shape must be non-zero"));
    }
    Ok(())
}

/// Coarse-grid coordinate of the row-major target index `flat`.
fn target_point(flat: usize, source: [usize; 3], target: [usize; 3]) -> [f64; 3] {
    let idx = [
        flat / (target[1] * target[2]),
        (flat / target[2]) % target[1],
        flat % target[2],
    ];
    [0, 1, 2].map(|axis| {
        if target[axis] < 2 {
            0.0
        } else {
            idx[axis] as f64 * (source[axis] - 1) as f64 / (target[axis] - 1) as f64
        }
    })
}

fn into_map(
    values: Vec<f64>,
    shape: [usize; 3],
    spacing: [f64; 3],
) -> CorrDistResult<CorrelationMap> {
    let needed = shape.iter().product();
    let got = values.len();
    let values = Array3::from_shape_vec((shape[0], shape[1], shape[2]), values)
        .map_err(|_| CorrDistError::ShapeMismatch { shape, needed, got })?;
    Ok(CorrelationMap { values, spacing })
}
