//! Reassembly of per-subvolume buffers into the output grid.

use crate::util::{CorrDistError, CorrDistResult};
use ndarray::{s, Array3};
use std::ops::Range;

/// Output of one subvolume task.
#[derive(Clone, Debug)]
pub struct SubvolumeResult {
    /// Tile index the buffer belongs to.
    pub index: usize,
    /// Output cell range along each axis.
    pub output: [Range<usize>; 3],
    /// Feature values for the range, row-major.
    pub values: Array3<f64>,
}

/// Writes every result into a fresh array of `output_shape`.
///
/// Placement is driven only by each result's output range, so arrival order
/// does not matter. Cells no result covers stay NaN.
pub fn stitch<I>(output_shape: [usize; 3], results: I) -> CorrDistResult<Array3<f64>>
where
    I: IntoIterator<Item = SubvolumeResult>,
{
    let mut out = Array3::from_elem((output_shape[0], output_shape[1], output_shape[2]), f64::NAN);
    for result in results {
        let [r0, r1, r2] = result.output;
        if r0.end > output_shape[0] || r1.end > output_shape[1] || r2.end > output_shape[2] {
            return Err(CorrDistError::InvalidInput(
                "subvolume output range exceeds the output grid",
            ));
        }
        let expected = [r0.len(), r1.len(), r2.len()];
        let (a, b, c) = result.values.dim();
        if [a, b, c] != expected {
            return Err(CorrDistError::ShapeMismatch {
                shape: expected,
                needed: expected.iter().product(),
                got: result.values.len(),
            });
        }
        out.slice_mut(s![r0, r1, r2]).assign(&result.values);
    }
    Ok(out)
}
