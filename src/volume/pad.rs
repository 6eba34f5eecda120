//! Mirror padding for 3D arrays.

use crate::util::{CorrDistError, CorrDistResult};
use ndarray::{Array3, ArrayView3};

/// Maps a possibly out-of-range index onto `[0, len)` by mirroring about the
/// edge samples without repeating them (`d c b | a b c d | c b a`).
fn reflect_index(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut m = idx.rem_euclid(period);
    if m >= len as isize {
        m = period - m;
    }
    m as usize
}

/// Pads every side of every axis by `pad` samples using reflection.
///
/// The result is a fresh allocation; the input is never aliased. Paddings
/// wider than the axis keep mirroring back and forth across the data. Every
/// axis must hold at least one sample.
pub fn reflect_pad(data: ArrayView3<'_, f64>, pad: usize) -> CorrDistResult<Array3<f64>> {
    if data.is_empty() {
        return Err(CorrDistError::InvalidInput(
            "cannot reflect-pad an array with an empty axis",
        ));
    }
    let (a, b, c) = data.dim();
    let p = pad as isize;
    Ok(Array3::from_shape_fn((a + 2 * pad, b + 2 * pad, c + 2 * pad), |(i, j, k)| {
        data[[
            reflect_index(i as isize - p, a),
            reflect_index(j as isize - p, b),
            reflect_index(k as isize - p, c),
        ]]
    }))
}
