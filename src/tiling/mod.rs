//! Partitioning of a volume into unit-aligned subvolumes.
//!
//! Every tile except the last along an axis spans the same whole number of
//! unit cells; the last one absorbs the remainder up to the volume edge. Tiles
//! are produced in row-major order (axis 0 outermost), so repeated calls with
//! the same inputs return identical lists.

use crate::util::{CorrDistError, CorrDistResult};
use crate::volume::Shape3;
use std::ops::Range;

mod windows;

pub use windows::{KernelWindow, KernelWindows};

/// One tile of the unpadded volume and the output cells it owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subvolume {
    /// Position in row-major tile order.
    pub index: usize,
    /// Voxel range along each axis, in unpadded input coordinates.
    pub bounds: [Range<usize>; 3],
    /// Output cell range along each axis.
    pub output: [Range<usize>; 3],
}

impl Subvolume {
    /// Number of output cells along each axis.
    pub fn output_shape(&self) -> [usize; 3] {
        self.output.clone().map(|r| r.len())
    }

    /// Voxel range of the padded slab holding this tile plus `padding` on
    /// every side, in padded input coordinates.
    pub fn padded_bounds(&self, padding: usize) -> [Range<usize>; 3] {
        self.bounds.clone().map(|r| r.start..r.end + 2 * padding)
    }
}

/// Per-axis tile counts after clamping `divisor` to the whole units available.
///
/// Fails when `unit_shape` has a zero extent.
pub fn tile_counts(
    volume_shape: Shape3,
    unit_shape: Shape3,
    divisor: usize,
) -> CorrDistResult<[usize; 3]> {
    check_unit(unit_shape)?;
    let units = volume_shape.div_floor(unit_shape);
    Ok(units.map(|u| divisor.min(u).max(1)))
}

fn check_unit(unit_shape: Shape3) -> CorrDistResult<()> {
    if unit_shape.is_empty() {
        return Err(CorrDistError::InvalidInput(
            "unit shape must be at least one voxel along every axis",
        ));
    }
    Ok(())
}

/// Splits `volume_shape` into subvolumes aligned on `unit_shape`.
///
/// `divisor` is the requested number of tiles per axis; it is clamped so that
/// an axis is never split into more tiles than it has whole unit cells.
/// An axis shorter than one unit yields a single tile with no output cells.
pub fn tile(
    volume_shape: Shape3,
    unit_shape: Shape3,
    divisor: usize,
) -> CorrDistResult<Vec<Subvolume>> {
    let counts = tile_counts(volume_shape, unit_shape, divisor)?;
    let dims = volume_shape.dims();
    let unit = unit_shape.dims();
    let units = volume_shape.div_floor(unit_shape);
    let size = [0, 1, 2].map(|axis| (units[axis] / counts[axis]) * unit[axis]);

    let axis_range = |axis: usize, idx: usize| -> Range<usize> {
        let start = idx * size[axis];
        let end = if idx + 1 == counts[axis] {
            dims[axis]
        } else {
            (idx + 1) * size[axis]
        };
        start..end
    };

    let mut tiles = Vec::with_capacity(counts.iter().product());
    for i in 0..counts[0] {
        for j in 0..counts[1] {
            for k in 0..counts[2] {
                let bounds = [axis_range(0, i), axis_range(1, j), axis_range(2, k)];
                let output = [0, 1, 2].map(|axis| {
                    let r = &bounds[axis];
                    r.start / unit[axis]..r.end / unit[axis]
                });
                tiles.push(Subvolume {
                    index: tiles.len(),
                    bounds,
                    output,
                });
            }
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::{tile, tile_counts};
    use crate::{CorrDistError, Shape3};

    #[test]
    fn last_tile_absorbs_remainder() {
        let tiles = tile(Shape3([10, 4, 4]), Shape3([3, 4, 4]), 2).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].bounds[0], 0..3);
        assert_eq!(tiles[1].bounds[0], 3..10);
        assert_eq!(tiles[0].output[0], 0..1);
        assert_eq!(tiles[1].output[0], 1..3);
    }

    #[test]
    fn divisor_is_clamped_per_axis() {
        assert_eq!(
            tile_counts(Shape3([8, 20, 60]), Shape3([4, 4, 4]), 3),
            Ok([2, 3, 3])
        );
        assert_eq!(
            tile_counts(Shape3([8, 8, 8]), Shape3([4, 4, 4]), 0),
            Ok([1, 1, 1])
        );
    }

    #[test]
    fn zero_unit_extent_is_rejected() {
        let err = tile(Shape3([8, 8, 8]), Shape3([0, 4, 4]), 2).unwrap_err();
        assert!(matches!(err, CorrDistError::InvalidInput(_)));
        assert!(tile_counts(Shape3([8, 8, 8]), Shape3([4, 4, 0]), 2).is_err());
    }

    #[test]
    fn axis_shorter_than_unit_has_no_output_cells() {
        let tiles = tile(Shape3([3, 8, 8]), Shape3([4, 4, 4]), 2).unwrap();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.bounds[0] == (0..3) && t.output[0].is_empty()));
    }

    #[test]
    fn tiles_are_row_major_and_indexed() {
        let tiles = tile(Shape3([8, 8, 8]), Shape3([2, 2, 2]), 2).unwrap();
        assert_eq!(tiles.len(), 8);
        for (idx, t) in tiles.iter().enumerate() {
            assert_eq!(t.index, idx);
        }
        assert_eq!(tiles[1].bounds, [0..4, 0..4, 4..8]);
        assert_eq!(tiles[2].bounds, [0..4, 4..8, 0..4]);
        assert_eq!(tiles[4].bounds, [4..8, 0..4, 0..4]);
        assert_eq!(tiles[7].padded_bounds(3), [4..14, 4..14, 4..14]);
    }
}
