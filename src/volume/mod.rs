//! Volume blocks, shapes and spacing.
//!
//! `VolumeBlock` owns a dense 3D array of samples together with the physical
//! size of one voxel along each axis. Shapes used to describe kernels and unit
//! cells are `Shape3` values; callers holding floating-point shapes go through
//! [`IntoShape3`], which rounds once at the boundary.

use crate::util::math::round_extent;
use crate::util::{CorrDistError, CorrDistResult};
use ndarray::{Array3, ArrayView3};

mod pad;

pub use pad::reflect_pad;

/// Integer extent along each of the three axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape3(pub [usize; 3]);

impl Shape3 {
    /// Returns the extents as an array.
    pub fn dims(&self) -> [usize; 3] {
        self.0
    }

    /// Returns the number of elements covered by the shape.
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    /// Returns true when any axis has zero extent.
    pub fn is_empty(&self) -> bool {
        self.0.contains(&0)
    }

    /// Returns the largest extent.
    pub fn max(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Returns the smallest extent.
    pub fn min(&self) -> usize {
        self.0.iter().copied().min().unwrap_or(0)
    }

    /// Elementwise integer division, `floor(self / unit)` per axis.
    pub(crate) fn div_floor(&self, unit: Shape3) -> [usize; 3] {
        [0, 1, 2].map(|axis| self.0[axis] / unit.0[axis])
    }
}

impl From<[usize; 3]> for Shape3 {
    fn from(value: [usize; 3]) -> Self {
        Self(value)
    }
}

/// Conversion into a `Shape3`, rounding floating-point extents.
pub trait IntoShape3 {
    /// Performs the conversion.
    fn into_shape3(self) -> CorrDistResult<Shape3>;
}

impl IntoShape3 for Shape3 {
    fn into_shape3(self) -> CorrDistResult<Shape3> {
        Ok(self)
    }
}

impl IntoShape3 for [usize; 3] {
    fn into_shape3(self) -> CorrDistResult<Shape3> {
        Ok(Shape3(self))
    }
}

impl IntoShape3 for [f64; 3] {
    fn into_shape3(self) -> CorrDistResult<Shape3> {
        let mut dims = [0usize; 3];
        for (axis, value) in self.iter().copied().enumerate() {
            dims[axis] = round_extent(value).ok_or(CorrDistError::InvalidShape { axis, value })?;
        }
        Ok(Shape3(dims))
    }
}

/// Physical voxel size along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing(pub [f64; 3]);

impl Spacing {
    /// Returns the per-axis spacing.
    pub fn axes(&self) -> [f64; 3] {
        self.0
    }

    /// Checks that every component is finite and strictly positive.
    pub fn validate(&self) -> CorrDistResult<()> {
        for (axis, value) in self.0.iter().copied().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(CorrDistError::InvalidSpacing { axis, value });
            }
        }
        Ok(())
    }

    /// Spacing of a grid whose cells span `unit` voxels of this grid.
    pub fn scaled(&self, unit: Shape3) -> Spacing {
        Spacing([0, 1, 2].map(|axis| self.0[axis] * unit.0[axis] as f64))
    }
}

impl From<f64> for Spacing {
    fn from(value: f64) -> Self {
        Self([value; 3])
    }
}

impl From<[f64; 3]> for Spacing {
    fn from(value: [f64; 3]) -> Self {
        Self(value)
    }
}

/// Dense 3D block of samples with its voxel spacing.
#[derive(Clone, Debug)]
pub struct VolumeBlock {
    data: Array3<f64>,
    spacing: Spacing,
}

impl VolumeBlock {
    /// Wraps an owned array.
    pub fn new(data: Array3<f64>, spacing: impl Into<Spacing>) -> CorrDistResult<Self> {
        let spacing = spacing.into();
        spacing.validate()?;
        if data.is_empty() {
            return Err(CorrDistError::InvalidInput("volume must not be empty"));
        }
        Ok(Self { data, spacing })
    }

    /// Builds a block from a row-major buffer.
    pub fn from_vec(
        data: Vec<f64>,
        shape: [usize; 3],
        spacing: impl Into<Spacing>,
    ) -> CorrDistResult<Self> {
        let needed = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(CorrDistError::InvalidInput("volume shape overflows usize"))?;
        if data.len() != needed {
            return Err(CorrDistError::ShapeMismatch {
                shape,
                needed,
                got: data.len(),
            });
        }
        let data = Array3::from_shape_vec((shape[0], shape[1], shape[2]), data).map_err(|_| {
            CorrDistError::ShapeMismatch {
                shape,
                needed,
                got: needed,
            }
        })?;
        Self::new(data, spacing)
    }

    /// Returns the shape of the block.
    pub fn shape(&self) -> Shape3 {
        let (a, b, c) = self.data.dim();
        Shape3([a, b, c])
    }

    /// Returns the voxel spacing.
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Returns a borrowed view of the samples.
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// Consumes the block and returns the sample array.
    pub fn into_array(self) -> Array3<f64> {
        self.data
    }
}

/// Coarse per-cell result grid together with its spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMap {
    /// One value per output cell; NaN marks windows with no usable statistic.
    pub values: Array3<f64>,
    /// Physical size of one output cell.
    pub spacing: [f64; 3],
}

impl CorrelationMap {
    /// Returns the output grid shape.
    pub fn shape(&self) -> [usize; 3] {
        let (a, b, c) = self.values.dim();
        [a, b, c]
    }

    /// Number of cells holding NaN.
    pub fn nan_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Splits the map into its array and spacing.
    pub fn into_parts(self) -> (Array3<f64>, [f64; 3]) {
        (self.values, self.spacing)
    }
}
