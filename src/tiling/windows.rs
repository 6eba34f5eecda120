//! Kernel window enumeration over one padded subvolume.

use crate::util::{CorrDistError, CorrDistResult};
use std::ops::Range;

/// Kernel slice for one output cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelWindow {
    /// Window bounds in the padded subvolume, one range per axis.
    pub bounds: [Range<usize>; 3],
    /// Output cell coordinate relative to the subvolume.
    pub output: [usize; 3],
    /// Integer percent done, present only when it advanced since the last
    /// window that carried one.
    pub progress: Option<u8>,
}

/// Row-major walk over the output cells of a subvolume.
///
/// For output coordinate `o`, the unit cell starts at `padding + o * unit`
/// and the kernel window starts `unit / 2 - kernel / 2` from there, which
/// centers the kernel on the unit cell. The iterator is finite, yielding
/// exactly `product(output_shape)` windows, and cannot be restarted.
#[derive(Clone, Debug)]
pub struct KernelWindows {
    padding: usize,
    kernel: [usize; 3],
    unit: [usize; 3],
    output_shape: [usize; 3],
    next: usize,
    total: usize,
    reported: u8,
}

impl KernelWindows {
    /// Creates the walk for a subvolume producing `output_shape` cells.
    ///
    /// Fails when the padding is too narrow for the first window to start
    /// inside the slab, i.e. `padding + unit / 2 < kernel / 2` on some axis.
    pub fn new(
        padding: usize,
        kernel: [usize; 3],
        unit: [usize; 3],
        output_shape: [usize; 3],
    ) -> CorrDistResult<Self> {
        if (0..3).any(|axis| padding + unit[axis] / 2 < kernel[axis] / 2) {
            return Err(CorrDistError::InvalidInput(
                "padding too small to center the kernel on the unit cell",
            ));
        }
        Ok(Self {
            padding,
            kernel,
            unit,
            output_shape,
            next: 0,
            total: output_shape.iter().product(),
            reported: 0,
        })
    }

    /// Total number of windows in the walk.
    pub fn total(&self) -> usize {
        self.total
    }

    fn coordinate(&self, flat: usize) -> [usize; 3] {
        let [_, n1, n2] = self.output_shape;
        [flat / (n1 * n2), (flat / n2) % n1, flat % n2]
    }
}

impl Iterator for KernelWindows {
    type Item = KernelWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let flat = self.next;
        self.next += 1;

        let output = self.coordinate(flat);
        let bounds = [0, 1, 2].map(|axis| {
            let base = self.padding + output[axis] * self.unit[axis];
            let start = base + self.unit[axis] / 2 - self.kernel[axis] / 2;
            start..start + self.kernel[axis]
        });

        let percent = (100 * self.next).div_ceil(self.total) as u8;
        let progress = if percent > self.reported {
            self.reported = percent;
            Some(percent)
        } else {
            None
        };

        Some(KernelWindow {
            bounds,
            output,
            progress,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for KernelWindows {}
