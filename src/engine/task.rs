//! Work performed for one subvolume.

use crate::engine::progress::ProgressWriter;
use crate::engine::stitch::SubvolumeResult;
use crate::kernel::FeatureKernel;
use crate::tiling::{KernelWindows, Subvolume};
use crate::util::{CorrDistError, CorrDistResult};
use ndarray::{s, Array3};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Self-contained input for one subvolume: a by-value copy of its padded slab
/// plus the geometry shared by the whole run.
pub(crate) struct SubvolumeTask {
    pub(crate) subvolume: Subvolume,
    pub(crate) slab: Array3<f64>,
    pub(crate) padding: usize,
    pub(crate) kernel: [usize; 3],
    pub(crate) unit: [usize; 3],
    pub(crate) spacing: [f64; 3],
    pub(crate) progress: ProgressWriter,
    pub(crate) abort: Arc<AtomicBool>,
}

impl SubvolumeTask {
    /// Runs the task, converting errors and panics into `WorkerFailed`.
    pub(crate) fn run<K: FeatureKernel>(self) -> CorrDistResult<SubvolumeResult> {
        let index = self.subvolume.index;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.evaluate::<K>()));
        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err @ CorrDistError::WorkerFailed { .. })) => Err(err),
            Ok(Err(err)) => Err(CorrDistError::WorkerFailed {
                subvolume: index,
                reason: err.to_string(),
            }),
            Err(payload) => Err(CorrDistError::WorkerFailed {
                subvolume: index,
                reason: panic_message(payload.as_ref()),
            }),
        }
    }

    fn evaluate<K: FeatureKernel>(self) -> CorrDistResult<SubvolumeResult> {
        self.progress.reset();
        let output_shape = self.subvolume.output_shape();
        let mut values = Array3::from_elem(
            (output_shape[0], output_shape[1], output_shape[2]),
            f64::NAN,
        );
        let mut plan = K::plan(self.kernel, self.spacing)?;

        let (a, b, c) = self.slab.dim();
        let slab_dims = [a, b, c];
        let windows = KernelWindows::new(self.padding, self.kernel, self.unit, output_shape)?;
        for window in windows {
            if self.abort.load(Ordering::Relaxed) {
                return Err(CorrDistError::WorkerFailed {
                    subvolume: self.subvolume.index,
                    reason: "aborted after another subvolume failed".to_string(),
                });
            }
            if (0..3).any(|axis| window.bounds[axis].end > slab_dims[axis]) {
                return Err(CorrDistError::InvalidInput(
                    "kernel window extends past the padded subvolume",
                ));
            }
            let [r0, r1, r2] = window.bounds;
            let view = self.slab.slice(s![r0, r1, r2]);
            values[window.output] = K::evaluate(&mut plan, view)?;
            if let Some(percent) = window.progress {
                self.progress.advance(percent);
            }
        }

        Ok(SubvolumeResult {
            index: self.subvolume.index,
            output: self.subvolume.output.clone(),
            values,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
