//! Tiled correlation-length estimation over a whole volume.
//!
//! The engine pads the volume once by reflection, splits it into unit-aligned
//! subvolumes, evaluates a [`FeatureKernel`] for every unit cell of every
//! subvolume on a bounded worker pool, and stitches the per-subvolume buffers
//! back into one coarse grid. Progress is polled from per-task counters on the
//! calling thread and forwarded to a [`ProgressSink`].

mod pool;
mod progress;
mod stitch;
mod task;

pub use progress::{NoProgress, ProgressSink};
pub use stitch::{stitch, SubvolumeResult};

use crate::kernel::{CorrelationLength, FeatureKernel};
use crate::tiling::{tile, KernelWindows};
use crate::trace::{trace_event, trace_span};
use crate::util::math::cube_root_ceil;
use crate::util::{CorrDistError, CorrDistResult};
use crate::volume::{reflect_pad, CorrelationMap, IntoShape3, Shape3, VolumeBlock};
use ndarray::{s, Array3};
use pool::WorkerPool;
use progress::{map_progress, ProgressBoard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use task::SubvolumeTask;

/// Configuration for a correlation run.
#[derive(Clone, Debug)]
pub struct CorrelationConfig {
    /// Upper bound on worker threads; `None` uses all cores but one.
    pub max_workers: Option<usize>,
    /// How long the orchestrator waits for a result before polling progress.
    pub poll_interval: Duration,
    /// Progress value reported when the run starts.
    pub initial_progress: f64,
    /// Progress value reported when the run completes.
    pub final_progress: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            poll_interval: Duration::from_secs(2),
            initial_progress: 0.0,
            final_progress: 1.0,
        }
    }
}

impl CorrelationConfig {
    fn validate(&self) -> CorrDistResult<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.initial_progress) || !in_unit(self.final_progress) {
            return Err(CorrDistError::InvalidInput(
                "progress bounds must lie in [0, 1]",
            ));
        }
        if self.initial_progress > self.final_progress {
            return Err(CorrDistError::InvalidInput(
                "initial_progress must not exceed final_progress",
            ));
        }
        if self.max_workers == Some(0) {
            return Err(CorrDistError::InvalidInput("max_workers must be at least 1"));
        }
        Ok(())
    }

    fn requested_workers(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2)
                .saturating_sub(1)
                .max(1)
        })
    }
}

/// Border width added around the volume for a kernel/unit pair.
///
/// `ceil(max(kernel) / 2) - floor(min(unit) / 2)`, computed once per run and
/// applied to every subvolume alike.
pub fn padding_for(kernel_shape: Shape3, unit_shape: Shape3) -> usize {
    kernel_shape
        .max()
        .div_ceil(2)
        .saturating_sub(unit_shape.min() / 2)
}

/// Validated geometry of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrelationGeometry {
    /// Shape of the unpadded input.
    pub volume_shape: Shape3,
    /// Kernel window shape in voxels.
    pub kernel_shape: Shape3,
    /// Unit cell shape in voxels.
    pub unit_shape: Shape3,
    /// Reflection padding on every side.
    pub padding: usize,
    /// Shape of the output grid, `floor(volume / unit)`.
    pub output_shape: [usize; 3],
    /// Spacing of the output grid, `spacing * unit`.
    pub output_spacing: [f64; 3],
}

impl CorrelationGeometry {
    /// Checks the shape preconditions and derives the run geometry.
    ///
    /// Shapes given as floats are rounded to the nearest integer first.
    pub fn new(
        volume: &VolumeBlock,
        kernel_shape: impl IntoShape3,
        unit_shape: impl IntoShape3,
    ) -> CorrDistResult<Self> {
        let kernel = kernel_shape.into_shape3()?;
        let unit = unit_shape.into_shape3()?;
        let shape = volume.shape();

        if unit.is_empty() {
            return Err(CorrDistError::InvalidInput(
                "unit shape must be at least one voxel along every axis",
            ));
        }
        if (0..3).any(|axis| unit.0[axis] >= shape.0[axis]) {
            return Err(CorrDistError::UnitNotSmallerThanVolume {
                unit: unit.0,
                volume: shape.0,
            });
        }
        if (0..3).any(|axis| kernel.0[axis] <= unit.0[axis]) {
            return Err(CorrDistError::KernelNotLargerThanUnit {
                kernel: kernel.0,
                unit: unit.0,
            });
        }

        Ok(Self {
            volume_shape: shape,
            kernel_shape: kernel,
            unit_shape: unit,
            padding: padding_for(kernel, unit),
            output_shape: shape.div_floor(unit),
            output_spacing: volume.spacing().scaled(unit).axes(),
        })
    }
}

/// Orchestrates tiled correlation runs.
#[derive(Clone, Debug, Default)]
pub struct CorrelationEngine {
    cfg: CorrelationConfig,
}

impl CorrelationEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: CorrelationConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.cfg
    }

    /// Estimates the correlation length of every unit cell of `volume`.
    ///
    /// Returns the coarse map with spacing `spacing * unit_shape`. Windows
    /// whose autocovariance has fewer than two lags above threshold hold NaN.
    pub fn calculate_correlation(
        &self,
        volume: &VolumeBlock,
        kernel_shape: impl IntoShape3,
        unit_shape: impl IntoShape3,
        progress: impl ProgressSink,
    ) -> CorrDistResult<CorrelationMap> {
        self.calculate_with::<CorrelationLength>(volume, kernel_shape, unit_shape, progress)
    }

    /// Runs the tiled pipeline with an arbitrary per-window kernel.
    pub fn calculate_with<K: FeatureKernel>(
        &self,
        volume: &VolumeBlock,
        kernel_shape: impl IntoShape3,
        unit_shape: impl IntoShape3,
        mut progress: impl ProgressSink,
    ) -> CorrDistResult<CorrelationMap> {
        self.cfg.validate()?;
        let geom = CorrelationGeometry::new(volume, kernel_shape, unit_shape)?;
        let _span = trace_span!("calculate_correlation", padding = geom.padding).entered();

        let requested = self.cfg.requested_workers();
        let divisor = cube_root_ceil(requested);
        let subvolumes = tile(geom.volume_shape, geom.unit_shape, divisor)?;
        let pool = WorkerPool::new(requested.min(subvolumes.len()))?;
        trace_event!(
            "subvolumes_planned",
            count = subvolumes.len(),
            cells = geom.output_shape.iter().product::<usize>(),
            divisor = divisor,
            workers = pool.workers()
        );

        let padded = reflect_pad(volume.view(), geom.padding)?;
        let board = ProgressBoard::new(
            subvolumes.len(),
            self.cfg.initial_progress,
            self.cfg.final_progress,
        );
        let abort = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let total = subvolumes.len();

        progress.report(board.mapped());
        for subvolume in subvolumes {
            let [r0, r1, r2] = subvolume.padded_bounds(geom.padding);
            let slab = padded.slice(s![r0, r1, r2]).to_owned();
            let writer = board.writer(subvolume.index)?;
            let task = SubvolumeTask {
                subvolume,
                slab,
                padding: geom.padding,
                kernel: geom.kernel_shape.dims(),
                unit: geom.unit_shape.dims(),
                spacing: volume.spacing().axes(),
                progress: writer,
                abort: Arc::clone(&abort),
            };
            let tx = tx.clone();
            pool.spawn(move || {
                let index = task.subvolume.index;
                let _ = tx.send((index, task.run::<K>()));
            })?;
        }
        drop(tx);

        let mut finished: Vec<Option<SubvolumeResult>> = (0..total).map(|_| None).collect();
        let mut first_error: Option<CorrDistError> = None;
        let mut pending = total;
        while pending > 0 {
            match rx.recv_timeout(self.cfg.poll_interval) {
                Ok((index, Ok(result))) => {
                    pending -= 1;
                    trace_event!("subvolume_done", index = index, cells = result.values.len());
                    if let Some(slot) = finished.get_mut(index) {
                        *slot = Some(result);
                    }
                }
                Ok((_, Err(err))) => {
                    pending -= 1;
                    abort.store(true, Ordering::Relaxed);
                    first_error.get_or_insert(err);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    first_error.get_or_insert(CorrDistError::WorkerPool(
                        "workers exited before every subvolume reported".to_string(),
                    ));
                    break;
                }
            }
            let current = board.mapped();
            trace_event!("progress", value = current);
            progress.report(current);
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let values = stitch(geom.output_shape, finished.into_iter().flatten())?;
        progress.report(self.cfg.final_progress);
        trace_event!(
            "correlation_done",
            out_0 = geom.output_shape[0],
            out_1 = geom.output_shape[1],
            out_2 = geom.output_shape[2]
        );
        Ok(CorrelationMap {
            values,
            spacing: geom.output_spacing,
        })
    }

    /// Computes the same map on the calling thread without tiling.
    ///
    /// Walks the whole padded volume as a single subvolume; useful as a
    /// reference for the tiled path and for small inputs.
    pub fn calculate_sequential<K: FeatureKernel>(
        &self,
        volume: &VolumeBlock,
        kernel_shape: impl IntoShape3,
        unit_shape: impl IntoShape3,
        mut progress: impl ProgressSink,
    ) -> CorrDistResult<CorrelationMap> {
        self.cfg.validate()?;
        let geom = CorrelationGeometry::new(volume, kernel_shape, unit_shape)?;
        let padded = reflect_pad(volume.view(), geom.padding)?;
        let kernel = geom.kernel_shape.dims();
        let mut plan = K::plan(kernel, volume.spacing().axes())?;
        let out = geom.output_shape;
        let mut values = Array3::from_elem((out[0], out[1], out[2]), f64::NAN);

        progress.report(self.cfg.initial_progress);
        let windows = KernelWindows::new(geom.padding, kernel, geom.unit_shape.dims(), out)?;
        for window in windows {
            let [r0, r1, r2] = window.bounds;
            values[window.output] = K::evaluate(&mut plan, padded.slice(s![r0, r1, r2]))?;
            if let Some(percent) = window.progress {
                progress.report(map_progress(
                    f64::from(percent) / 100.0,
                    self.cfg.initial_progress,
                    self.cfg.final_progress,
                ));
            }
        }

        Ok(CorrelationMap {
            values,
            spacing: geom.output_spacing,
        })
    }
}

/// Runs [`CorrelationEngine::calculate_correlation`] with default settings
/// and no progress reporting.
pub fn calculate_correlation(
    volume: &VolumeBlock,
    kernel_shape: impl IntoShape3,
    unit_shape: impl IntoShape3,
) -> CorrDistResult<CorrelationMap> {
    CorrelationEngine::new().calculate_correlation(volume, kernel_shape, unit_shape, NoProgress)
}
