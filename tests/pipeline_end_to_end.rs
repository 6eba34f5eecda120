use corrdist::{
    calculate_correlation, padding_for, CorrDistError, CorrelationConfig, CorrelationEngine,
    NoProgress, Shape3, VolumeBlock,
};
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn make_volume(shape: [usize; 3], seed: u64) -> VolumeBlock {
    let mut rng = StdRng::seed_from_u64(seed);
    let tau = std::f64::consts::TAU;
    let data = Array3::from_shape_fn((shape[0], shape[1], shape[2]), |(i, j, k)| {
        let x = i as f64 / 9.0;
        let y = j as f64 / 7.0;
        let z = k as f64 / 11.0;
        (tau * x).sin() + 0.6 * (tau * y).cos() + 0.4 * (tau * (z + x)).sin()
            + 0.05 * rng.random::<f64>()
    });
    VolumeBlock::new(data, 1.0).unwrap()
}

fn fast_engine(workers: usize) -> CorrelationEngine {
    CorrelationEngine::new().with_config(CorrelationConfig {
        max_workers: Some(workers),
        poll_interval: Duration::from_millis(5),
        ..CorrelationConfig::default()
    })
}

#[test]
fn output_shape_and_spacing_follow_unit_shape() {
    let volume = make_volume([60, 60, 60], 1);
    let map = fast_engine(4)
        .calculate_correlation(&volume, [12, 12, 12], [4, 4, 4], NoProgress)
        .unwrap();
    assert_eq!(map.shape(), [15, 15, 15]);
    assert_eq!(map.spacing, [4.0, 4.0, 4.0]);
    assert_eq!(map.nan_count(), 0);
    assert!(map.values.iter().all(|v| *v > 0.0));
}

#[test]
fn anisotropic_spacing_and_remainders() {
    let data = make_volume([23, 18, 30], 2).into_array();
    let volume = VolumeBlock::new(data, [0.5, 2.0, 1.0]).unwrap();
    let map = fast_engine(3)
        .calculate_correlation(&volume, [9, 8, 10], [5, 3, 4], NoProgress)
        .unwrap();
    assert_eq!(map.shape(), [4, 6, 7]);
    assert_eq!(map.spacing, [2.5, 6.0, 4.0]);
}

#[test]
fn float_shapes_are_rounded() {
    let volume = make_volume([20, 20, 20], 3);
    let rounded = fast_engine(2)
        .calculate_correlation(&volume, [8.4, 7.6, 8.0], [3.9, 4.2, 4.0], NoProgress)
        .unwrap();
    let exact = fast_engine(2)
        .calculate_correlation(&volume, [8, 8, 8], [4, 4, 4], NoProgress)
        .unwrap();
    assert_eq!(rounded.shape(), [5, 5, 5]);
    assert_eq!(rounded.values, exact.values);
}

#[test]
fn unit_not_smaller_than_volume_is_rejected() {
    let volume = make_volume([16, 16, 16], 4);
    let err = calculate_correlation(&volume, [20, 20, 20], [16, 4, 4]).unwrap_err();
    assert_eq!(
        err,
        CorrDistError::UnitNotSmallerThanVolume {
            unit: [16, 4, 4],
            volume: [16, 16, 16],
        }
    );
    assert!(err.is_input_error());

    let err = calculate_correlation(&volume, [20, 20, 40], [4, 4, 17]).unwrap_err();
    assert!(matches!(err, CorrDistError::UnitNotSmallerThanVolume { .. }));
}

#[test]
fn kernel_not_larger_than_unit_is_rejected() {
    let volume = make_volume([16, 16, 16], 5);
    let err = calculate_correlation(&volume, [8, 4, 8], [4, 4, 4]).unwrap_err();
    assert_eq!(
        err,
        CorrDistError::KernelNotLargerThanUnit {
            kernel: [8, 4, 8],
            unit: [4, 4, 4],
        }
    );
    let err = calculate_correlation(&volume, [8, 8, 3], [4, 4, 4]).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn zero_unit_is_rejected() {
    let volume = make_volume([16, 16, 16], 6);
    let err = calculate_correlation(&volume, [8, 8, 8], [4, 0, 4]).unwrap_err();
    assert!(matches!(err, CorrDistError::InvalidInput(_)));
}

#[test]
fn invalid_progress_bounds_are_rejected() {
    let volume = make_volume([16, 16, 16], 7);
    let engine = CorrelationEngine::new().with_config(CorrelationConfig {
        initial_progress: 0.8,
        final_progress: 0.2,
        ..CorrelationConfig::default()
    });
    let err = engine
        .calculate_correlation(&volume, [8, 8, 8], [4, 4, 4], NoProgress)
        .unwrap_err();
    assert!(matches!(err, CorrDistError::InvalidInput(_)));
}

#[test]
fn padding_depends_only_on_kernel_and_unit() {
    assert_eq!(padding_for(Shape3([12, 12, 12]), Shape3([4, 4, 4])), 4);
    assert_eq!(padding_for(Shape3([9, 8, 10]), Shape3([5, 3, 4])), 4);
    assert_eq!(padding_for(Shape3([7, 7, 7]), Shape3([4, 4, 4])), 2);
}

#[test]
fn progress_is_monotonic_and_ends_at_final_value() {
    let volume = make_volume([32, 32, 32], 8);
    let engine = CorrelationEngine::new().with_config(CorrelationConfig {
        max_workers: Some(3),
        poll_interval: Duration::from_millis(1),
        initial_progress: 0.25,
        final_progress: 0.75,
    });
    let mut reports = Vec::new();
    engine
        .calculate_correlation(&volume, [10, 10, 10], [4, 4, 4], |p: f64| reports.push(p))
        .unwrap();

    assert!(reports.len() >= 2);
    assert_eq!(reports.first().copied(), Some(0.25));
    assert_eq!(reports.last().copied(), Some(0.75));
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
    assert!(reports.iter().all(|p| (0.25..=0.75).contains(p)));
}

#[test]
fn constant_volume_maps_to_nan_without_error() {
    let volume = VolumeBlock::new(Array3::from_elem((20, 20, 20), 4.5), 1.0).unwrap();
    let map = fast_engine(4)
        .calculate_correlation(&volume, [8, 8, 8], [4, 4, 4], NoProgress)
        .unwrap();
    assert_eq!(map.shape(), [5, 5, 5]);
    assert_eq!(map.nan_count(), map.values.len());
}
