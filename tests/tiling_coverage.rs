//! Table-driven checks that tiles cover the output grid exactly once.

use corrdist::lowlevel::{tile, tile_counts, Subvolume};
use corrdist::Shape3;
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

const CASES_JSON: &str = r#"
{
  "cases": [
    {"case_id": "cube_even", "volume": [60, 60, 60], "unit": [4, 4, 4], "divisor": 2, "tiles": 8},
    {"case_id": "remainder", "volume": [61, 30, 17], "unit": [4, 3, 5], "divisor": 3, "tiles": 27},
    {"case_id": "clamped", "volume": [9, 40, 40], "unit": [4, 4, 4], "divisor": 4, "tiles": 32},
    {"case_id": "single_tile", "volume": [20, 20, 20], "unit": [6, 6, 6], "divisor": 1, "tiles": 1},
    {"case_id": "unit_of_one", "volume": [5, 7, 3], "unit": [1, 1, 1], "divisor": 5, "tiles": 75},
    {"case_id": "zero_divisor", "volume": [12, 12, 12], "unit": [2, 2, 2], "divisor": 0, "tiles": 1}
  ]
}
"#;

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    volume: [usize; 3],
    unit: [usize; 3],
    divisor: usize,
    tiles: usize,
}

#[derive(Debug, Deserialize)]
struct Cases {
    cases: Vec<Case>,
}

fn assert_exact_cover(volume: [usize; 3], unit: [usize; 3], tiles: &[Subvolume], label: &str) {
    let out = [0, 1, 2].map(|axis| volume[axis] / unit[axis]);
    let mut hits = Array3::<u32>::zeros((out[0], out[1], out[2]));
    for t in tiles {
        for axis in 0..3 {
            assert_eq!(t.bounds[axis].start % unit[axis], 0, "{label}: unaligned start");
            assert_eq!(t.output[axis].start * unit[axis], t.bounds[axis].start, "{label}");
            assert!(t.bounds[axis].end <= volume[axis], "{label}: tile past volume");
            assert!(!t.output[axis].is_empty(), "{label}: empty output range");
       }
        for i in t.output[0].clone() {
            for j in t.output[1].clone() {
                for k in t.output[2].clone() {
                    hits[[i, j, k]] += 1;
               }
           }
       }
   }
    assert!(hits.iter().all(|&h| h == 1), "{label}: gaps or overlaps");
}

#[test]
fn tiles_cover_output_grid_for_table_cases() {
    let cases: Cases = serde_json::from_str(CASES_JSON).unwrap();
    for case in cases.cases {
        let tiles = tile(Shape3(case.volume), Shape3(case.unit), case.divisor).unwrap();
        assert_eq!(tiles.len(), case.tiles, "{}", case.case_id);
        let counts = tile_counts(Shape3(case.volume), Shape3(case.unit), case.divisor).unwrap();
        assert_eq!(counts.iter().product::<usize>(), case.tiles, "{}", case.case_id);
        assert_exact_cover(case.volume, case.unit, &tiles, &case.case_id);
   }
}

#[test]
fn tiles_cover_output_grid_for_random_geometry() {
    let mut rng = StdRng::seed_from_u64(0x7113);
    for round in 0..200 {
        let volume = [0; 3].map(|_| rng.random_range(2..48usize));
        let unit = volume.map(|v| rng.random_range(1..v));
        let divisor = rng.random_range(0..6usize);
        let tiles = tile(Shape3(volume), Shape3(unit), divisor).unwrap();
        assert_exact_cover(volume, unit, &tiles, &format!("round {round}"));
   }
}

#[test]
fn tiling_is_deterministic() {
    let first = tile(Shape3([61, 30, 17]), Shape3([4, 3, 5]), 3).unwrap();
    let second = tile(Shape3([61, 30, 17]), Shape3([4, 3, 5]), 3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn last_tile_on_each_axis_reaches_the_volume_edge() {
    let volume = [61, 30, 17];
    let tiles = tile(Shape3(volume), Shape3([4, 3, 5]), 3).unwrap();
    for axis in 0..3 {
        let reach = tiles.iter().map(|t| t.bounds[axis].end).max().unwrap();
        assert_eq!(reach, volume[axis]);
   }
}
