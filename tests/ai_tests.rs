use battleship_rules::{
    calc_pdf, choose_target, random_fleet, sample_pdf, Coordinate, GridModel, TrackingGrid,
    STANDARD_FLEET,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn c(row: usize, col: usize) -> Coordinate {
    Coordinate::new(row, col).unwrap()
}

#[test]
fn test_pdf_is_normalized() {
    let pdf = calc_pdf(&TrackingGrid::new(), &[5, 4, 3, 3, 2]);
    let total: f64 = pdf.iter().flatten().sum();
    assert!((total - 1.0).abs() < 1e-9);
    // the centre admits more placements than a corner
    assert!(pdf[4][4] > pdf[0][0]);
}

#[test]
fn test_pdf_favours_cells_next_to_hits() {
    let mut tracking = TrackingGrid::new();
    tracking.record(c(5, 5), true, None).unwrap();
    let pdf = calc_pdf(&tracking, &[2]);
    assert_eq!(pdf[5][5], 0.0);
    assert!(pdf[5][6] > pdf[0][0] * 5.0);
    assert!(pdf[4][5] > pdf[9][9] * 5.0);
}

#[test]
fn test_pdf_excludes_misses() {
    let mut tracking = TrackingGrid::new();
    tracking.record(c(0, 1), false, None).unwrap();
    tracking.record(c(1, 0), false, None).unwrap();
    let pdf = calc_pdf(&tracking, &[2]);
    assert_eq!(pdf[0][0], 0.0);
    assert_eq!(pdf[0][1], 0.0);
}

#[test]
fn test_sample_pdf_in_bounds() {
    let mut rng = SmallRng::seed_from_u64(3);
    let pdf = calc_pdf(&TrackingGrid::new(), &[3]);
    for _ in 0..100 {
        let (r, c) = sample_pdf(&pdf, 0.5, &mut rng);
        assert!(r < 10 && c < 10);
    }
}

#[test]
fn test_choose_target_never_repeats() {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut tracking = TrackingGrid::new();
    for _ in 0..100 {
        let target = choose_target(&tracking, &[5, 4, 3, 3, 2], &mut rng).unwrap();
        assert!(!tracking.is_targeted(target));
        tracking.record(target, false, None).unwrap();
    }
    assert_eq!(choose_target(&tracking, &[2], &mut rng), None);
}

fn remaining(grid: &GridModel) -> Vec<usize> {
    grid.kinds_afloat().map(|k| k.length()).collect()
}

#[test]
fn test_ai_sinks_fleet() {
    let mut rng = SmallRng::seed_from_u64(123);
    let mut defender = random_fleet(&mut rng, &STANDARD_FLEET).unwrap();
    let mut tracking = TrackingGrid::new();
    let mut shots = 0;
    while !defender.all_destroyed() {
        let target = choose_target(&tracking, &remaining(&defender), &mut rng).unwrap();
        let outcome = defender.attack(target).unwrap();
        let sunk = outcome
            .ship
            .filter(|_| outcome.destroyed)
            .and_then(|id| defender.ship(id))
            .map(|s| s.kind());
        tracking.record(target, outcome.hit, sunk).unwrap();
        shots += 1;
    }
    assert!(shots <= 100);
    assert_eq!(tracking.sunk().len(), STANDARD_FLEET.len());
}
