// Probability-based targeting for the automated opponent.
// Works on a tracking grid only, so it never sees the defender's layout.
// no_std and free of heap allocations.

use rand::Rng;

use crate::common::Coordinate;
use crate::config::{BOARD_SIZE, TARGETING_TEMPERATURE};
use crate::grid::TrackingGrid;
use crate::ship::Orientation;

const GRID_SIZE: usize = BOARD_SIZE as usize;

/// Relative likelihood of a ship segment at each cell.
pub type Pdf = [[f64; GRID_SIZE]; GRID_SIZE];

/// Placements covering observed hits get this factor per hit, so squares
/// next to a damaged ship stand out.
const HIT_BIAS: f64 = 10.0;

/// Compute a probability density over all unguessed squares given the shots
/// recorded in `tracking` and the lengths of ships still afloat.
pub fn calc_pdf(tracking: &TrackingGrid, remaining_lengths: &[usize]) -> Pdf {
    let hits = tracking.hits();
    let misses = tracking.misses();
    let mut matrix = [[0.0f64; GRID_SIZE]; GRID_SIZE];

    for &len in remaining_lengths {
        if len == 0 || len > GRID_SIZE {
            continue;
        }
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            let (max_row, max_col) = match orient {
                Orientation::Horizontal => (GRID_SIZE, GRID_SIZE - len + 1),
                Orientation::Vertical => (GRID_SIZE - len + 1, GRID_SIZE),
            };
            for r in 0..max_row {
                for c in 0..max_col {
                    let cell = |k: usize| match orient {
                        Orientation::Horizontal => (r, c + k),
                        Orientation::Vertical => (r + k, c),
                    };
                    let mut valid = true;
                    let mut n_hits = 0i32;
                    for k in 0..len {
                        let (rr, cc) = cell(k);
                        if misses.get(rr, cc).unwrap_or(false) {
                            valid = false;
                            break;
                        }
                        if hits.get(rr, cc).unwrap_or(false) {
                            n_hits += 1;
                        }
                    }
                    if !valid {
                        continue;
                    }
                    let weight = libm::pow(HIT_BIAS, n_hits as f64);
                    for k in 0..len {
                        let (rr, cc) = cell(k);
                        if !hits.get(rr, cc).unwrap_or(false) {
                            matrix[rr][cc] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix)
}

fn normalize(mut matrix: Pdf) -> Pdf {
    let total: f64 = matrix.iter().flatten().sum();
    if total == 0.0 {
        let uniform = 1.0 / (GRID_SIZE * GRID_SIZE) as f64;
        return [[uniform; GRID_SIZE]; GRID_SIZE];
    }
    for v in matrix.iter_mut().flatten() {
        *v /= total;
    }
    matrix
}

/// Sample a cell from `pdf`. Lower temperatures favour the likeliest cells.
pub fn sample_pdf<R: Rng + ?Sized>(pdf: &Pdf, temperature: f64, rng: &mut R) -> (usize, usize) {
    let exponent = 1.0 / temperature;
    let weight = |p: f64| libm::pow(p, exponent);
    let total: f64 = pdf.iter().flatten().map(|&p| weight(p)).sum();
    if !(total > 0.0 && total.is_finite()) {
        return (
            rng.random_range(0..GRID_SIZE),
            rng.random_range(0..GRID_SIZE),
        );
    }
    let mut threshold: f64 = rng.random_range(0.0..total);
    for (i, &p) in pdf.iter().flatten().enumerate() {
        let w = weight(p);
        if threshold < w {
            return (i / GRID_SIZE, i % GRID_SIZE);
        }
        threshold -= w;
    }
    (GRID_SIZE - 1, GRID_SIZE - 1)
}

/// Pick the next cell to fire at. Always returns an untargeted cell, or
/// `None` once every cell has been fired at.
pub fn choose_target<R: Rng + ?Sized>(
    tracking: &TrackingGrid,
    remaining_lengths: &[usize],
    rng: &mut R,
) -> Option<Coordinate> {
    let pdf = calc_pdf(tracking, remaining_lengths);
    let (r, c) = sample_pdf(&pdf, TARGETING_TEMPERATURE, rng);
    Coordinate::new(r, c)
        .filter(|coord| !tracking.is_targeted(*coord))
        .or_else(|| {
            tracking
                .untargeted()
                .iter_set_bits()
                .next()
                .and_then(|(r, c)| Coordinate::new(r, c))
        })
}
