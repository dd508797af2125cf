#![cfg(feature = "std")]

use std::fmt::Write;

use crate::ai::Pdf;
use crate::common::Coordinate;
use crate::config::BOARD_SIZE;
use crate::grid::{CellState, GridModel, TrackingGrid};

fn header(out: &mut String, width: usize) {
    out.push_str("   ");
    for c in 0..BOARD_SIZE as usize {
        let ch = (b'A' + c as u8) as char;
        let _ = write!(out, " {:>width$}", ch, width = width);
    }
    out.push('\n');
}

fn render(cell: impl Fn(Coordinate) -> char) -> String {
    let mut out = String::new();
    header(&mut out, 1);
    for r in 0..BOARD_SIZE as usize {
        let _ = write!(out, "{:2} ", r + 1);
        for c in 0..BOARD_SIZE as usize {
            let ch = Coordinate::new(r, c).map_or('.', &cell);
            let _ = write!(out, " {}", ch);
        }
        out.push('\n');
    }
    out
}

fn symbol(state: CellState, reveal: bool) -> char {
    match state {
        CellState::Hit => 'X',
        CellState::Miss => 'o',
        CellState::Occupied(_) if reveal => 'S',
        CellState::Occupied(_) | CellState::Empty => '.',
    }
}

/// A player's own grid. Ships are drawn only with `reveal`.
pub fn render_primary(grid: &GridModel, reveal: bool) -> String {
    render(|coord| symbol(grid.cell(coord), reveal))
}

/// Shots fired at the opponent.
pub fn render_tracking(grid: &TrackingGrid) -> String {
    render(|coord| symbol(grid.cell(coord), false))
}

/// Both grids as the player on move sees them.
pub fn render_player_view(primary: &GridModel, tracking: &TrackingGrid) -> String {
    format!(
        "Opponent board:\n{}\nYour board:\n{}",
        render_tracking(tracking),
        render_primary(primary, true)
    )
}

/// A normalized probability distribution matrix.
pub fn render_probability_board(pdf: &Pdf) -> String {
    let mut out = String::from("Probability distribution:\n");
    header(&mut out, 4);
    for (r, row) in pdf.iter().enumerate() {
        let _ = write!(out, "{:2} ", r + 1);
        for p in row {
            let _ = write!(out, " {:4.2}", p);
        }
        out.push('\n');
    }
    out
}
