//! Common types for the rules engine: coordinates, sides and the error taxonomy.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::config::BOARD_SIZE;
use crate::game::GameId;
use crate::ship::ShipKind;

/// A cell on the 10×10 grid. Both components are in bounds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// Returns `None` when either component falls outside the grid.
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE as usize && col < BOARD_SIZE as usize {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Like [`Coordinate::new`] but for untrusted signed input.
    pub fn from_signed(row: i64, col: i64) -> Option<Self> {
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as usize, col as usize)
    }

    pub const fn row(&self) -> usize {
        self.row as usize
    }

    pub const fn col(&self) -> usize {
        self.col as usize
    }

    /// Every coordinate on the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        let n = BOARD_SIZE as usize;
        (0..n * n).map(move |i| Coordinate {
            row: (i / n) as u8,
            col: (i % n) as u8,
        })
    }
}

/// Move notation: column letter followed by the 1-based row, e.g. `A1`, `J10`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Coordinate {
    type Err = GameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let mut chars = input.chars();
        let col_ch = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(|| invalid(input))?
            .to_ascii_uppercase();
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(input));
        }
        let row: usize = digits.parse().map_err(|_| invalid(input))?;
        let col = (col_ch as u8 - b'A') as usize;
        row.checked_sub(1)
            .and_then(|r| Coordinate::new(r, col))
            .ok_or_else(|| invalid(input))
    }
}

fn invalid(input: &str) -> GameError {
    GameError::InvalidArgument(alloc::format!(
        "'{}' is not a target between A1 and J10",
        input
    ))
}

/// One of the two seats in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub const fn from_player1_flag(is_player1: bool) -> Self {
        if is_player1 {
            Side::Player1
        } else {
            Side::Player2
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => 1,
        }
    }
}

/// Why a single ship could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementFault {
    /// A cell lies outside the grid.
    OutOfBounds { row: i64, col: i64 },
    /// A cell is already occupied by another ship.
    Overlap(Coordinate),
    /// Cells do not form a single straight, gap-free run.
    NotStraight,
    WrongLength { expected: usize, actual: usize },
    UnknownShipType(String),
    /// The same ship type appears twice in one fleet.
    DuplicateShipType,
    /// The fleet already holds the maximum number of ships.
    FleetFull,
    EmptyFleet,
    /// Random placement ran out of attempts.
    Exhausted,
}

impl fmt::Display for PlacementFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementFault::OutOfBounds { row, col } => {
                write!(f, "cell ({}, {}) is outside the grid", row, col)
            }
            PlacementFault::Overlap(coord) => write!(f, "overlaps another ship at {}", coord),
            PlacementFault::NotStraight => write!(f, "cells must form one straight line"),
            PlacementFault::WrongLength { expected, actual } => {
                write!(f, "expected {} cells, got {}", expected, actual)
            }
            PlacementFault::UnknownShipType(name) => write!(f, "unknown ship type '{}'", name),
            PlacementFault::DuplicateShipType => write!(f, "ship type placed twice"),
            PlacementFault::FleetFull => write!(f, "fleet is already complete"),
            PlacementFault::EmptyFleet => write!(f, "a fleet needs at least one ship"),
            PlacementFault::Exhausted => write!(f, "no free position found"),
        }
    }
}

/// A placement failure pinned to the ship that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementError {
    /// Position of the offending ship in the submitted list.
    pub index: usize,
    pub ship: Option<ShipKind>,
    pub fault: PlacementFault,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ship {
            Some(kind) => write!(f, "ship #{} ({}): {}", self.index + 1, kind, self.fault),
            None => write!(f, "ship #{}: {}", self.index + 1, self.fault),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}

/// Errors returned by game operations. All are recoverable; the terminal and
/// turn variants carry enough context to produce a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    InvalidPlacement(PlacementError),
    NotFound(GameId),
    GameOver { winner: String },
    GameCancelled,
    WrongTurn { expected: String },
    AlreadyTargeted(Coordinate),
    InvalidArgument(String),
}

impl From<PlacementError> for GameError {
    fn from(err: PlacementError) -> Self {
        GameError::InvalidPlacement(err)
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidPlacement(e) => write!(f, "Invalid placement: {}", e),
            GameError::NotFound(id) => write!(f, "Game {} not found!", id),
            GameError::GameOver { winner } => write!(f, "Game already over! {} wins!", winner),
            GameError::GameCancelled => write!(f, "Game already cancelled!"),
            GameError::WrongTurn { expected } => {
                write!(f, "It is not your turn! {}'s turn", expected)
            }
            GameError::AlreadyTargeted(coord) => write!(f, "{} has already been targeted", coord),
            GameError::InvalidArgument(reason) => write!(f, "Invalid argument: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}
