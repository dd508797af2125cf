//! Ship definitions and geometry, tracked with our `BitBoard`.

use core::fmt;

use crate::bitboard::BitBoard;
use crate::common::{Coordinate, PlacementFault};
use crate::config::BOARD_SIZE;

type BB = BitBoard<u128, { BOARD_SIZE as usize }>;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The `k`-th cell of a run starting at `origin`, if it stays on the grid.
    pub fn step(self, origin: Coordinate, k: usize) -> Option<Coordinate> {
        match self {
            Orientation::Horizontal => Coordinate::new(origin.row(), origin.col() + k),
            Orientation::Vertical => Coordinate::new(origin.row() + k, origin.col()),
        }
    }
}

/// The ship catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::Destroyer,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "Carrier",
            ShipKind::Battleship => "Battleship",
            ShipKind::Cruiser => "Cruiser",
            ShipKind::Submarine => "Submarine",
            ShipKind::Destroyer => "Destroyer",
        }
    }

    pub const fn length(self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser | ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ship placed on the board, with hits tracked in a `BitBoard`.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    kind: ShipKind,
    orientation: Orientation,
    origin: Coordinate,
    mask: BB,
    hits: BB,
}

impl Ship {
    /// Place a ship of `kind` starting at `origin` and running along
    /// `orientation`.
    pub fn new(
        kind: ShipKind,
        orientation: Orientation,
        origin: Coordinate,
    ) -> Result<Self, PlacementFault> {
        let mut mask = BB::new();
        for k in 0..kind.length() {
            let cell = orientation
                .step(origin, k)
                .ok_or_else(|| out_of_bounds(orientation, origin, k))?;
            mask.insert(cell)
                .map_err(|_| out_of_bounds(orientation, origin, k))?;
        }
        Ok(Ship {
            kind,
            orientation,
            origin,
            mask,
            hits: BB::new(),
        })
    }

    /// Build a ship from an explicit cell list in any order. The cells must
    /// form one gap-free horizontal or vertical run of the kind's length.
    pub fn from_cells(kind: ShipKind, cells: &[Coordinate]) -> Result<Self, PlacementFault> {
        if cells.len() != kind.length() {
            return Err(PlacementFault::WrongLength {
                expected: kind.length(),
                actual: cells.len(),
            });
        }
        let origin = cells.iter().copied().min().ok_or(PlacementFault::NotStraight)?;
        let same_row = cells.iter().all(|c| c.row() == origin.row());
        let same_col = cells.iter().all(|c| c.col() == origin.col());
        let orientation = match (same_row, same_col) {
            (true, false) => Orientation::Horizontal,
            (false, true) => Orientation::Vertical,
            _ => return Err(PlacementFault::NotStraight),
        };
        let ship =
            Ship::new(kind, orientation, origin).map_err(|_| PlacementFault::NotStraight)?;
        // Duplicate or scattered cells leave part of the run uncovered.
        let covered = BB::from_coords(cells.iter().copied())
            .map_err(|_| PlacementFault::NotStraight)?;
        if covered == ship.mask {
            Ok(ship)
        } else {
            Err(PlacementFault::NotStraight)
        }
    }

    /// Register an incoming shot. Returns `true` if it struck this ship.
    pub fn register_hit(&mut self, coord: Coordinate) -> bool {
        if self.mask.contains(coord) {
            let _ = self.hits.insert(coord);
            true
        } else {
            false
        }
    }

    /// `true` once every cell of the ship has been hit.
    pub fn is_destroyed(&self) -> bool {
        (self.hits & self.mask) == self.mask
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.mask.contains(coord)
    }

    /// Cells covered by the ship, from the origin outwards.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.kind.length()).filter_map(move |k| self.orientation.step(self.origin, k))
    }

    pub fn hit_count(&self) -> usize {
        self.hits.count_ones()
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupancy mask of the ship on the board.
    pub fn mask(&self) -> BB {
        self.mask
    }
}

fn out_of_bounds(orientation: Orientation, origin: Coordinate, k: usize) -> PlacementFault {
    let (row, col) = match orientation {
        Orientation::Horizontal => (origin.row(), origin.col() + k),
        Orientation::Vertical => (origin.row() + k, origin.col()),
    };
    PlacementFault::OutOfBounds {
        row: row as i64,
        col: col as i64,
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ kind: {}, origin: {}, orientation: {:?}, hits: {}/{} }}",
            self.kind,
            self.origin,
            self.orientation,
            self.hits.count_ones(),
            self.kind.length(),
        )
    }
}
