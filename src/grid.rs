//! Per-player grids: the primary grid holding a fleet and its incoming shots,
//! and the tracking grid recording a player's shots at the opponent.

use alloc::vec::Vec;
use core::fmt;

use crate::bitboard::BitBoard;
use crate::common::{Coordinate, GameError, PlacementFault};
use crate::config::{BOARD_SIZE, MAX_FLEET_SIZE};
use crate::ship::{Ship, ShipKind};

type BB = BitBoard<u128, { BOARD_SIZE as usize }>;

/// Index of a ship within its grid, in placement order.
pub type ShipId = usize;

/// Observable state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Occupied(ShipId),
    Hit,
    Miss,
}

/// Result of a single attack on a primary grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub hit: bool,
    pub ship: Option<ShipId>,
    /// `true` only on the shot that struck the last intact cell of `ship`.
    pub destroyed: bool,
}

/// A player's own board: fleet layout plus every shot received.
#[derive(Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GridModel {
    ships: Vec<Ship>,
    ship_map: BB,
    hits: BB,
    misses: BB,
}

impl GridModel {
    /// An empty grid with no ships and every cell `Empty`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `ship` to the fleet.
    pub fn place(&mut self, ship: Ship) -> Result<ShipId, PlacementFault> {
        if self.ships.len() >= MAX_FLEET_SIZE {
            return Err(PlacementFault::FleetFull);
        }
        if self.ships.iter().any(|s| s.kind() == ship.kind()) {
            return Err(PlacementFault::DuplicateShipType);
        }
        let overlap = self.ship_map & ship.mask();
        if let Some((row, col)) = overlap.iter_set_bits().next() {
            let at = Coordinate::new(row, col).unwrap_or(ship.origin());
            return Err(PlacementFault::Overlap(at));
        }
        self.ship_map |= ship.mask();
        self.ships.push(ship);
        Ok(self.ships.len() - 1)
    }

    /// Fire at `coord`. A coordinate can be attacked only once.
    pub fn attack(&mut self, coord: Coordinate) -> Result<AttackOutcome, GameError> {
        if self.is_targeted(coord) {
            return Err(GameError::AlreadyTargeted(coord));
        }
        let Some(id) = self.ships.iter().position(|s| s.contains(coord)) else {
            let _ = self.misses.insert(coord);
            return Ok(AttackOutcome {
                hit: false,
                ship: None,
                destroyed: false,
            });
        };
        let _ = self.hits.insert(coord);
        let ship = &mut self.ships[id];
        ship.register_hit(coord);
        Ok(AttackOutcome {
            hit: true,
            ship: Some(id),
            destroyed: ship.is_destroyed(),
        })
    }

    pub fn cell(&self, coord: Coordinate) -> CellState {
        if self.hits.contains(coord) {
            CellState::Hit
        } else if self.misses.contains(coord) {
            CellState::Miss
        } else if let Some(id) = self.ships.iter().position(|s| s.contains(coord)) {
            CellState::Occupied(id)
        } else {
            CellState::Empty
        }
    }

    pub fn is_targeted(&self, coord: Coordinate) -> bool {
        (self.hits | self.misses).contains(coord)
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    /// Ships with at least one intact cell.
    pub fn ships_afloat(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_destroyed()).count()
    }

    /// Kinds of the ships still afloat, in placement order.
    pub fn kinds_afloat(&self) -> impl Iterator<Item = ShipKind> + '_ {
        self.ships
            .iter()
            .filter(|s| !s.is_destroyed())
            .map(Ship::kind)
    }

    pub fn all_destroyed(&self) -> bool {
        self.ships.iter().all(Ship::is_destroyed)
    }

    /// Number of shots received so far.
    pub fn shots_received(&self) -> usize {
        self.hits.count_ones() + self.misses.count_ones()
    }

    /// Board occupancy mask of all ships.
    pub fn ship_map(&self) -> BB {
        self.ship_map
    }
}

impl fmt::Debug for GridModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridModel")
            .field("ships", &self.ships)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

/// A player's record of shots fired at the opponent: Hit/Miss marks and the
/// kinds reported sunk, never the opponent's layout.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingGrid {
    hits: BB,
    misses: BB,
    sunk: Vec<ShipKind>,
}

impl TrackingGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the result of a shot fired at `coord`.
    pub fn record(
        &mut self,
        coord: Coordinate,
        hit: bool,
        sunk: Option<ShipKind>,
    ) -> Result<(), GameError> {
        if self.is_targeted(coord) {
            return Err(GameError::AlreadyTargeted(coord));
        }
        let layer = if hit { &mut self.hits } else { &mut self.misses };
        let _ = layer.insert(coord);
        if let Some(kind) = sunk {
            self.sunk.push(kind);
        }
        Ok(())
    }

    /// `Hit`, `Miss` or `Empty`; never `Occupied`.
    pub fn cell(&self, coord: Coordinate) -> CellState {
        if self.hits.contains(coord) {
            CellState::Hit
        } else if self.misses.contains(coord) {
            CellState::Miss
        } else {
            CellState::Empty
        }
    }

    pub fn is_targeted(&self, coord: Coordinate) -> bool {
        (self.hits | self.misses).contains(coord)
    }

    pub fn hits(&self) -> BB {
        self.hits
    }

    pub fn misses(&self) -> BB {
        self.misses
    }

    /// Cells not yet fired at.
    pub fn untargeted(&self) -> BB {
        !(self.hits | self.misses)
    }

    pub fn sunk(&self) -> &[ShipKind] {
        &self.sunk
    }

    pub fn shots_fired(&self) -> usize {
        self.hits.count_ones() + self.misses.count_ones()
    }
}
