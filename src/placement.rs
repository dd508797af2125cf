//! Fleet placement: turning a placement request into a populated grid.
//!
//! A fleet is validated on a scratch [`GridModel`] one ship at a time, in the
//! order given, and the grid is only handed back once every ship fits. A
//! failed request therefore never leaves a partially populated grid behind.

use alloc::vec::Vec;

use rand::Rng;

use crate::common::{Coordinate, PlacementError, PlacementFault};
use crate::config::{BOARD_SIZE, PLACEMENT_ATTEMPTS};
use crate::grid::GridModel;
use crate::ship::{Orientation, Ship, ShipKind};

/// How the cells of a requested ship are described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    /// Explicit cells, in any order.
    Cells(Vec<Coordinate>),
    /// A run starting at `origin`.
    Line {
        origin: Coordinate,
        orientation: Orientation,
    },
}

/// One ship of a placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipPlacement {
    pub kind: ShipKind,
    pub geometry: Geometry,
}

impl ShipPlacement {
    pub fn cells(kind: ShipKind, cells: Vec<Coordinate>) -> Self {
        Self {
            kind,
            geometry: Geometry::Cells(cells),
        }
    }

    pub fn line(kind: ShipKind, origin: Coordinate, orientation: Orientation) -> Self {
        Self {
            kind,
            geometry: Geometry::Line {
                origin,
                orientation,
            },
        }
    }

    /// Resolve the requested geometry into a ship.
    pub fn to_ship(&self) -> Result<Ship, PlacementFault> {
        match &self.geometry {
            Geometry::Cells(cells) => Ship::from_cells(self.kind, cells),
            Geometry::Line {
                origin,
                orientation,
            } => Ship::new(self.kind, *orientation, *origin),
        }
    }
}

/// Validate `placements` in order and return the populated grid, or the
/// first failure with the index and kind of the offending ship.
pub fn place_fleet(placements: &[ShipPlacement]) -> Result<GridModel, PlacementError> {
    if placements.is_empty() {
        return Err(PlacementError {
            index: 0,
            ship: None,
            fault: PlacementFault::EmptyFleet,
        });
    }
    let mut grid = GridModel::new();
    for (index, placement) in placements.iter().enumerate() {
        placement
            .to_ship()
            .and_then(|ship| grid.place(ship))
            .map_err(|fault| PlacementError {
                index,
                ship: Some(placement.kind),
                fault,
            })?;
    }
    log::debug!("placed fleet of {} ships", placements.len());
    Ok(grid)
}

/// Returns a random non-overlapping origin and orientation for `kind` on
/// `grid`, trying up to [`PLACEMENT_ATTEMPTS`] times.
pub fn random_placement<R: Rng + ?Sized>(
    grid: &GridModel,
    rng: &mut R,
    kind: ShipKind,
) -> Result<(Coordinate, Orientation), PlacementFault> {
    let n = BOARD_SIZE as usize;
    for _ in 0..PLACEMENT_ATTEMPTS {
        let orientation = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (max_r, max_c) = match orientation {
            Orientation::Horizontal => (n - 1, n - kind.length()),
            Orientation::Vertical => (n - kind.length(), n - 1),
        };
        let origin = Coordinate::new(rng.random_range(0..=max_r), rng.random_range(0..=max_c))
            .ok_or(PlacementFault::Exhausted)?;
        let ship = Ship::new(kind, orientation, origin)?;
        if (grid.ship_map() & ship.mask()).is_empty() {
            return Ok((origin, orientation));
        }
    }
    Err(PlacementFault::Exhausted)
}

/// Place `kinds` at random positions, all-or-nothing.
pub fn random_fleet<R: Rng + ?Sized>(
    rng: &mut R,
    kinds: &[ShipKind],
) -> Result<GridModel, PlacementError> {
    if kinds.is_empty() {
        return Err(PlacementError {
            index: 0,
            ship: None,
            fault: PlacementFault::EmptyFleet,
        });
    }
    let mut grid = GridModel::new();
    for (index, &kind) in kinds.iter().enumerate() {
        random_placement(&grid, &mut *rng, kind)
            .and_then(|(origin, orientation)| Ship::new(kind, orientation, origin))
            .and_then(|ship| grid.place(ship))
            .map_err(|fault| PlacementError {
                index,
                ship: Some(kind),
                fault,
            })?;
    }
    Ok(grid)
}

/// A random layout of `kinds` as a placement request, for callers that go
/// through [`place_fleet`] rather than taking a grid directly.
pub fn random_layout<R: Rng + ?Sized>(
    rng: &mut R,
    kinds: &[ShipKind],
) -> Result<Vec<ShipPlacement>, PlacementError> {
    let grid = random_fleet(rng, kinds)?;
    Ok(grid
        .ships()
        .iter()
        .map(|ship| ShipPlacement::line(ship.kind(), ship.origin(), ship.orientation()))
        .collect())
}
