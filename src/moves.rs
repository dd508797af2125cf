//! Applying a single attack to the defender's grid.

use crate::common::{Coordinate, GameError, Side};
use crate::game::Game;
use crate::ship::{Ship, ShipKind};

/// What an attack revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveOutcome {
    pub hit: bool,
    pub ship: Option<ShipKind>,
    pub destroyed: bool,
}

/// Fire at `target` on the grid of `attacker`'s opponent and mirror the result
/// into `attacker`'s tracking grid.
///
/// Does not check turn order or lifecycle; that is [`Game::make_move`]'s job.
/// A repeated target fails with `AlreadyTargeted` before either grid changes.
pub fn apply(
    game: &mut Game,
    attacker: Side,
    target: Coordinate,
) -> Result<MoveOutcome, GameError> {
    let (defender, tracker) = game.attack_boards(attacker);
    if tracker.is_targeted(target) {
        return Err(GameError::AlreadyTargeted(target));
    }
    let result = defender.attack(target)?;
    let ship = result.ship.and_then(|id| defender.ship(id)).map(Ship::kind);
    tracker.record(target, result.hit, ship.filter(|_| result.destroyed))?;
    Ok(MoveOutcome {
        hit: result.hit,
        ship,
        destroyed: result.destroyed,
    })
}
