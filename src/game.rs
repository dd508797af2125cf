//! Game lifecycle: turn order, `Active → Over | Cancelled`, win detection.
//!
//! A [`Game`] is only mutated through [`Game::make_move`] and
//! [`Game::cancel`]. Both reject every call once the game is terminal, so a
//! finished or cancelled game is effectively frozen.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::common::{Coordinate, GameError, PlacementError, PlacementFault, Side};
use crate::config::AUTOMATED_PLAYER_NAME;
use crate::grid::{GridModel, TrackingGrid};
use crate::moves::{self, MoveOutcome};
use crate::score::ScoreRecord;
use crate::ship::ShipKind;

/// Unique identifier for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct GameId(Uuid);

impl GameId {
    /// Create a new random game ID.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

#[cfg(feature = "std")]
impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque identifier of a human player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whoever occupies a seat: a human player or the automated opponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Participant {
    Human(PlayerId),
    Automated,
}

impl Participant {
    pub fn display_name(&self) -> &str {
        match self {
            Participant::Human(id) => id.as_str(),
            Participant::Automated => AUTOMATED_PLAYER_NAME,
        }
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Participant::Human(id) => Some(id),
            Participant::Automated => None,
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, Participant::Automated)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lifecycle of a game. `Over` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    Active,
    Over { winner: Side },
    Cancelled,
}

impl GameStatus {
    pub const fn is_active(&self) -> bool {
        matches!(self, GameStatus::Active)
    }

    pub const fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub const fn winner(&self) -> Option<Side> {
        match self {
            GameStatus::Over { winner } => Some(*winner),
            _ => None,
        }
    }
}

/// One accepted move, in the order it was played.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    /// Display name of the acting player.
    pub player: String,
    pub side: Side,
    pub target: Coordinate,
    pub hit: bool,
    pub ship: Option<ShipKind>,
    pub destroyed: bool,
}

impl HistoryEntry {
    /// The attacked cell in move notation, e.g. `C7`.
    pub fn move_description(&self) -> String {
        self.target.to_string()
    }
}

/// Event handed to the notifier when the turn passes to a human player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnNotice {
    pub game: GameId,
    pub next: Side,
    pub player: PlayerId,
    pub description: String,
}

/// What happened to the game after an accepted move.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The game continues. `notice` is set when the next player is human.
    TurnPassed {
        next: Side,
        notice: Option<TurnNotice>,
    },
    /// The defender's last ship went down.
    Finished { winner: Side, score: ScoreRecord },
}

/// Result of [`Game::make_move`].
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub game: GameId,
    pub outcome: MoveOutcome,
    pub entry: HistoryEntry,
    pub transition: Transition,
    /// Narrative for the client, e.g. "alice has hit the Cruiser of bob! bob's turn".
    pub message: String,
}

/// Full state of one game between `player1` and `opponent`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Game {
    id: GameId,
    player1: PlayerId,
    opponent: Participant,
    primary: [GridModel; 2],
    tracking: [TrackingGrid; 2],
    current: Side,
    status: GameStatus,
    remaining: [usize; 2],
    history: Vec<HistoryEntry>,
    created_at: DateTime<Utc>,
    last_move: DateTime<Utc>,
}

impl Game {
    /// Start a game from two placed fleets. Player 1 moves first.
    pub fn new(
        id: GameId,
        player1: PlayerId,
        opponent: Participant,
        fleet1: GridModel,
        fleet2: GridModel,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        for fleet in [&fleet1, &fleet2] {
            if fleet.ships().is_empty() {
                return Err(GameError::InvalidPlacement(PlacementError {
                    index: 0,
                    ship: None,
                    fault: PlacementFault::EmptyFleet,
                }));
            }
        }
        let remaining = [fleet1.ships_afloat(), fleet2.ships_afloat()];
        Ok(Self {
            id,
            player1,
            opponent,
            primary: [fleet1, fleet2],
            tracking: [TrackingGrid::new(), TrackingGrid::new()],
            current: Side::Player1,
            status: GameStatus::Active,
            remaining,
            history: Vec::new(),
            created_at: now,
            last_move: now,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn player1(&self) -> &PlayerId {
        &self.player1
    }

    pub fn opponent(&self) -> &Participant {
        &self.opponent
    }

    /// Whoever sits on `side`.
    pub fn participant(&self, side: Side) -> Participant {
        match side {
            Side::Player1 => Participant::Human(self.player1.clone()),
            Side::Player2 => self.opponent.clone(),
        }
    }

    pub fn player_name(&self, side: Side) -> String {
        match side {
            Side::Player1 => self.player1.to_string(),
            Side::Player2 => self.opponent.display_name().to_string(),
        }
    }

    /// `true` if `player` holds either seat.
    pub fn involves(&self, player: &PlayerId) -> bool {
        &self.player1 == player || self.opponent.player_id() == Some(player)
    }

    /// The fleet belonging to `side`, with the shots it has received.
    pub fn primary(&self, side: Side) -> &GridModel {
        &self.primary[side.index()]
    }

    /// The shots `side` has fired at its opponent.
    pub fn tracking(&self, side: Side) -> &TrackingGrid {
        &self.tracking[side.index()]
    }

    pub fn current_player(&self) -> Side {
        self.current
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn winner(&self) -> Option<Side> {
        self.status.winner()
    }

    /// Ships `side` still has afloat.
    pub fn ships_remaining(&self, side: Side) -> usize {
        self.remaining[side.index()]
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_move(&self) -> DateTime<Utc> {
        self.last_move
    }

    /// An Active game whose last move is at least `threshold` before `now`.
    pub fn is_dormant(&self, now: DateTime<Utc>, threshold: TimeDelta) -> bool {
        self.is_active() && now.signed_duration_since(self.last_move) >= threshold
    }

    /// Fails with the terminal-state error if the game is no longer Active.
    pub fn ensure_active(&self) -> Result<(), GameError> {
        match self.status {
            GameStatus::Active => Ok(()),
            GameStatus::Over { winner } => Err(GameError::GameOver {
                winner: self.player_name(winner),
            }),
            GameStatus::Cancelled => Err(GameError::GameCancelled),
        }
    }

    /// Against the automated opponent there is no adversary turn to enforce.
    pub fn is_eligible(&self, side: Side) -> bool {
        self.opponent.is_automated() || side == self.current
    }

    pub(crate) fn attack_boards(&mut self, attacker: Side) -> (&mut GridModel, &mut TrackingGrid) {
        (
            &mut self.primary[attacker.other().index()],
            &mut self.tracking[attacker.index()],
        )
    }

    /// Fire at `target` on behalf of `side`.
    ///
    /// Rejected moves (terminal game, wrong turn, repeated target) leave the
    /// game untouched. An accepted move is appended to the history, stamps
    /// `last_move`, and either passes the turn or finishes the game.
    pub fn make_move(
        &mut self,
        side: Side,
        target: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<MoveReport, GameError> {
        self.ensure_active()?;
        if !self.is_eligible(side) {
            return Err(GameError::WrongTurn {
                expected: self.player_name(self.current),
            });
        }

        let outcome = moves::apply(self, side, target)?;
        let defender = side.other();
        if outcome.destroyed {
            let left = &mut self.remaining[defender.index()];
            *left = left.saturating_sub(1);
        }

        let attacker_name = self.player_name(side);
        let defender_name = self.player_name(defender);
        let entry = HistoryEntry {
            player: attacker_name.clone(),
            side,
            target,
            hit: outcome.hit,
            ship: outcome.ship,
            destroyed: outcome.destroyed,
        };
        self.history.push(entry.clone());
        self.last_move = now;

        let mut message = match outcome.ship {
            Some(kind) => format!("{} has hit the {} of {}", attacker_name, kind, defender_name),
            None => format!("{} has hit nothing", attacker_name),
        };
        if outcome.destroyed {
            message.push_str(" and sunk it");
        }

        let transition = if self.remaining.contains(&0) {
            let winner = if self.remaining[Side::Player1.index()] == 0 {
                Side::Player2
            } else {
                Side::Player1
            };
            self.status = GameStatus::Over { winner };
            let winner_name = self.player_name(winner);
            log::info!(
                "game {} over after {} moves, {} wins",
                self.id,
                self.history.len(),
                winner_name
            );
            message = format!("Game over! {} wins!", winner_name);
            Transition::Finished {
                winner,
                score: ScoreRecord::for_winner(self, winner),
            }
        } else {
            self.current = defender;
            message = format!("{}! {}'s turn", message, defender_name);
            let notice = self.participant(defender).player_id().map(|player| TurnNotice {
                game: self.id,
                next: defender,
                player: player.clone(),
                description: format!(
                    "{} fired at {}. It's your turn in game {}",
                    attacker_name, target, self.id
                ),
            });
            Transition::TurnPassed {
                next: defender,
                notice,
            }
        };
        log::debug!("game {}: {} -> {} ({:?})", self.id, attacker_name, target, outcome);

        Ok(MoveReport {
            game: self.id,
            outcome,
            entry,
            transition,
            message,
        })
    }

    /// Move an Active game to `Cancelled`.
    pub fn cancel(&mut self) -> Result<(), GameError> {
        self.ensure_active()?;
        self.status = GameStatus::Cancelled;
        log::info!("game {} cancelled after {} moves", self.id, self.history.len());
        Ok(())
    }
}
