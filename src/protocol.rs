#![cfg(feature = "std")]

//! Request forms and response views for whatever transport sits in front of
//! the service.
//!
//! Forms arrive loosely typed (names as strings, signed coordinates) and are
//! validated once into core values. Views are flat serde structs built from
//! core values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{Coordinate, GameError, PlacementError, PlacementFault, Side};
use crate::config::AUTOMATED_PLAYER_NAME;
use crate::game::{Game, GameStatus, HistoryEntry, MoveReport, Participant, PlayerId, Transition};
use crate::placement::ShipPlacement;
use crate::score::{self, Ranking, ScoreRecord};
use crate::ship::{Orientation, ShipKind};

/// One ship as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipForm {
    pub ship: String,
    #[serde(flatten)]
    pub geometry: GeometryForm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryForm {
    /// `[row, col]` pairs.
    Cells { cells: Vec<[i64; 2]> },
    Line {
        row: i64,
        col: i64,
        orientation: Orientation,
    },
}

fn coordinate(row: i64, col: i64) -> Result<Coordinate, PlacementFault> {
    Coordinate::from_signed(row, col).ok_or(PlacementFault::OutOfBounds { row, col })
}

impl ShipForm {
    /// Validate the form found at `index` of a fleet list.
    pub fn validate(&self, index: usize) -> Result<ShipPlacement, PlacementError> {
        let fail = |ship, fault| PlacementError { index, ship, fault };
        let kind = ShipKind::from_name(&self.ship)
            .ok_or_else(|| fail(None, PlacementFault::UnknownShipType(self.ship.clone())))?;
        match &self.geometry {
            GeometryForm::Cells { cells } => {
                let cells = cells
                    .iter()
                    .map(|&[row, col]| coordinate(row, col))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|fault| fail(Some(kind), fault))?;
                Ok(ShipPlacement::cells(kind, cells))
            }
            GeometryForm::Line {
                row,
                col,
                orientation,
            } => {
                let origin = coordinate(*row, *col).map_err(|fault| fail(Some(kind), fault))?;
                Ok(ShipPlacement::line(kind, origin, *orientation))
            }
        }
    }
}

/// Validate a whole fleet, failing on the first bad ship.
pub fn validate_fleet(forms: &[ShipForm]) -> Result<Vec<ShipPlacement>, PlacementError> {
    forms
        .iter()
        .enumerate()
        .map(|(index, form)| form.validate(index))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGameForm {
    pub player1: String,
    /// Absent or blank for a game against the computer.
    #[serde(default)]
    pub player2: Option<String>,
    pub player1_ships: Vec<ShipForm>,
    /// Absent for a random fleet.
    #[serde(default)]
    pub player2_ships: Option<Vec<ShipForm>>,
}

/// A validated [`NewGameForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub player1: PlayerId,
    pub opponent: Participant,
    pub placement1: Vec<ShipPlacement>,
    pub placement2: Option<Vec<ShipPlacement>>,
}

impl NewGameForm {
    pub fn validate(&self) -> Result<NewGame, GameError> {
        let player1 = self.player1.trim();
        if player1.is_empty() {
            return Err(GameError::InvalidArgument("player1 must not be empty".into()));
        }
        check_human_name(player1)?;
        let opponent = match self.player2.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                check_human_name(name)?;
                Participant::Human(PlayerId::new(name))
            }
            _ => Participant::Automated,
        };
        let placement1 = validate_fleet(&self.player1_ships)?;
        let placement2 = self
            .player2_ships
            .as_deref()
            .map(validate_fleet)
            .transpose()?;
        Ok(NewGame {
            player1: PlayerId::new(player1),
            opponent,
            placement1,
            placement2,
        })
    }
}

/// The automated opponent's name is reserved.
fn check_human_name(name: &str) -> Result<(), GameError> {
    if name.eq_ignore_ascii_case(AUTOMATED_PLAYER_NAME) {
        return Err(GameError::InvalidArgument(format!(
            "{} is reserved for the automated player",
            AUTOMATED_PLAYER_NAME
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveForm {
    pub is_player1_move: bool,
    pub row: i64,
    pub col: i64,
}

impl MoveForm {
    pub fn validate(&self) -> Result<(Side, Coordinate), GameError> {
        let target = Coordinate::from_signed(self.row, self.col).ok_or_else(|| {
            GameError::InvalidArgument(format!(
                "({}, {}) is outside the grid",
                self.row, self.col
            ))
        })?;
        Ok((Side::from_player1_flag(self.is_player1_move), target))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub id: String,
    pub player1: String,
    pub player2: String,
    pub current_player: String,
    pub status: String,
    pub winner: Option<String>,
    pub ships_remaining: [usize; 2],
    pub moves: usize,
    pub created_at: DateTime<Utc>,
    pub last_move: DateTime<Utc>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        let status = match game.status() {
            GameStatus::Active => "active",
            GameStatus::Over { .. } => "over",
            GameStatus::Cancelled => "cancelled",
        };
        Self {
            id: game.id().to_string(),
            player1: game.player_name(Side::Player1),
            player2: game.player_name(Side::Player2),
            current_player: game.player_name(game.current_player()),
            status: status.to_string(),
            winner: game.winner().map(|side| game.player_name(side)),
            ships_remaining: [
                game.ships_remaining(Side::Player1),
                game.ships_remaining(Side::Player2),
            ],
            moves: game.history().len(),
            created_at: game.created_at(),
            last_move: game.last_move(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub player: String,
    #[serde(rename = "move")]
    pub target: String,
    pub hit: bool,
    pub ship: Option<String>,
    pub destroyed: bool,
}

impl From<&HistoryEntry> for HistoryView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            player: entry.player.clone(),
            target: entry.move_description(),
            hit: entry.hit,
            ship: entry.ship.map(|kind| kind.name().to_string()),
            destroyed: entry.destroyed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveView {
    pub game: String,
    pub message: String,
    pub hit: bool,
    pub ship: Option<String>,
    pub destroyed: bool,
    pub game_over: bool,
}

impl From<&MoveReport> for MoveView {
    fn from(report: &MoveReport) -> Self {
        Self {
            game: report.game.to_string(),
            message: report.message.clone(),
            hit: report.outcome.hit,
            ship: report.outcome.ship.map(|kind| kind.name().to_string()),
            destroyed: report.outcome.destroyed,
            game_over: matches!(report.transition, Transition::Finished { .. }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreView {
    pub game: String,
    pub winner: String,
    pub loser: String,
    pub ships_remaining: usize,
    pub finished_at: DateTime<Utc>,
    pub summary: String,
}

impl From<&ScoreRecord> for ScoreView {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            game: record.game.to_string(),
            winner: record.winner_name().to_string(),
            loser: record.loser.display_name().to_string(),
            ships_remaining: record.ships_remaining,
            finished_at: record.finished_at,
            summary: score::describe(record),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankView {
    pub name: String,
    pub score: usize,
    pub wins: usize,
}

impl From<&Ranking> for RankView {
    fn from(ranking: &Ranking) -> Self {
        Self {
            name: ranking.name().to_string(),
            score: ranking.score,
            wins: ranking.wins,
        }
    }
}
