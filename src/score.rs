//! Score snapshots for finished games and rankings across them.
//!
//! Everything here is a pure function over a slice of [`ScoreRecord`]s, so a
//! caller can rank any snapshot it has loaded without holding a lock.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Utc};

use crate::common::{GameError, Side};
use crate::game::{Game, GameId, Participant, PlayerId};

/// Outcome of one finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreRecord {
    pub game: GameId,
    pub winner: Participant,
    pub loser: Participant,
    /// Ships the winner still had afloat when the game ended.
    pub ships_remaining: usize,
    pub finished_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Snapshot `game` with `winner` as the victor.
    pub fn for_winner(game: &Game, winner: Side) -> Self {
        Self {
            game: game.id(),
            winner: game.participant(winner),
            loser: game.participant(winner.other()),
            ships_remaining: game.ships_remaining(winner),
            finished_at: game.last_move(),
        }
    }

    pub fn winner_name(&self) -> &str {
        self.winner.display_name()
    }
}

/// A winner's summed score across all their wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub participant: Participant,
    pub score: usize,
    pub wins: usize,
}

impl Ranking {
    pub fn name(&self) -> &str {
        self.participant.display_name()
    }
}

/// The score for `game`, or `None` unless it is Over.
pub fn record_score(game: &Game) -> Option<ScoreRecord> {
    game.winner().map(|winner| ScoreRecord::for_winner(game, winner))
}

/// Sum `ships_remaining` per winner and sort descending. Winners with equal
/// sums keep the order in which they first appear in `scores`.
pub fn rank_users(scores: &[ScoreRecord]) -> Vec<Ranking> {
    let mut rankings: Vec<Ranking> = Vec::new();
    for record in scores {
        match rankings.iter_mut().find(|r| r.participant == record.winner) {
            Some(ranking) => {
                ranking.score += record.ships_remaining;
                ranking.wins += 1;
            }
            None => rankings.push(Ranking {
                participant: record.winner.clone(),
                score: record.ships_remaining,
                wins: 1,
            }),
        }
    }
    rankings.sort_by(|a, b| b.score.cmp(&a.score));
    rankings
}

/// The `n` records with the most ships remaining, best first.
pub fn top_scores(scores: &[ScoreRecord], n: i64) -> Result<Vec<ScoreRecord>, GameError> {
    if n <= 0 {
        return Err(GameError::InvalidArgument(format!(
            "number of results must be positive, got {}",
            n
        )));
    }
    let mut sorted: Vec<ScoreRecord> = scores.to_vec();
    sorted.sort_by(|a, b| b.ships_remaining.cmp(&a.ships_remaining));
    sorted.truncate(usize::try_from(n).unwrap_or(usize::MAX));
    Ok(sorted)
}

/// Records won by `player`, in the order given.
pub fn scores_for(scores: &[ScoreRecord], player: &PlayerId) -> Vec<ScoreRecord> {
    scores
        .iter()
        .filter(|r| r.winner.player_id() == Some(player))
        .cloned()
        .collect()
}

/// One-line summary, e.g. "alice beat Computer with 3 ships left".
pub fn describe(record: &ScoreRecord) -> String {
    format!(
        "{} beat {} with {} ships left",
        record.winner, record.loser, record.ships_remaining
    )
}
