#![cfg(feature = "std")]

//! Persistence boundary. The service loads a game, mutates it and commits it
//! back; what happens behind [`GameStore`] is up to the implementation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::game::{Game, GameId};
use crate::score::ScoreRecord;

#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    /// The committed state of `id`, or `None` if it was never committed.
    async fn load(&self, id: GameId) -> anyhow::Result<Option<Game>>;
    /// Insert or replace `game`.
    async fn commit(&self, game: &Game) -> anyhow::Result<()>;
    /// Every committed game, oldest first.
    async fn games(&self) -> anyhow::Result<Vec<Game>>;
    /// Commit a finished `game` together with its `score`. Either both are
    /// stored or neither is.
    async fn commit_finished(&self, game: &Game, score: &ScoreRecord) -> anyhow::Result<()>;
    /// All scores in the order they were appended.
    async fn scores(&self) -> anyhow::Result<Vec<ScoreRecord>>;
}

/// Store backed by process memory.
///
/// Games are kept as bincode snapshots, so each `load` decodes a fresh value
/// that shares nothing with the caller's copy or with other loads.
#[derive(Default)]
pub struct InMemoryStore {
    games: Mutex<HashMap<GameId, Vec<u8>>>,
    scores: Mutex<Vec<ScoreRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed games.
    pub fn len(&self) -> usize {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl GameStore for InMemoryStore {
    async fn load(&self, id: GameId) -> anyhow::Result<Option<Game>> {
        let games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        match games.get(&id) {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    async fn commit(&self, game: &Game) -> anyhow::Result<()> {
        let bytes = bincode::serialize(game)?;
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(game.id(), bytes);
        Ok(())
    }

    async fn games(&self) -> anyhow::Result<Vec<Game>> {
        let mut games = {
            let snapshots = self.games.lock().unwrap_or_else(PoisonError::into_inner);
            snapshots
                .values()
                .map(|bytes| bincode::deserialize::<Game>(bytes))
                .collect::<Result<Vec<_>, _>>()?
        };
        games.sort_by_key(|g| (g.created_at(), g.id()));
        Ok(games)
    }

    async fn commit_finished(&self, game: &Game, score: &ScoreRecord) -> anyhow::Result<()> {
        let bytes = bincode::serialize(game)?;
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        let mut scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        games.insert(game.id(), bytes);
        scores.push(score.clone());
        Ok(())
    }

    async fn scores(&self) -> anyhow::Result<Vec<ScoreRecord>> {
        Ok(self
            .scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
