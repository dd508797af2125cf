#![cfg(feature = "std")]

//! Async façade over the rules core.
//!
//! Every mutating operation runs load → mutate → commit while holding the
//! game's own lock, so two requests against one game are applied one after the
//! other and requests against different games never wait on each other.
//! The lock table only holds weak handles, so an entry lives exactly as long
//! as some request is using it. Notifications go out after the lock is dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{TimeDelta, Utc};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::ai;
use crate::common::{Coordinate, GameError, Side};
use crate::config::{ServiceConfig, STANDARD_FLEET};
use crate::game::{Game, GameId, HistoryEntry, MoveReport, Participant, PlayerId, Transition};
use crate::grid::GridModel;
use crate::notify::Notifier;
use crate::placement::{self, ShipPlacement};
use crate::protocol::NewGame;
use crate::score::{self, Ranking, ScoreRecord};
use crate::store::GameStore;

#[derive(Debug)]
pub enum ServiceError {
    /// The request broke a game rule.
    Game(GameError),
    /// The store failed.
    Store(anyhow::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Game(e) => write!(f, "{}", e),
            ServiceError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Game(e) => Some(e),
            ServiceError::Store(e) => Some(&**e),
        }
    }
}

impl From<GameError> for ServiceError {
    fn from(err: GameError) -> Self {
        ServiceError::Game(err)
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Store(err)
    }
}

impl ServiceError {
    /// The rule violation, if this is one.
    pub fn game_error(&self) -> Option<&GameError> {
        match self {
            ServiceError::Game(e) => Some(e),
            ServiceError::Store(_) => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

type GameLock = Arc<tokio::sync::Mutex<()>>;

pub struct BattleshipService<S, N> {
    store: S,
    notifier: N,
    config: ServiceConfig,
    locks: Mutex<HashMap<GameId, Weak<tokio::sync::Mutex<()>>>>,
    rng: Mutex<SmallRng>,
}

impl<S: GameStore, N: Notifier> BattleshipService<S, N> {
    pub fn new(store: S, notifier: N, config: ServiceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            store,
            notifier,
            config,
            locks: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Number of games with a request in flight.
    pub fn tracked_locks(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| lock.strong_count() > 0);
        locks.len()
    }

    fn game_lock(&self, id: GameId) -> GameLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = locks.get(&id).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = GameLock::default();
        locks.insert(id, Arc::downgrade(&lock));
        lock
    }

    fn random_fleet(&self) -> Result<GridModel, GameError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(placement::random_fleet(&mut *rng, &STANDARD_FLEET)?)
    }

    async fn load(&self, id: GameId) -> ServiceResult<Game> {
        self.store
            .load(id)
            .await?
            .ok_or(ServiceError::Game(GameError::NotFound(id)))
    }

    /// Start a game. Player 2 gets a random standard fleet when
    /// `placement2` is `None`.
    pub async fn create_game(
        &self,
        player1: PlayerId,
        opponent: Participant,
        placement1: &[ShipPlacement],
        placement2: Option<&[ShipPlacement]>,
    ) -> ServiceResult<Game> {
        let fleet1 = placement::place_fleet(placement1).map_err(GameError::from)?;
        let fleet2 = match placement2 {
            Some(ships) => placement::place_fleet(ships).map_err(GameError::from)?,
            None => self.random_fleet()?,
        };
        let game = Game::new(GameId::new(), player1, opponent, fleet1, fleet2, Utc::now())?;
        self.store.commit(&game).await?;
        log::info!(
            "created game {}: {} vs {}",
            game.id(),
            game.player_name(Side::Player1),
            game.player_name(Side::Player2)
        );
        Ok(game)
    }

    /// [`Self::create_game`] from an already validated form.
    pub async fn create_from(&self, request: NewGame) -> ServiceResult<Game> {
        self.create_game(
            request.player1,
            request.opponent,
            &request.placement1,
            request.placement2.as_deref(),
        )
        .await
    }

    pub async fn get_game(&self, id: GameId) -> ServiceResult<Game> {
        self.load(id).await
    }

    pub async fn make_move(
        &self,
        id: GameId,
        side: Side,
        target: Coordinate,
    ) -> ServiceResult<MoveReport> {
        self.locked_move(id, |_| Ok((side, target))).await
    }

    /// Let the automated opponent take its shot as player 2.
    pub async fn automated_move(&self, id: GameId) -> ServiceResult<MoveReport> {
        self.locked_move(id, |game| {
            if !game.opponent().is_automated() {
                return Err(GameError::InvalidArgument(format!(
                    "game {} has no automated player",
                    id
                )));
            }
            game.ensure_active()?;
            let remaining: Vec<usize> = game
                .primary(Side::Player1)
                .kinds_afloat()
                .map(|kind| kind.length())
                .collect();
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let target = ai::choose_target(game.tracking(Side::Player2), &remaining, &mut *rng)
                .ok_or_else(|| GameError::InvalidArgument("no cells left to target".into()))?;
            Ok((Side::Player2, target))
        })
        .await
    }

    async fn locked_move<F>(&self, id: GameId, pick: F) -> ServiceResult<MoveReport>
    where
        F: FnOnce(&Game) -> Result<(Side, Coordinate), GameError> + Send,
    {
        let lock = self.game_lock(id);
        let report = {
            let _guard = lock.lock().await;
            let mut game = self.load(id).await?;
            let (side, target) = pick(&game)?;
            let report = game.make_move(side, target, Utc::now())?;
            match &report.transition {
                Transition::Finished { score, .. } => {
                    self.store.commit_finished(&game, score).await?
                }
                Transition::TurnPassed { .. } => self.store.commit(&game).await?,
            }
            report
        };
        if let Transition::TurnPassed {
            notice: Some(notice),
            ..
        } = &report.transition
        {
            if let Err(e) = self.notifier.turn_changed(notice).await {
                log::warn!("failed to notify {} for game {}: {}", notice.player, id, e);
            }
        }
        Ok(report)
    }

    pub async fn cancel_game(&self, id: GameId) -> ServiceResult<Game> {
        let lock = self.game_lock(id);
        let _guard = lock.lock().await;
        let mut game = self.load(id).await?;
        game.cancel()?;
        self.store.commit(&game).await?;
        Ok(game)
    }

    /// Active games in which `player` holds either seat.
    pub async fn list_active_games(&self, player: &PlayerId) -> ServiceResult<Vec<Game>> {
        let games = self.store.games().await?;
        Ok(games
            .into_iter()
            .filter(|g| g.is_active() && g.involves(player))
            .collect())
    }

    pub async fn list_history(&self, id: GameId) -> ServiceResult<Vec<HistoryEntry>> {
        Ok(self.load(id).await?.history().to_vec())
    }

    pub async fn list_scores(&self) -> ServiceResult<Vec<ScoreRecord>> {
        Ok(self.store.scores().await?)
    }

    pub async fn list_scores_for(&self, player: &PlayerId) -> ServiceResult<Vec<ScoreRecord>> {
        let scores = self.store.scores().await?;
        Ok(score::scores_for(&scores, player))
    }

    pub async fn top_scores(&self, n: i64) -> ServiceResult<Vec<ScoreRecord>> {
        let scores = self.store.scores().await?;
        Ok(score::top_scores(&scores, n)?)
    }

    pub async fn rankings(&self) -> ServiceResult<Vec<Ranking>> {
        let scores = self.store.scores().await?;
        Ok(score::rank_users(&scores))
    }

    /// Active games with no move for at least `threshold`. Read-only.
    pub async fn list_dormant_games(&self, threshold: TimeDelta) -> ServiceResult<Vec<Game>> {
        let now = Utc::now();
        let games = self.store.games().await?;
        Ok(games
            .into_iter()
            .filter(|g| g.is_dormant(now, threshold))
            .collect())
    }

    /// Dormant games under the configured threshold.
    pub async fn dormant_games(&self) -> ServiceResult<Vec<Game>> {
        self.list_dormant_games(self.config.dormant_after).await
    }
}
