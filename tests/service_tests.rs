use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use battleship_rules::{
    BattleshipService, ChannelNotifier, Coordinate, Game, GameError, GameId, GameStatus,
    GameStore, InMemoryStore, LogNotifier, Orientation, Participant, PlayerId, ScoreRecord,
    ServiceConfig, ServiceError, ShipKind, ShipPlacement, Side, Transition,
};
use chrono::TimeDelta;

fn c(row: usize, col: usize) -> Coordinate {
    Coordinate::new(row, col).unwrap()
}

fn destroyer(row: usize, col: usize) -> Vec<ShipPlacement> {
    vec![ShipPlacement::line(
        ShipKind::Destroyer,
        c(row, col),
        Orientation::Horizontal,
    )]
}

fn config() -> ServiceConfig {
    ServiceConfig {
        seed: Some(99),
        ..ServiceConfig::default()
    }
}

fn service() -> BattleshipService<InMemoryStore, LogNotifier> {
    BattleshipService::new(InMemoryStore::new(), LogNotifier, config())
}

fn alice() -> PlayerId {
    PlayerId::new("alice")
}

fn bob() -> Participant {
    Participant::Human(PlayerId::new("bob"))
}

fn game_error(err: ServiceError) -> GameError {
    match err {
        ServiceError::Game(e) => e,
        ServiceError::Store(e) => panic!("unexpected store error: {}", e),
    }
}

#[tokio::test]
async fn test_create_and_get() -> anyhow::Result<()> {
    let service = service();
    let game = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?;
    let loaded = service.get_game(game.id()).await?;
    assert_eq!(loaded, game);
    assert_eq!(loaded.status(), GameStatus::Active);
    Ok(())
}

#[tokio::test]
async fn test_random_fleet_for_missing_placement() -> anyhow::Result<()> {
    let service = service();
    let game = service
        .create_game(alice(), Participant::Automated, &destroyer(0, 0), None)
        .await?;
    assert_eq!(game.primary(Side::Player2).ships().len(), 5);
    assert_eq!(game.ships_remaining(Side::Player2), 5);
    assert_eq!(game.ships_remaining(Side::Player1), 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_placement_creates_nothing() {
    let service = service();
    let bad = vec![ShipPlacement::cells(ShipKind::Cruiser, vec![c(0, 0), c(1, 1), c(2, 2)])];
    let err = service
        .create_game(alice(), bob(), &bad, Some(&destroyer(9, 0)))
        .await
        .unwrap_err();
    assert!(matches!(game_error(err), GameError::InvalidPlacement(_)));
    assert!(service.store().is_empty());
}

#[tokio::test]
async fn test_not_found() {
    let service = service();
    let id = GameId::new();
    let err = service.get_game(id).await.unwrap_err();
    assert_eq!(game_error(err), GameError::NotFound(id));
    let err = service.make_move(id, Side::Player1, c(0, 0)).await.unwrap_err();
    assert_eq!(game_error(err), GameError::NotFound(id));
    let err = service.cancel_game(id).await.unwrap_err();
    assert_eq!(game_error(err), GameError::NotFound(id));
}

#[tokio::test]
async fn test_full_game_records_score() -> anyhow::Result<()> {
    let service = service();
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    service.make_move(id, Side::Player1, c(9, 0)).await?;
    service.make_move(id, Side::Player2, c(5, 5)).await?;
    let report = service.make_move(id, Side::Player1, c(9, 1)).await?;
    assert!(matches!(report.transition, Transition::Finished { .. }));

    let scores = service.list_scores().await?;
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].winner_name(), "alice");
    assert_eq!(service.list_scores_for(&alice()).await?.len(), 1);
    assert!(service
        .list_scores_for(&PlayerId::new("bob"))
        .await?
        .is_empty());
    let ranks = service.rankings().await?;
    assert_eq!(ranks[0].name(), "alice");
    assert_eq!(service.top_scores(5).await?.len(), 1);
    assert_eq!(service.list_history(id).await?.len(), 3);

    let err = service.make_move(id, Side::Player2, c(0, 0)).await.unwrap_err();
    assert_eq!(err.to_string(), "Game already over! alice wins!");
    Ok(())
}

#[tokio::test]
async fn test_top_scores_invalid() {
    let service = service();
    for n in [0, -3] {
        let err = service.top_scores(n).await.unwrap_err();
        assert!(matches!(game_error(err), GameError::InvalidArgument(_)));
    }
}

#[tokio::test]
async fn test_cancel() -> anyhow::Result<()> {
    let service = service();
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    let game = service.cancel_game(id).await?;
    assert_eq!(game.status(), GameStatus::Cancelled);

    let err = service.make_move(id, Side::Player1, c(0, 0)).await.unwrap_err();
    assert_eq!(game_error(err), GameError::GameCancelled);
    let err = service.cancel_game(id).await.unwrap_err();
    assert_eq!(game_error(err), GameError::GameCancelled);
    assert!(service.get_game(id).await?.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_wrong_turn_not_committed() -> anyhow::Result<()> {
    let service = service();
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    let err = service.make_move(id, Side::Player2, c(0, 0)).await.unwrap_err();
    assert!(matches!(game_error(err), GameError::WrongTurn { .. }));
    let game = service.get_game(id).await?;
    assert!(game.history().is_empty());
    assert_eq!(game.current_player(), Side::Player1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_moves_serialize() -> anyhow::Result<()> {
    let service = Arc::new(service());
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();

    // Eight identical requests race for the same turn; exactly one may win.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.make_move(id, Side::Player1, c(4, 4)).await
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => accepted += 1,
            Err(ServiceError::Game(GameError::WrongTurn { .. })) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(service.list_history(id).await?.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_games_run_in_parallel() -> anyhow::Result<()> {
    let service = Arc::new(service());
    let mut handles = Vec::new();
    for i in 0..4 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let player = PlayerId::new(format!("p{}", i));
            let id = service
                .create_game(player, Participant::Automated, &destroyer(0, 0), None)
                .await?
                .id();
            loop {
                let report = service.automated_move(id).await?;
                if matches!(report.transition, Transition::Finished { .. }) {
                    return Ok::<_, ServiceError>(id);
                }
            }
        }));
    }
    for handle in handles {
        let id = handle.await??;
        let game = service.get_game(id).await?;
        assert_eq!(game.winner(), Some(Side::Player2));
    }
    assert_eq!(service.rankings().await?[0].name(), "Computer");
    assert_eq!(service.rankings().await?[0].wins, 4);
    Ok(())
}

#[tokio::test]
async fn test_notifier_receives_turns() -> anyhow::Result<()> {
    let (notifier, mut rx) = ChannelNotifier::new();
    let service = BattleshipService::new(InMemoryStore::new(), notifier, config());
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    service.make_move(id, Side::Player1, c(5, 5)).await?;
    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.player, PlayerId::new("bob"));
    assert_eq!(notice.next, Side::Player2);

    service.make_move(id, Side::Player2, c(5, 5)).await?;
    assert_eq!(rx.recv().await.unwrap().player, alice());
    Ok(())
}

#[tokio::test]
async fn test_notifier_failure_does_not_roll_back() -> anyhow::Result<()> {
    let (notifier, rx) = ChannelNotifier::new();
    drop(rx);
    let service = BattleshipService::new(InMemoryStore::new(), notifier, config());
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    service.make_move(id, Side::Player1, c(5, 5)).await?;
    assert_eq!(service.list_history(id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_automated_move() -> anyhow::Result<()> {
    let service = service();
    let id = service
        .create_game(alice(), Participant::Automated, &destroyer(0, 0), None)
        .await?
        .id();
    service.make_move(id, Side::Player1, c(5, 5)).await?;
    let report = service.automated_move(id).await?;
    assert_eq!(report.entry.player, "Computer");
    assert_eq!(report.entry.side, Side::Player2);

    let two_humans = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    let err = service.automated_move(two_humans).await.unwrap_err();
    assert!(matches!(game_error(err), GameError::InvalidArgument(_)));
    Ok(())
}

#[tokio::test]
async fn test_list_active_games() -> anyhow::Result<()> {
    let service = service();
    let first = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    let second = service
        .create_game(
            PlayerId::new("bob"),
            Participant::Human(alice()),
            &destroyer(0, 0),
            Some(&destroyer(9, 0)),
        )
        .await?
        .id();
    service
        .create_game(PlayerId::new("carol"), Participant::Automated, &destroyer(0, 0), None)
        .await?;
    service.cancel_game(first).await?;

    let active = service.list_active_games(&alice()).await?;
    let ids: Vec<_> = active.iter().map(|g| g.id()).collect();
    assert_eq!(ids, vec![second]);
    assert_eq!(service.store().games().await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_dormant_games() -> anyhow::Result<()> {
    let service = service();
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    assert!(service.dormant_games().await?.is_empty());
    let dormant = service.list_dormant_games(TimeDelta::zero()).await?;
    assert_eq!(dormant.len(), 1);
    assert_eq!(dormant[0].id(), id);

    service.cancel_game(id).await?;
    assert!(service.list_dormant_games(TimeDelta::zero()).await?.is_empty());
    Ok(())
}

/// In-memory store whose finishing commit can be made to fail.
#[derive(Default)]
struct FailingFinishStore {
    inner: InMemoryStore,
    fail_finish: AtomicBool,
}

#[async_trait::async_trait]
impl GameStore for FailingFinishStore {
    async fn load(&self, id: GameId) -> anyhow::Result<Option<Game>> {
        self.inner.load(id).await
    }

    async fn commit(&self, game: &Game) -> anyhow::Result<()> {
        self.inner.commit(game).await
    }

    async fn games(&self) -> anyhow::Result<Vec<Game>> {
        self.inner.games().await
    }

    async fn commit_finished(&self, game: &Game, score: &ScoreRecord) -> anyhow::Result<()> {
        if self.fail_finish.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.commit_finished(game, score).await
    }

    async fn scores(&self) -> anyhow::Result<Vec<ScoreRecord>> {
        self.inner.scores().await
    }
}

#[tokio::test]
async fn test_failed_finish_can_be_retried() -> anyhow::Result<()> {
    let store = FailingFinishStore::default();
    store.fail_finish.store(true, Ordering::SeqCst);
    let service = BattleshipService::new(store, LogNotifier, config());
    let id = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    service.make_move(id, Side::Player1, c(9, 0)).await?;
    service.make_move(id, Side::Player2, c(5, 5)).await?;

    let err = service.make_move(id, Side::Player1, c(9, 1)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(_)));
    let game = service.get_game(id).await?;
    assert_eq!(game.status(), GameStatus::Active);
    assert_eq!(game.history().len(), 2);
    assert!(service.list_scores().await?.is_empty());

    service.store().fail_finish.store(false, Ordering::SeqCst);
    let report = service.make_move(id, Side::Player1, c(9, 1)).await?;
    assert!(matches!(report.transition, Transition::Finished { .. }));
    assert_eq!(
        service.get_game(id).await?.status(),
        GameStatus::Over {
            winner: Side::Player1
        }
    );
    assert_eq!(service.list_scores().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_ids_leave_no_locks() {
    let service = service();
    for _ in 0..1000 {
        let err = service
            .make_move(GameId::new(), Side::Player1, c(0, 0))
            .await
            .unwrap_err();
        assert!(matches!(game_error(err), GameError::NotFound(_)));
    }
    assert_eq!(service.tracked_locks(), 0);
}

#[tokio::test]
async fn test_finished_and_cancelled_games_leave_no_locks() -> anyhow::Result<()> {
    let service = service();
    let finished = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    service.make_move(finished, Side::Player1, c(9, 0)).await?;
    service.make_move(finished, Side::Player2, c(5, 5)).await?;
    service.make_move(finished, Side::Player1, c(9, 1)).await?;
    let cancelled = service
        .create_game(alice(), bob(), &destroyer(0, 0), Some(&destroyer(9, 0)))
        .await?
        .id();
    service.cancel_game(cancelled).await?;

    for _ in 0..10 {
        assert!(service.make_move(finished, Side::Player2, c(0, 0)).await.is_err());
        assert!(service.cancel_game(cancelled).await.is_err());
    }
    assert_eq!(service.tracked_locks(), 0);
    Ok(())
}
