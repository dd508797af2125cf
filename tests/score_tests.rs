use battleship_rules::{
    describe, rank_users, scores_for, top_scores, GameError, GameId, Participant, PlayerId,
    ScoreRecord,
};
use chrono::{TimeZone, Utc};

fn record(winner: Participant, ships_remaining: usize) -> ScoreRecord {
    ScoreRecord {
        game: GameId::new(),
        winner,
        loser: Participant::Human(PlayerId::new("loser")),
        ships_remaining,
        finished_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn human(name: &str) -> Participant {
    Participant::Human(PlayerId::new(name))
}

#[test]
fn test_rank_users_sums_and_sorts() {
    let scores = vec![
        record(human("alice"), 2),
        record(human("bob"), 4),
        record(human("alice"), 3),
        record(Participant::Automated, 1),
    ];
    let ranks = rank_users(&scores);
    let names: Vec<_> = ranks.iter().map(|r| (r.name(), r.score, r.wins)).collect();
    assert_eq!(
        names,
        vec![("alice", 5, 2), ("bob", 4, 1), ("Computer", 1, 1)]
    );
}

#[test]
fn test_rank_ties_keep_discovery_order() {
    let scores = vec![
        record(human("carol"), 3),
        record(human("dave"), 1),
        record(human("erin"), 3),
        record(human("dave"), 2),
    ];
    let ranks = rank_users(&scores);
    let names: Vec<_> = ranks.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["carol", "dave", "erin"]);
}

#[test]
fn test_automated_wins_merge() {
    let scores = vec![
        record(Participant::Automated, 1),
        record(Participant::Automated, 2),
    ];
    let ranks = rank_users(&scores);
    assert_eq!(ranks.len(), 1);
    assert_eq!(ranks[0].score, 3);
}

#[test]
fn test_top_scores() {
    let scores = vec![
        record(human("a"), 1),
        record(human("b"), 5),
        record(human("c"), 3),
        record(human("d"), 5),
    ];
    let top = top_scores(&scores, 3).unwrap();
    let names: Vec<_> = top.iter().map(|r| r.winner_name()).collect();
    assert_eq!(names, vec!["b", "d", "c"]);

    assert_eq!(top_scores(&scores, 10).unwrap().len(), 4);
    assert!(top_scores(&[], 2).unwrap().is_empty());
}

#[test]
fn test_top_scores_rejects_non_positive() {
    for n in [0, -3] {
        let err = top_scores(&[record(human("a"), 1)], n).unwrap_err();
        assert!(matches!(err, GameError::InvalidArgument(_)));
    }
}

#[test]
fn test_scores_for_and_describe() {
    let scores = vec![
        record(human("alice"), 2),
        record(Participant::Automated, 4),
        record(human("alice"), 1),
    ];
    let mine = scores_for(&scores, &PlayerId::new("alice"));
    assert_eq!(mine.len(), 2);
    assert!(scores_for(&scores, &PlayerId::new("nobody")).is_empty());
    assert_eq!(describe(&scores[1]), "Computer beat loser with 4 ships left");
}
