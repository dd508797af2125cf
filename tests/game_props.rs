use battleship_rules::{
    choose_target, random_fleet, Game, GameError, GameId, GameStatus, Participant, PlayerId,
    Side, Transition, STANDARD_FLEET,
};
use chrono::Utc;
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn new_game(rng: &mut SmallRng) -> Game {
    Game::new(
        GameId::new(),
        PlayerId::new("alice"),
        Participant::Human(PlayerId::new("bob")),
        random_fleet(rng, &STANDARD_FLEET).unwrap(),
        random_fleet(rng, &STANDARD_FLEET).unwrap(),
        Utc::now(),
    )
    .unwrap()
}

fn remaining_lengths(game: &Game, side: Side) -> Vec<usize> {
    game.primary(side).kinds_afloat().map(|k| k.length()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn turns_alternate_and_game_terminates(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut game = new_game(&mut rng);
        let mut expected = Side::Player1;
        let mut moves = 0;
        loop {
            prop_assert_eq!(game.current_player(), expected);
            let target = choose_target(
                game.tracking(expected),
                &remaining_lengths(&game, expected.other()),
                &mut rng,
            )
            .unwrap();

            // the other side is always turned away without side effects
            let before = game.clone();
            let err = game.make_move(expected.other(), target, Utc::now()).unwrap_err();
            let is_wrong_turn = matches!(err, GameError::WrongTurn { .. });
            prop_assert!(is_wrong_turn);
            prop_assert_eq!(&game, &before);

            let report = game.make_move(expected, target, Utc::now()).unwrap();
            moves += 1;
            if let Transition::Finished { winner, .. } = report.transition {
                prop_assert_eq!(winner, expected);
                break;
            }
            expected = expected.other();
            prop_assert!(moves < 200, "game did not terminate");
        }

        let winner = game.winner().unwrap();
        prop_assert_eq!(game.status(), GameStatus::Over { winner });
        prop_assert!(game.ships_remaining(winner) > 0);
        prop_assert_eq!(game.ships_remaining(winner.other()), 0);
        prop_assert_eq!(game.history().len(), moves);
    }
}
