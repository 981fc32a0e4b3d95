//! Property tests over random states, actions and seeds.

use proptest::prelude::*;
use tycoon_core::actions;
use tycoon_core::log::LogQueue;
use tycoon_core::prelude::*;
use tycoon_core::state::STAT_CAP;
use tycoon_core::turn;
use tycoon_test_utils::determinism::strategies::{arb_action, arb_run_state, arb_script};
use tycoon_test_utils::determinism::{verify_script_determinism, verify_serialization_determinism};

fn assert_bounded(state: &RunState) -> std::result::Result<(), TestCaseError> {
    let player = &state.player;
    let server = &state.server;
    prop_assert!((0..=player.max_energy).contains(&player.energy), "energy {}", player.energy);
    prop_assert!((0..=STAT_CAP).contains(&player.passion), "passion {}", player.passion);
    prop_assert!((0..=STAT_CAP).contains(&player.culture), "culture {}", player.culture);
    prop_assert!((0..=STAT_CAP).contains(&server.health), "health {}", server.health);
    prop_assert!(server.hype >= 0, "hype {}", server.hype);
    prop_assert!(
        server.online_players <= server.capacity(),
        "online {} over capacity {}",
        server.online_players,
        server.capacity()
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_weeks_keep_stats_in_bounds(state in arb_run_state(), seed in any::<u64>(), weeks in 1usize..8) {
        let config = GameConfig::default();
        let mut state = state;
        let mut draws = SeededDraws::new(seed);
        let mut log = LogQueue::new(false);

        for _ in 0..weeks {
            if state.is_settled() {
                break;
            }
            turn::advance(&mut state, &config, &mut draws, &mut log).unwrap();
            assert_bounded(&state)?;
        }
    }

    #[test]
    fn prop_refused_actions_change_nothing(state in arb_run_state(), kind in arb_action(), seed in any::<u64>()) {
        let config = GameConfig::default();
        let mut state = state;
        let before = bincode::serialize(&state).unwrap();
        let mut draws = SeededDraws::new(seed);
        let mut log = LogQueue::new(false);

        if actions::execute(kind, &mut state, &config, &mut draws, &mut log).is_err() {
            prop_assert_eq!(bincode::serialize(&state).unwrap(), before);
        } else {
            assert_bounded(&state)?;
        }
    }

    #[test]
    fn prop_snapshot_is_idempotent(state in arb_run_state()) {
        let game = Game::from_state(GameConfig::default(), state, ConstantDraw(Fixed::ZERO));
        let before = game.state_hash();
        prop_assert_eq!(game.snapshot(), game.snapshot());
        prop_assert_eq!(game.state_hash(), before);
    }

    #[test]
    fn prop_same_seed_same_run(script in arb_script(40), seed in any::<u64>()) {
        let result = verify_script_determinism(
            GameConfig::default(),
            Mode::Nonprofit,
            ServerType::Modded,
            seed,
            &script,
            2,
        );
        prop_assert!(result.is_deterministic, "hashes {:?}", result.hashes);
    }

    #[test]
    fn prop_state_survives_encoding(script in arb_script(30), seed in any::<u64>()) {
        prop_assert!(verify_serialization_determinism(
            GameConfig::classic(),
            Mode::Commercial,
            ServerType::Vanilla,
            seed,
            &script,
        ));
    }
}
