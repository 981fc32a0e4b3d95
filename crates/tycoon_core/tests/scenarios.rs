//! End-to-end scenarios played through the `Game` facade.
//!
//! All runs use constant one-half draws so every number below can be worked
//! out by hand: no surcharge, no event, no donation and no tech gain.

use tycoon_core::prelude::*;
use tycoon_core::settlement::SettlementOutcome;
use tycoon_test_utils::fixtures::{
    classic_game, drain_log, extended_game, game_from, half_draws, messages, state_with,
};
use tycoon_test_utils::init_test_tracing;

fn end_week<D: DrawSource>(game: &mut Game<D>) -> TurnOutcome {
    let outcome = game.advance_turn().unwrap();
    drain_log(game);
    outcome
}

// =============================================================================
// Billing cadence
// =============================================================================

#[test]
fn test_rent_is_billed_every_fourth_week() {
    init_test_tracing();
    let mut game = extended_game(Mode::Nonprofit, ServerType::Vanilla, half_draws());

    let mut reports = Vec::new();
    for _ in 0..3 {
        let TurnOutcome::Advanced(report) = end_week(&mut game) else {
            panic!("run ended early");
        };
        reports.push(report);
    }

    assert_eq!(reports[0].billing, BillingResult::NotDue);
    assert_eq!(reports[1].billing, BillingResult::NotDue);
    assert_eq!(reports[2].billing, BillingResult::DueSoon);

    // allowance only
    assert_eq!(game.state().player.wealth, 650);
    assert_eq!(game.state().server.next_bill_week, 4);
    assert_eq!(game.state().server.active_players, 11);
    assert!(game
        .log_history()
        .iter()
        .any(|e| e.week == 3 && e.message == "Heads up: rent is due next week!"));

    let TurnOutcome::Advanced(report) = end_week(&mut game) else {
        panic!("run ended on the billing week");
    };
    assert_eq!(
        report.billing,
        BillingResult::Paid {
            tier: HardwareTier::VpsBasic,
            amount: 40
        }
    );
    assert_eq!(report.metrics.income.donation, 0);
    assert_eq!(game.state().player.wealth, 610 + 50);
    assert_eq!(game.state().server.next_bill_week, 8);
    assert_eq!(game.state().server.active_players, 12);
    assert_eq!(game.snapshot().weeks_until_bill, 3);
}

#[test]
fn test_population_grows_from_hype() {
    let mut game = extended_game(Mode::Nonprofit, ServerType::Vanilla, half_draws());
    let mut population = Vec::new();
    let mut hype = Vec::new();
    for _ in 0..3 {
        end_week(&mut game);
        population.push(game.state().server.active_players);
        hype.push(game.state().server.hype);
    }
    assert_eq!(population, vec![5, 8, 11]);
    assert_eq!(hype, vec![45, 40, 36]);
    // only the first week had nobody playing
    assert_eq!(game.state().player.passion, 98);
    assert_eq!(game.state().server.health, 88);
}

// =============================================================================
// Burn-out
// =============================================================================

#[test]
fn test_burning_out_ends_the_week_at_the_failure_check() {
    init_test_tracing();
    let config = GameConfig::default();
    let state = state_with(&config, Mode::Nonprofit, ServerType::Vanilla, |s| {
        s.player.passion = 1;
    });
    let mut game = game_from(config, state, half_draws());

    let report = game.perform_action(ActionKind::Work).unwrap();
    assert_eq!(report.effect, ActionEffect::Worked { earned: 80 });
    assert_eq!(game.state().player.passion, 0);
    drain_log(&mut game);

    let outcome = end_week(&mut game);
    let settlement = outcome.settlement().unwrap();
    assert_eq!(settlement.failure_reason(), Some(FailureReason::BurnedOut));
    assert_eq!(settlement.week, 1);

    let state = game.state();
    assert_eq!(state.week, 1);
    assert_eq!(state.week_in_semester, 0);
    // metrics ran before the check
    assert_eq!(state.player.wealth, 500 + 80 + 50);
    assert_eq!(state.server.active_players, 5);
    assert_eq!(game.snapshot().status, RunStatus::GameOver);
    assert!(game
        .log_history()
        .iter()
        .any(|e| e.message == "Game over: burned out."));

    assert_eq!(game.advance_turn(), Err(GameError::RunOver));
    assert_eq!(
        game.perform_action(ActionKind::Study),
        Err(GameError::Action(ActionError::RunOver))
    );
}

#[test]
fn test_failed_semester_stages_and_commits_recovery() {
    let config = GameConfig::default();
    let state = state_with(&config, Mode::Nonprofit, ServerType::Vanilla, |s| {
        s.player.passion = 1;
    });
    let mut game = game_from(config, state, half_draws());
    game.perform_action(ActionKind::Work).unwrap();
    drain_log(&mut game);
    end_week(&mut game);

    let summary = game.snapshot().settlement.unwrap();
    assert!(!summary.success);
    assert_eq!(summary.reason.as_deref(), Some("burned out"));
    assert_eq!(summary.weeks_skipped, 23);
    assert_eq!(summary.allowance, 23 * 50);
    assert_eq!(summary.hype_kept_percent, 45);
    assert_eq!(summary.tech_kept_percent, 75);
    assert!(summary.can_continue);

    // staged only
    assert_eq!(game.state().server.hype, 45);
    assert_eq!(game.state().player.tech, 30);

    game.continue_run().unwrap();
    drain_log(&mut game);

    let state = game.state();
    assert_eq!(state.semester, 2);
    assert_eq!(state.week, 1);
    assert_eq!(state.week_in_semester, 0);
    assert_eq!(state.player.wealth, 630 + 1150);
    assert_eq!(state.server.hype, 20);
    assert_eq!(state.player.tech, 22);
    assert_eq!(state.server.active_players, 1);
    assert_eq!(state.player.passion, 100);
    assert_eq!(state.player.energy, state.player.max_energy);
    assert_eq!(state.server.health, 100);
    assert_eq!(state.server.next_bill_week, 5);
    assert_eq!(game.snapshot().status, RunStatus::Active);
}

#[test]
fn test_classic_failure_is_terminal_until_reset() {
    let config = GameConfig::classic();
    let state = state_with(&config, Mode::Commercial, ServerType::Vanilla, |s| {
        s.player.wealth = -100;
    });
    let mut game = game_from(config, state, half_draws());

    let outcome = game.advance_turn().unwrap();
    let settlement = outcome.settlement().unwrap();
    assert_eq!(settlement.failure_reason(), Some(FailureReason::FundingCollapse));
    assert_eq!(settlement.recovery(), None);
    assert!(!game.snapshot().settlement.unwrap().can_continue);

    assert_eq!(game.continue_run(), Err(GameError::NoContinuation));

    game.reset();
    let entries = game.poll_log();
    assert_eq!(messages(&entries)[0], "Server initialised...");
    assert_eq!(game.state().player.wealth, 1000);
    assert_eq!(game.state().mode, Mode::Commercial);
    assert_eq!(game.snapshot().status, RunStatus::Active);
}

#[test]
fn test_classic_log_never_locks_commands() {
    let mut game = classic_game(Mode::Nonprofit, ServerType::Vanilla);
    assert_eq!(game.pending_log_len(), 2);
    assert!(!game.is_log_busy());

    game.perform_action(ActionKind::Study).unwrap();
    game.advance_turn().unwrap();

    let entries = game.poll_log();
    let lines = messages(&entries);
    assert_eq!(lines[0], "Server initialised...");
    assert_eq!(lines[2], "Caught up on homework (culture +7)");
    assert_eq!(lines[3], "--- Week 1 ---");
}

// =============================================================================
// Forced rest
// =============================================================================

#[test]
fn test_exhausted_player_rests_but_the_server_keeps_running() {
    init_test_tracing();
    let config = GameConfig::default();
    let state = state_with(&config, Mode::Nonprofit, ServerType::Vanilla, |s| {
        s.player.energy = 0;
    });
    let mut game = game_from(config, state, half_draws());

    let outcome = game.advance_turn().unwrap();
    let entries = drain_log(&mut game);

    let TurnOutcome::Rested(report) = outcome else {
        panic!("expected a rest week, got {outcome:?}");
    };
    assert_eq!(report.billing, BillingResult::NotDue);
    assert_eq!(report.event, None);
    assert_eq!(report.drift.change, 0);
    assert_eq!(report.energy_regained, 10);
    assert_eq!(report.metrics.joined, 4);

    let state = game.state();
    assert_eq!(state.player.energy, state.player.max_energy);
    assert_eq!(state.player.passion, 100);
    assert_eq!(state.player.wealth, 550);
    assert_eq!(state.server.active_players, 4);
    assert_eq!(state.server.hype, 42);
    assert_eq!(state.server.health, 91);
    assert_eq!(state.week, 2);

    let lines = messages(&entries);
    assert_eq!(lines[0], "Out of energy! Forced to rest this week.");
    assert_eq!(lines[1], "--- Week 1 (resting) ---");
    assert!(!lines.iter().any(|l| l.contains("rent is due")));

    assert_eq!(game.snapshot().status, RunStatus::ForcedRest);
    assert!(game.snapshot().actions_locked());
    assert_eq!(
        game.perform_action(ActionKind::Work),
        Err(GameError::Action(ActionError::Resting))
    );
    // refused silently
    assert_eq!(game.pending_log_len(), 0);

    let outcome = end_week(&mut game);
    assert!(matches!(outcome, TurnOutcome::Advanced(_)));
    assert!(!game.state().resting);
    assert!(game.perform_action(ActionKind::Work).is_ok());
}

#[test]
fn test_rest_week_can_lapse_on_rent() {
    let config = GameConfig::default();
    let state = state_with(&config, Mode::Commercial, ServerType::Vanilla, |s| {
        s.player.energy = 0;
        s.player.wealth = 10;
        s.week = 4;
        s.week_in_semester = 3;
    });
    let mut game = game_from(config, state, half_draws());

    let outcome = end_week(&mut game);

    assert_eq!(
        outcome.settlement().and_then(Settlement::failure_reason),
        Some(FailureReason::RenewalUnaffordable {
            while_resting: true
        })
    );
    assert_eq!(game.state().player.energy, 0);
}

// =============================================================================
// Semester end
// =============================================================================

#[test]
fn test_last_week_settles_without_touching_anything() {
    init_test_tracing();
    let config = GameConfig::default();
    let state = state_with(&config, Mode::Commercial, ServerType::Modded, |s| {
        s.week = 24;
        s.week_in_semester = 23;
        s.player.energy = 2;
        s.player.passion = 37;
        s.server.active_players = 40;
        s.server.online_players = 15;
        s.server.next_bill_week = 25;
    });
    let before = state.clone();
    let mut game = game_from(config, state, half_draws());

    let outcome = end_week(&mut game);

    let settlement = outcome.settlement().unwrap();
    assert!(settlement.is_success());
    assert_eq!(settlement.outcome, SettlementOutcome::Success);
    assert_eq!(game.state().player, before.player);
    assert_eq!(game.state().server, before.server);
    assert_eq!(game.state().week, 24);
    assert_eq!(game.state().week_in_semester, 23);
    assert_eq!(game.snapshot().status, RunStatus::SemesterEnd);
    assert_eq!(game.advance_turn(), Err(GameError::RunOver));

    game.continue_run().unwrap();
    drain_log(&mut game);

    let state = game.state();
    assert_eq!(state.semester, 2);
    assert_eq!(state.week, 24);
    assert_eq!(state.week_in_semester, 0);
    assert_eq!(state.player.energy, state.player.max_energy);
    assert_eq!(state.player.passion, 100);
    assert_eq!(state.server.health, 100);
    assert_eq!(state.player.wealth, before.player.wealth);
    assert_eq!(state.server.active_players, 40);
    assert_eq!(state.server.next_bill_week, 28);
}

#[test]
fn test_continue_requires_a_settlement() {
    let mut game = extended_game(Mode::Nonprofit, ServerType::Modded, half_draws());
    assert_eq!(game.continue_run(), Err(GameError::NotSettled));
}
