//! Balance testing utilities for headless runs.
//!
//! Scripted policies play whole semesters through [`GameFacade`] so that
//! tuning changes can be checked across hundreds of seeds: how often a
//! policy survives, how it fails and how rich it ends up.

use std::ops::Range;

use tycoon_core::actions::ActionKind;
use tycoon_core::config::GameConfig;
use tycoon_core::facade::GameFacade;
use tycoon_core::game::Game;
use tycoon_core::settlement::{FailureReason, Settlement};
use tycoon_core::snapshot::{Snapshot, UpgradePreview};
use tycoon_core::state::{Mode, RunStatus, ServerType};
use tycoon_core::turn::TurnOutcome;

/// Passion below which the balanced policy stops acting for the week.
const TIRED_PASSION: i32 = 20;

/// How an autoplayer spends its week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Never acts; only ends weeks.
    Idle,
    /// Works every shift it can.
    Grinder,
    /// Spends everything on promotion, falls back to work.
    Promoter,
    /// Keeps the server healthy, studies when needed, upgrades when full.
    Balanced,
}

impl Policy {
    /// All policies.
    pub const ALL: [Self; 4] = [Self::Idle, Self::Grinder, Self::Promoter, Self::Balanced];

    /// Actions to try, in preference order. Empty means end the week.
    #[must_use]
    pub fn plan(self, snapshot: &Snapshot) -> Vec<ActionKind> {
        let player = &snapshot.player;
        let server = &snapshot.server;
        match self {
            Self::Idle => Vec::new(),
            Self::Grinder => vec![ActionKind::Work],
            Self::Promoter => vec![ActionKind::Promote, ActionKind::Work],
            Self::Balanced => {
                if player.passion < TIRED_PASSION {
                    return Vec::new();
                }
                let mut plan = Vec::new();
                if let UpgradePreview::Available { cost, .. } = &snapshot.upgrade {
                    if server.online_players >= snapshot.capacity
                        && player.wealth > *cost + 4 * snapshot.monthly_cost
                    {
                        plan.push(ActionKind::Upgrade);
                    }
                }
                if server.health < 60 {
                    plan.push(ActionKind::Maintain);
                }
                if player.culture < 65 {
                    plan.push(ActionKind::Study);
                }
                if player.wealth < 200 {
                    plan.push(ActionKind::Work);
                }
                if server.hype < 40 && player.wealth >= 150 {
                    plan.push(ActionKind::Promote);
                }
                plan.push(ActionKind::Maintain);
                plan
            }
        }
    }
}

/// How one autoplayed semester ended.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Weeks resolved, forced rest included.
    pub weeks: u32,
    /// Weeks spent resting.
    pub rest_weeks: u32,
    /// The settlement, if one was reached.
    pub settlement: Option<Settlement>,
    /// The run at the end.
    pub final_snapshot: Snapshot,
}

impl RunResult {
    /// Whether the semester was completed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.settlement.as_ref().is_some_and(Settlement::is_success)
    }
}

/// Play until a settlement or `max_weeks` resolved weeks.
pub fn play_semester<G: GameFacade>(game: &mut G, policy: Policy, max_weeks: u32) -> RunResult {
    let mut weeks = 0;
    let mut rest_weeks = 0;
    let mut settlement = None;

    while weeks < max_weeks {
        let _ = game.poll_log();
        let snapshot = game.snapshot();
        if snapshot.status == RunStatus::SemesterEnd || snapshot.status == RunStatus::GameOver {
            break;
        }

        let plan = policy.plan(&snapshot);
        if !plan.is_empty() && game.perform_first(&plan).is_some() {
            continue;
        }

        let _ = game.poll_log();
        match game.advance_turn() {
            Ok(TurnOutcome::Advanced(_)) => weeks += 1,
            Ok(TurnOutcome::Rested(_)) => {
                weeks += 1;
                rest_weeks += 1;
            }
            Ok(TurnOutcome::Settled(s)) => {
                settlement = Some(s);
                break;
            }
            Err(err) => {
                tracing::warn!(%err, "autoplay stopped");
                break;
            }
        }
    }

    let _ = game.poll_log();
    RunResult {
        weeks,
        rest_weeks,
        settlement,
        final_snapshot: game.snapshot(),
    }
}

/// Statistics over a batch of autoplayed semesters.
#[derive(Debug, Clone, Default)]
pub struct BalanceStats {
    /// Semesters played.
    pub runs: u32,
    /// Semesters completed.
    pub successes: u32,
    /// Failures from negative wealth.
    pub funding_collapses: u32,
    /// Failures from zero passion.
    pub burnouts: u32,
    /// Failures from unpaid rent.
    pub lapsed_renewals: u32,
    /// Average weeks resolved.
    pub avg_weeks: f64,
    /// Average final wealth.
    pub avg_final_wealth: f64,
    /// Average final active population.
    pub avg_final_players: f64,
}

impl BalanceStats {
    /// Share of runs that completed the semester (0.0 to 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        f64::from(self.successes) / f64::from(self.runs)
    }

    /// Total failures.
    pub fn failures(&self) -> u32 {
        self.funding_collapses + self.burnouts + self.lapsed_renewals
    }

    fn record(&mut self, result: &RunResult) {
        self.runs += 1;
        match result.settlement.as_ref().and_then(Settlement::failure_reason) {
            Some(FailureReason::FundingCollapse) => self.funding_collapses += 1,
            Some(FailureReason::BurnedOut) => self.burnouts += 1,
            Some(FailureReason::RenewalUnaffordable { .. }) => self.lapsed_renewals += 1,
            None if result.succeeded() => self.successes += 1,
            None => {}
        }
        let n = f64::from(self.runs);
        let fold = |avg: f64, value: f64| avg + (value - avg) / n;
        self.avg_weeks = fold(self.avg_weeks, f64::from(result.weeks));
        self.avg_final_wealth = fold(
            self.avg_final_wealth,
            result.final_snapshot.player.wealth as f64,
        );
        self.avg_final_players = fold(
            self.avg_final_players,
            f64::from(result.final_snapshot.server.active_players),
        );
    }
}

/// Play one semester per seed and collect statistics.
pub fn run_batch(
    config: GameConfig,
    mode: Mode,
    server_type: ServerType,
    policy: Policy,
    seeds: Range<u64>,
) -> BalanceStats {
    let max_weeks = config.semester_length;
    let mut stats = BalanceStats::default();
    for seed in seeds {
        let mut game = Game::seeded(config, mode, server_type, seed);
        let result = play_semester(&mut game, policy, max_weeks);
        stats.record(&result);
    }
    tracing::info!(
        ?policy,
        runs = stats.runs,
        success_rate = stats.success_rate(),
        "balance batch finished"
    );
    stats
}
