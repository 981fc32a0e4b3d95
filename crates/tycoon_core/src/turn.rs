//! Weekly turn resolution.
//!
//! [`advance`] resolves one week in a fixed order. The order matters: every
//! probabilistic step pulls from the same draw stream, so reordering two
//! steps changes every run that follows.
//!
//! 0. Semester end: the last week of a semester settles successfully and
//!    nothing else happens.
//! 1. Forced rest: an exhausted player sits the week out (see below).
//! 2. Energy regeneration.
//! 3. Passion drift from server conditions.
//! 4. Billing.
//! 5. Metrics ([`crate::metrics::update`]).
//! 6. Events ([`crate::events::roll`]).
//! 7. Failure check.
//! 8. Calendar advance.
//!
//! A forced-rest week bills, lets hype and health slide, refills energy,
//! runs the metrics, checks for failure and advances. It skips
//! regeneration, drift, the rent warning and events.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, HardwareTier};
use crate::error::{GameError, Result};
use crate::events::{self, EventKind};
use crate::log::{LogQueue, Severity};
use crate::metrics::{self, MetricsReport};
use crate::rng::DrawSource;
use crate::settlement::{self, FailureReason, Settlement};
use crate::state::RunState;

const IDLE_PLAYERS: u32 = 5;
const CROWDED_ONLINE: u32 = 30;
const BUGGY_HEALTH: i32 = 50;
const IDLE_PASSION: i32 = -2;
const CROWDED_PASSION: i32 = -2;
const BUGGY_PASSION: i32 = -3;

const REST_HYPE: i32 = -3;
const REST_HEALTH: i32 = -5;

/// Why passion moved at the start of a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriftReason {
    /// Fewer than five active players.
    NobodyPlaying,
    /// More than thirty online at once.
    AdminPressure,
    /// Health below fifty.
    ConstantBugs,
}

impl DriftReason {
    /// Label used in the log.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NobodyPlaying => "nobody is playing",
            Self::AdminPressure => "admin pressure",
            Self::ConstantBugs => "constant bugs",
        }
    }
}

/// Summed passion change with its causes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassionDrift {
    /// Net change, applied once.
    pub change: i32,
    /// Causes in evaluation order.
    pub reasons: Vec<DriftReason>,
}

/// What billing did this week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingResult {
    /// Rent was paid.
    Paid {
        /// Tier billed.
        tier: HardwareTier,
        /// Amount paid.
        amount: i64,
    },
    /// Rent is due next week.
    DueSoon,
    /// Nothing to do.
    NotDue,
    /// Rent was due and could not be paid. The run is settled.
    Lapsed,
}

/// Everything that happened during a resolved week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekReport {
    /// Week that was resolved.
    pub week: u32,
    /// Energy regained at the start of the week.
    pub energy_regained: i32,
    /// Passion drift.
    pub drift: PassionDrift,
    /// Rent.
    pub billing: BillingResult,
    /// Population, load, wear and income.
    pub metrics: MetricsReport,
    /// Event that fired, if any.
    pub event: Option<EventKind>,
}

/// Result of one call to [`advance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// A normal week was played.
    Advanced(WeekReport),
    /// The player sat the week out.
    Rested(WeekReport),
    /// The semester or run ended.
    Settled(Settlement),
}

impl TurnOutcome {
    /// The settlement, if this turn produced one.
    #[must_use]
    pub const fn settlement(&self) -> Option<&Settlement> {
        match self {
            Self::Settled(settlement) => Some(settlement),
            _ => None,
        }
    }
}

/// Resolve one week.
///
/// # Errors
///
/// [`GameError::RunOver`] if the run is settled and [`GameError::LogBusy`]
/// while a paced log is still draining. Nothing changes in either case.
pub fn advance<D: DrawSource + ?Sized>(
    state: &mut RunState,
    config: &GameConfig,
    draws: &mut D,
    log: &mut LogQueue,
) -> Result<TurnOutcome> {
    if state.is_settled() {
        return Err(GameError::RunOver);
    }
    if log.is_busy() {
        return Err(GameError::LogBusy);
    }

    let outcome = if config.features.semesters
        && state.week_in_semester + 1 >= config.semester_length
    {
        TurnOutcome::Settled(settlement::settle_success(state, log))
    } else if config.features.forced_rest && state.player.energy <= 0 && !state.resting {
        rest_week(state, config, draws, log)
    } else {
        normal_week(state, config, draws, log)
    };

    #[cfg(debug_assertions)]
    {
        let hash = state.state_hash();
        tracing::debug!(week = state.week, state_hash = hash, "week resolved");
    }

    #[cfg(feature = "debug-validation")]
    if let Err(err) = state.validate() {
        tracing::error!(week = state.week, %err, "state validation failed");
    }

    Ok(outcome)
}

fn normal_week<D: DrawSource + ?Sized>(
    state: &mut RunState,
    config: &GameConfig,
    draws: &mut D,
    log: &mut LogQueue,
) -> TurnOutcome {
    let week = state.week;
    state.resting = false;
    log.push(week, Severity::Turn, format!("--- Week {week} ---"));

    let before = state.player.energy;
    state.player.regen_energy(config.energy_regen);
    let energy_regained = state.player.energy - before;

    let drift = passion_drift(state);
    if drift.change != 0 {
        state.player.add_passion(drift.change);
        let reasons: Vec<&str> = drift.reasons.iter().map(|r| r.label()).collect();
        log.push(
            week,
            Severity::Danger,
            format!("Passion {}: {}", drift.change, reasons.join(", ")),
        );
    }

    let billing = bill(state, config, log, false);
    if billing == BillingResult::Lapsed {
        let reason = FailureReason::RenewalUnaffordable {
            while_resting: false,
        };
        return TurnOutcome::Settled(settlement::settle_failure(state, config, draws, reason, log));
    }

    let metrics = metrics::update(state, config, draws, log);
    let event = events::roll(state, draws, log);

    if let Some(reason) = failure(state) {
        return TurnOutcome::Settled(settlement::settle_failure(state, config, draws, reason, log));
    }

    advance_calendar(state);
    TurnOutcome::Advanced(WeekReport {
        week,
        energy_regained,
        drift,
        billing,
        metrics,
        event,
    })
}

fn rest_week<D: DrawSource + ?Sized>(
    state: &mut RunState,
    config: &GameConfig,
    draws: &mut D,
    log: &mut LogQueue,
) -> TurnOutcome {
    let week = state.week;
    state.resting = true;
    log.push(week, Severity::Danger, "Out of energy! Forced to rest this week.");
    log.push(week, Severity::Turn, format!("--- Week {week} (resting) ---"));
    tracing::debug!(week, "forced rest");

    let billing = bill(state, config, log, true);
    if billing == BillingResult::Lapsed {
        let reason = FailureReason::RenewalUnaffordable {
            while_resting: true,
        };
        return TurnOutcome::Settled(settlement::settle_failure(state, config, draws, reason, log));
    }

    state.server.add_hype(REST_HYPE);
    state.server.add_health(REST_HEALTH);
    let before = state.player.energy;
    state.player.energy = state.player.max_energy;
    log.push(
        week,
        Severity::Info,
        "Rest restored your energy, but the server went unmaintained.",
    );

    let metrics = metrics::update(state, config, draws, log);

    if let Some(reason) = failure(state) {
        return TurnOutcome::Settled(settlement::settle_failure(state, config, draws, reason, log));
    }

    advance_calendar(state);
    TurnOutcome::Rested(WeekReport {
        week,
        energy_regained: state.player.energy - before,
        drift: PassionDrift::default(),
        billing,
        metrics,
        event: None,
    })
}

/// Passion pressure from the server's condition.
#[must_use]
pub fn passion_drift(state: &RunState) -> PassionDrift {
    let mut drift = PassionDrift::default();
    if state.server.active_players < IDLE_PLAYERS {
        drift.change += IDLE_PASSION;
        drift.reasons.push(DriftReason::NobodyPlaying);
    } else if state.server.online_players > CROWDED_ONLINE {
        drift.change += CROWDED_PASSION;
        drift.reasons.push(DriftReason::AdminPressure);
    }
    if state.server.health < BUGGY_HEALTH {
        drift.change += BUGGY_PASSION;
        drift.reasons.push(DriftReason::ConstantBugs);
    }
    drift
}

fn bill(
    state: &mut RunState,
    config: &GameConfig,
    log: &mut LogQueue,
    resting: bool,
) -> BillingResult {
    let week = state.week;
    if week < state.server.next_bill_week {
        if !resting && state.server.next_bill_week - week <= 1 {
            log.push(week, Severity::Danger, "Heads up: rent is due next week!");
            return BillingResult::DueSoon;
        }
        return BillingResult::NotDue;
    }

    let tier = state.server.tier;
    let amount = tier.monthly_cost();
    if state.player.wealth < amount {
        tracing::debug!(week, amount, wealth = state.player.wealth, "rent unaffordable");
        return BillingResult::Lapsed;
    }

    state.player.wealth -= amount;
    state.server.next_bill_week += config.billing_period;
    if resting {
        log.push(week, Severity::Info, format!("Auto-renewed: -${amount}"));
    } else {
        log.push(
            week,
            Severity::Success,
            format!("Auto-renewed [{}]: -${amount}", tier.display_name()),
        );
    }
    BillingResult::Paid { tier, amount }
}

fn failure(state: &RunState) -> Option<FailureReason> {
    if state.player.wealth < 0 {
        Some(FailureReason::FundingCollapse)
    } else if state.player.passion <= 0 {
        Some(FailureReason::BurnedOut)
    } else {
        None
    }
}

fn advance_calendar(state: &mut RunState) {
    state.week += 1;
    state.week_in_semester += 1;
}
