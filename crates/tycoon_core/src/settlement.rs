//! Semester and run settlement.
//!
//! A run settles when the semester runs out of weeks (success) or a
//! failure condition trips. Settling freezes the run: nothing about the
//! player or the server changes until [`continue_run`] rolls it into the
//! next semester. A failed semester draws its recovery terms up front and
//! stages them inside the [`Settlement`], so the summary the player sees
//! is exactly what continuation will apply.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::log::{LogQueue, Severity};
use crate::math::{banded_permille, fixed_serde, percent_floor, permille_floor, Fixed};
use crate::rng::DrawSource;
use crate::state::{RunPhase, RunState, STAT_CAP};

const HYPE_RETENTION_BASE: i32 = 300;
const HYPE_RETENTION_SPREAD: i32 = 300;
const TECH_RETENTION_BASE: i32 = 600;
const TECH_RETENTION_SPREAD: i32 = 300;
const ACTIVE_RETENTION_PERCENT: i64 = 20;

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// Wealth went negative.
    FundingCollapse,
    /// Passion reached zero.
    BurnedOut,
    /// Rent came due and could not be paid.
    RenewalUnaffordable {
        /// The bill fell due during a forced-rest week.
        while_resting: bool,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FundingCollapse => write!(f, "funding collapse"),
            Self::BurnedOut => write!(f, "burned out"),
            Self::RenewalUnaffordable { .. } => write!(f, "could not afford renewal"),
        }
    }
}

impl FailureReason {
    /// Longer line for the log.
    #[must_use]
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::FundingCollapse => "The money ran out.",
            Self::BurnedOut => "You are completely sick of running a server.",
            Self::RenewalUnaffordable {
                while_resting: false,
            } => "Could not pay the hosting bill; the provider wiped the server.",
            Self::RenewalUnaffordable {
                while_resting: true,
            } => "The hosting bill lapsed while you were in bed.",
        }
    }
}

/// Recovery terms drawn when a semester fails, applied on continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StagedRecovery {
    /// Weeks of the semester left unplayed.
    pub weeks_skipped: u32,
    /// Lump-sum allowance for the skipped weeks.
    pub allowance: i64,
    /// Share of hype kept, in per-mille.
    #[serde(with = "fixed_serde")]
    pub hype_retention: Fixed,
    /// Share of tech kept, in per-mille.
    #[serde(with = "fixed_serde")]
    pub tech_retention: Fixed,
}

impl StagedRecovery {
    /// Hype kept, as a whole percentage rounded down.
    #[must_use]
    pub fn hype_percent(&self) -> u32 {
        permille_to_percent(self.hype_retention)
    }

    /// Tech kept, as a whole percentage rounded down.
    #[must_use]
    pub fn tech_percent(&self) -> u32 {
        permille_to_percent(self.tech_retention)
    }
}

fn permille_to_percent(rate: Fixed) -> u32 {
    (rate / Fixed::from_num(10)).floor().to_num::<u32>()
}

/// How the semester ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// All weeks played.
    Success,
    /// A failure condition tripped.
    Failure {
        /// What went wrong.
        reason: FailureReason,
        /// Recovery terms, absent when the rules have no next semester.
        recovery: Option<StagedRecovery>,
    },
}

/// End-of-semester record, frozen until continuation or reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settlement {
    /// Semester that ended.
    pub semester: u32,
    /// Global week on which it ended.
    pub week: u32,
    /// Success or failure.
    pub outcome: SettlementOutcome,
}

impl Settlement {
    /// A successful settlement for the current semester.
    #[must_use]
    pub const fn success(state: &RunState) -> Self {
        Self {
            semester: state.semester,
            week: state.week,
            outcome: SettlementOutcome::Success,
        }
    }

    /// Whether the semester ended successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, SettlementOutcome::Success)
    }

    /// The failure reason, if the semester failed.
    #[must_use]
    pub const fn failure_reason(&self) -> Option<FailureReason> {
        match &self.outcome {
            SettlementOutcome::Success => None,
            SettlementOutcome::Failure { reason, .. } => Some(*reason),
        }
    }

    /// Staged recovery terms, if any.
    #[must_use]
    pub const fn recovery(&self) -> Option<&StagedRecovery> {
        match &self.outcome {
            SettlementOutcome::Failure {
                recovery: Some(recovery),
                ..
            } => Some(recovery),
            _ => None,
        }
    }

    /// Display-ready numbers for the settlement screen.
    #[must_use]
    pub fn summary(&self) -> SettlementSummary {
        match &self.outcome {
            SettlementOutcome::Success => SettlementSummary {
                semester: self.semester,
                success: true,
                reason: None,
                weeks_skipped: 0,
                allowance: 0,
                hype_kept_percent: 100,
                tech_kept_percent: 100,
                can_continue: true,
            },
            SettlementOutcome::Failure { reason, recovery } => SettlementSummary {
                semester: self.semester,
                success: false,
                reason: Some(reason.to_string()),
                weeks_skipped: recovery.map_or(0, |r| r.weeks_skipped),
                allowance: recovery.map_or(0, |r| r.allowance),
                hype_kept_percent: recovery.map_or(0, |r| r.hype_percent()),
                tech_kept_percent: recovery.map_or(0, |r| r.tech_percent()),
                can_continue: recovery.is_some(),
            },
        }
    }
}

/// What the settlement screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Semester that ended.
    pub semester: u32,
    /// Whether it ended well.
    pub success: bool,
    /// Failure reason text.
    pub reason: Option<String>,
    /// Weeks skipped by the failure.
    pub weeks_skipped: u32,
    /// Allowance paid on continuation.
    pub allowance: i64,
    /// Hype kept on continuation.
    pub hype_kept_percent: u32,
    /// Tech kept on continuation.
    pub tech_kept_percent: u32,
    /// Whether [`continue_run`] will accept this settlement.
    pub can_continue: bool,
}

/// Settle the semester as a success. Player and server are left untouched.
pub fn settle_success(state: &mut RunState, log: &mut LogQueue) -> Settlement {
    let settlement = Settlement::success(state);
    log.push(
        state.week,
        Severity::Success,
        format!("Semester {} complete! Everything carries over.", state.semester),
    );
    tracing::info!(
        semester = state.semester,
        week = state.week,
        wealth = state.player.wealth,
        "semester settled"
    );
    state.phase = RunPhase::Settled(settlement.clone());
    settlement
}

/// Settle the semester as a failure.
///
/// With semesters enabled this draws the recovery terms (hype first, then
/// tech) and stages them in the settlement. Nothing else changes.
pub fn settle_failure<D: DrawSource + ?Sized>(
    state: &mut RunState,
    config: &GameConfig,
    draws: &mut D,
    reason: FailureReason,
    log: &mut LogQueue,
) -> Settlement {
    let recovery = if config.features.semesters {
        let weeks_skipped = config
            .semester_length
            .saturating_sub(state.week_in_semester + 1);
        let hype_retention =
            banded_permille(HYPE_RETENTION_BASE, draws.next_draw(), HYPE_RETENTION_SPREAD);
        let tech_retention =
            banded_permille(TECH_RETENTION_BASE, draws.next_draw(), TECH_RETENTION_SPREAD);
        Some(StagedRecovery {
            weeks_skipped,
            allowance: i64::from(weeks_skipped) * config.allowance,
            hype_retention,
            tech_retention,
        })
    } else {
        None
    };

    log.push(state.week, Severity::Danger, reason.narrative());
    log.push(
        state.week,
        Severity::Danger,
        format!("Game over: {reason}."),
    );
    tracing::info!(
        semester = state.semester,
        week = state.week,
        %reason,
        recoverable = recovery.is_some(),
        "run failed"
    );

    let settlement = Settlement {
        semester: state.semester,
        week: state.week,
        outcome: SettlementOutcome::Failure { reason, recovery },
    };
    state.phase = RunPhase::Settled(settlement.clone());
    settlement
}

/// Roll a settled run into the next semester.
///
/// A failed semester first commits its staged recovery: the allowance is
/// paid, hype, tech and the active population shrink. Both paths then
/// restore energy, passion and health and schedule the next bill.
///
/// # Errors
///
/// [`GameError::NotSettled`] if the run is still active, and
/// [`GameError::NoContinuation`] for a failure with nothing staged.
pub fn continue_run(state: &mut RunState, config: &GameConfig, log: &mut LogQueue) -> Result<()> {
    let settlement = match &state.phase {
        RunPhase::Settled(settlement) => settlement.clone(),
        RunPhase::Active => return Err(GameError::NotSettled),
    };

    match settlement.outcome {
        SettlementOutcome::Success => {
            log.push(
                state.week,
                Severity::Success,
                "A new semester begins. Keep it up!",
            );
        }
        SettlementOutcome::Failure {
            recovery: Some(recovery),
            ..
        } => {
            state.player.wealth += recovery.allowance;
            state.server.hype =
                permille_floor(i64::from(state.server.hype), recovery.hype_retention) as i32;
            state.player.tech =
                permille_floor(i64::from(state.player.tech), recovery.tech_retention) as i32;
            state.server.active_players = percent_floor(
                i64::from(state.server.active_players),
                ACTIVE_RETENTION_PERCENT,
            ) as u32;
            log.push(
                state.week,
                Severity::Danger,
                "After the collapse, everything has to be rebuilt.",
            );
        }
        SettlementOutcome::Failure { recovery: None, .. } => {
            return Err(GameError::NoContinuation);
        }
    }

    state.semester += 1;
    state.week_in_semester = 0;
    state.resting = false;
    state.player.energy = state.player.max_energy;
    state.player.passion = STAT_CAP;
    state.server.health = STAT_CAP;
    state.server.next_bill_week = state.week + config.billing_period;
    state.phase = RunPhase::Active;

    tracing::info!(
        semester = state.semester,
        week = state.week,
        "semester started"
    );
    Ok(())
}
