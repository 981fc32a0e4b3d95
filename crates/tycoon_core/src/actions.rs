//! Action executor.
//!
//! An action is one discrete thing the player does during a week. Every
//! precondition is checked before anything changes; a refused action
//! leaves the run state exactly as it was (the log may gain a line
//! explaining the refusal).
//!
//! # Costs
//!
//! Energy cost is a base per action plus surcharges. Surcharges are kept
//! as a [`CostBreakdown`] instead of being folded into one number, so the
//! log and the tests can see why an action got more expensive:
//!
//! - **Rusty skills** (+1): maintaining with tech below 30.
//! - **Frustrated** (+1): passion below 40, on a coin flip.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, HardwareTier};
use crate::error::ActionError;
use crate::log::{LogQueue, Severity};
use crate::math::{percent, percent_floor, roll_below};
use crate::rng::DrawSource;
use crate::state::RunState;

const RUSTY_TECH_THRESHOLD: i32 = 30;
const FRUSTRATED_PASSION_THRESHOLD: i32 = 40;
const FRUSTRATED_CHANCE_PERCENT: i32 = 50;

const MAINTAIN_BASE_FIX: i32 = 20;
const MAINTAIN_TECH_PERCENT: i64 = 50;
const MAINTAIN_LEARN_PERCENT: i32 = 70;
const MAINTAIN_PASSION: i32 = -2;

const PROMOTE_BASE_HYPE: i32 = 15;
const PROMOTE_HYPE_RANGE: i32 = 10;
const PROMOTE_CULTURE_PERCENT: i64 = 25;
const PROMOTE_PASSION: i32 = -1;

const WORK_BASE_PAY: i32 = 60;
const WORK_PAY_RANGE: i32 = 40;
const WORK_PASSION: i32 = -3;

const STUDY_BASE_GAIN: i32 = 4;
const STUDY_GAIN_RANGE: i32 = 5;
const STUDY_TECH_PERCENT: i64 = 5;

const UPGRADE_PASSION: i32 = 10;

/// The things a player can do during a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Patch and clean the server; restores health.
    Maintain,
    /// Advertise; raises hype for money.
    Promote,
    /// Part-time job; earns money.
    Work,
    /// Move to the next hardware tier.
    Upgrade,
    /// Do schoolwork; raises culture.
    Study,
}

impl ActionKind {
    /// All actions, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Maintain,
        Self::Promote,
        Self::Work,
        Self::Upgrade,
        Self::Study,
    ];

    /// Name shown to the player.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Maintain => "Maintain",
            Self::Promote => "Promote",
            Self::Work => "Work",
            Self::Upgrade => "Upgrade",
            Self::Study => "Study",
        }
    }

    /// Energy cost before surcharges.
    #[must_use]
    pub const fn base_energy(self, config: &GameConfig) -> i32 {
        match self {
            Self::Maintain => config.action_costs.maintain,
            Self::Promote => config.action_costs.promote,
            Self::Work => config.action_costs.work,
            Self::Study => config.action_costs.study,
            Self::Upgrade => 0,
        }
    }
}

/// Why a surcharge was added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurchargeReason {
    /// Tech too low to maintain efficiently.
    RustySkills,
    /// Passion too low to focus.
    Frustrated,
}

impl SurchargeReason {
    /// Label used in the log.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RustySkills => "rusty skills",
            Self::Frustrated => "frustrated",
        }
    }
}

/// One extra energy charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    /// Why it applies.
    pub reason: SurchargeReason,
    /// Extra energy.
    pub amount: i32,
}

/// Full cost of an action, with surcharges kept separate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Base energy cost.
    pub base_energy: i32,
    /// Surcharges, in the order they were applied.
    pub surcharges: Vec<Surcharge>,
    /// Money cost.
    pub money: i64,
}

impl CostBreakdown {
    /// Base energy plus all surcharges.
    #[must_use]
    pub fn energy_total(&self) -> i32 {
        self.base_energy + self.surcharges.iter().map(|s| s.amount).sum::<i32>()
    }

    /// Whether any surcharge applied.
    #[must_use]
    pub fn has_surcharges(&self) -> bool {
        !self.surcharges.is_empty()
    }

    fn describe_surcharges(&self) -> String {
        self.surcharges
            .iter()
            .map(|s| format!("{} (+{})", s.reason.label(), s.amount))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEffect {
    /// Server health restored (before the cap) and whether tech went up.
    Maintained {
        /// Health points applied.
        health_restored: i32,
        /// Tech gained one point.
        learned: bool,
    },
    /// Hype gained.
    Promoted {
        /// Hype points added.
        hype_gained: i32,
    },
    /// Money earned.
    Worked {
        /// Wage.
        earned: i64,
    },
    /// Hardware moved up a tier.
    Upgraded {
        /// Previous tier.
        from: HardwareTier,
        /// New tier.
        to: HardwareTier,
    },
    /// Culture gained (before the cap).
    Studied {
        /// Culture points applied.
        culture_gained: i32,
    },
}

/// Outcome of a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    /// Which action ran.
    pub kind: ActionKind,
    /// What it cost.
    pub cost: CostBreakdown,
    /// Nominal passion change (before clamping).
    pub passion_change: i32,
    /// What it did.
    pub effect: ActionEffect,
}

/// Work out what an action would cost right now.
///
/// Rolls the frustration coin when passion is low, so this consumes draws.
///
/// # Errors
///
/// Returns [`ActionError::NoFurtherTier`] when upgrading from the top tier.
pub fn action_cost<D: DrawSource + ?Sized>(
    kind: ActionKind,
    state: &RunState,
    config: &GameConfig,
    draws: &mut D,
) -> Result<CostBreakdown, ActionError> {
    if kind == ActionKind::Upgrade {
        let next = state.server.tier.next().ok_or(ActionError::NoFurtherTier)?;
        return Ok(CostBreakdown {
            base_energy: 0,
            surcharges: Vec::new(),
            money: next.monthly_cost(),
        });
    }

    let mut surcharges = Vec::new();
    if kind == ActionKind::Maintain && state.player.tech < RUSTY_TECH_THRESHOLD {
        surcharges.push(Surcharge {
            reason: SurchargeReason::RustySkills,
            amount: 1,
        });
    }
    if state.player.passion < FRUSTRATED_PASSION_THRESHOLD
        && draws.chance(percent(FRUSTRATED_CHANCE_PERCENT))
    {
        surcharges.push(Surcharge {
            reason: SurchargeReason::Frustrated,
            amount: 1,
        });
    }

    let money = if kind == ActionKind::Promote {
        config.promote_money_cost
    } else {
        0
    };

    Ok(CostBreakdown {
        base_energy: kind.base_energy(config),
        surcharges,
        money,
    })
}

/// Validate and apply one action.
///
/// Refusals for missing energy, money or hardware are written to the log;
/// refusals because the controls are locked are not.
///
/// # Errors
///
/// Returns the first failed precondition. The state is unchanged.
pub fn execute<D: DrawSource + ?Sized>(
    kind: ActionKind,
    state: &mut RunState,
    config: &GameConfig,
    draws: &mut D,
    log: &mut LogQueue,
) -> Result<ActionReport, ActionError> {
    let result = check_and_cost(kind, state, config, draws, log.is_busy());
    let cost = match result {
        Ok(cost) => cost,
        Err(err) => {
            if err.is_reported() {
                log.push(state.week, Severity::Danger, format!("{err}!"));
            }
            tracing::debug!(?kind, %err, "action refused");
            return Err(err);
        }
    };

    let week = state.week;
    let (effect, passion_change) = match kind {
        ActionKind::Maintain => {
            let fix = MAINTAIN_BASE_FIX
                + percent_floor(i64::from(state.player.tech), MAINTAIN_TECH_PERCENT) as i32;
            state.server.add_health(fix);
            spend(state, &cost, log);
            state.player.add_passion(MAINTAIN_PASSION);

            let learned = draws.next_draw() > percent(MAINTAIN_LEARN_PERCENT);
            if learned {
                state.player.tech += 1;
                log.push(
                    week,
                    Severity::Info,
                    format!("Picked up something new while patching (tech +1, passion {MAINTAIN_PASSION})"),
                );
            } else {
                log.push(
                    week,
                    Severity::Info,
                    format!("Cleared caches and rotated logs (health +{fix}%, passion {MAINTAIN_PASSION})"),
                );
            }
            (
                ActionEffect::Maintained {
                    health_restored: fix,
                    learned,
                },
                MAINTAIN_PASSION,
            )
        }
        ActionKind::Promote => {
            let hype = PROMOTE_BASE_HYPE
                + roll_below(draws.next_draw(), PROMOTE_HYPE_RANGE)
                + percent_floor(i64::from(state.player.culture), PROMOTE_CULTURE_PERCENT) as i32;
            state.server.add_hype(hype);
            state.player.wealth -= cost.money;
            spend(state, &cost, log);
            state.player.add_passion(PROMOTE_PASSION);
            log.push(
                week,
                Severity::Info,
                format!("Posted ads on every forum (hype +{hype}, passion {PROMOTE_PASSION})"),
            );
            (ActionEffect::Promoted { hype_gained: hype }, PROMOTE_PASSION)
        }
        ActionKind::Work => {
            let earned = i64::from(WORK_BASE_PAY + roll_below(draws.next_draw(), WORK_PAY_RANGE));
            state.player.wealth += earned;
            spend(state, &cost, log);
            state.player.add_passion(WORK_PASSION);
            log.push(
                week,
                Severity::Info,
                format!("Earned ${earned} at a part-time job (passion {WORK_PASSION})"),
            );
            (ActionEffect::Worked { earned }, WORK_PASSION)
        }
        ActionKind::Upgrade => {
            let from = state.server.tier;
            // Checked by `action_cost`.
            let to = from.next().unwrap_or(from);
            state.server.tier = to;
            state.player.wealth -= cost.money;
            state.player.add_passion(UPGRADE_PASSION);
            log.push(
                week,
                Severity::Success,
                format!(
                    "Migrated to [{}]! (passion +{UPGRADE_PASSION})",
                    to.display_name()
                ),
            );
            (ActionEffect::Upgraded { from, to }, UPGRADE_PASSION)
        }
        ActionKind::Study => {
            let gain = STUDY_BASE_GAIN
                + roll_below(draws.next_draw(), STUDY_GAIN_RANGE)
                + percent_floor(i64::from(state.player.tech), STUDY_TECH_PERCENT) as i32;
            state.player.add_culture(gain);
            spend(state, &cost, log);
            log.push(
                week,
                Severity::Info,
                format!("Caught up on homework (culture +{gain})"),
            );
            (ActionEffect::Studied { culture_gained: gain }, 0)
        }
    };

    tracing::debug!(
        ?kind,
        energy = cost.energy_total(),
        money = cost.money,
        passion = state.player.passion,
        "action applied"
    );

    Ok(ActionReport {
        kind,
        cost,
        passion_change,
        effect,
    })
}

fn check_and_cost<D: DrawSource + ?Sized>(
    kind: ActionKind,
    state: &RunState,
    config: &GameConfig,
    draws: &mut D,
    log_busy: bool,
) -> Result<CostBreakdown, ActionError> {
    if state.is_settled() {
        return Err(ActionError::RunOver);
    }
    if state.resting {
        return Err(ActionError::Resting);
    }
    if log_busy {
        return Err(ActionError::LogBusy);
    }

    let cost = action_cost(kind, state, config, draws)?;

    let required = cost.energy_total();
    if state.player.energy < required {
        return Err(ActionError::InsufficientEnergy {
            required,
            available: state.player.energy,
        });
    }
    if state.player.wealth < cost.money {
        return Err(ActionError::InsufficientFunds {
            required: cost.money,
            available: state.player.wealth,
        });
    }
    Ok(cost)
}

fn spend(state: &mut RunState, cost: &CostBreakdown, log: &mut LogQueue) {
    state.player.spend_energy(cost.energy_total());
    if cost.has_surcharges() {
        log.push(
            state.week,
            Severity::Danger,
            format!("Extra energy spent: {}", cost.describe_surcharges()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::rng::{ConstantDraw, ScriptedDraws};
    use crate::settlement::Settlement;
    use crate::state::{Mode, RunPhase, ServerType};

    fn fresh() -> (RunState, GameConfig) {
        let config = GameConfig::default();
        let state = RunState::new(&config, Mode::Nonprofit, ServerType::Vanilla);
        (state, config)
    }

    fn half() -> ConstantDraw {
        ConstantDraw(Fixed::from_num(0.5))
    }

    #[test]
    fn test_maintain_restores_health_and_may_teach() {
        let (mut state, config) = fresh();
        state.server.health = 50;
        let mut log = LogQueue::new(false);
        let mut draws = ScriptedDraws::from_fractions(&[0.9]);

        let report = execute(ActionKind::Maintain, &mut state, &config, &mut draws, &mut log)
            .expect("maintain should succeed");

        // 20 + floor(30 * 0.5)
        assert_eq!(
            report.effect,
            ActionEffect::Maintained {
                health_restored: 35,
                learned: true
            }
        );
        assert_eq!(state.server.health, 85);
        assert_eq!(state.player.energy, 8);
        assert_eq!(state.player.passion, 98);
        assert_eq!(state.player.tech, 31);
        assert_eq!(draws.consumed(), 1);
    }

    #[test]
    fn test_maintain_health_caps_at_100() {
        let (mut state, config) = fresh();
        let mut log = LogQueue::new(false);
        execute(ActionKind::Maintain, &mut state, &config, &mut half(), &mut log).unwrap();
        assert_eq!(state.server.health, 100);
        assert_eq!(state.player.tech, 30);
    }

    #[test]
    fn test_rusty_surcharge_is_itemised() {
        let (mut state, config) = fresh();
        state.player.tech = 20;
        let mut log = LogQueue::new(false);

        let report =
            execute(ActionKind::Maintain, &mut state, &config, &mut half(), &mut log).unwrap();

        assert_eq!(report.cost.base_energy, 2);
        assert_eq!(
            report.cost.surcharges,
            vec![Surcharge {
                reason: SurchargeReason::RustySkills,
                amount: 1
            }]
        );
        assert_eq!(report.cost.energy_total(), 3);
        assert_eq!(state.player.energy, 7);
        assert!(log
            .pending()
            .any(|e| e.severity == Severity::Danger && e.message.contains("rusty skills")));
    }

    #[test]
    fn test_frustration_rolls_only_when_passion_low() {
        let (mut state, config) = fresh();
        let mut draws = ScriptedDraws::from_fractions(&[0.2, 0.25]);
        let cost = action_cost(ActionKind::Work, &state, &config, &mut draws).unwrap();
        assert!(!cost.has_surcharges());
        assert_eq!(draws.consumed(), 0);

        state.player.passion = 30;
        let cost = action_cost(ActionKind::Work, &state, &config, &mut draws).unwrap();
        assert_eq!(cost.energy_total(), 4);
        assert_eq!(cost.surcharges[0].reason, SurchargeReason::Frustrated);
        assert_eq!(draws.consumed(), 1);
    }

    #[test]
    fn test_promote_spends_money_and_adds_hype() {
        let (mut state, config) = fresh();
        let mut log = LogQueue::new(false);
        let mut draws = ScriptedDraws::from_fractions(&[0.55]);

        let report =
            execute(ActionKind::Promote, &mut state, &config, &mut draws, &mut log).unwrap();

        // 15 + floor(0.55 * 10) + floor(80 * 0.25)
        assert_eq!(report.effect, ActionEffect::Promoted { hype_gained: 40 });
        assert_eq!(state.server.hype, 90);
        assert_eq!(state.player.wealth, 450);
        assert_eq!(state.player.energy, 7);
        assert_eq!(state.player.passion, 99);
    }

    #[test]
    fn test_work_pays_wage() {
        let (mut state, config) = fresh();
        let mut log = LogQueue::new(false);
        let mut draws = ScriptedDraws::from_fractions(&[0.25]);

        let report = execute(ActionKind::Work, &mut state, &config, &mut draws, &mut log).unwrap();

        assert_eq!(report.effect, ActionEffect::Worked { earned: 70 });
        assert_eq!(state.player.wealth, 570);
        assert_eq!(state.player.passion, 97);
    }

    #[test]
    fn test_study_costs_no_passion() {
        let (mut state, config) = fresh();
        state.player.culture = 50;
        let mut log = LogQueue::new(false);

        let report =
            execute(ActionKind::Study, &mut state, &config, &mut half(), &mut log).unwrap();

        // 4 + floor(0.5 * 5) + floor(30 * 0.05)
        assert_eq!(report.effect, ActionEffect::Studied { culture_gained: 7 });
        assert_eq!(state.player.culture, 57);
        assert_eq!(state.player.passion, 100);
        assert_eq!(report.passion_change, 0);
    }

    #[test]
    fn test_upgrade_moves_one_tier_and_restores_passion() {
        let (mut state, config) = fresh();
        state.player.passion = 95;
        let mut log = LogQueue::new(false);

        let report =
            execute(ActionKind::Upgrade, &mut state, &config, &mut half(), &mut log).unwrap();

        assert_eq!(
            report.effect,
            ActionEffect::Upgraded {
                from: HardwareTier::VpsBasic,
                to: HardwareTier::VpsPro
            }
        );
        assert_eq!(state.player.wealth, 380);
        assert_eq!(state.player.passion, 100);
        assert_eq!(state.player.energy, 10);
    }

    #[test]
    fn test_upgrade_refused_on_top_tier() {
        let (mut state, config) = fresh();
        state.server.tier = HardwareTier::DediPro;
        state.player.wealth = 100_000;
        let before = state.clone();
        let mut log = LogQueue::new(false);

        let err =
            execute(ActionKind::Upgrade, &mut state, &config, &mut half(), &mut log).unwrap_err();

        assert_eq!(err, ActionError::NoFurtherTier);
        assert_eq!(state, before);
        assert_eq!(log.pending_len(), 1);
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let (mut state, config) = fresh();
        state.player.wealth = 40;
        let before = state.clone();
        let mut log = LogQueue::new(false);

        let err =
            execute(ActionKind::Promote, &mut state, &config, &mut half(), &mut log).unwrap_err();

        assert_eq!(
            err,
            ActionError::InsufficientFunds {
                required: 50,
                available: 40
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_insufficient_energy_changes_nothing() {
        let (mut state, config) = fresh();
        state.player.energy = 1;
        let before = state.clone();
        let mut log = LogQueue::new(false);

        let err =
            execute(ActionKind::Work, &mut state, &config, &mut half(), &mut log).unwrap_err();

        assert_eq!(
            err,
            ActionError::InsufficientEnergy {
                required: 3,
                available: 1
            }
        );
        assert_eq!(state, before);
        assert_eq!(log.pending().next().map(|e| e.severity), Some(Severity::Danger));
    }

    #[test]
    fn test_locked_controls_refuse_silently_without_drawing() {
        let (mut state, config) = fresh();
        let mut draws = ScriptedDraws::from_fractions(&[]);

        state.resting = true;
        let mut log = LogQueue::new(false);
        let err = execute(ActionKind::Work, &mut state, &config, &mut draws, &mut log).unwrap_err();
        assert_eq!(err, ActionError::Resting);

        state.resting = false;
        state.phase = RunPhase::Settled(Settlement::success(&state));
        let err = execute(ActionKind::Work, &mut state, &config, &mut draws, &mut log).unwrap_err();
        assert_eq!(err, ActionError::RunOver);

        state.phase = RunPhase::Active;
        let mut busy = LogQueue::new(true);
        busy.push(1, Severity::Info, "still showing");
        let err =
            execute(ActionKind::Work, &mut state, &config, &mut draws, &mut busy).unwrap_err();
        assert_eq!(err, ActionError::LogBusy);

        assert_eq!(draws.consumed(), 0);
        assert_eq!(log.pending_len(), 0);
        assert_eq!(busy.pending_len(), 1);
    }
}
