//! Weekly server metrics: population, load, wear, income and hype decay.
//!
//! Draw order is fixed: churn, then online ratio, then (nonprofit only,
//! when eligible) the donation chance and the donation amount.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::log::{LogQueue, Severity};
use crate::math::{banded_permille, percent, percent_ceil, percent_floor, permille_ceil, roll_below};
use crate::rng::DrawSource;
use crate::state::{Mode, RunState, ServerType};

const HYPE_PER_NEW_PLAYER: i32 = 10;

// Churn and online ratios are per-mille.
const CHURN_BASE: i32 = 50;
const CHURN_SPREAD: i32 = 50;
const MODDED_CHURN_SHIFT: i32 = -20;
const MODDED_UNSTABLE_CHURN: i32 = 150;
const MODDED_UNSTABLE_HEALTH: i32 = 60;
const MODDED_BONUS_PLAYERS: i32 = 2;
const VANILLA_CHURN_SHIFT: i32 = 20;
const VANILLA_LOYAL_CHURN: i32 = -30;
const VANILLA_LOYAL_REPUTATION: i32 = 80;
const VANILLA_WORD_OF_MOUTH_REPUTATION: i32 = 70;
const DISTRUST_CHURN: i32 = 50;
const DISTRUST_REPUTATION: i32 = 30;

const ONLINE_SPREAD: i32 = 50;

const OVERLOAD_REPUTATION: i32 = -2;
const OVERLOAD_HYPE: i32 = -2;
const OVERLOAD_PASSION: i32 = -1;

const MIN_DECAY: i32 = 2;
const TECH_PER_DECAY_POINT: i32 = 8;

const DONATION_MIN_ACTIVE: u32 = 10;
const DONATION_BIG_COMMUNITY: u32 = 50;
const DONATION_CHANCE_PERCENT: i32 = 10;
const DONATION_BIG_CHANCE_PERCENT: i32 = 25;
const DONATION_BASE: i32 = 2;
const DONATION_RANGE: i32 = 8;

const HYPE_DECAY_PERCENT: i64 = 10;

impl ServerType {
    const fn online_ratio_base(self) -> i32 {
        match self {
            Self::Vanilla => 180,
            Self::Modded => 220,
        }
    }

    const fn base_decay(self) -> i32 {
        match self {
            Self::Vanilla => 7,
            Self::Modded => 14,
        }
    }

    /// Income per online player, in percent of a coin.
    const fn revenue_per_player_percent(self) -> i64 {
        match self {
            Self::Vanilla => 150,
            Self::Modded => 300,
        }
    }
}

/// Money that came in during the metrics update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Income {
    /// Paying players (commercial).
    pub revenue: i64,
    /// Donation (nonprofit).
    pub donation: i64,
    /// Weekly allowance (nonprofit).
    pub allowance: i64,
}

impl Income {
    /// Everything combined.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.revenue + self.donation + self.allowance
    }
}

/// What the metrics update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Players attracted this week.
    pub joined: i32,
    /// Players lost this week.
    pub churned: i32,
    /// Players who wanted to be online.
    pub demand: u32,
    /// Demand exceeded capacity.
    pub overloaded: bool,
    /// Health lost to wear.
    pub decay: i32,
    /// Money earned.
    pub income: Income,
    /// Hype lost to natural decay.
    pub hype_lost: i32,
}

/// Run the weekly metrics update.
pub fn update<D: DrawSource + ?Sized>(
    state: &mut RunState,
    config: &GameConfig,
    draws: &mut D,
    log: &mut LogQueue,
) -> MetricsReport {
    let week = state.week;
    let server_type = state.server_type;

    // Population
    let mut joined = state.server.hype / HYPE_PER_NEW_PLAYER;
    let churn_draw = draws.next_draw();
    let mut churn_shift = 0;
    let reputation = state.server.reputation;
    match server_type {
        ServerType::Modded => {
            joined += MODDED_BONUS_PLAYERS;
            churn_shift += MODDED_CHURN_SHIFT;
            if state.server.health < MODDED_UNSTABLE_HEALTH {
                churn_shift += MODDED_UNSTABLE_CHURN;
            }
        }
        ServerType::Vanilla => {
            churn_shift += VANILLA_CHURN_SHIFT;
            if reputation > VANILLA_LOYAL_REPUTATION {
                churn_shift += VANILLA_LOYAL_CHURN;
            }
            if reputation > VANILLA_WORD_OF_MOUTH_REPUTATION {
                joined += (reputation - VANILLA_WORD_OF_MOUTH_REPUTATION) / 10;
            }
        }
    }
    if reputation < DISTRUST_REPUTATION {
        churn_shift += DISTRUST_CHURN;
    }
    let churn = banded_permille(CHURN_BASE + churn_shift, churn_draw, CHURN_SPREAD);

    let active = i64::from(state.server.active_players);
    let churned = permille_ceil(active, churn) as i32;
    state.server.active_players = (active + i64::from(joined) - i64::from(churned)).max(0) as u32;

    // Load
    let ratio = banded_permille(server_type.online_ratio_base(), draws.next_draw(), ONLINE_SPREAD);
    let demand = permille_ceil(i64::from(state.server.active_players), ratio) as u32;
    let capacity = state.server.capacity();
    let overloaded = demand > capacity;
    if overloaded {
        state.server.online_players = capacity;
        state.server.reputation += OVERLOAD_REPUTATION;
        state.server.add_hype(OVERLOAD_HYPE);
        state.player.add_passion(OVERLOAD_PASSION);
        tracing::warn!(demand, capacity, "online players clamped to capacity");
        log.push(
            week,
            Severity::Danger,
            format!("Server full ({capacity}/{capacity})! Queues are hurting your reputation."),
        );
    } else {
        state.server.online_players = demand;
    }

    // Wear
    let decay =
        (server_type.base_decay() - state.player.tech / TECH_PER_DECAY_POINT).max(MIN_DECAY);
    state.server.add_health(-decay);

    // Income
    let mut income = Income::default();
    match state.mode {
        Mode::Commercial => {
            income.revenue = percent_floor(
                i64::from(state.server.online_players),
                server_type.revenue_per_player_percent(),
            );
            if income.revenue > 0 {
                log.push(
                    week,
                    Severity::Success,
                    format!("Player purchases: +${}", income.revenue),
                );
            }
        }
        Mode::Nonprofit => {
            let active = state.server.active_players;
            if active > DONATION_MIN_ACTIVE {
                let chance = if active > DONATION_BIG_COMMUNITY {
                    DONATION_BIG_CHANCE_PERCENT
                } else {
                    DONATION_CHANCE_PERCENT
                };
                if draws.chance(percent(chance)) {
                    income.donation =
                        i64::from(DONATION_BASE + roll_below(draws.next_draw(), DONATION_RANGE));
                    log.push(
                        week,
                        Severity::Success,
                        format!("A player bought you a soda: +${}", income.donation),
                    );
                }
            }
            income.allowance = config.allowance;
            log.push(
                week,
                Severity::Info,
                format!("Pocket money: +${}", income.allowance),
            );
        }
    }
    state.player.wealth += income.total();

    // Hype decay
    let hype_lost = percent_ceil(i64::from(state.server.hype), HYPE_DECAY_PERCENT) as i32;
    state.server.add_hype(-hype_lost);

    debug_assert!(state.server.online_players <= capacity);

    MetricsReport {
        joined,
        churned,
        demand,
        overloaded,
        decay,
        income,
        hype_lost,
    }
}
