//! Static rules table.
//!
//! Everything a run is tuned by lives here: hardware tiers, action costs,
//! regeneration, semester length and the allowance. The table is fixed at
//! build time; [`GameConfig::default`] is the extended game and
//! [`GameConfig::classic`] the simple one.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hardware tier the server runs on.
///
/// Tiers are ordered; upgrades only ever move to [`HardwareTier::next`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum HardwareTier {
    /// Entry-level virtual server.
    #[default]
    VpsBasic,
    /// Larger virtual server.
    VpsPro,
    /// Second-hand dedicated machine.
    DediUsed,
    /// Professional dedicated machine.
    DediPro,
}

/// Static data for one hardware tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    /// Name shown to the player.
    pub display_name: &'static str,
    /// Maximum concurrent online players.
    pub capacity: u32,
    /// Rent charged every billing period.
    pub monthly_cost: i64,
}

impl HardwareTier {
    /// All tiers in upgrade order.
    pub const ALL: [Self; 4] = [Self::VpsBasic, Self::VpsPro, Self::DediUsed, Self::DediPro];

    /// Static data for this tier.
    #[must_use]
    pub const fn spec(self) -> TierSpec {
        match self {
            Self::VpsBasic => TierSpec {
                display_name: "Starter VPS",
                capacity: 15,
                monthly_cost: 40,
            },
            Self::VpsPro => TierSpec {
                display_name: "Pro VPS",
                capacity: 50,
                monthly_cost: 120,
            },
            Self::DediUsed => TierSpec {
                display_name: "Used dedicated box",
                capacity: 150,
                monthly_cost: 450,
            },
            Self::DediPro => TierSpec {
                display_name: "Pro dedicated box",
                capacity: 500,
                monthly_cost: 1200,
            },
        }
    }

    /// The tier an upgrade moves to, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::VpsBasic => Some(Self::VpsPro),
            Self::VpsPro => Some(Self::DediUsed),
            Self::DediUsed => Some(Self::DediPro),
            Self::DediPro => None,
        }
    }

    /// Shorthand for `spec().display_name`.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    /// Shorthand for `spec().capacity`.
    #[must_use]
    pub const fn capacity(self) -> u32 {
        self.spec().capacity
    }

    /// Shorthand for `spec().monthly_cost`.
    #[must_use]
    pub const fn monthly_cost(self) -> i64 {
        self.spec().monthly_cost
    }
}

/// Base energy cost of each action before surcharges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCosts {
    /// Maintaining the server.
    pub maintain: i32,
    /// Promoting the server.
    pub promote: i32,
    /// Working a part-time job.
    pub work: i32,
    /// Studying.
    pub study: i32,
}

/// Optional behaviour that separates the simple and extended games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Semesters end after a fixed number of weeks and failed runs may continue.
    pub semesters: bool,
    /// Log entries are released one at a time and block commands meanwhile.
    pub queued_log: bool,
    /// An exhausted player sits out the week instead of acting.
    pub forced_rest: bool,
}

impl Features {
    /// Everything on.
    pub const EXTENDED: Self = Self {
        semesters: true,
        queued_log: true,
        forced_rest: true,
    };

    /// Everything off.
    pub const CLASSIC: Self = Self {
        semesters: false,
        queued_log: false,
        forced_rest: false,
    };
}

/// The full rules table for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Energy cap, also the starting energy.
    pub max_energy: i32,
    /// Energy regained at the start of each normal week.
    pub energy_regen: i32,
    /// Weeks in a semester.
    pub semester_length: u32,
    /// Weeks between rent payments.
    pub billing_period: u32,
    /// Weekly allowance, also the per-week lump sum after a failed semester.
    pub allowance: i64,
    /// Base energy costs.
    pub action_costs: ActionCosts,
    /// Money spent per promotion.
    pub promote_money_cost: i64,
    /// Gap between two released log entries in the queued log.
    pub log_drain_interval_ms: u64,
    /// Optional behaviour.
    pub features: Features,
}

impl GameConfig {
    /// The extended rules table.
    pub const EXTENDED: Self = Self {
        max_energy: 10,
        energy_regen: 3,
        semester_length: 24,
        billing_period: 4,
        allowance: 50,
        action_costs: ActionCosts {
            maintain: 2,
            promote: 3,
            work: 3,
            study: 2,
        },
        promote_money_cost: 50,
        log_drain_interval_ms: 300,
        features: Features::EXTENDED,
    };

    /// The simple game: no semesters, no queued log, no forced rest.
    #[must_use]
    pub const fn classic() -> Self {
        Self::EXTENDED.with_features(Features::CLASSIC)
    }

    /// Same table with a different feature set.
    #[must_use]
    pub const fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Gap between two released log entries.
    #[must_use]
    pub const fn log_drain_interval(&self) -> Duration {
        Duration::from_millis(self.log_drain_interval_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::EXTENDED
    }
}
