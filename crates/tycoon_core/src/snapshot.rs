//! Read-only views for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, HardwareTier};
use crate::log::LogQueue;
use crate::settlement::SettlementSummary;
use crate::state::{Mode, PlayerState, RunState, RunStatus, ServerState, ServerType};

/// What the upgrade button offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradePreview {
    /// A next tier exists.
    Available {
        /// Tier an upgrade moves to.
        tier: HardwareTier,
        /// Its display name.
        name: String,
        /// Money an upgrade costs.
        cost: i64,
    },
    /// Already on the top tier.
    Maxed,
}

impl UpgradePreview {
    /// Preview for a server on `tier`.
    #[must_use]
    pub fn for_tier(tier: HardwareTier) -> Self {
        tier.next().map_or(Self::Maxed, |next| Self::Available {
            tier: next,
            name: next.display_name().to_string(),
            cost: next.monthly_cost(),
        })
    }
}

/// Everything the presentation layer shows, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Semester counter.
    pub semester: u32,
    /// Global week.
    pub week: u32,
    /// Zero-based week inside the semester.
    pub week_in_semester: u32,
    /// Weeks in a semester.
    pub semester_length: u32,
    /// Funding model.
    pub mode: Mode,
    /// Server flavour.
    pub server_type: ServerType,
    /// Player stats.
    pub player: PlayerState,
    /// Server stats.
    pub server: ServerState,
    /// Coarse status.
    pub status: RunStatus,
    /// Current hardware name.
    pub tier_name: String,
    /// Current capacity.
    pub capacity: u32,
    /// Current rent.
    pub monthly_cost: i64,
    /// Upgrade button.
    pub upgrade: UpgradePreview,
    /// Weeks until rent is due.
    pub weeks_until_bill: u32,
    /// Settlement screen, when settled.
    pub settlement: Option<SettlementSummary>,
    /// The log is still being released.
    pub log_busy: bool,
}

impl Snapshot {
    /// Capture the current run.
    #[must_use]
    pub fn capture(state: &RunState, config: &GameConfig, log: &LogQueue) -> Self {
        let tier = state.server.tier;
        Self {
            semester: state.semester,
            week: state.week,
            week_in_semester: state.week_in_semester,
            semester_length: config.semester_length,
            mode: state.mode,
            server_type: state.server_type,
            player: state.player,
            server: state.server,
            status: state.status(),
            tier_name: tier.display_name().to_string(),
            capacity: tier.capacity(),
            monthly_cost: tier.monthly_cost(),
            upgrade: UpgradePreview::for_tier(tier),
            weeks_until_bill: state.weeks_until_bill(),
            settlement: state.settlement().map(|s| s.summary()),
            log_busy: log.is_busy(),
        }
    }

    /// Whether commands would be refused right now.
    ///
    /// Turns can still be advanced while resting; actions cannot.
    #[must_use]
    pub fn actions_locked(&self) -> bool {
        self.log_busy || self.status != RunStatus::Active
    }

    /// Whether the rent line should be highlighted.
    #[must_use]
    pub const fn bill_urgent(&self) -> bool {
        self.weeks_until_bill <= 1
    }
}
