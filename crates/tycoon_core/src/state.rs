//! Run state: the player, the server and the calendar.
//!
//! State is pure data plus clamping helpers. It is mutated only by the
//! action executor, the turn resolver and the settlement handler.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, HardwareTier};
use crate::error::{GameError, Result};
use crate::settlement::Settlement;

/// Upper bound for passion, culture and server health.
pub const STAT_CAP: i32 = 100;

/// How the server is funded. Fixed at run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Free to play; lives on allowance and the odd donation.
    #[default]
    Nonprofit,
    /// Players pay; income scales with online population.
    Commercial,
}

/// What the server runs. Fixed at run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServerType {
    /// Stock game: stable and cheap to keep healthy.
    #[default]
    Vanilla,
    /// Mod pack: more players and more breakage.
    Modded,
}

impl Mode {
    /// Name shown to the player.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Nonprofit => "Nonprofit",
            Self::Commercial => "Commercial",
        }
    }
}

impl ServerType {
    /// Name shown to the player.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Vanilla => "Vanilla",
            Self::Modded => "Modded",
        }
    }
}

/// The student running the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    /// Energy left this week.
    pub energy: i32,
    /// Energy cap.
    pub max_energy: i32,
    /// Technical skill.
    pub tech: i32,
    /// Schoolwork standing.
    pub culture: i32,
    /// Money. Only negative at the instant the run fails.
    pub wealth: i64,
    /// Motivation. Reaching zero ends the run.
    pub passion: i32,
}

impl PlayerState {
    /// Remove energy, never going below zero.
    pub fn spend_energy(&mut self, amount: i32) {
        debug_assert!(
            amount <= self.energy,
            "spent {amount} energy with only {} left",
            self.energy
        );
        self.energy = (self.energy - amount).max(0);
    }

    /// Add energy up to the cap.
    pub fn regen_energy(&mut self, amount: i32) {
        self.energy = (self.energy + amount).clamp(0, self.max_energy);
    }

    /// Shift passion, clamped to `0..=100`.
    pub fn add_passion(&mut self, delta: i32) {
        self.passion = (self.passion + delta).clamp(0, STAT_CAP);
    }

    /// Shift culture, clamped to `0..=100`.
    pub fn add_culture(&mut self, delta: i32) {
        self.culture = (self.culture + delta).clamp(0, STAT_CAP);
    }
}

/// The game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerState {
    /// Current hardware.
    pub tier: HardwareTier,
    /// Stability, `0..=100`.
    pub health: i32,
    /// Persistent player population.
    pub active_players: u32,
    /// Players online this week, never above capacity.
    pub online_players: u32,
    /// Marketing attention, decays weekly.
    pub hype: i32,
    /// Community trust.
    pub reputation: i32,
    /// Week on which rent is next due.
    pub next_bill_week: u32,
}

impl ServerState {
    /// Shift health, clamped to `0..=100`.
    pub fn add_health(&mut self, delta: i32) {
        self.health = (self.health + delta).clamp(0, STAT_CAP);
    }

    /// Shift hype, never below zero.
    pub fn add_hype(&mut self, delta: i32) {
        self.hype = (self.hype + delta).max(0);
    }

    /// Capacity of the current tier.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.tier.capacity()
    }
}

/// Where the run stands between commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    /// Weeks are being played.
    Active,
    /// The semester or run has ended and awaits continuation or reset.
    Settled(Settlement),
}

/// Coarse status for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// Normal play.
    Active,
    /// Sitting out after an exhausted week; actions are locked until the next turn.
    ForcedRest,
    /// The semester finished successfully.
    SemesterEnd,
    /// The run failed.
    GameOver,
}

/// Complete state of one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunState {
    /// Semester counter, starting at 1.
    pub semester: u32,
    /// Global week counter, starting at 1.
    pub week: u32,
    /// Zero-based index of the current week inside the semester.
    pub week_in_semester: u32,
    /// Set by a forced-rest week and cleared by the next turn.
    pub resting: bool,
    /// Funding model.
    pub mode: Mode,
    /// Server flavour.
    pub server_type: ServerType,
    /// The player.
    pub player: PlayerState,
    /// The server.
    pub server: ServerState,
    /// Active or settled.
    pub phase: RunPhase,
}

impl RunState {
    /// Create the opening state for a run, applying mode and type biases.
    #[must_use]
    pub fn new(config: &GameConfig, mode: Mode, server_type: ServerType) -> Self {
        let mut player = PlayerState {
            energy: config.max_energy,
            max_energy: config.max_energy,
            tech: 30,
            culture: 80,
            wealth: 500,
            passion: STAT_CAP,
        };
        let mut server = ServerState {
            tier: HardwareTier::VpsBasic,
            health: STAT_CAP,
            active_players: 0,
            online_players: 0,
            hype: 50,
            reputation: 60,
            next_bill_week: 4,
        };

        match mode {
            Mode::Commercial => {
                player.wealth = 1000;
                server.reputation = 40;
            }
            Mode::Nonprofit => server.reputation = 70,
        }

        if server_type == ServerType::Modded {
            server.hype += 30;
            server.health = 80;
            player.tech += 10;
        }

        Self {
            semester: 1,
            week: 1,
            week_in_semester: 0,
            resting: false,
            mode,
            server_type,
            player,
            server,
            phase: RunPhase::Active,
        }
    }

    /// Whether the run is waiting on settlement.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self.phase, RunPhase::Settled(_))
    }

    /// The pending settlement, if any.
    #[must_use]
    pub fn settlement(&self) -> Option<&Settlement> {
        match &self.phase {
            RunPhase::Settled(settlement) => Some(settlement),
            RunPhase::Active => None,
        }
    }

    /// Coarse status for display.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        match &self.phase {
            RunPhase::Settled(settlement) if settlement.is_success() => RunStatus::SemesterEnd,
            RunPhase::Settled(_) => RunStatus::GameOver,
            RunPhase::Active if self.resting => RunStatus::ForcedRest,
            RunPhase::Active => RunStatus::Active,
        }
    }

    /// Hash of the complete state.
    ///
    /// Two runs fed the same draws and commands produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Weeks until rent is due, never negative.
    #[must_use]
    pub const fn weeks_until_bill(&self) -> u32 {
        self.server.next_bill_week.saturating_sub(self.week)
    }

    /// Check every bounded value.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] naming the first violated bound.
    pub fn validate(&self) -> Result<()> {
        let p = &self.player;
        let s = &self.server;
        if p.energy < 0 || p.energy > p.max_energy {
            return Err(GameError::InvalidState(format!(
                "energy {} outside 0..={}",
                p.energy, p.max_energy
            )));
        }
        if !(0..=STAT_CAP).contains(&p.passion) {
            return Err(GameError::InvalidState(format!(
                "passion {} outside 0..={STAT_CAP}",
                p.passion
            )));
        }
        if !(0..=STAT_CAP).contains(&s.health) {
            return Err(GameError::InvalidState(format!(
                "health {} outside 0..={STAT_CAP}",
                s.health
            )));
        }
        if s.hype < 0 {
            return Err(GameError::InvalidState(format!("hype {} below zero", s.hype)));
        }
        if s.online_players > s.capacity() {
            return Err(GameError::InvalidState(format!(
                "{} online exceeds capacity {}",
                s.online_players,
                s.capacity()
            )));
        }
        if p.wealth < 0 && !self.is_settled() {
            return Err(GameError::InvalidState(format!(
                "wealth {} negative while the run is active",
                p.wealth
            )));
        }
        Ok(())
    }
}
