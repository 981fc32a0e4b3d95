//! # Tycoon Core
//!
//! Deterministic turn-resolution engine for Server Tycoon, a small
//! simulation about a student running a game server between classes.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (draws are injected through [`rng::DrawSource`])
//! - No floating-point math (uses fixed-point)
//!
//! A seed plus a command stream reproduces a run exactly, which is what
//! the determinism and balance harnesses in `tycoon_test_utils` rely on.
//!
//! ## Crate Structure
//!
//! - [`state`] - Player, server and calendar
//! - [`config`] - Static rules table and hardware tiers
//! - [`actions`] - Action executor
//! - [`turn`] - Weekly turn resolver
//! - [`metrics`] - Population, load, wear and income
//! - [`events`] - Random events
//! - [`settlement`] - Semester end, failure and continuation
//! - [`log`] - Player-facing log queue
//! - [`game`] - The [`Game`](game::Game) facade tying it together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod game;
pub mod log;
pub mod math;
pub mod metrics;
pub mod rng;
pub mod settlement;
pub mod snapshot;
pub mod state;
pub mod turn;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{ActionEffect, ActionKind, ActionReport, CostBreakdown};
    pub use crate::config::{Features, GameConfig, HardwareTier};
    pub use crate::error::{ActionError, GameError, Result};
    pub use crate::events::EventKind;
    pub use crate::facade::GameFacade;
    pub use crate::game::Game;
    pub use crate::log::{LogEntry, Severity};
    pub use crate::math::Fixed;
    pub use crate::rng::{ConstantDraw, DrawSource, ScriptedDraws, SeededDraws};
    pub use crate::settlement::{FailureReason, Settlement, SettlementSummary};
    pub use crate::snapshot::{Snapshot, UpgradePreview};
    pub use crate::state::{Mode, RunState, RunStatus, ServerType};
    pub use crate::turn::{BillingResult, TurnOutcome, WeekReport};
}
