//! Error types for the engine.
//!
//! Precondition failures are [`ActionError`]s: logged, absorbed, no state
//! change. Command-level failures are [`GameError`]s. Run-ending outcomes
//! are not errors at all; they travel in a
//! [`Settlement`](crate::settlement::Settlement).

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Why an action was refused. The state is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The run has been settled.
    #[error("The run is over")]
    RunOver,

    /// The player is recovering from a forced-rest week.
    #[error("Resting this week")]
    Resting,

    /// The log queue is still being released.
    #[error("Waiting for the log to finish")]
    LogBusy,

    /// Not enough energy for the action and its surcharges.
    #[error("Not enough energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Total energy cost.
        required: i32,
        /// Energy left.
        available: i32,
    },

    /// Not enough money.
    #[error("Not enough money: need {required}, have {available}")]
    InsufficientFunds {
        /// Money cost.
        required: i64,
        /// Money available.
        available: i64,
    },

    /// The server already runs on the top tier.
    #[error("Already on the best hardware")]
    NoFurtherTier,
}

impl ActionError {
    /// Whether this refusal should be shown to the player.
    ///
    /// Lifecycle refusals happen while the controls are locked and are not
    /// worth a log line; resource shortfalls are.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(
            self,
            Self::InsufficientEnergy { .. } | Self::InsufficientFunds { .. } | Self::NoFurtherTier
        )
    }
}

/// Top-level error type for commands issued to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// An action failed its preconditions.
    #[error("Action rejected: {0}")]
    Action(#[from] ActionError),

    /// The run has been settled; continue or reset first.
    #[error("The run is over; continue or reset before playing on")]
    RunOver,

    /// The log queue is still being released.
    #[error("The log queue is still draining")]
    LogBusy,

    /// Continuation was requested but nothing is settled.
    #[error("No settlement is pending")]
    NotSettled,

    /// The run failed and this rules table has no semesters to continue into.
    #[error("The run cannot continue; reset to start over")]
    NoContinuation,

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
