//! Command interface shared by the presentation layer and autoplay.
//!
//! Anything that drives a run, whether a human behind a UI or a scripted
//! policy in a balance test, goes through [`GameFacade`]. There is no other
//! way to mutate a run, so a command stream fully describes a session.

use crate::actions::{ActionKind, ActionReport};
use crate::error::Result;
use crate::log::LogEntry;
use crate::snapshot::Snapshot;
use crate::turn::TurnOutcome;

/// Commands and queries available to whoever is playing.
pub trait GameFacade {
    /// Perform one action this week.
    ///
    /// # Errors
    /// Returns [`GameError::Action`](crate::error::GameError::Action) with
    /// the failed precondition. The run is unchanged.
    fn perform_action(&mut self, kind: ActionKind) -> Result<ActionReport>;

    /// End the week.
    ///
    /// # Errors
    /// Returns an error if the run is settled or the log is still draining.
    fn advance_turn(&mut self) -> Result<TurnOutcome>;

    /// Roll a settled run into the next semester.
    ///
    /// # Errors
    /// Returns an error if nothing is settled or the run cannot continue.
    fn continue_run(&mut self) -> Result<()>;

    /// Throw the run away and start over with the same mode and type.
    fn reset(&mut self);

    /// Capture the run for display. Never mutates.
    fn snapshot(&self) -> Snapshot;

    /// Release every pending log entry, oldest first.
    fn poll_log(&mut self) -> Vec<LogEntry>;

    /// Try each action in order and perform the first one accepted.
    ///
    /// Refusals along the way are logged like any other refusal.
    fn perform_first(&mut self, kinds: &[ActionKind]) -> Option<ActionReport> {
        kinds
            .iter()
            .find_map(|&kind| self.perform_action(kind).ok())
    }
}
