//! The run facade: state, rules, draws and log under one owner.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::actions::{self, ActionKind, ActionReport};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::facade::GameFacade;
use crate::log::{LogEntry, LogQueue, Severity};
use crate::rng::{DrawSource, SeededDraws};
use crate::settlement;
use crate::snapshot::Snapshot;
use crate::state::{Mode, RunState, ServerType};
use crate::turn::{self, TurnOutcome};

/// One run of the game.
///
/// All mutation is synchronous and happens through the command methods.
/// The log is owned here as well: with queued logging on, commands are
/// refused until a driver has released every entry (see
/// [`Game::release_log_entry`]).
///
/// # Example
///
/// ```
/// use tycoon_core::prelude::*;
///
/// let mut game = Game::seeded(GameConfig::classic(), Mode::Nonprofit, ServerType::Vanilla, 7);
/// game.perform_action(ActionKind::Work).unwrap();
/// game.advance_turn().unwrap();
/// assert_eq!(game.state().week, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Game<D: DrawSource = SeededDraws> {
    config: GameConfig,
    state: RunState,
    draws: D,
    log: LogQueue,
}

impl Game<SeededDraws> {
    /// Start a run with a seeded draw source.
    #[must_use]
    pub fn seeded(config: GameConfig, mode: Mode, server_type: ServerType, seed: u64) -> Self {
        Self::new(config, mode, server_type, SeededDraws::new(seed))
    }
}

impl<D: DrawSource> Game<D> {
    /// Start a run.
    #[must_use]
    pub fn new(config: GameConfig, mode: Mode, server_type: ServerType, draws: D) -> Self {
        let mut game = Self::from_state(config, RunState::new(&config, mode, server_type), draws);
        game.announce();
        game
    }

    /// Resume from an existing state, with an empty log.
    #[must_use]
    pub fn from_state(config: GameConfig, state: RunState, draws: D) -> Self {
        Self {
            config,
            state,
            draws,
            log: LogQueue::new(config.features.queued_log),
        }
    }

    /// Restore a run from [`Game::serialize_state`] output.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the bytes do not decode or the
    /// decoded state breaks an invariant.
    pub fn restore(config: GameConfig, bytes: &[u8], draws: D) -> Result<Self> {
        let state: RunState = bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to decode run state: {e}")))?;
        state.validate()?;
        Ok(Self::from_state(config, state, draws))
    }

    fn announce(&mut self) {
        let tier = self.state.server.tier;
        let week = self.state.week;
        self.log.push(week, Severity::Event, "Server initialised...");
        self.log.push(
            week,
            Severity::Info,
            format!(
                "Current hardware: [{}] (rent ${} per month)",
                tier.display_name(),
                tier.monthly_cost()
            ),
        );
        tracing::info!(
            mode = self.state.mode.display_name(),
            server_type = self.state.server_type.display_name(),
            "run started"
        );
    }

    /// The rules table.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The run state.
    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// The draw source.
    #[must_use]
    pub const fn draws(&self) -> &D {
        &self.draws
    }

    /// Release the oldest pending log entry.
    ///
    /// Returns `None` once the queue is empty, which also unlocks commands.
    pub fn release_log_entry(&mut self) -> Option<LogEntry> {
        self.log.release_next()
    }

    /// Entries waiting to be released.
    #[must_use]
    pub fn pending_log_len(&self) -> usize {
        self.log.pending_len()
    }

    /// Every released entry, oldest first.
    #[must_use]
    pub fn log_history(&self) -> &[LogEntry] {
        self.log.history()
    }

    /// Whether commands are blocked on the log.
    #[must_use]
    pub fn is_log_busy(&self) -> bool {
        self.log.is_busy()
    }

    /// Hash of the run state and the log position.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state.hash(&mut hasher);
        self.log.history().len().hash(&mut hasher);
        self.log.pending_len().hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the run state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if encoding fails.
    pub fn serialize_state(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.state)
            .map_err(|e| GameError::InvalidState(format!("Failed to encode run state: {e}")))
    }
}

impl<D: DrawSource> GameFacade for Game<D> {
    fn perform_action(&mut self, kind: ActionKind) -> Result<ActionReport> {
        let report = actions::execute(
            kind,
            &mut self.state,
            &self.config,
            &mut self.draws,
            &mut self.log,
        )?;
        Ok(report)
    }

    fn advance_turn(&mut self) -> Result<TurnOutcome> {
        turn::advance(&mut self.state, &self.config, &mut self.draws, &mut self.log)
    }

    fn continue_run(&mut self) -> Result<()> {
        if self.log.is_busy() {
            return Err(GameError::LogBusy);
        }
        settlement::continue_run(&mut self.state, &self.config, &mut self.log)
    }

    fn reset(&mut self) {
        let (mode, server_type) = (self.state.mode, self.state.server_type);
        self.state = RunState::new(&self.config, mode, server_type);
        self.log = LogQueue::new(self.config.features.queued_log);
        self.announce();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.config, &self.log)
    }

    fn poll_log(&mut self) -> Vec<LogEntry> {
        self.log.release_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::math::Fixed;
    use crate::rng::ConstantDraw;
    use crate::state::RunStatus;

    fn classic() -> Game<ConstantDraw> {
        Game::new(
            GameConfig::classic(),
            Mode::Nonprofit,
            ServerType::Vanilla,
            ConstantDraw(Fixed::from_num(0.5)),
        )
    }

    #[test]
    fn test_new_run_announces_itself() {
        let mut game = classic();
        let entries = game.poll_log();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Server initialised...");
        assert!(entries[1].message.contains("Starter VPS"));
        assert_eq!(game.log_history().len(), 2);
    }

    #[test]
    fn test_queued_log_blocks_commands_until_drained() {
        let mut game = Game::new(
            GameConfig::default(),
            Mode::Nonprofit,
            ServerType::Vanilla,
            ConstantDraw(Fixed::from_num(0.5)),
        );
        assert!(game.is_log_busy());
        assert_eq!(
            game.perform_action(ActionKind::Work),
            Err(GameError::Action(ActionError::LogBusy))
        );
        assert_eq!(game.advance_turn(), Err(GameError::LogBusy));

        while game.release_log_entry().is_some() {}
        assert!(!game.is_log_busy());
        assert!(game.perform_action(ActionKind::Work).is_ok());
    }

    #[test]
    fn test_reset_keeps_mode_and_type() {
        let mut game = Game::new(
            GameConfig::classic(),
            Mode::Commercial,
            ServerType::Modded,
            ConstantDraw(Fixed::from_num(0.5)),
        );
        game.perform_action(ActionKind::Work).unwrap();
        game.advance_turn().unwrap();

        game.reset();

        assert_eq!(game.state().week, 1);
        assert_eq!(game.state().mode, Mode::Commercial);
        assert_eq!(game.state().server_type, ServerType::Modded);
        assert_eq!(game.state().player.wealth, 1000);
        assert_eq!(game.snapshot().status, RunStatus::Active);
    }

    #[test]
    fn test_serialize_round_trip_preserves_hash() {
        let mut game = classic();
        game.perform_action(ActionKind::Promote).unwrap();
        game.advance_turn().unwrap();

        let bytes = game.serialize_state().unwrap();
        let restored =
            Game::restore(*game.config(), &bytes, ConstantDraw(Fixed::from_num(0.5))).unwrap();

        assert_eq!(restored.state(), game.state());
        assert_eq!(restored.state().state_hash(), game.state().state_hash());
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let result = Game::restore(
            GameConfig::classic(),
            &[0xff, 0x01],
            ConstantDraw(Fixed::ZERO),
        );
        assert!(matches!(result, Err(GameError::InvalidState(_))));
    }
}
