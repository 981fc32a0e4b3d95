//! Test fixtures and helpers.
//!
//! Pre-built runs and draw sources for consistent testing.

use fixed::types::I32F32;
use tycoon_core::config::GameConfig;
use tycoon_core::game::Game;
use tycoon_core::log::LogEntry;
use tycoon_core::rng::{ConstantDraw, DrawSource, ScriptedDraws};
use tycoon_core::state::{Mode, RunState, ServerType};

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In engine code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A draw source stuck at one half.
///
/// Every probability gate stays shut (no surcharge, no event, no donation,
/// no tech gain) except the crash check on a server below 30 health.
#[must_use]
pub fn half_draws() -> ConstantDraw {
    ConstantDraw(fixed_f(0.5))
}

/// Scripted draws from plain fractions, falling back to one half.
#[must_use]
pub fn scripted(draws: &[f64]) -> ScriptedDraws {
    ScriptedDraws::from_fractions(draws)
}

/// Opening state with a tweak applied.
pub fn state_with(
    config: &GameConfig,
    mode: Mode,
    server_type: ServerType,
    tweak: impl FnOnce(&mut RunState),
) -> RunState {
    let mut state = RunState::new(config, mode, server_type);
    tweak(&mut state);
    state
}

/// A run on the extended rules, with the opening log already drained.
#[must_use]
pub fn extended_game<D: DrawSource>(mode: Mode, server_type: ServerType, draws: D) -> Game<D> {
    let mut game = Game::new(GameConfig::default(), mode, server_type, draws);
    drain_log(&mut game);
    game
}

/// A classic-rules run on constant one-half draws.
#[must_use]
pub fn classic_game(mode: Mode, server_type: ServerType) -> Game<ConstantDraw> {
    Game::new(GameConfig::classic(), mode, server_type, half_draws())
}

/// A run resumed from a hand-built state.
#[must_use]
pub fn game_from<D: DrawSource>(config: GameConfig, state: RunState, draws: D) -> Game<D> {
    Game::from_state(config, state, draws)
}

/// Release log entries one by one until the queue unlocks, as a paced
/// driver would, and return them in release order.
pub fn drain_log<D: DrawSource>(game: &mut Game<D>) -> Vec<LogEntry> {
    let mut released = Vec::new();
    while let Some(entry) = game.release_log_entry() {
        released.push(entry);
    }
    released
}

/// Messages of a batch of entries.
#[must_use]
pub fn messages(entries: &[LogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.message.as_str()).collect()
}
