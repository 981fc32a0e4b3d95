//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine produces identical
//! results given identical seeds and command streams.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism the engine guards against:
//!
//! - **Floating-point math**: every rate and draw is fixed-point via
//!   [`tycoon_core::math::Fixed`].
//!
//! - **System randomness**: the engine only reads draws from an injected
//!   [`DrawSource`]; seeded runs use ChaCha8.
//!
//! - **Draw order**: each draw is pulled at a fixed point of a command,
//!   refusals included (the frustration coin is flipped while pricing an
//!   action), so two runs on one seed stay in step.

use tycoon_core::actions::ActionKind;
use tycoon_core::config::GameConfig;
use tycoon_core::facade::GameFacade;
use tycoon_core::game::Game;
use tycoon_core::rng::{DrawSource, SeededDraws};
use tycoon_core::state::{Mode, ServerType};

/// One step of a scripted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Perform an action.
    Act(ActionKind),
    /// End the week.
    EndWeek,
    /// Continue after a settlement.
    Continue,
}

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps played per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup/step loop multiple times and compare final hashes.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance by one step (receives the step index)
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: usize,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, usize),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for index in 0..steps {
            step(&mut state, index);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Apply one scripted command, ignoring refusals.
///
/// The log is released after every command so a paced run never blocks.
pub fn apply<G: GameFacade>(game: &mut G, command: Command) {
    let _ = game.poll_log();
    match command {
        Command::Act(kind) => {
            let _ = game.perform_action(kind);
        }
        Command::EndWeek => {
            let _ = game.advance_turn();
        }
        Command::Continue => {
            let _ = game.continue_run();
        }
    }
    let _ = game.poll_log();
}

/// Play a command script on a fresh seeded run, twice or more, and compare.
pub fn verify_script_determinism(
    config: GameConfig,
    mode: Mode,
    server_type: ServerType,
    seed: u64,
    script: &[Command],
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        script.len(),
        || Game::seeded(config, mode, server_type, seed),
        |game, index| apply(game, script[index]),
        Game::state_hash,
    )
}

/// Compare two runs command by command, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(step)` for the first step
/// (1-based) after which the hashes differ, `Some(0)` if they differ
/// before any command.
pub fn find_first_divergence<D, F>(setup: F, script: &[Command]) -> Option<usize>
where
    D: DrawSource,
    F: Fn() -> Game<D>,
{
    let mut a = setup();
    let mut b = setup();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for (index, &command) in script.iter().enumerate() {
        apply(&mut a, command);
        apply(&mut b, command);
        if a.state_hash() != b.state_hash() {
            return Some(index + 1);
        }
    }

    None
}

/// Verify that an encode/decode cycle preserves the run state exactly.
pub fn verify_serialization_determinism(
    config: GameConfig,
    mode: Mode,
    server_type: ServerType,
    seed: u64,
    script: &[Command],
) -> bool {
    let mut game = Game::seeded(config, mode, server_type, seed);
    for &command in script {
        apply(&mut game, command);
    }

    let hash_before = game.state().state_hash();

    let Ok(bytes) = game.serialize_state() else {
        return false;
    };
    let Ok(restored) = Game::restore(config, &bytes, SeededDraws::new(seed)) else {
        return false;
    };

    hash_before == restored.state().state_hash()
}

/// Proptest strategies for engine testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use proptest::prelude::*;
    use tycoon_core::actions::ActionKind;
    use tycoon_core::config::{GameConfig, HardwareTier};
    use tycoon_core::state::{Mode, RunState, ServerType};

    use super::Command;

    /// Any funding mode.
    pub fn arb_mode() -> impl Strategy<Value = Mode> {
        prop_oneof![Just(Mode::Nonprofit), Just(Mode::Commercial)]
    }

    /// Any server type.
    pub fn arb_server_type() -> impl Strategy<Value = ServerType> {
        prop_oneof![Just(ServerType::Vanilla), Just(ServerType::Modded)]
    }

    /// Any hardware tier.
    pub fn arb_tier() -> impl Strategy<Value = HardwareTier> {
        prop::sample::select(HardwareTier::ALL.to_vec())
    }

    /// Any action.
    pub fn arb_action() -> impl Strategy<Value = ActionKind> {
        prop::sample::select(ActionKind::ALL.to_vec())
    }

    /// Script commands, weighted towards actions.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            4 => arb_action().prop_map(Command::Act),
            2 => Just(Command::EndWeek),
            1 => Just(Command::Continue),
        ]
    }

    /// A script of up to `max_len` commands.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<Command>> {
        prop::collection::vec(arb_command(), 0..max_len)
    }

    /// An active mid-semester state with every bounded value in range.
    pub fn arb_run_state() -> impl Strategy<Value = RunState> {
        (
            (arb_mode(), arb_server_type(), arb_tier()),
            (0i32..=10, 0i32..=120, 0i32..=100, 0i64..=3000, 1i32..=100),
            (0i32..=100, 0u32..=400, 0i32..=200, -20i32..=120),
            (1u32..=60, 0u32..=22, 0u32..=4),
        )
            .prop_map(
                |(
                    (mode, server_type, tier),
                    (energy, tech, culture, wealth, passion),
                    (health, active, hype, reputation),
                    (week, week_in_semester, bill_offset),
                )| {
                    let config = GameConfig::default();
                    let mut state = RunState::new(&config, mode, server_type);
                    state.week = week;
                    state.week_in_semester = week_in_semester;
                    state.player.energy = energy;
                    state.player.tech = tech;
                    state.player.culture = culture;
                    state.player.wealth = wealth;
                    state.player.passion = passion;
                    state.server.tier = tier;
                    state.server.health = health;
                    state.server.active_players = active;
                    state.server.online_players = active.min(tier.capacity());
                    state.server.hype = hype;
                    state.server.reputation = reputation;
                    state.server.next_bill_week = week + bill_offset;
                    state
                },
            )
    }
}
