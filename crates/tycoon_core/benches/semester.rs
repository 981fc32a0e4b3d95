//! Turn resolution benchmarks for tycoon_core.
//!
//! Run with: `cargo bench -p tycoon_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tycoon_core::log::LogQueue;
use tycoon_core::prelude::*;
use tycoon_core::turn;
use tycoon_test_utils::balance::{play_semester, Policy};

/// One resolved week on a mid-semester state.
pub fn week_benchmark(c: &mut Criterion) {
    let config = GameConfig::default();
    let mut state = RunState::new(&config, Mode::Commercial, ServerType::Modded);
    state.week = 10;
    state.week_in_semester = 9;
    state.server.active_players = 40;

    c.bench_function("advance_week", |b| {
        b.iter_batched(
            || (state.clone(), SeededDraws::new(7), LogQueue::new(false)),
            |(mut state, mut draws, mut log)| {
                black_box(turn::advance(&mut state, &config, &mut draws, &mut log))
            },
            BatchSize::SmallInput,
        );
    });
}

/// A whole autoplayed semester per policy.
pub fn semester_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("semester");
    for policy in [Policy::Grinder, Policy::Balanced] {
        group.bench_function(format!("{policy:?}"), |b| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                let mut game =
                    Game::seeded(GameConfig::default(), Mode::Nonprofit, ServerType::Vanilla, seed);
                black_box(play_semester(&mut game, policy, 24))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, week_benchmark, semester_benchmark);
criterion_main!(benches);
