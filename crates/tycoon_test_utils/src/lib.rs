//! # Tycoon Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture helpers (preset runs, scripted draws, log draining)
//! - Autoplay policies and balance statistics
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod balance;
pub mod determinism;
pub mod fixtures;

use tracing_subscriber::EnvFilter;

/// Re-export proptest for convenience.
pub use proptest;

/// Route `tracing` output through the test harness.
///
/// Honours `RUST_LOG`; defaults to warnings only. Safe to call from every
/// test: only the first call installs a subscriber.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
