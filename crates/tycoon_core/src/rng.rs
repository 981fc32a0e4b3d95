//! Random draw sources.
//!
//! The engine never touches system randomness. Every probabilistic rule
//! pulls a uniform draw in `[0, 1)` from a [`DrawSource`] that the caller
//! injects, so a seed (or a scripted sequence) fully determines a run.

use std::collections::VecDeque;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::Fixed;

/// Supplier of uniform draws in `[0, 1)`.
pub trait DrawSource {
    /// Produce the next draw. Must lie in `[0, 1)`.
    fn next_draw(&mut self) -> Fixed;

    /// Draw and compare against a probability: `draw < chance`.
    fn chance(&mut self, chance: Fixed) -> bool {
        self.next_draw() < chance
    }
}

impl<D: DrawSource + ?Sized> DrawSource for &mut D {
    fn next_draw(&mut self) -> Fixed {
        (**self).next_draw()
    }
}

impl<D: DrawSource + ?Sized> DrawSource for Box<D> {
    fn next_draw(&mut self) -> Fixed {
        (**self).next_draw()
    }
}

/// Seeded pseudo-random draws backed by ChaCha8.
///
/// Each draw takes 32 random bits and places them in the fractional part,
/// so every value in `[0, 1)` at 2^-32 resolution is equally likely.
#[derive(Debug, Clone)]
pub struct SeededDraws {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededDraws {
    /// Create a draw source from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this source was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl DrawSource for SeededDraws {
    fn next_draw(&mut self) -> Fixed {
        Fixed::from_bits(i64::from(self.rng.next_u32()))
    }
}

/// A draw source that always returns the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantDraw(pub Fixed);

impl DrawSource for ConstantDraw {
    fn next_draw(&mut self) -> Fixed {
        self.0
    }
}

/// Replays a fixed sequence of draws, then a fallback value forever.
///
/// The default fallback is one half: it keeps every probability gate in
/// the engine closed (no surcharge, no event, no donation) except the
/// crash check on a badly damaged server.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    script: VecDeque<Fixed>,
    fallback: Fixed,
    consumed: usize,
}

impl ScriptedDraws {
    /// Create a scripted source from fixed-point draws.
    ///
    /// Values outside `[0, 1)` are clamped into range.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Fixed>) -> Self {
        let top = Fixed::from_bits(i64::from(u32::MAX));
        Self {
            script: script.into_iter().map(|d| d.clamp(Fixed::ZERO, top)).collect(),
            fallback: Fixed::from_num(0.5),
            consumed: 0,
        }
    }

    /// Create a scripted source from plain fractions, for test setup.
    #[must_use]
    pub fn from_fractions(script: &[f64]) -> Self {
        Self::new(script.iter().map(|&d| Fixed::from_num(d)))
    }

    /// Replace the value returned once the script runs out.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Fixed) -> Self {
        self.fallback = fallback;
        self
    }

    /// How many draws have been taken so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// How many scripted draws remain before the fallback kicks in.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DrawSource for ScriptedDraws {
    fn next_draw(&mut self) -> Fixed {
        self.consumed += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
