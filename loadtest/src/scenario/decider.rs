//! Sources of scenario decisions

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Decides how many participants join and which optional actions happen.
///
/// Each optional action consumes one fresh draw, so gates are independent.
pub trait Decider: Send {
    /// Participant count in `1..=max` (a `max` of 0 is treated as 1)
    fn participant_count(&mut self, max: u32) -> u32;

    /// A fresh draw in `0..100`
    fn percent(&mut self) -> u32;

    /// Whether an action with the given percentage threshold happens
    fn chance(&mut self, threshold: u32) -> bool {
        self.percent() < threshold
    }
}

/// Uniform random decisions
#[derive(Debug, Clone)]
pub struct RandomDecider<R = StdRng> {
    rng: R,
}

impl RandomDecider<StdRng> {
    /// Seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for RandomDecider<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> RandomDecider<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Decider for RandomDecider<R> {
    fn participant_count(&mut self, max: u32) -> u32 {
        self.rng.random_range(1..=max.max(1))
    }

    fn percent(&mut self) -> u32 {
        self.rng.random_range(0..100)
    }
}

/// Predetermined decisions.
///
/// Draws are consumed in order; once exhausted every draw returns the
/// fallback. The participant count is clamped into `1..=max`.
#[derive(Debug, Clone)]
pub struct ScriptedDecider {
    participants: u32,
    draws: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedDecider {
    pub fn new(participants: u32) -> Self {
        Self {
            participants,
            draws: VecDeque::new(),
            fallback: 0,
        }
    }

    pub fn with_draws(mut self, draws: impl IntoIterator<Item = u32>) -> Self {
        self.draws.extend(draws);
        self
    }

    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }

    /// Draws not consumed yet
    pub fn remaining_draws(&self) -> usize {
        self.draws.len()
    }
}

impl Decider for ScriptedDecider {
    fn participant_count(&mut self, max: u32) -> u32 {
        self.participants.clamp(1, max.max(1))
    }

    fn percent(&mut self) -> u32 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}
