//! Spawn decisions
//!
//! The spawn timer decides *when*. This module decides *whether* (only while
//! Active) and *where* (uniform over the padded screen width).

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::playfield::Playfield;
use super::state::GamePhase;
use crate::config::GameConfig;

/// Spawn cadence, tightened over time by the difficulty controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnConfig {
    initial: Duration,
    current: Duration,
    floor: Duration,
    step: Duration,
}

impl SpawnConfig {
    pub fn new(initial: Duration, floor: Duration, step: Duration) -> Self {
        Self {
            initial,
            current: initial.max(floor),
            floor,
            step,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.spawn_interval(),
            config.min_spawn_interval(),
            config.difficulty_step(),
        )
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn floor(&self) -> Duration {
        self.floor
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn is_floored(&self) -> bool {
        self.current <= self.floor
    }

    /// Shorten the interval by one step, clamped to the floor.
    ///
    /// Returns the new interval if it changed.
    pub fn tighten(&mut self) -> Option<Duration> {
        let next = self.current.saturating_sub(self.step).max(self.floor);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }

    pub fn reset(&mut self) {
        self.current = self.initial.max(self.floor);
    }
}

/// Picks spawn positions from a seeded RNG
#[derive(Debug, Clone)]
pub struct SpawnController {
    config: SpawnConfig,
    rise: Duration,
    rng: Pcg32,
}

impl SpawnController {
    pub fn new(config: SpawnConfig, rise: Duration, seed: u64) -> Self {
        Self {
            config,
            rise,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SpawnConfig {
        &mut self.config
    }

    pub fn rise(&self) -> Duration {
        self.rise
    }

    /// Horizontal position for the next balloon, or None while the game is over
    pub fn maybe_spawn(&mut self, phase: GamePhase, field: &Playfield) -> Option<f32> {
        if phase != GamePhase::Active {
            return None;
        }
        let x = match field.x_range() {
            Some(range) => self.rng.random_range(range),
            // Screen narrower than twice the padding
            None => field.mid_x(),
        };
        Some(x)
    }
}
