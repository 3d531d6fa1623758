//! Difficulty progression
//!
//! Runs on its own timer, independent of spawning. Each tick shaves a fixed
//! step off the spawn interval until it reaches the floor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::spawn::SpawnConfig;
use super::state::GamePhase;

/// What the difficulty timer does once the game is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyPolicy {
    /// Keep ticking until the session is torn down or restarted. Spawning
    /// still stops at game over.
    #[default]
    RunThroughGameOver,
    /// Stop alongside the spawn timer
    PauseAtGameOver,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DifficultyController {
    policy: DifficultyPolicy,
}

impl DifficultyController {
    pub fn new(policy: DifficultyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DifficultyPolicy {
        self.policy
    }

    /// Whether the difficulty timer should stay armed in `phase`
    pub fn runs_in(&self, phase: GamePhase) -> bool {
        match (self.policy, phase) {
            (_, GamePhase::Active) => true,
            (DifficultyPolicy::RunThroughGameOver, GamePhase::GameOver) => true,
            (DifficultyPolicy::PauseAtGameOver, GamePhase::GameOver) => false,
        }
    }

    /// Tighten the spawn interval. Returns the new interval if it moved.
    pub fn tick(&self, phase: GamePhase, spawn: &mut SpawnConfig) -> Option<Duration> {
        if !self.runs_in(phase) {
            return None;
        }
        spawn.tighten()
    }
}
