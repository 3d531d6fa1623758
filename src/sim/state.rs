//! Session scoring state and outbound events
//!
//! `SessionState` owns the Active/GameOver machine. Every transition reports
//! what changed through `GameEvent`s pushed onto the caller's queue.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pool::EntityId;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Balloons spawn and can be popped
    #[default]
    Active,
    /// Run ended, counters frozen until restart
    GameOver,
}

/// Why a balloon left the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Tapped by the player
    Popped,
    /// Rose off screen (counts as a miss)
    Escaped,
    /// Swept away at game over or restart (not a miss)
    Cleared,
}

/// Events emitted by the core for the rendering/UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BalloonSpawned {
        id: EntityId,
        x: f32,
        rise: Duration,
    },
    BalloonRemoved {
        id: EntityId,
        cause: RemovalCause,
    },
    ScoreChanged {
        score: u32,
    },
    MissesChanged {
        misses: u32,
        max: u32,
    },
    GameEnded {
        final_score: u32,
    },
    GameRestarted,
    SpawnIntervalChanged {
        interval: Duration,
    },
}

/// Score, misses and phase for one playthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    score: u32,
    misses: u32,
    max_misses: u32,
    phase: GamePhase,
}

impl SessionState {
    pub fn new(max_misses: u32) -> Self {
        Self {
            score: 0,
            misses: 0,
            max_misses,
            phase: GamePhase::Active,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn max_misses(&self) -> u32 {
        self.max_misses
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Active
    }

    /// Award a point for a popped balloon. No-op once the game is over.
    pub fn record_pop(&mut self, events: &mut Vec<GameEvent>) {
        if !self.is_active() {
            return;
        }
        self.score += 1;
        events.push(GameEvent::ScoreChanged { score: self.score });
    }

    /// Count an escaped balloon, ending the game when the limit is reached.
    ///
    /// Returns true if this escape ended the game.
    pub fn record_escape(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.misses += 1;
        events.push(GameEvent::MissesChanged {
            misses: self.misses,
            max: self.max_misses,
        });

        // >= rather than == so a multi-miss path can never skip past the limit
        if self.misses >= self.max_misses {
            self.phase = GamePhase::GameOver;
            events.push(GameEvent::GameEnded {
                final_score: self.score,
            });
            return true;
        }
        false
    }

    /// Zero the counters and re-enter Active (valid from any phase)
    pub fn restart(&mut self, events: &mut Vec<GameEvent>) {
        *self = Self::new(self.max_misses);
        events.push(GameEvent::GameRestarted);
        events.push(GameEvent::ScoreChanged { score: 0 });
        events.push(GameEvent::MissesChanged {
            misses: 0,
            max: self.max_misses,
        });
    }
}
