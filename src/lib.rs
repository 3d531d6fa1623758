//! Balloon Pop - session core for a tap-the-balloon arcade game
//!
//! Core modules:
//! - `sim`: Deterministic session rules (spawning, escapes, scoring, difficulty)
//! - `scheduler`: Repeating timers with synchronous cancellation
//! - `game`: Host driver wiring the timers to a session
//! - `config`: Data-driven tuning and playfield geometry

pub mod config;
pub mod game;
pub mod scheduler;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use game::Game;

/// Default tuning constants
pub mod consts {
    /// Initial delay between spawns
    pub const SPAWN_INTERVAL_MS: u64 = 1000;
    /// Time for a balloon to cross the screen
    pub const RISE_DURATION_MS: u64 = 4000;
    /// Escapes allowed before game over
    pub const MAX_MISSES: u32 = 5;

    /// Difficulty ramp: every 10s the spawn interval shrinks by 100ms, down to 300ms
    pub const DIFFICULTY_INTERVAL_MS: u64 = 10_000;
    pub const DIFFICULTY_STEP_MS: u64 = 100;
    pub const MIN_SPAWN_INTERVAL_MS: u64 = 300;

    /// Playfield (points), sized for a typical portrait phone
    pub const SCREEN_WIDTH: f32 = 390.0;
    pub const SCREEN_HEIGHT: f32 = 844.0;

    /// Balloon body
    pub const BALLOON_RADIUS: f32 = 30.0;
    pub const STROKE_WIDTH: f32 = 3.0;
    /// Gap kept between a balloon and the screen edge at spawn
    pub const EDGE_MARGIN: f32 = 10.0;

    pub const RESTART_BUTTON_WIDTH: f32 = 200.0;
    pub const RESTART_BUTTON_HEIGHT: f32 = 60.0;
}
