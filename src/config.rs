//! Game tuning and playfield configuration
//!
//! Loaded from JSON. Every field has a default, so a file only needs to name
//! what it overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::DifficultyPolicy;

/// Errors raised while loading or validating a [`GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_misses must be at least 1")]
    NoMissesAllowed,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("min_spawn_interval_ms ({floor}) is above spawn_interval_ms ({initial})")]
    FloorAboveInitial { floor: u64, initial: u64 },

    #[error("{name} must be a positive finite number, got {value}")]
    BadDimension { name: &'static str, value: f32 },
}

/// Safe-area insets reported by the host platform (notches, home indicator)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insets {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Complete configuration for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Pacing ===
    /// Initial delay between spawns
    pub spawn_interval_ms: u64,
    /// Time a balloon takes to rise off the top of the screen
    pub rise_duration_ms: u64,
    /// Escapes allowed before the game ends
    pub max_misses: u32,

    // === Difficulty ===
    /// Cadence of the difficulty timer
    pub difficulty_interval_ms: u64,
    /// Amount shaved off the spawn interval per difficulty tick
    pub difficulty_step_ms: u64,
    /// Spawn interval never drops below this
    pub min_spawn_interval_ms: u64,
    /// Whether the difficulty timer keeps running after game over
    pub difficulty_policy: DifficultyPolicy,

    // === Playfield ===
    pub screen: Size,
    pub safe_area: Insets,
    pub balloon_radius: f32,
    pub stroke_width: f32,
    /// Extra gap kept between a balloon and the screen edge
    pub edge_margin: f32,
    /// Restart control, centered on screen while the game is over
    pub restart_button: Size,

    /// Fixed RNG seed (random spawn positions are reproducible when set)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            rise_duration_ms: RISE_DURATION_MS,
            max_misses: MAX_MISSES,

            difficulty_interval_ms: DIFFICULTY_INTERVAL_MS,
            difficulty_step_ms: DIFFICULTY_STEP_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,
            difficulty_policy: DifficultyPolicy::default(),

            screen: Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            safe_area: Insets::default(),
            balloon_radius: BALLOON_RADIUS,
            stroke_width: STROKE_WIDTH,
            edge_margin: EDGE_MARGIN,
            restart_button: Size::new(RESTART_BUTTON_WIDTH, RESTART_BUTTON_HEIGHT),

            seed: None,
        }
    }
}

impl GameConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn rise_duration(&self) -> Duration {
        Duration::from_millis(self.rise_duration_ms)
    }

    pub fn difficulty_interval(&self) -> Duration {
        Duration::from_millis(self.difficulty_interval_ms)
    }

    pub fn difficulty_step(&self) -> Duration {
        Duration::from_millis(self.difficulty_step_ms)
    }

    pub fn min_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.min_spawn_interval_ms)
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Using default config ({}: {})",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_misses == 0 {
            return Err(ConfigError::NoMissesAllowed);
        }

        let durations = [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("rise_duration_ms", self.rise_duration_ms),
            ("difficulty_interval_ms", self.difficulty_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
        ];
        for (name, ms) in durations {
            if ms == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }

        if self.min_spawn_interval_ms > self.spawn_interval_ms {
            return Err(ConfigError::FloorAboveInitial {
                floor: self.min_spawn_interval_ms,
                initial: self.spawn_interval_ms,
            });
        }

        let positive = [
            ("screen.width", self.screen.width),
            ("screen.height", self.screen.height),
            ("balloon_radius", self.balloon_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::BadDimension { name, value });
            }
        }

        // Zero is fine for these, but negatives would widen the spawn range
        let non_negative = [
            ("stroke_width", self.stroke_width),
            ("edge_margin", self.edge_margin),
            ("safe_area.left", self.safe_area.left),
            ("safe_area.right", self.safe_area.right),
            ("safe_area.top", self.safe_area.top),
            ("safe_area.bottom", self.safe_area.bottom),
            ("restart_button.width", self.restart_button.width),
            ("restart_button.height", self.restart_button.height),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::BadDimension { name, value });
            }
        }

        Ok(())
    }
}
