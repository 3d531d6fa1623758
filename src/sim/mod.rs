//! Deterministic session simulation
//!
//! All gameplay rules live here. This module must stay pure:
//! - Time comes from the caller, never from a clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod input;
pub mod playfield;
pub mod pool;
pub mod session;
pub mod spawn;
pub mod state;

pub use difficulty::{DifficultyController, DifficultyPolicy};
pub use input::{HitTarget, TapAction, resolve_tap};
pub use playfield::Playfield;
pub use pool::{Balloon, EntityId, EntityPool};
pub use session::{Session, SessionSnapshot, TapOutcome};
pub use spawn::{SpawnConfig, SpawnController};
pub use state::{GameEvent, GamePhase, RemovalCause, SessionState};
