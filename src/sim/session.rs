//! One playthrough's complete mutable state
//!
//! `Session` is the single value every handler mutates. Hosts feed it timer
//! ticks and taps and read back `GameEvent`s; nothing here touches a clock,
//! a renderer or global state.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyController;
use super::input::{HitTarget, TapAction, resolve_tap};
use super::playfield::Playfield;
use super::pool::{EntityId, EntityPool};
use super::spawn::{SpawnConfig, SpawnController};
use super::state::{GameEvent, GamePhase, RemovalCause, SessionState};
use crate::config::{ConfigError, GameConfig};

/// Result of a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Popped(EntityId),
    Restarted,
    Ignored,
}

/// HUD-friendly summary of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub score: u32,
    pub misses: u32,
    pub max_misses: u32,
    pub phase: GamePhase,
    pub live_balloons: usize,
    pub spawn_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    pool: EntityPool,
    spawner: SpawnController,
    difficulty: DifficultyController,
    playfield: Playfield,
    /// Latest time seen from the host
    now: Duration,
    events: Vec<GameEvent>,
}

impl Session {
    /// Build a session from a validated config.
    ///
    /// Without a configured seed the spawn RNG is seeded from the OS.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        log::debug!("New session (seed {seed})");

        Ok(Self {
            state: SessionState::new(config.max_misses),
            pool: EntityPool::new(),
            spawner: SpawnController::new(
                SpawnConfig::from_config(config),
                config.rise_duration(),
                seed,
            ),
            difficulty: DifficultyController::new(config.difficulty_policy),
            playfield: Playfield::from_config(config),
            now: Duration::ZERO,
            events: Vec::new(),
        })
    }

    // === Inbound ===

    /// Spawn timer fired. Escapes due by `now` are processed first.
    pub fn on_spawn_tick(&mut self, now: Duration) -> Option<EntityId> {
        self.tick(now);

        let x = self.spawner.maybe_spawn(self.state.phase(), &self.playfield)?;
        let rise = self.spawner.rise();
        let id = self.pool.spawn(x, now, rise);
        log::debug!("Spawned balloon {id} at x={x:.1}");
        self.events.push(GameEvent::BalloonSpawned { id, x, rise });
        Some(id)
    }

    /// Difficulty timer fired. Returns the new spawn interval if it changed.
    pub fn on_difficulty_tick(&mut self) -> Option<Duration> {
        let interval = self
            .difficulty
            .tick(self.state.phase(), self.spawner.config_mut())?;
        log::debug!("Spawn interval tightened to {interval:?}");
        self.events.push(GameEvent::SpawnIntervalChanged { interval });
        Some(interval)
    }

    /// Resolve a tap against a front-to-back hit list
    pub fn on_tap(&mut self, point: Option<Vec2>, hits: &[HitTarget]) -> TapOutcome {
        let Some(point) = point else {
            log::trace!("Tap without a location ignored");
            return TapOutcome::Ignored;
        };

        let pool = &self.pool;
        let action = resolve_tap(self.state.phase(), hits, |id| pool.contains(id));
        log::trace!("Tap at {point} -> {action:?}");

        match action {
            TapAction::Pop(id) if self.pop(id) => TapOutcome::Popped(id),
            TapAction::Restart => {
                self.restart();
                TapOutcome::Restarted
            }
            _ => TapOutcome::Ignored,
        }
    }

    /// Escape detection. Every balloon whose rise is complete leaves the pool
    /// and counts as a miss, oldest first.
    pub fn tick(&mut self, now: Duration) {
        self.now = self.now.max(now);

        let escaped = self.pool.expire(now);
        if escaped.is_empty() {
            return;
        }

        for balloon in &escaped {
            log::debug!("Balloon {} escaped", balloon.id);
            self.events.push(GameEvent::BalloonRemoved {
                id: balloon.id,
                cause: RemovalCause::Escaped,
            });
        }

        for _ in &escaped {
            if self.state.record_escape(&mut self.events) {
                self.end_game();
            }
        }
    }

    /// Pop a live balloon. False if it is gone or the game is over.
    pub fn pop(&mut self, id: EntityId) -> bool {
        if !self.state.is_active() || !self.pool.pop(id) {
            return false;
        }
        log::debug!("Popped balloon {id}");
        self.events.push(GameEvent::BalloonRemoved {
            id,
            cause: RemovalCause::Popped,
        });
        self.state.record_pop(&mut self.events);
        true
    }

    /// Start over from any phase: counters, spawn interval and pool are reset
    pub fn restart(&mut self) {
        self.clear_pool();
        self.state.restart(&mut self.events);

        let spawn = self.spawner.config_mut();
        let before = spawn.current();
        spawn.reset();
        if spawn.current() != before {
            self.events.push(GameEvent::SpawnIntervalChanged {
                interval: spawn.current(),
            });
        }
        log::info!("Game restarted");
    }

    fn end_game(&mut self) {
        log::info!("Game over, final score {}", self.state.score());
        self.clear_pool();
    }

    fn clear_pool(&mut self) {
        for balloon in self.pool.clear() {
            self.events.push(GameEvent::BalloonRemoved {
                id: balloon.id,
                cause: RemovalCause::Cleared,
            });
        }
    }

    // === Geometry ===

    /// Everything under `point` at `now`, front to back: the restart control
    /// (only shown while the game is over), then balloons newest first.
    pub fn hit_test(&self, point: Vec2, now: Duration) -> Vec<HitTarget> {
        let mut hits = Vec::new();
        if !self.state.is_active() && self.playfield.restart_contains(point) {
            hits.push(HitTarget::RestartControl);
        }
        hits.extend(
            self.pool
                .iter()
                .rev()
                .filter(|b| self.playfield.balloon_contains(b, now, point))
                .map(|b| HitTarget::Balloon(b.id)),
        );
        hits
    }

    // === Outbound ===

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase() == GamePhase::GameOver
    }

    pub fn score(&self) -> u32 {
        self.state.score()
    }

    pub fn misses(&self) -> u32 {
        self.state.misses()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn spawn_interval(&self) -> Duration {
        self.spawner.config().current()
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.state.score(),
            misses: self.state.misses(),
            max_misses: self.state.max_misses(),
            phase: self.state.phase(),
            live_balloons: self.pool.len(),
            spawn_interval: self.spawn_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::config::Size;

    const RISE_MS: u64 = 4000;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn config(max_misses: u32) -> GameConfig {
        GameConfig {
            max_misses,
            rise_duration_ms: RISE_MS,
            seed: Some(1),
            ..Default::default()
        }
    }

    fn tap_at() -> Option<Vec2> {
        Some(Vec2::ZERO)
    }

    #[test]
    fn test_pop_scores_once() {
        let mut session = Session::new(&config(5)).unwrap();
        let id = session.on_spawn_tick(ms(0)).unwrap();

        let hits = [HitTarget::Balloon(id)];
        assert_eq!(session.on_tap(tap_at(), &hits), TapOutcome::Popped(id));
        assert_eq!(session.on_tap(tap_at(), &hits), TapOutcome::Ignored);
        assert_eq!(session.score(), 1);
        assert!(!session.pop(id));
    }

    #[test]
    fn test_late_pop_after_escape_is_not_found() {
        let mut session = Session::new(&config(5)).unwrap();
        let id = session.on_spawn_tick(ms(0)).unwrap();
        session.tick(ms(RISE_MS));
        assert!(!session.pop(id));
        assert_eq!(session.score(), 0);
        assert_eq!(session.misses(), 1);
    }

    #[test]
    fn test_tap_without_location_is_ignored() {
        let mut session = Session::new(&config(5)).unwrap();
        let id = session.on_spawn_tick(ms(0)).unwrap();
        assert_eq!(
            session.on_tap(None, &[HitTarget::Balloon(id)]),
            TapOutcome::Ignored
        );
        assert!(session.pool().contains(id));
    }

    #[test]
    fn test_five_escapes_end_game_exactly_once() {
        let mut session = Session::new(&config(5)).unwrap();
        for i in 0..5 {
            session.on_spawn_tick(ms(i * 100));
        }
        session.drain_events();

        // Escapes land one at a time
        for i in 0..5 {
            session.tick(ms(RISE_MS + i * 100));
            let ended = session
                .drain_events()
                .into_iter()
                .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
                .count();
            if i < 4 {
                assert_eq!(ended, 0, "game ended early after escape {}", i + 1);
                assert_eq!(session.phase(), GamePhase::Active);
            } else {
                assert_eq!(ended, 1);
            }
        }
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.misses(), 5);
    }

    #[test]
    fn test_game_ended_follows_fifth_escape_event() {
        let mut session = Session::new(&config(5)).unwrap();
        for _ in 0..5 {
            session.on_spawn_tick(ms(0));
        }
        session.drain_events();
        session.tick(ms(RISE_MS));

        let events = session.drain_events();
        let escapes: Vec<_> = events
            .iter()
            .take_while(|e| {
                matches!(
                    e,
                    GameEvent::BalloonRemoved {
                        cause: RemovalCause::Escaped,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(escapes.len(), 5);
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameEnded { final_score: 0 })
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameEnded { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_game_over_clears_pool_without_misses() {
        let mut session = Session::new(&config(1)).unwrap();
        session.on_spawn_tick(ms(0));
        let survivor = session.on_spawn_tick(ms(3000)).unwrap();
        session.tick(ms(RISE_MS));

        assert!(session.is_over());
        assert!(session.pool().is_empty());
        assert_eq!(session.misses(), 1);
        assert!(session.drain_events().contains(&GameEvent::BalloonRemoved {
            id: survivor,
            cause: RemovalCause::Cleared,
        }));
    }

    #[test]
    fn test_no_spawns_while_game_over() {
        let mut session = Session::new(&config(1)).unwrap();
        session.on_spawn_tick(ms(0));
        session.tick(ms(RISE_MS));
        assert!(session.is_over());
        assert_eq!(session.on_spawn_tick(ms(5000)), None);
        assert!(session.pool().is_empty());
    }

    #[test]
    fn test_restart_control_over_balloon() {
        let mut session = Session::new(&config(1)).unwrap();
        let id = session.on_spawn_tick(ms(0)).unwrap();
        session.tick(ms(RISE_MS));
        assert!(session.is_over());

        let hits = [HitTarget::RestartControl, HitTarget::Balloon(id)];
        assert_eq!(session.on_tap(tap_at(), &hits), TapOutcome::Restarted);
        assert_eq!(session.score(), 0);
        assert!(!session
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::BalloonRemoved { cause: RemovalCause::Popped, .. })));
    }

    #[test]
    fn test_restart_resets_all_fields() {
        let mut session = Session::new(&config(2)).unwrap();
        let id = session.on_spawn_tick(ms(0)).unwrap();
        session.pop(id);
        session.on_spawn_tick(ms(100));
        session.on_difficulty_tick();
        session.on_difficulty_tick();
        assert_eq!(session.spawn_interval(), ms(800));

        session.restart();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.misses, 0);
        assert_eq!(snapshot.phase, GamePhase::Active);
        assert_eq!(snapshot.live_balloons, 0);
        assert_eq!(snapshot.spawn_interval, ms(1000));

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::GameRestarted));
        assert!(events.contains(&GameEvent::SpawnIntervalChanged { interval: ms(1000) }));
    }

    #[test]
    fn test_ids_not_reused_after_restart() {
        let mut session = Session::new(&config(2)).unwrap();
        let old = session.on_spawn_tick(ms(0)).unwrap();
        session.restart();
        let new = session.on_spawn_tick(ms(10)).unwrap();
        assert_ne!(old, new);
        assert!(!session.pop(old));
    }

    #[test]
    fn test_difficulty_floor() {
        let mut session = Session::new(&GameConfig {
            spawn_interval_ms: 1000,
            difficulty_step_ms: 100,
            min_spawn_interval_ms: 300,
            ..config(5)
        })
        .unwrap();
        for _ in 0..8 {
            session.on_difficulty_tick();
        }
        assert_eq!(session.spawn_interval(), ms(300));
        assert_eq!(session.on_difficulty_tick(), None);
    }

    #[test]
    fn test_narrow_screen_spawns_at_midpoint() {
        let mut session = Session::new(&GameConfig {
            screen: Size::new(80.0, 600.0),
            ..config(5)
        })
        .unwrap();
        let id = session.on_spawn_tick(ms(0)).unwrap();
        assert_eq!(session.pool().get(id).map(|b| b.x), Some(40.0));
    }

    #[test]
    fn test_hit_test_front_to_back() {
        let mut session = Session::new(&GameConfig {
            screen: Size::new(60.0, 600.0),
            ..config(5)
        })
        .unwrap();
        // Same midpoint column, spawned at the same instant: fully overlapping
        let older = session.on_spawn_tick(ms(0)).unwrap();
        let newer = session.on_spawn_tick(ms(0)).unwrap();

        let center = session
            .playfield()
            .balloon_center(session.pool().get(older).unwrap(), ms(2000));
        let hits = session.hit_test(center, ms(2000));
        assert_eq!(hits, vec![HitTarget::Balloon(newer), HitTarget::Balloon(older)]);

        assert_eq!(session.on_tap(Some(center), &hits), TapOutcome::Popped(newer));
        assert!(session.pool().contains(older));
    }

    #[test]
    fn test_hit_test_shows_restart_only_when_over() {
        let mut session = Session::new(&config(1)).unwrap();
        let center = session.playfield().center();
        assert!(!session.hit_test(center, ms(0)).contains(&HitTarget::RestartControl));

        session.on_spawn_tick(ms(0));
        session.tick(ms(RISE_MS));
        assert_eq!(session.hit_test(center, ms(RISE_MS)), vec![HitTarget::RestartControl]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Spawn,
        Tap(usize),
        Advance(u64),
        Difficulty,
        Restart,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Spawn),
            3 => (0usize..8).prop_map(Op::Tap),
            3 => (0u64..3000).prop_map(Op::Advance),
            1 => Just(Op::Difficulty),
            1 => Just(Op::Restart),
        ]
    }

    proptest! {
        #[test]
        fn prop_session_invariants(ops in proptest::collection::vec(op(), 1..120)) {
            let mut session = Session::new(&config(3)).unwrap();
            let mut now = Duration::ZERO;
            let mut removals: HashMap<EntityId, u32> = HashMap::new();
            let mut spawned = Vec::new();

            for op in ops {
                let before = session.snapshot();
                let mut restarted = false;

                match op {
                    Op::Spawn => {
                        if let Some(id) = session.on_spawn_tick(now) {
                            spawned.push(id);
                        }
                    }
                    Op::Tap(i) => {
                        if let Some(&id) = spawned.get(i % spawned.len().max(1)) {
                            let outcome = session.on_tap(Some(Vec2::ZERO), &[HitTarget::Balloon(id)]);
                            if before.phase == GamePhase::GameOver {
                                prop_assert_eq!(outcome, TapOutcome::Ignored);
                            }
                        }
                    }
                    Op::Advance(step) => {
                        now += Duration::from_millis(step);
                        session.tick(now);
                    }
                    Op::Difficulty => {
                        session.on_difficulty_tick();
                    }
                    Op::Restart => {
                        session.restart();
                        restarted = true;
                    }
                }

                let after = session.snapshot();
                for event in session.drain_events() {
                    if let GameEvent::BalloonRemoved { id, .. } = event {
                        *removals.entry(id).or_default() += 1;
                    }
                }

                // Each balloon leaves the pool exactly once
                prop_assert!(removals.values().all(|&n| n == 1));
                prop_assert!(after.spawn_interval >= ms(300));
                prop_assert_eq!(after.phase == GamePhase::GameOver, after.misses >= 3);

                if after.phase == GamePhase::GameOver {
                    prop_assert_eq!(after.live_balloons, 0);
                }
                if !restarted {
                    prop_assert!(after.score >= before.score);
                    prop_assert!(after.misses >= before.misses);
                    prop_assert!(after.score <= before.score + 1);
                    if before.phase == GamePhase::GameOver {
                        prop_assert_eq!(after.score, before.score);
                        prop_assert_eq!(after.misses, before.misses);
                    }
                } else {
                    prop_assert_eq!(after.score, 0);
                    prop_assert_eq!(after.misses, 0);
                    prop_assert_eq!(after.live_balloons, 0);
                    prop_assert_eq!(after.spawn_interval, ms(1000));
                }
            }
        }
    }
}
