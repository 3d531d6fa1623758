//! Host driver
//!
//! Couples a `Session` to the two repeating timers it needs. The spawn timer
//! stops at game over; the difficulty timer follows the configured
//! `DifficultyPolicy`. A restart re-arms both from the current time.

use std::time::Duration;

use glam::Vec2;

use crate::config::{ConfigError, GameConfig};
use crate::scheduler::{Firing, Scheduler, TimerId, TimerKind};
use crate::sim::{GameEvent, HitTarget, Session, TapOutcome};

pub struct Game {
    session: Session,
    scheduler: Scheduler,
    difficulty_interval: Duration,
    spawn_timer: Option<TimerId>,
    difficulty_timer: Option<TimerId>,
}

impl Game {
    /// Build a session and arm its timers at time zero
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let session = Session::new(&config)?;
        let mut game = Self {
            session,
            scheduler: Scheduler::new(),
            difficulty_interval: config.difficulty_interval(),
            spawn_timer: None,
            difficulty_timer: None,
        };
        game.arm_timers();
        Ok(game)
    }

    fn arm_timers(&mut self) {
        self.cancel_timers();
        self.spawn_timer = Some(
            self.scheduler
                .schedule_repeating(TimerKind::Spawn, self.session.spawn_interval()),
        );
        self.difficulty_timer = Some(
            self.scheduler
                .schedule_repeating(TimerKind::Difficulty, self.difficulty_interval),
        );
    }

    fn cancel_timers(&mut self) {
        for timer in [self.spawn_timer.take(), self.difficulty_timer.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(timer);
        }
    }

    /// Tear down timers the current phase no longer needs
    fn sync_timers(&mut self) {
        if !self.session.is_over() {
            return;
        }
        if let Some(timer) = self.spawn_timer.take() {
            self.scheduler.cancel(timer);
            log::debug!("Spawn timer stopped");
        }
        if !self.session.difficulty().runs_in(self.session.phase()) {
            if let Some(timer) = self.difficulty_timer.take() {
                self.scheduler.cancel(timer);
                log::debug!("Difficulty timer stopped");
            }
        }
    }

    fn dispatch(&mut self, firing: Firing) {
        // Anything that escaped before this instant is settled first
        self.session.tick(firing.at);

        match firing.kind {
            TimerKind::Spawn => {
                self.session.on_spawn_tick(firing.at);
            }
            TimerKind::Difficulty => {
                if let Some(interval) = self.session.on_difficulty_tick() {
                    if let Some(timer) = self.spawn_timer {
                        self.scheduler.set_interval(timer, interval);
                    }
                }
            }
        }
        self.sync_timers();
    }

    /// Run every timer due up to `now`, then settle escapes at `now`
    pub fn advance(&mut self, now: Duration) {
        while let Some(firing) = self.scheduler.poll(now) {
            self.dispatch(firing);
        }
        self.session.tick(now);
        self.sync_timers();
    }

    /// Tap at a screen point (None when the host could not locate the touch)
    pub fn tap(&mut self, point: Option<Vec2>) -> TapOutcome {
        let now = self.scheduler.now();
        let hits = point
            .map(|p| self.session.hit_test(p, now))
            .unwrap_or_default();
        let outcome = self.session.on_tap(point, &hits);
        self.after_tap(outcome);
        outcome
    }

    /// Tap with a hit list supplied by the host's own scene graph
    pub fn tap_with_hits(&mut self, point: Option<Vec2>, hits: &[HitTarget]) -> TapOutcome {
        let outcome = self.session.on_tap(point, hits);
        self.after_tap(outcome);
        outcome
    }

    fn after_tap(&mut self, outcome: TapOutcome) {
        if outcome == TapOutcome::Restarted {
            self.arm_timers();
        }
    }

    /// Explicit restart command
    pub fn restart(&mut self) {
        self.session.restart();
        self.arm_timers();
    }

    /// Cancel both timers. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.cancel_timers();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn spawn_timer_active(&self) -> bool {
        self.spawn_timer.is_some_and(|t| self.scheduler.is_active(t))
    }

    pub fn difficulty_timer_active(&self) -> bool {
        self.difficulty_timer
            .is_some_and(|t| self.scheduler.is_active(t))
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.shutdown();
    }
}
