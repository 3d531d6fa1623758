//! Deterministic repeating timers
//!
//! Timers do not hold callbacks. A firing hands back a `TimerKind` token and
//! the owner dispatches it against its own state, so nothing scheduled can
//! keep a session alive or reach one that was torn down.
//!
//! Firings are handed out one at a time by `poll`. A timer cancelled while the
//! previous firing is being handled never fires again.

use std::time::Duration;

/// Shortest interval a timer may have (zero would fire forever at one instant)
pub const MIN_TIMER_INTERVAL: Duration = Duration::from_millis(1);

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Spawn,
    Difficulty,
}

/// Handle to a scheduled timer. Stale handles never match a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    slot: u32,
    generation: u32,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub timer: TimerId,
    pub kind: TimerKind,
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    interval: Duration,
    next_due: Duration,
    /// Creation order, used to break ties between timers due at once
    seq: u64,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    timer: Option<Timer>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    slots: Vec<Slot>,
    now: Duration,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.timer.is_some()).count()
    }

    /// Arm a repeating timer; the first firing is one interval from now
    pub fn schedule_repeating(&mut self, kind: TimerKind, interval: Duration) -> TimerId {
        let interval = interval.max(MIN_TIMER_INTERVAL);
        let timer = Timer {
            kind,
            interval,
            next_due: self.now + interval,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let slot = match self.slots.iter().position(|s| s.timer.is_none()) {
            Some(i) => i,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let entry = &mut self.slots[slot];
        entry.generation = entry.generation.wrapping_add(1);
        entry.timer = Some(timer);

        log::trace!("Scheduled {kind:?} every {interval:?}");
        TimerId {
            slot: slot as u32,
            generation: entry.generation,
        }
    }

    fn timer_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.timer.as_mut())
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.slots
            .get(id.slot as usize)
            .is_some_and(|s| s.generation == id.generation && s.timer.is_some())
    }

    /// Disarm a timer. Returns false if it was already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.slots.get_mut(id.slot as usize) {
            Some(slot) if slot.generation == id.generation => {
                let was_armed = slot.timer.take().is_some();
                if was_armed {
                    log::trace!("Cancelled timer {id:?}");
                }
                was_armed
            }
            _ => false,
        }
    }

    /// Change a timer's period. The next firing moves to one new interval
    /// after the previous firing, but never earlier than now.
    pub fn set_interval(&mut self, id: TimerId, interval: Duration) -> bool {
        let now = self.now;
        let Some(timer) = self.timer_mut(id) else {
            return false;
        };
        let interval = interval.max(MIN_TIMER_INTERVAL);
        let last_fired = timer.next_due.saturating_sub(timer.interval);
        timer.interval = interval;
        timer.next_due = (last_fired + interval).max(now);
        true
    }

    /// Next firing due at or before `until`, in time order (creation order on
    /// ties). When nothing is due the clock moves to `until`.
    pub fn poll(&mut self, until: Duration) -> Option<Firing> {
        let due = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.timer.as_ref().map(|t| (i, t.next_due, t.seq)))
            .filter(|&(_, next_due, _)| next_due <= until)
            .min_by_key(|&(_, next_due, seq)| (next_due, seq));

        let Some((slot, at, _)) = due else {
            self.now = self.now.max(until);
            return None;
        };

        let entry = &mut self.slots[slot];
        let timer = entry.timer.as_mut()?;
        timer.next_due = at + timer.interval;
        self.now = self.now.max(at);

        log::trace!("{:?} fired at {at:?}", timer.kind);
        Some(Firing {
            timer: TimerId {
                slot: slot as u32,
                generation: entry.generation,
            },
            kind: timer.kind,
            at,
        })
    }
}
