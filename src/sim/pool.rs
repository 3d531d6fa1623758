//! Live balloon table
//!
//! Balloons are kept in insertion order. Ids are allocated monotonically, so
//! insertion order is also id order and lookups can binary search.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Unique balloon identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rising balloon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balloon {
    pub id: EntityId,
    /// Horizontal spawn position (screen points)
    pub x: f32,
    /// Session time when it was spawned
    pub spawned_at: Duration,
    /// Time until it escapes off the top
    pub rise: Duration,
}

impl Balloon {
    /// Time since spawn, saturating at zero for clocks behind the spawn time
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.spawned_at)
    }

    /// Rise progress in [0, 1]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.rise.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / self.rise.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn has_escaped(&self, now: Duration) -> bool {
        self.elapsed(now) >= self.rise
    }
}

/// Balloons currently on screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool {
    /// Sorted by id (== insertion order)
    balloons: Vec<Balloon>,
    next_id: u32,
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityPool {
    pub fn new() -> Self {
        Self {
            balloons: Vec::new(),
            next_id: 1,
        }
    }

    /// Track a new balloon and return its id
    pub fn spawn(&mut self, x: f32, now: Duration, rise: Duration) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.balloons.push(Balloon {
            id,
            x,
            spawned_at: now,
            rise,
        });
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.balloons.binary_search_by_key(&id, |b| b.id).ok()
    }

    /// Remove a live balloon. Returns false if it already escaped, was popped
    /// or was cleared.
    pub fn pop(&mut self, id: EntityId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.balloons.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove every balloon whose rise has completed, in insertion order
    pub fn expire(&mut self, now: Duration) -> Vec<Balloon> {
        let (escaped, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.balloons)
            .into_iter()
            .partition(|b| b.has_escaped(now));
        self.balloons = live;
        escaped
    }

    /// Remove everything without counting escapes
    pub fn clear(&mut self) -> Vec<Balloon> {
        std::mem::take(&mut self.balloons)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Balloon> {
        self.index_of(id).map(|i| &self.balloons[i])
    }

    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    /// Live balloons, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Balloon> {
        self.balloons.iter()
    }
}
