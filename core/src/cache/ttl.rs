//! Expiring map underlying the cache views.

use std::time::{Duration, Instant};

use hashbrown::HashMap;

use crate::player::Player;

struct Entry {
    stored_at: Instant,
    player: Player,
}

/// Map whose entries expire a fixed duration after they were written.
///
/// Expiry is lazy: reads past the deadline behave as misses, and a write
/// into a full map drops expired entries before falling back to evicting
/// the oldest live one. The caller supplies `now` so the deadline checks
/// stay deterministic under test.
pub(crate) struct TtlMap {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<String, Entry>,
}

impl TtlMap {
    pub(crate) fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn get(&mut self, key: &str, now: Instant) -> Option<&Player> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| now.duration_since(entry.stored_at) > self.ttl);
        if expired {
            self.entries.remove(key);
        }
        self.entries.get(key).map(|entry| &entry.player)
    }

    pub(crate) fn insert(&mut self, key: String, player: Player, now: Instant) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.make_room(now);
        }
        self.entries.insert(key, Entry { stored_at: now, player });
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn make_room(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) <= ttl);
        if self.entries.len() < self.capacity {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
