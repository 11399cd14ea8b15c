//! Cached stat lookup results.
//!
//! Lookups are keyed by lowercased username or nick and land in two views
//! at once. The short term view drives the rows shown while queueing, so
//! stats refresh between games; the long term view survives a short term
//! wipe and keeps mid-game rows stable. The genus counter is the cache
//! epoch: a lookup snapshots it before fetching, and a result from before
//! a clear is dropped instead of repopulating wiped state.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::player::{KnownPlayer, Player};

mod ttl;


use ttl::TtlMap;

const SHORT_TERM_TTL: Duration = Duration::from_secs(600);
const LONG_TERM_TTL: Duration = Duration::from_secs(3600);

/// Cap on the number of entries held in each view.
const MAX_ENTRIES: usize = 512;

pub struct PlayerCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    genus: u64,
    short_term: TtlMap,
    long_term: TtlMap,
}

impl PlayerCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                genus: 0,
                short_term: TtlMap::new(SHORT_TERM_TTL, MAX_ENTRIES),
                long_term: TtlMap::new(LONG_TERM_TTL, MAX_ENTRIES),
            }),
        }
    }

    /// The current cache epoch. Snapshot this before starting a lookup and
    /// pass it back to [`set`](Self::set) with the result.
    pub fn current_genus(&self) -> u64 {
        self.inner.lock().map(|inner| inner.genus).unwrap_or(0)
    }

    /// Looks up the cached player for `username`, reading the long term
    /// view when `long_term` is set.
    pub fn get(&self, username: &str, long_term: bool) -> Option<Player> {
        let key = username.to_lowercase();
        let mut inner = self.inner.lock().ok()?;
        let now = Instant::now();
        let view = if long_term {
            &mut inner.long_term
        } else {
            &mut inner.short_term
        };
        view.get(&key, now).cloned()
    }

    /// Returns the cached player for `username`, marking them pending on a
    /// miss.
    ///
    /// The check and the write happen under one lock, so out of any number
    /// of concurrent callers exactly one sees `true` and should request the
    /// lookup.
    pub fn get_or_set_pending(&self, username: &str) -> (Player, bool) {
        let pending = Player::Pending {
            username: username.to_owned(),
        };
        let key = username.to_lowercase();
        let Ok(mut inner) = self.inner.lock() else {
            return (pending, false);
        };
        let now = Instant::now();
        if let Some(player) = inner.short_term.get(&key, now) {
            return (player.clone(), false);
        }

        inner.short_term.insert(key.clone(), pending.clone(), now);
        inner.long_term.insert(key, pending.clone(), now);
        (pending, true)
    }

    /// Stores a lookup result in both views.
    ///
    /// `genus` is the epoch snapshotted when the lookup started. If the
    /// cache has been cleared since, the result is stale and is dropped.
    pub fn set(&self, username: &str, player: Player, genus: u64) {
        let key = username.to_lowercase();
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if genus != inner.genus {
            warn!("Tried to store stats for {username} with an old genus, ignoring");
            return;
        }

        let now = Instant::now();
        inner.short_term.insert(key.clone(), player.clone(), now);
        inner.long_term.insert(key, player, now);
    }

    /// Rewrites the completed entry for `username` through `update`.
    ///
    /// Pending and absent entries warn and are left alone.
    pub fn update(&self, username: &str, update: impl FnOnce(KnownPlayer) -> KnownPlayer) {
        let key = username.to_lowercase();
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let now = Instant::now();
        let Some(Player::Known(known)) = inner.short_term.get(&key, now).cloned() else {
            warn!("Player {username} not found during update");
            return;
        };

        let updated = Player::Known(update(known));
        inner.short_term.insert(key.clone(), updated.clone(), now);
        inner.long_term.insert(key, updated, now);
    }

    /// Drops `username` from both views.
    pub fn remove(&self, username: &str) {
        let key = username.to_lowercase();
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.short_term.remove(&key);
        inner.long_term.remove(&key);
    }

    /// Wipes the short term view, or both, and starts a new epoch.
    ///
    /// A short term only clear keeps already resolved players reachable
    /// through the long term view, so a game ending does not force a full
    /// refetch of the lobby.
    pub fn clear(&self, short_term_only: bool) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.genus += 1;
        inner.short_term.clear();
        if !short_term_only {
            inner.long_term.clear();
        }
    }
}

impl Default for PlayerCache {
    fn default() -> Self {
        Self::new()
    }
}
