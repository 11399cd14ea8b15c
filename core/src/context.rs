//! Shared handles threaded through the pipeline.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::api::StatsProvider;
use crate::cache::PlayerCache;
use crate::nicks::NickDatabase;
use crate::settings::Settings;
use crate::state::OverlayState;

/// Everything the event processor, the stat workers, and row assembly share.
///
/// The drivers wrap this in an [`Arc`](std::sync::Arc). The tracked state is
/// only written by the event-processing task; everyone else takes snapshots.
pub struct OverlayContext {
    state: Mutex<OverlayState>,
    pub settings: Mutex<Settings>,
    pub nick_database: NickDatabase,
    pub player_cache: PlayerCache,
    pub provider: Box<dyn StatsProvider>,
    redraw_flag: AtomicBool,
}

impl OverlayContext {
    pub fn new(
        settings: Settings,
        nick_database: NickDatabase,
        provider: Box<dyn StatsProvider>,
    ) -> Self {
        Self {
            state: Mutex::new(OverlayState::new(None)),
            settings: Mutex::new(settings),
            nick_database,
            player_cache: PlayerCache::default(),
            provider,
            redraw_flag: AtomicBool::new(false),
        }
    }

    /// Clone of the current tracked state.
    pub fn state_snapshot(&self) -> OverlayState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(_) => {
                warn!("state lock is poisoned, returning a fresh state");
                OverlayState::new(None)
            }
        }
    }

    /// Replace the tracked state with its successor.
    pub fn replace_state(&self, state: OverlayState) {
        let Ok(mut guard) = self.state.lock() else {
            warn!("state lock is poisoned, dropping the state update");
            return;
        };
        *guard = state;
    }

    /// Ask the front-end to redraw on its next tick.
    pub fn request_redraw(&self) {
        self.redraw_flag.store(true, Ordering::Release);
    }

    /// True when a redraw was requested since the last call. Clears the
    /// request.
    pub fn take_redraw_request(&self) -> bool {
        self.redraw_flag.swap(false, Ordering::AcqRel)
    }
}
