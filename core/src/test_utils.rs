//! Shared helpers for the crate's tests.

use serde_json::Value;

use crate::api::{ApiError, StatsProvider};
use crate::context::OverlayContext;
use crate::nicks::NickDatabase;
use crate::player::{KnownPlayer, Stats, Winstreaks};
use crate::settings::Settings;

pub(crate) const DATA_RECEIVED_AT_MS: i64 = 1_234_567_890;

/// Stat provider driven by closures. The defaults panic, so a test only
/// wires up the calls it expects to happen.
pub(crate) struct ScriptedProvider {
    pub uuids: Box<dyn Fn(&str) -> Result<Option<String>, ApiError> + Send + Sync>,
    pub playerdata: Box<dyn Fn(&str) -> Result<Option<(i64, Value)>, ApiError> + Send + Sync>,
    pub winstreaks: Box<dyn Fn(&str) -> (Winstreaks, bool) + Send + Sync>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            uuids: Box::new(|username| panic!("unexpected get_uuid call for {username}")),
            playerdata: Box::new(|uuid| panic!("unexpected get_playerdata call for {uuid}")),
            winstreaks: Box::new(|uuid| {
                panic!("unexpected get_estimated_winstreaks call for {uuid}")
            }),
        }
    }
}

impl StatsProvider for ScriptedProvider {
    fn get_uuid(&self, username: &str) -> Result<Option<String>, ApiError> {
        (self.uuids)(username)
    }

    fn get_playerdata(&self, uuid: &str) -> Result<Option<(i64, Value)>, ApiError> {
        (self.playerdata)(uuid)
    }

    fn get_estimated_winstreaks(&self, uuid: &str) -> (Winstreaks, bool) {
        (self.winstreaks)(uuid)
    }
}

pub(crate) fn make_context() -> OverlayContext {
    make_context_with(ScriptedProvider::default())
}

pub(crate) fn make_context_with(provider: ScriptedProvider) -> OverlayContext {
    OverlayContext::new(
        Settings::default(),
        NickDatabase::default(),
        Box::new(provider),
    )
}

/// A known player with all-zero stats.
pub(crate) fn make_known(username: &str) -> KnownPlayer {
    KnownPlayer {
        username: username.to_owned(),
        uuid: "placeholder".to_owned(),
        nick: None,
        stars: 1.0,
        stats: Stats {
            index: 0.0,
            fkdr: 0.0,
            kdr: 0.0,
            bblr: 0.0,
            wlr: 0.0,
            winstreak: None,
            winstreak_accurate: false,
            kills: 0,
            finals: 0,
            beds: 0,
            wins: 0,
        },
        data_received_at_ms: DATA_RECEIVED_AT_MS,
        last_login_ms: None,
        last_logout_ms: None,
        tags: None,
    }
}
