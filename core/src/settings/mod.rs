//! User settings, persisted as TOML through confy.
//!
//! Loading is forgiving: missing fields take their defaults, out-of-range
//! values are reset, and a file that cannot be parsed at all degrades to
//! all defaults. Corrections are flushed back to disk.

use std::path::PathBuf;

use confy::ConfyError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use spyglass_types::{ColumnName, DEFAULT_COLUMN_ORDER};


/// Key shipped in the stock settings template. Never valid.
pub const PLACEHOLDER_API_KEY: &str = "insert-your-key-here";

const APP_NAME: &str = "spyglass";

const DEFAULT_AUTOHIDE_TIMEOUT_S: u64 = 8;
const DEFAULT_STATS_THREAD_COUNT: usize = 16;

/// Permissive validity check for stored api keys. Catches the stock
/// placeholder and obviously truncated keys, nothing more.
pub fn api_key_is_valid(key: &str) -> bool {
    key != PLACEHOLDER_API_KEY && key.len() > 5
}

/// Value stored per nick in `known_nicks`. The comment is usually the
/// account's real ign at the time the nick was registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NickValue {
    pub uuid: String,
    pub comment: String,
}

/// User settings for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hypixel_api_key: Option<String>,
    pub antisniper_api_key: Option<String>,
    pub use_antisniper_api: bool,
    pub sort_order: ColumnName,
    pub sort_ascending: bool,
    pub column_order: Vec<ColumnName>,
    /// Nicks the user has assigned to an account by hand.
    pub known_nicks: HashMap<String, NickValue>,
    pub hide_dead_players: bool,
    /// Seconds the overlay stays visible after the last activity.
    pub autohide_timeout_s: u64,
    pub stats_thread_count: usize,
    /// Explicit log file to tail. `None` means autodetect.
    pub logfile_path: Option<PathBuf>,
    /// Where [`Settings::flush`] writes. `None` keeps the settings in
    /// memory only.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl ::std::default::Default for Settings {
    fn default() -> Self {
        Self {
            hypixel_api_key: None,
            antisniper_api_key: None,
            use_antisniper_api: true,
            sort_order: ColumnName::Index,
            sort_ascending: false,
            column_order: DEFAULT_COLUMN_ORDER.to_vec(),
            known_nicks: HashMap::new(),
            hide_dead_players: true,
            autohide_timeout_s: DEFAULT_AUTOHIDE_TIMEOUT_S,
            stats_thread_count: DEFAULT_STATS_THREAD_COUNT,
            logfile_path: None,
            config_path: None,
        }
    }
}

impl Settings {
    /// Read settings from the standard confy location, filling anything
    /// missing or invalid with its default. Corrections are written back.
    pub fn load() -> Self {
        let (mut settings, updated) = Self::from_stored(confy::load(APP_NAME, None));
        settings.config_path = confy::get_configuration_file_path(APP_NAME, None).ok();
        if updated {
            settings.flush();
        }
        info!("Read settings from disk");
        settings
    }

    /// Persist the current settings to their file. Failures are logged, not
    /// returned.
    pub fn flush(&self) {
        let Some(path) = &self.config_path else {
            debug!("No settings path configured, not writing settings");
            return;
        };

        match confy::store_path(path, self) {
            Ok(()) => info!("Wrote settings to disk"),
            Err(err) => warn!("Failed writing settings to disk: {err}"),
        }
    }

    /// Turn the result of a confy read into usable settings. Also returns
    /// whether they differ from what was stored.
    fn from_stored(stored: Result<Settings, ConfyError>) -> (Settings, bool) {
        let (stored, read_failed) = match stored {
            Ok(settings) => (settings, false),
            Err(err) => {
                warn!("Error reading settings file, using all defaults: {err}");
                (Settings::default(), true)
            }
        };

        let settings = stored.clone().sanitized();
        let updated = read_failed || settings != stored;
        (settings, updated)
    }

    /// Replace out-of-range or placeholder values with their defaults.
    fn sanitized(mut self) -> Self {
        if self
            .hypixel_api_key
            .as_deref()
            .is_some_and(|key| !api_key_is_valid(key))
        {
            warn!("Discarding invalid hypixel api key");
            self.hypixel_api_key = None;
        }

        if self
            .antisniper_api_key
            .as_deref()
            .is_some_and(|key| !api_key_is_valid(key))
        {
            warn!("Discarding invalid antisniper api key");
            self.antisniper_api_key = None;
        }

        if self.column_order.is_empty() {
            self.column_order = DEFAULT_COLUMN_ORDER.to_vec();
        }

        if !(1..=20).contains(&self.autohide_timeout_s) {
            self.autohide_timeout_s = DEFAULT_AUTOHIDE_TIMEOUT_S;
        }

        if !(1..=16).contains(&self.stats_thread_count) {
            self.stats_thread_count = DEFAULT_STATS_THREAD_COUNT;
        }

        self
    }
}
