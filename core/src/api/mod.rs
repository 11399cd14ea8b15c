//! Collaborator boundary for identity and stats lookups.
//!
//! The HTTP mechanics live outside this crate. Core code consumes the
//! [`StatsProvider`] trait and the typed errors it fails with, and
//! degrades failed lookups into `Nicked`/`Unknown` players at the call
//! site instead of propagating them.

use serde_json::Value;
use thiserror::Error as ThisError;

use crate::player::Winstreaks;

pub mod lookup;
pub mod playerdata;

#[cfg(test)]
mod lookup_tests;

pub use lookup::{fetch_player, get_player};
pub use playerdata::create_known_player;

/// True when two uuids, dashed or not, name the same account.
pub fn compare_uuids(uuid_1: &str, uuid_2: &str) -> bool {
    uuid_1
        .chars()
        .filter(|c| *c != '-')
        .eq(uuid_2.chars().filter(|c| *c != '-'))
}

/// Errors from the identity and stats services.
///
/// "Player not found" is not an error. Providers return `Ok(None)` for it
/// and the lookup pipeline reads that as "probably a nick".
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ApiError {
    #[error("stats service is unreachable or failing")]
    ServiceDown,

    #[error("stats service throttled the request")]
    Throttled,

    #[error("stats service rejected the api key")]
    InvalidKey,

    #[error("stats service returned a malformed response")]
    Malformed,
}

/// Identity and stats lookups backing the overlay.
///
/// This is the seam between the core and the outside world: the lookup
/// pipeline and the stat workers only ever see this trait. Calls block;
/// the worker pool runs them on blocking threads.
pub trait StatsProvider: Send + Sync {
    /// Resolve a username to an account uuid.
    ///
    /// `Ok(None)` means no such account exists, which usually means the
    /// name is a nick.
    fn get_uuid(&self, username: &str) -> Result<Option<String>, ApiError>;

    /// Fetch the raw stats blob for an account, together with the epoch
    /// millis at which the data was received.
    ///
    /// `Ok(None)` means the account exists but has never been seen by the
    /// stats service.
    fn get_playerdata(&self, uuid: &str) -> Result<Option<(i64, Value)>, ApiError>;

    /// Estimate the winstreaks of an account whose real ones are hidden.
    ///
    /// Returns [`MISSING_WINSTREAKS`](crate::player::MISSING_WINSTREAKS)
    /// and `false` when no estimate is available.
    fn get_estimated_winstreaks(&self, uuid: &str) -> (Winstreaks, bool);
}
