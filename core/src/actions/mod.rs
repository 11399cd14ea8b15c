//! Actions that touch more than the tracked state.
//!
//! The event processor delegates here for operations that cut across the
//! settings, the nick database, and the player cache.

use tracing::{debug, error, warn};

use crate::api::compare_uuids;
use crate::context::OverlayContext;
use crate::settings::NickValue;


/// Record that `nick` belongs to `username`, or remove the nick when
/// `username` is `None`.
///
/// Updates the known nicks in the settings and the default layer of the
/// nick database, evicts stale cache entries, and requests a redraw.
pub fn set_nickname(ctx: &OverlayContext, username: Option<&str>, nick: &str) {
    debug!("Setting denick {nick} => {username:?}");

    let mut old_nick: Option<String> = None;

    let uuid = match username {
        Some(username) => match ctx.provider.get_uuid(username) {
            Ok(Some(uuid)) => Some(uuid),
            Ok(None) => {
                error!("Failed getting uuid for '{username}' when setting nickname.");
                // No account by that name. Drop the entry for this nick.
                old_nick = Some(nick.to_owned());
                None
            }
            Err(err) => {
                // With the service failing we cannot tell which stored
                // entry this nick should replace. Leave them all alone.
                error!("Error getting uuid for '{username}' when setting nickname: {err}");
                None
            }
        },
        None => {
            // Explicit removal
            old_nick = Some(nick.to_owned());
            None
        }
    };

    if let Ok(mut settings) = ctx.settings.lock() {
        let new_nick_value = match (&uuid, username) {
            (Some(uuid), Some(username)) => {
                match settings
                    .known_nicks
                    .iter()
                    .find(|(_, value)| compare_uuids(&value.uuid, uuid))
                {
                    // The player already had a nick. Reuse the stored
                    // value so the comment survives the move.
                    Some((existing_nick, value)) => {
                        old_nick = Some(existing_nick.clone());
                        Some(value.clone())
                    }
                    None => Some(NickValue {
                        uuid: uuid.clone(),
                        comment: username.to_owned(),
                    }),
                }
            }
            _ => None,
        };

        if let Some(old_nick) = &old_nick {
            settings.known_nicks.remove(old_nick);
        }

        if let Some(value) = new_nick_value {
            settings.known_nicks.insert(nick.to_owned(), value);
        }

        settings.flush();
    } else {
        warn!("settings lock is poisoned, skipping the known nicks update");
    }

    // Mirror the change in the nick database's default layer
    if let Some(old_nick) = &old_nick {
        ctx.nick_database.remove_default(old_nick);
    }
    if let Some(uuid) = uuid {
        ctx.nick_database.insert_default(nick.to_owned(), uuid);
    }

    // Drop the stats cached for the old nick
    if let Some(old_nick) = &old_nick {
        if old_nick != nick {
            ctx.player_cache.remove(old_nick);
        }
    }

    // Drop the stats cached for the new nick so they get refetched
    ctx.player_cache.remove(nick);

    ctx.request_redraw();
}

/// Drop every short-term cache entry when a game ends.
pub fn bedwars_game_ended(ctx: &OverlayContext) {
    ctx.player_cache.clear(true);
}
