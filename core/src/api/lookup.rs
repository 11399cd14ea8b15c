//! Username to [`Player`] resolution, with nick handling and caching.

use tracing::{debug, error, warn};

use crate::context::OverlayContext;
use crate::player::{KnownPlayer, Player};

use super::create_known_player;
use super::playerdata::display_name;

/// Resolve a nickname to a uuid through the nick database.
///
/// The user-maintained default layer wins over any bundled databases.
pub(crate) fn denick(ctx: &OverlayContext, nick: &str) -> Option<String> {
    if let Some(uuid) = ctx.nick_database.get_default(nick) {
        debug!("Denicked with default database {nick} -> {uuid}");
        return Some(uuid);
    }

    if let Some(uuid) = ctx.nick_database.get(nick) {
        debug!("Denicked with database {nick} -> {uuid}");
        return Some(uuid);
    }

    debug!("Failed denicking {nick}");

    None
}

/// Fetch stats for the account behind `username`, without touching the cache.
///
/// Falls back to the nick database when the username does not resolve to an
/// account, and again when the account exists but has no playerdata. Service
/// failures come back as [`Player::Unknown`] so stale cache entries are not
/// overwritten with nick guesses.
pub fn fetch_player(ctx: &OverlayContext, username: &str) -> Player {
    let mut nick: Option<String> = None;
    let mut denicked = false;

    let mut uuid = match ctx.provider.get_uuid(username) {
        Ok(uuid) => uuid,
        Err(err) => {
            warn!("Error while getting uuid for '{username}' - returning UnknownPlayer: {err}");
            return Player::Unknown {
                username: username.to_owned(),
            };
        }
    };

    // No such account, so the name is likely a nick
    if uuid.is_none() {
        if let Some(denicked_uuid) = denick(ctx, username) {
            debug!("De-nicked {username} as {denicked_uuid}");
            uuid = Some(denicked_uuid);
            nick = Some(username.to_owned());
            denicked = true;
        }
    }

    let Some(mut uuid) = uuid else {
        return Player::Nicked {
            nick: username.to_owned(),
        };
    };

    let mut fetched = match ctx.provider.get_playerdata(&uuid) {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(
                "Error while getting playerdata for '{username}' - returning UnknownPlayer: {err}"
            );
            return Player::Unknown {
                username: username.to_owned(),
            };
        }
    };

    debug!(
        "Initial stats for {username} ({uuid}) denicked={denicked} missing={}",
        fetched.is_none()
    );

    if !denicked {
        if let Some((_, playerdata)) = &fetched {
            let displayname = display_name(playerdata);
            if !displayname.eq_ignore_ascii_case(username) {
                // The playerdata is outdated and belongs to whoever held the
                // name before, so the player in the lobby must be nicked.
                error!(
                    "Mismatching displayname for username={username} uuid={uuid} \
                     displayname={displayname}. Assuming the player is nicked and \
                     attempting denick."
                );
                fetched = None;
            }
        }
    }

    if !denicked && fetched.is_none() {
        // The account may exist without ever having logged on to Hypixel.
        // Then Mojang resolves the name but Hypixel has nothing, and the
        // name can still be someone's nick.
        if let Some(denicked_uuid) = denick(ctx, username) {
            uuid = denicked_uuid;
            nick = Some(username.to_owned());
            debug!("De-nicked {username} as {uuid} after hit from Mojang");

            fetched = match ctx.provider.get_playerdata(&uuid) {
                Ok(fetched) => fetched,
                Err(err) => {
                    warn!(
                        "Error while getting playerdata for '{username}' - returning \
                         UnknownPlayer: {err}"
                    );
                    return Player::Unknown {
                        username: username.to_owned(),
                    };
                }
            };
            debug!("Stats for nicked {username} ({uuid}) missing={}", fetched.is_none());
        }
    }

    let Some((data_received_at_ms, playerdata)) = fetched else {
        debug!("Got no playerdata - assuming player is nicked");
        return Player::Nicked {
            nick: username.to_owned(),
        };
    };

    let username = if nick.is_some() {
        // Successfully denicked, so report the real username
        let denicked_username = display_name(&playerdata).to_owned();
        debug!("De-nicked {username} as {denicked_username}");
        denicked_username
    } else {
        username.to_owned()
    };

    Player::Known(create_known_player(
        data_received_at_ms,
        &playerdata,
        username,
        uuid,
        nick,
    ))
}

/// Get the player behind `username`, through the cache.
///
/// Fetched players are stored at the genus the cache had before the fetch
/// started, so a clear that happens mid-flight wins over the stale result.
/// Denicked players are additionally cached under their real username.
pub fn get_player(ctx: &OverlayContext, username: &str) -> Player {
    if let Some(cached) = ctx.player_cache.get(username, false) {
        if !matches!(cached, Player::Pending { .. }) {
            debug!("Cache hit {username}");
            return cached;
        }
    }

    debug!("Cache miss {username}");

    let genus = ctx.player_cache.current_genus();
    let player = fetch_player(ctx, username);

    if let Player::Known(known) = &player {
        if known.nick.is_some() {
            // Also cache under the real username, where the player counts
            // as not nicked
            let unnicked = KnownPlayer {
                nick: None,
                ..known.clone()
            };
            ctx.player_cache
                .set(&known.username, Player::Known(unnicked), genus);
        }
    }

    ctx.player_cache.set(username, player.clone(), genus);

    player
}
