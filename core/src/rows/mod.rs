//! Assembles the rows the overlay renders.
//!
//! The renderer polls [`get_stat_list`] once per frame. `None` means
//! nothing changed since the last poll, so the previous rows can stay on
//! screen without resorting or touching the cache.

use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::context::OverlayContext;
use crate::player::{Player, sort_players};
use crate::state::OverlayState;

#[cfg(test)]
mod rows_tests;

/// True when something happened since the last poll that changes the rows.
///
/// Combines the shared redraw flag with the stream of completed lookups;
/// a finished lookup only matters if that player is still in the lobby.
/// Consumes both, so a `true` result must be acted on.
pub fn should_redraw(ctx: &OverlayContext, completed: &Receiver<String>) -> bool {
    let mut redraw = ctx.take_redraw_request();

    let state = ctx.state_snapshot();
    while let Ok(username) = completed.try_recv() {
        if state.lobby_players.contains(&username) {
            redraw = true;
        }
    }

    redraw
}

/// Rebuild the sorted row list, or `None` when no redraw is needed.
///
/// Misses become `Pending` rows and a lookup request for the stats
/// workers. While in queue the short term cache is used so stats refresh
/// between games; in game the long term view keeps rows stable.
pub fn get_stat_list(
    ctx: &OverlayContext,
    completed: &Receiver<String>,
    requests: &Sender<String>,
) -> Option<Vec<Player>> {
    if !should_redraw(ctx, completed) {
        return None;
    }

    let state = ctx.state_snapshot();

    let (hide_dead_players, column, sort_ascending) = match ctx.settings.lock() {
        Ok(settings) => (
            settings.hide_dead_players,
            settings.sort_order,
            settings.sort_ascending,
        ),
        Err(_) => {
            warn!("settings lock is poisoned, skipping the row rebuild");
            return None;
        }
    };

    let displayed_players = if hide_dead_players {
        &state.alive_players
    } else {
        &state.lobby_players
    };

    let mut players: Vec<Player> = Vec::with_capacity(displayed_players.len());
    // Players present twice, once nicked and once under their real name
    let mut duplicate_nicked_usernames: Vec<String> = Vec::new();

    for username in displayed_players {
        let player = match ctx.player_cache.get(username, !state.in_queue) {
            Some(player) => {
                if let Player::Known(known) = &player {
                    if known.nick.is_some() && displayed_players.contains(&known.username) {
                        duplicate_nicked_usernames.push(known.username.clone());
                    }
                }
                player
            }
            None => {
                let (pending, newly_pending) = ctx.player_cache.get_or_set_pending(username);
                if newly_pending {
                    debug!("Set player {username} to pending");
                    if requests.send(username.clone()).is_err() {
                        warn!("stats workers are gone, dropping the lookup request");
                    }
                }
                pending
            }
        };
        players.push(player);
    }

    // Keep only the nicked row of a duplicated player. The real-name row
    // comes from the party roster and would double-count them.
    players.retain(|player| {
        if !duplicate_nicked_usernames
            .iter()
            .any(|username| username == player.username())
        {
            return true;
        }
        match player {
            Player::Known(known) => known.nick.is_some(),
            _ => false,
        }
    });

    Some(sort_players(
        players,
        &state.party_members,
        column,
        sort_ascending,
    ))
}

/// Whether the overlay window should be on screen.
///
/// Shown for the whole queue, and for the autohide window after a game
/// starts so the user can glance at the final roster.
pub fn overlay_visible(state: &OverlayState, autohide_timeout: Duration, now: Instant) -> bool {
    if state.in_queue {
        return true;
    }

    match state.last_game_start {
        Some(started_at) => now.saturating_duration_since(started_at) < autohide_timeout,
        None => false,
    }
}

/// Warning line shown above the rows, if any.
pub fn status_banner(state: &OverlayState) -> Option<&'static str> {
    state.out_of_sync.then_some("out of sync")
}
