//! Background workers that resolve stats lookups off the hot path.
//!
//! Row assembly pushes usernames into the request channel and the workers
//! answer on the completed channel once the cache holds the result. The
//! lookups block on network calls, so they run on the blocking pool.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::get_player;
use crate::context::OverlayContext;
use crate::player::{MISSING_WINSTREAKS, Player};


/// Resolve one username and notify the row assembly.
///
/// Sends on `completed` twice when a missing winstreak could be estimated
/// afterwards, so the row refreshes once with stats and once more with the
/// winstreak filled in.
pub fn get_stats_and_winstreak(ctx: &OverlayContext, username: &str, completed: &Sender<String>) {
    let player = get_player(ctx, username);
    let _ = completed.send(username.to_owned());
    debug!("Finished getting stats for {username}");

    if let Player::Known(known) = &player {
        if known.is_missing_winstreaks() {
            let (winstreaks, accurate) = ctx.provider.get_estimated_winstreaks(&known.uuid);

            if winstreaks == MISSING_WINSTREAKS {
                debug!("Updating missing winstreak for {username} failed");
            } else {
                for alias in player.aliases() {
                    ctx.player_cache
                        .update(alias, |cached| cached.update_winstreaks(winstreaks, accurate));
                }
                let _ = completed.send(username.to_owned());
                debug!("Updated missing winstreak for {username}");
            }
        }
    }
}

/// One worker's request loop. Returns when the request channel closes.
///
/// Requests for players who already left the lobby are dropped and their
/// pending cache entry removed, so a later sighting requests them again.
/// The own username is always looked up, party commands mention it before
/// any lobby does.
pub(crate) fn stats_worker_loop(
    ctx: &OverlayContext,
    requests: &Mutex<Receiver<String>>,
    completed: &Sender<String>,
) {
    loop {
        // Hold the lock only while waiting, the lookup itself runs
        // unlocked so the workers overlap
        let request = match requests.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => {
                warn!("request lock is poisoned, stopping the stats worker");
                return;
            }
        };
        let Ok(username) = request else {
            debug!("Request channel closed, stopping the stats worker");
            return;
        };

        let state = ctx.state_snapshot();
        if state.lobby_players.contains(&username)
            || state.own_username.as_deref() == Some(username.as_str())
        {
            get_stats_and_winstreak(ctx, &username, completed);
        } else {
            info!("Skipping get_stats for {username} because they left");
            ctx.player_cache.remove(&username);
        }
    }
}

/// Spawn the configured number of stats workers on the blocking pool.
pub fn spawn_stats_workers(
    ctx: Arc<OverlayContext>,
    requests: Receiver<String>,
    completed: Sender<String>,
) -> Vec<JoinHandle<()>> {
    let worker_count = match ctx.settings.lock() {
        Ok(settings) => settings.stats_thread_count,
        Err(_) => {
            warn!("settings lock is poisoned, spawning a single stats worker");
            1
        }
    };

    let requests = Arc::new(Mutex::new(requests));

    (0..worker_count)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            let requests = Arc::clone(&requests);
            let completed = completed.clone();
            tokio::task::spawn_blocking(move || stats_worker_loop(&ctx, &requests, &completed))
        })
        .collect()
}
