//! Turns parsed events into state transitions.
//!
//! Every transition consumes the current state and returns the next one
//! together with a redraw flag. Events that do not apply degrade to a
//! logged no-op, so processing a log never fails.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::actions::{bedwars_game_ended, set_nickname};
use crate::context::OverlayContext;
use crate::parser::parse_logline;
use crate::state::OverlayState;

use super::event::Event;

/// Apply one event to the tracked state.
///
/// Returns the next state and whether the overlay should redraw. Nickname
/// events delegate to [`set_nickname`], which raises the redraw flag on its
/// own once the caches are consistent again.
pub fn process_event(
    ctx: &OverlayContext,
    state: OverlayState,
    event: Event,
) -> (OverlayState, bool) {
    match event {
        Event::InitializeAs { username } => {
            // Restarting the client or switching accounts. Both make the
            // tracked session worthless.
            if let Some(previous) = &state.own_username {
                debug!("Reinitializing, was playing as {previous}");
            }
            info!("Playing as {username}. Cleared party and lobby.");

            let state = OverlayState {
                own_username: Some(username),
                ..state
            };
            (
                state
                    .clear_party()
                    .clear_lobby()
                    .leave_queue()
                    .leave_game()
                    .set_out_of_sync(false),
                true,
            )
        }

        Event::NewNickname { nick } => {
            info!("Setting new nickname {nick}={:?}", state.own_username);
            let Some(own_username) = state.own_username.clone() else {
                warn!("Own username is not set, could not add denick entry for {nick}.");
                return (state, false);
            };

            set_nickname(ctx, Some(&own_username), &nick);
            (state, false)
        }

        Event::LobbySwap => {
            info!("Received lobby swap. Clearing the lobby");
            (
                state
                    .clear_lobby()
                    .set_out_of_sync(false)
                    .leave_queue()
                    .leave_game(),
                true,
            )
        }

        Event::LobbyJoin {
            username,
            player_count,
            player_cap,
        } => {
            if player_cap < 8 {
                debug!("Gamemode has too few players to be bedwars. Skipping.");
                return (state, false);
            }

            let mut state = state.join_queue().add_to_lobby(&username);

            if player_count != state.lobby_players.len() {
                let mut out_of_sync = true;
                if player_count < state.lobby_players.len() {
                    // We track more players than the server reports, so the
                    // roster has stale entries. Start over from the joiner.
                    warn!("Tracking too many players. Clearing the lobby");
                    state = state.clear_lobby().add_to_lobby(&username);
                    out_of_sync = player_count != state.lobby_players.len();
                }
                state = state.set_out_of_sync(out_of_sync);
            }

            info!("{username} joined your lobby");
            (state, true)
        }

        Event::LobbyLeave { username } => {
            info!("{username} left your lobby");
            (state.remove_from_lobby(&username), true)
        }

        Event::LobbyList { usernames } => {
            // Response from the who command. This roster is authoritative,
            // so any desync is healed here.
            info!(
                "Updating lobby players from who command: '{}'",
                usernames.join(", ")
            );
            (
                state.join_queue().set_out_of_sync(false).set_lobby(usernames),
                true,
            )
        }

        Event::PartyAttach { username } => {
            info!("Joined {username}'s party");
            // Start from a clean party
            (state.clear_party().add_to_party(&username), true)
        }

        Event::PartyDetach => {
            info!("Leaving the party, clearing all members");
            (state.clear_party(), true)
        }

        Event::PartyJoin { usernames } => {
            info!("{} joined your party", usernames.join(", "));
            let state = usernames
                .iter()
                .fold(state, |state, username| state.add_to_party(username));
            (state, true)
        }

        Event::PartyLeave { usernames } => {
            let own_left = state
                .own_username
                .as_deref()
                .is_some_and(|own| usernames.iter().any(|username| username == own));
            if own_left {
                // We left, so everyone else did too
                return (state.clear_party(), true);
            }

            info!("{} left your party", usernames.join(", "));
            let state = usernames
                .iter()
                .fold(state, |state, username| state.remove_from_party(username));
            (state, true)
        }

        Event::PartyListIncoming => {
            // The per-role lists that follow rebuild the party, so no
            // redraw until they arrive
            debug!("Receiving response from /pl. Clearing the party and awaiting the lists");
            (state.clear_party(), false)
        }

        Event::PartyMembershipList { usernames, role } => {
            info!("Adding party {role:?} {} from /pl", usernames.join(", "));
            let state = usernames
                .iter()
                .fold(state, |state, username| state.add_to_party(username));
            (state, true)
        }

        Event::BedwarsGameStartingSoon { seconds } => {
            info!("Bedwars game starting soon {seconds} second(s)");
            (state, false)
        }

        Event::StartBedwarsGame => {
            // Late joiners and team splits right at game start routinely
            // invalidate the tracked roster, so flag it until the next
            // who response.
            info!("Bedwars game starting");
            (state.leave_queue().join_game().set_out_of_sync(true), false)
        }

        Event::EndBedwarsGame => {
            info!("Bedwars game ended");
            bedwars_game_ended(ctx);
            (
                state.clear_lobby().set_out_of_sync(false).leave_game(),
                true,
            )
        }

        Event::BedwarsFinalKill {
            dead_player,
            raw_message,
        } => {
            info!("Final kill: {dead_player} - {raw_message}");
            (state.mark_dead(&dead_player), true)
        }

        Event::BedwarsDisconnect { username } => {
            info!("Player disconnected: {username}");
            (state.mark_dead(&username), true)
        }

        Event::BedwarsReconnect { username } => {
            info!("Player reconnected: {username}");
            (state.mark_alive(&username), true)
        }

        Event::WhisperCommandSetNick { nick, username } => {
            info!("Setting nick from whisper command {nick}={username:?}");
            set_nickname(ctx, username.as_deref(), &nick);
            (state, false)
        }

        Event::ChatMessage { username, .. } => {
            if state.in_queue || state.in_game() {
                // Chatting in the pre-game lobby reveals a player the join
                // messages may have missed
                return (state.add_to_lobby(&username), true);
            }
            (state, false)
        }
    }
}

/// Replay `lines` through the state machine without raising redraws.
///
/// Used to catch the tracked state up to the end of an existing logfile
/// before tailing it. The caller must be the only writer of the state
/// while this runs.
pub fn fast_forward_state<I>(ctx: &OverlayContext, lines: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    info!("Fast forwarding state");

    let mut state = ctx.state_snapshot();
    for line in lines {
        let Some(event) = parse_logline(line.as_ref()) else {
            continue;
        };
        (state, _) = process_event(ctx, state, event);
    }
    ctx.replace_state(state);

    info!("Done fast forwarding state");
}

/// Apply one live log line, raising the redraw flag when the transition
/// asks for it.
pub fn process_line(ctx: &OverlayContext, line: &str) {
    let Some(event) = parse_logline(line) else {
        return;
    };

    let state = ctx.state_snapshot();
    let (state, redraw) = process_event(ctx, state, event);
    ctx.replace_state(state);

    if redraw {
        ctx.request_redraw();
    }
}

/// Consume lines from the log reader until the channel closes.
pub async fn process_lines(ctx: &OverlayContext, lines: &mut mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        process_line(ctx, &line);
    }
}
