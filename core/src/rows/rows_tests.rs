//! Tests for row assembly.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::{get_stat_list, overlay_visible, should_redraw, status_banner};
use crate::context::OverlayContext;
use crate::player::{KnownPlayer, Player};
use crate::state::OverlayState;
use crate::test_utils::{make_context, make_known};

fn known(username: &str) -> Player {
    Player::Known(make_known(username))
}

fn nicked_known(username: &str, nick: &str) -> Player {
    Player::Known(KnownPlayer {
        nick: Some(nick.to_owned()),
        ..make_known(username)
    })
}

fn nick(nick: &str) -> Player {
    Player::Nicked {
        nick: nick.to_owned(),
    }
}

fn pending(username: &str) -> Player {
    Player::Pending {
        username: username.to_owned(),
    }
}

/// Cache `player` under `key`, like a finished lookup for `key` would.
fn seed(ctx: &OverlayContext, key: &str, player: Player) {
    let genus = ctx.player_cache.current_genus();
    ctx.player_cache.set(key, player, genus);
}

fn queued_state(lobby: &[&str]) -> OverlayState {
    let mut state = OverlayState::new(Some("Me".to_owned())).join_queue();
    for username in lobby {
        state = state.add_to_lobby(username);
    }
    state
}

fn drain(rx: &mpsc::Receiver<String>) -> Vec<String> {
    let mut requested = Vec::new();
    while let Ok(username) = rx.try_recv() {
        requested.push(username);
    }
    requested.sort();
    requested
}

fn usernames(players: &[Player]) -> Vec<&str> {
    players.iter().map(Player::username).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Redraw gating
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_should_redraw_nothing_happened() {
    let ctx = make_context();
    let (_tx, completed) = mpsc::channel::<String>();

    assert!(!should_redraw(&ctx, &completed));
}

#[test]
fn test_should_redraw_flag_is_consumed() {
    let ctx = make_context();
    let (_tx, completed) = mpsc::channel::<String>();

    ctx.request_redraw();
    assert!(should_redraw(&ctx, &completed));
    assert!(!should_redraw(&ctx, &completed));
}

#[test]
fn test_should_redraw_completed_lookup_in_lobby() {
    let ctx = make_context();
    ctx.replace_state(queued_state(&["Alice"]));
    let (tx, completed) = mpsc::channel();

    tx.send("Alice".to_owned()).unwrap();
    assert!(should_redraw(&ctx, &completed));
}

#[test]
fn test_should_redraw_completed_lookup_for_departed_player() {
    let ctx = make_context();
    ctx.replace_state(queued_state(&["Alice"]));
    let (tx, completed) = mpsc::channel();

    tx.send("SomeoneElse".to_owned()).unwrap();
    assert!(!should_redraw(&ctx, &completed));
}

#[test]
fn test_should_redraw_drains_the_whole_queue() {
    let ctx = make_context();
    ctx.replace_state(queued_state(&["Alice"]));
    let (tx, completed) = mpsc::channel();

    tx.send("SomeoneElse".to_owned()).unwrap();
    tx.send("Alice".to_owned()).unwrap();
    tx.send("AnotherOne".to_owned()).unwrap();
    assert!(should_redraw(&ctx, &completed));
    // Everything was consumed by the first call
    assert!(!should_redraw(&ctx, &completed));
}

// ─────────────────────────────────────────────────────────────────────────────
// Row assembly
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_get_stat_list_without_redraw() {
    let ctx = make_context();
    ctx.replace_state(queued_state(&["Alice"]));
    let (_ctx_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    assert_eq!(get_stat_list(&ctx, &completed, &requests), None);
    assert!(drain(&requests_rx).is_empty());
}

#[test]
fn test_get_stat_list_empty_lobby() {
    let ctx = make_context();
    ctx.replace_state(queued_state(&[]));
    let (_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    ctx.request_redraw();
    assert_eq!(get_stat_list(&ctx, &completed, &requests), Some(vec![]));
    assert!(drain(&requests_rx).is_empty());
}

#[test]
fn test_get_stat_list_sorts_cached_players() {
    let ctx = make_context();
    seed(&ctx, "Alice", known("Alice"));
    seed(&ctx, "SneakyNick", nicked_known("Carol", "SneakyNick"));
    seed(&ctx, "UnknownNick", nick("UnknownNick"));
    seed(&ctx, "Bob", pending("Bob"));
    ctx.replace_state(queued_state(&["Alice", "SneakyNick", "UnknownNick", "Bob"]));
    let (_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    // Nicks on top, known players alphabetically on equal stats, pending last
    assert_eq!(usernames(&rows), ["UnknownNick", "Alice", "Carol", "Bob"]);
    // Everyone was cached already
    assert!(drain(&requests_rx).is_empty());
}

#[test]
fn test_get_stat_list_party_members_sort_last() {
    let ctx = make_context();
    seed(&ctx, "Alice", known("Alice"));
    seed(&ctx, "SneakyNick", nicked_known("Carol", "SneakyNick"));
    seed(&ctx, "UnknownNick", nick("UnknownNick"));
    seed(&ctx, "Bob", pending("Bob"));
    let state = queued_state(&["Alice", "SneakyNick", "UnknownNick", "Bob"]);
    ctx.replace_state(state.add_to_party("Alice"));
    let (_tx, completed) = mpsc::channel();
    let (requests, _requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(usernames(&rows), ["UnknownNick", "Carol", "Bob", "Alice"]);
}

#[test]
fn test_get_stat_list_requests_missing_players() {
    let ctx = make_context();
    seed(&ctx, "Alice", known("Alice"));
    ctx.replace_state(queued_state(&["Alice", "Bob"]));
    let (_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![known("Alice"), pending("Bob")]);
    assert_eq!(drain(&requests_rx), ["Bob"]);
    assert_eq!(ctx.player_cache.get("Bob", false), Some(pending("Bob")));

    // A pending player is a cache hit, so the next rebuild must not
    // request the lookup again
    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![known("Alice"), pending("Bob")]);
    assert!(drain(&requests_rx).is_empty());
}

#[test]
fn test_get_stat_list_hides_dead_players() {
    let ctx = make_context();
    seed(&ctx, "Alice", known("Alice"));
    seed(&ctx, "Carol", known("Carol"));
    let state = queued_state(&["Alice", "Carol"]).join_game().mark_dead("Carol");
    ctx.replace_state(state);
    let (_tx, completed) = mpsc::channel();
    let (requests, _requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(usernames(&rows), ["Alice"]);
}

#[test]
fn test_get_stat_list_shows_dead_players_when_configured() {
    let ctx = make_context();
    ctx.settings.lock().unwrap().hide_dead_players = false;
    seed(&ctx, "Alice", known("Alice"));
    seed(&ctx, "Carol", known("Carol"));
    let state = queued_state(&["Alice", "Carol"]).join_game().mark_dead("Carol");
    ctx.replace_state(state);
    let (_tx, completed) = mpsc::channel();
    let (requests, _requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(usernames(&rows), ["Alice", "Carol"]);
}

#[test]
fn test_get_stat_list_drops_duplicate_real_name_row() {
    // A denicked party member appears both under their real name (from
    // the party roster) and under their nick (from the lobby). Only the
    // nicked row survives.
    let ctx = make_context();
    seed(&ctx, "Carol", known("Carol"));
    seed(&ctx, "SneakyNick", nicked_known("Carol", "SneakyNick"));
    ctx.replace_state(queued_state(&["Carol", "SneakyNick"]));
    let (_tx, completed) = mpsc::channel();
    let (requests, _requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![nicked_known("Carol", "SneakyNick")]);
}

#[test]
fn test_get_stat_list_drops_duplicate_even_when_pending() {
    let ctx = make_context();
    seed(&ctx, "SneakyNick", nicked_known("Carol", "SneakyNick"));
    ctx.replace_state(queued_state(&["Carol", "SneakyNick"]));
    let (_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![nicked_known("Carol", "SneakyNick")]);
    // The pending row is hidden but its lookup still goes out
    assert_eq!(drain(&requests_rx), ["Carol"]);
}

#[test]
fn test_get_stat_list_keeps_unresolved_nick_row() {
    // Until the nick resolves there is no Known row tying the two names
    // together, so both are shown
    let ctx = make_context();
    seed(&ctx, "Carol", known("Carol"));
    ctx.replace_state(queued_state(&["Carol", "SneakyNick"]));
    let (_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![known("Carol"), pending("SneakyNick")]);
    assert_eq!(drain(&requests_rx), ["SneakyNick"]);
}

#[test]
fn test_get_stat_list_uses_long_term_cache_in_game() {
    let ctx = make_context();
    seed(&ctx, "Alice", known("Alice"));
    ctx.player_cache.clear(true);
    let (_tx, completed) = mpsc::channel();
    let (requests, requests_rx) = mpsc::channel();

    // In queue only the short term cache counts, so Alice is refetched
    ctx.replace_state(queued_state(&["Alice"]));
    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![pending("Alice")]);
    assert_eq!(drain(&requests_rx), ["Alice"]);

    // In game the long term entry keeps the row stable
    let ctx = make_context();
    seed(&ctx, "Alice", known("Alice"));
    ctx.player_cache.clear(true);
    ctx.replace_state(queued_state(&["Alice"]).join_game().leave_queue());
    ctx.request_redraw();
    let rows = get_stat_list(&ctx, &completed, &requests).unwrap();
    assert_eq!(rows, vec![known("Alice")]);
    assert!(drain(&requests_rx).is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Visibility
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_overlay_visible_in_queue() {
    let state = OverlayState::new(Some("Me".to_owned())).join_queue();
    assert!(overlay_visible(&state, Duration::from_secs(8), Instant::now()));
}

#[test]
fn test_overlay_visible_for_the_autohide_window() {
    let now = Instant::now();
    let state = OverlayState {
        last_game_start: Some(now - Duration::from_secs(5)),
        ..OverlayState::new(Some("Me".to_owned()))
    };

    assert!(overlay_visible(&state, Duration::from_secs(8), now));
    assert!(!overlay_visible(&state, Duration::from_secs(5), now));
    assert!(!overlay_visible(&state, Duration::from_secs(2), now));
}

#[test]
fn test_overlay_hidden_outside_games() {
    let state = OverlayState::new(Some("Me".to_owned()));
    assert!(!overlay_visible(&state, Duration::from_secs(8), Instant::now()));
}

#[test]
fn test_status_banner() {
    let state = OverlayState::new(Some("Me".to_owned()));
    assert_eq!(status_banner(&state), None);
    assert_eq!(
        status_banner(&state.set_out_of_sync(true)),
        Some("out of sync")
    );
}
