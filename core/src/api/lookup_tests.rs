//! Tests for username resolution and the cached lookup wrapper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use serde_json::{Value, json};

use crate::api::{ApiError, create_known_player};
use crate::context::OverlayContext;
use crate::nicks::NickDatabase;
use crate::player::Player;
use crate::settings::Settings;
use crate::test_utils::{ScriptedProvider, make_context, make_context_with};

use super::lookup::{denick, fetch_player, get_player};

const CURRENT_TIME_MS: i64 = 1_234_567_890_123;

/// An account taking part in a lookup scenario.
struct User {
    uuid: String,
    username: &'static str,
    nick: Option<&'static str>,
    has_playerdata: bool,
}

fn user(username: &'static str, has_playerdata: bool, nick: Option<&'static str>) -> User {
    User {
        uuid: format!("uuid-for-{username}"),
        username,
        nick,
        has_playerdata,
    }
}

fn unnicked_player() -> User {
    user("UnnickedPlayer", true, None)
}

fn nicked_player() -> User {
    user("NickedPlayer", true, Some("AmazingNick"))
}

/// A real account holding the same name as NickedPlayer's nick.
fn amazing_nick_account() -> User {
    user("AmazingNick", false, None)
}

fn wrong_player() -> User {
    user("WrongPlayer", false, Some("SuperbNick"))
}

fn superb_nick_account() -> User {
    user("SuperbNick", false, None)
}

/// Playerdata for an account that has been on Hypixel without playing bedwars.
fn new_player_blob(username: &str) -> Value {
    json!({ "displayname": username, "stats": {} })
}

/// Playerdata with no displayname field, as the API sometimes returns.
fn anonymous_blob() -> Value {
    json!({ "stats": { "Bedwars": { "Experience": 1087 } } })
}

/// Context whose provider resolves exactly the given users.
///
/// Unknown usernames and uuids without playerdata come back as not found.
/// The users' nicks are entered into the default nick database.
fn scenario(users: &[User]) -> OverlayContext {
    let uuid_by_username: HashMap<String, String> = users
        .iter()
        .map(|user| (user.username.to_owned(), user.uuid.clone()))
        .collect();
    let blob_by_uuid: HashMap<String, Value> = users
        .iter()
        .filter(|user| user.has_playerdata)
        .map(|user| (user.uuid.clone(), new_player_blob(user.username)))
        .collect();

    let provider = ScriptedProvider {
        uuids: Box::new(move |username| Ok(uuid_by_username.get(username).cloned())),
        playerdata: Box::new(move |uuid| {
            Ok(blob_by_uuid
                .get(uuid)
                .cloned()
                .map(|blob| (CURRENT_TIME_MS, blob)))
        }),
        ..ScriptedProvider::default()
    };

    let ctx = make_context_with(provider);
    for user in users {
        if let Some(nick) = user.nick {
            ctx.nick_database.insert_default(nick.to_owned(), user.uuid.clone());
        }
    }

    ctx
}

/// The player `fetch_player` should produce for `user`.
fn known(user: &User, nicked: bool) -> Player {
    Player::Known(create_known_player(
        CURRENT_TIME_MS,
        &new_player_blob(user.username),
        user.username.to_owned(),
        user.uuid.clone(),
        if nicked { user.nick.map(str::to_owned) } else { None },
    ))
}

fn nicked(nick: &str) -> Player {
    Player::Nicked {
        nick: nick.to_owned(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Denicking
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_denick_precedence() {
    let nick = "AmazingNick";

    // No hits anywhere
    let ctx = make_context();
    assert_eq!(denick(&ctx, nick), None);

    // Hit in a secondary database
    let secondary: HashMap<String, String> = [(nick.to_owned(), "database-uuid".to_owned())]
        .into_iter()
        .collect();
    let ctx = OverlayContext::new(
        Settings::default(),
        NickDatabase::new(HashMap::new(), vec![secondary]),
        Box::new(ScriptedProvider::default()),
    );
    assert_eq!(denick(&ctx, nick), Some("database-uuid".to_owned()));

    // The default database takes precedence
    ctx.nick_database
        .insert_default(nick.to_owned(), "default-database-uuid".to_owned());
    assert_eq!(denick(&ctx, nick), Some("default-database-uuid".to_owned()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Fetching
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fetch_unknown_names_count_as_nicks() {
    let ctx = scenario(&[unnicked_player()]);
    assert_eq!(fetch_player(&ctx, "AmazingNick"), nicked("AmazingNick"));

    let ctx = scenario(&[nicked_player()]);
    assert_eq!(fetch_player(&ctx, "UnnickedPlayer"), nicked("UnnickedPlayer"));
}

#[test]
fn test_fetch_resolves_real_account() {
    let ctx = scenario(&[unnicked_player()]);
    assert_eq!(
        fetch_player(&ctx, "UnnickedPlayer"),
        known(&unnicked_player(), false)
    );
}

#[test]
fn test_fetch_real_name_of_nicked_player() {
    let ctx = scenario(&[nicked_player()]);
    assert_eq!(
        fetch_player(&ctx, "NickedPlayer"),
        known(&nicked_player(), false)
    );

    // An existing account holding the nick changes nothing
    let ctx = scenario(&[nicked_player(), amazing_nick_account()]);
    assert_eq!(
        fetch_player(&ctx, "NickedPlayer"),
        known(&nicked_player(), false)
    );
}

#[test]
fn test_fetch_denicks_through_database() {
    let ctx = scenario(&[nicked_player()]);
    assert_eq!(
        fetch_player(&ctx, "AmazingNick"),
        known(&nicked_player(), true)
    );
}

#[test]
fn test_fetch_denicks_after_mojang_hit() {
    // AmazingNick is a real account without playerdata, so the name first
    // resolves through Mojang and only the denick retry finds the player.
    let ctx = scenario(&[nicked_player(), amazing_nick_account()]);
    assert_eq!(
        fetch_player(&ctx, "AmazingNick"),
        known(&nicked_player(), true)
    );
}

#[test]
fn test_fetch_mojang_hit_without_stats_or_denick() {
    let ctx = scenario(&[wrong_player(), superb_nick_account()]);
    assert_eq!(fetch_player(&ctx, "WrongPlayer"), nicked("WrongPlayer"));
}

#[test]
fn test_fetch_denick_retry_without_playerdata() {
    // The retry denicks SuperbNick to WrongPlayer, who has no playerdata
    // either, so the lookup still ends in a nick.
    let ctx = scenario(&[wrong_player(), superb_nick_account()]);
    assert_eq!(fetch_player(&ctx, "SuperbNick"), nicked("SuperbNick"));
}

#[test]
fn test_fetch_mismatching_displayname_is_nicked() {
    let provider = ScriptedProvider {
        uuids: Box::new(|username| {
            assert_eq!(username, "Summer173");
            Ok(Some("fe3d80923dcf4147a35921f6b9fc460f".to_owned()))
        }),
        playerdata: Box::new(|_| {
            // Stale data from whoever held the name before
            Ok(Some((
                CURRENT_TIME_MS,
                json!({
                    "displayname": "Sween_Sween",
                    "playername": "sween_sween",
                    "stats": { "Bedwars": { "Experience": 99_720 } },
                }),
            )))
        }),
        ..ScriptedProvider::default()
    };
    let ctx = make_context_with(provider);

    assert_eq!(fetch_player(&ctx, "Summer173"), nicked("Summer173"));
}

#[test]
fn test_fetch_missing_displayname_is_nicked() {
    // Without a displayname the data cannot be matched to the queried
    // username, so the player is treated as nicked.
    let provider = ScriptedProvider {
        uuids: Box::new(|_| Ok(Some("fffaceca46b24658b21f12c3cd2b413f".to_owned()))),
        playerdata: Box::new(|_| Ok(Some((CURRENT_TIME_MS, anonymous_blob())))),
        ..ScriptedProvider::default()
    };
    let ctx = make_context_with(provider);

    assert_eq!(fetch_player(&ctx, "Ares"), nicked("Ares"));
}

#[test]
fn test_fetch_missing_displayname_when_denicked() {
    // A denicked uuid is trusted even without a displayname to verify.
    let uuid = "fffaceca46b24658b21f12c3cd2b413f";
    let provider = ScriptedProvider {
        uuids: Box::new(|_| Ok(None)),
        playerdata: Box::new(|_| Ok(Some((CURRENT_TIME_MS, anonymous_blob())))),
        ..ScriptedProvider::default()
    };
    let ctx = make_context_with(provider);
    ctx.nick_database
        .insert_default("CrazyNick".to_owned(), uuid.to_owned());

    let expected = Player::Known(create_known_player(
        CURRENT_TIME_MS,
        &anonymous_blob(),
        "<missing name>".to_owned(),
        uuid.to_owned(),
        Some("CrazyNick".to_owned()),
    ));

    assert_eq!(fetch_player(&ctx, "CrazyNick"), expected);
}

#[test]
fn test_fetch_uuid_error_is_unknown() {
    let provider = ScriptedProvider {
        uuids: Box::new(|_| Err(ApiError::ServiceDown)),
        ..ScriptedProvider::default()
    };
    let ctx = make_context_with(provider);

    assert_eq!(
        fetch_player(&ctx, "someone"),
        Player::Unknown {
            username: "someone".to_owned()
        }
    );
}

#[test]
fn test_fetch_playerdata_error_is_unknown() {
    let provider = ScriptedProvider {
        uuids: Box::new(|_| Ok(Some("uuid".to_owned()))),
        playerdata: Box::new(|_| Err(ApiError::Throttled)),
        ..ScriptedProvider::default()
    };
    let ctx = make_context_with(provider);

    assert_eq!(
        fetch_player(&ctx, "someone"),
        Player::Unknown {
            username: "someone".to_owned()
        }
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached lookups
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_get_player_caches_both_aliases() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lookups);

    let provider = ScriptedProvider {
        uuids: Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        }),
        playerdata: Box::new(|_| Ok(Some((CURRENT_TIME_MS, new_player_blob("NickedPlayer"))))),
        ..ScriptedProvider::default()
    };
    let ctx = make_context_with(provider);
    ctx.nick_database
        .insert_default("AmazingNick".to_owned(), "uuid-for-NickedPlayer".to_owned());

    // The first lookup fetches and caches both the nicked and the
    // unnicked version
    assert_eq!(
        get_player(&ctx, "AmazingNick"),
        known(&nicked_player(), true)
    );
    assert_eq!(lookups.load(Ordering::Relaxed), 1);
    assert_eq!(
        ctx.player_cache.get("AmazingNick", false),
        Some(known(&nicked_player(), true))
    );
    assert_eq!(
        ctx.player_cache.get("NickedPlayer", false),
        Some(known(&nicked_player(), false))
    );

    // Both names now come straight from the cache
    assert_eq!(
        get_player(&ctx, "AmazingNick"),
        known(&nicked_player(), true)
    );
    assert_eq!(
        get_player(&ctx, "NickedPlayer"),
        known(&nicked_player(), false)
    );
    assert_eq!(lookups.load(Ordering::Relaxed), 1);
}

#[test]
fn test_get_player_refetches_pending_entries() {
    let ctx = scenario(&[unnicked_player()]);
    let (placeholder, _) = ctx.player_cache.get_or_set_pending("UnnickedPlayer");
    assert!(matches!(placeholder, Player::Pending { .. }));

    assert_eq!(
        get_player(&ctx, "UnnickedPlayer"),
        known(&unnicked_player(), false)
    );
}

#[test]
fn test_get_player_drops_write_when_cache_cleared_mid_fetch() {
    let slot: Arc<OnceLock<Arc<OverlayContext>>> = Arc::new(OnceLock::new());
    let cleared = Arc::clone(&slot);

    let provider = ScriptedProvider {
        uuids: Box::new(|_| Ok(Some("dead-beef".to_owned()))),
        playerdata: Box::new(move |_| {
            // Someone clears the cache while the request is in flight
            if let Some(ctx) = cleared.get() {
                ctx.player_cache.clear(false);
            }
            Ok(Some((CURRENT_TIME_MS, new_player_blob("Player"))))
        }),
        ..ScriptedProvider::default()
    };
    let ctx = Arc::new(make_context_with(provider));
    let _ = slot.set(Arc::clone(&ctx));

    let expected = Player::Known(create_known_player(
        CURRENT_TIME_MS,
        &new_player_blob("Player"),
        "Player".to_owned(),
        "dead-beef".to_owned(),
        None,
    ));

    // The player is still returned, but the stale write is dropped
    assert_eq!(get_player(&ctx, "Player"), expected);
    assert_eq!(ctx.player_cache.get("Player", false), None);
}
