//! Building known players from raw stats blobs.
//!
//! Blobs come straight from the stats service and are never trusted:
//! every field is extracted with a type check and falls back to its
//! default when missing or mistyped, so one broken account cannot take
//! down a lookup.

use serde_json::Value;

use crate::player::{KnownPlayer, Stats};
use crate::stars::bedwars_level_from_exp;

/// The display name recorded in the blob, used to detect outdated data
/// for nicked accounts.
pub fn display_name(playerdata: &Value) -> &str {
    playerdata
        .get("displayname")
        .and_then(Value::as_str)
        .unwrap_or("<missing name>")
}

fn int_field(blob: &Value, field: &str) -> Option<i64> {
    // Floats fail the type check on purpose, just like strings do
    blob.get(field).and_then(Value::as_i64)
}

/// The Bedwars stats object, if the account has one.
fn bedwars_stats(playerdata: &Value) -> Option<&Value> {
    let gamemodes = playerdata.get("stats")?;
    let bedwars = gamemodes.get("Bedwars")?;
    bedwars.is_object().then_some(bedwars)
}

fn div(dividend: f64, divisor: f64) -> f64 {
    if dividend == 0.0 {
        0.0
    } else if divisor == 0.0 {
        dividend
    } else {
        dividend / divisor
    }
}

/// Builds a known player from a raw stats blob.
///
/// An account with no Bedwars stats object at all gets zero for
/// everything, including an accurate winstreak of zero.
pub fn create_known_player(
    data_received_at_ms: i64,
    playerdata: &Value,
    username: String,
    uuid: String,
    nick: Option<String>,
) -> KnownPlayer {
    let last_login_ms = int_field(playerdata, "lastLogin");
    let last_logout_ms = int_field(playerdata, "lastLogout");

    let Some(bw_stats) = bedwars_stats(playerdata) else {
        return KnownPlayer {
            username,
            uuid,
            nick,
            stars: 0.0,
            stats: Stats {
                index: 0.0,
                fkdr: 0.0,
                kdr: 0.0,
                bblr: 0.0,
                wlr: 0.0,
                winstreak: Some(0),
                winstreak_accurate: true,
                kills: 0,
                finals: 0,
                beds: 0,
                wins: 0,
            },
            data_received_at_ms,
            last_login_ms,
            last_logout_ms,
            tags: None,
        };
    };

    let mut winstreak = int_field(bw_stats, "winstreak");
    let exp = int_field(bw_stats, "Experience").unwrap_or(500).max(0);
    let stars = bedwars_level_from_exp(exp as u64);
    let kills = int_field(bw_stats, "kills_bedwars").unwrap_or(0);
    let finals = int_field(bw_stats, "final_kills_bedwars").unwrap_or(0);
    let beds = int_field(bw_stats, "beds_broken_bedwars").unwrap_or(0);
    let wins = int_field(bw_stats, "wins_bedwars").unwrap_or(0);

    if winstreak.is_none() && wins == 0 {
        // The winstreak field is not populated until the first win, so an
        // account without wins cannot have a streak
        winstreak = Some(0);
    }

    let final_deaths = int_field(bw_stats, "final_deaths_bedwars").unwrap_or(0);
    let deaths = int_field(bw_stats, "deaths_bedwars").unwrap_or(0);
    let beds_lost = int_field(bw_stats, "beds_lost_bedwars").unwrap_or(0);
    let losses = int_field(bw_stats, "losses_bedwars").unwrap_or(0);

    let fkdr = div(finals as f64, final_deaths as f64);
    KnownPlayer {
        username,
        uuid,
        nick,
        stars,
        stats: Stats {
            index: stars * fkdr.powi(2),
            fkdr,
            kdr: div(kills as f64, deaths as f64),
            bblr: div(beds as f64, beds_lost as f64),
            wlr: div(wins as f64, losses as f64),
            winstreak,
            winstreak_accurate: winstreak.is_some(),
            kills,
            finals,
            beds,
            wins,
        },
        data_received_at_ms,
        last_login_ms,
        last_logout_ms,
        tags: None,
    }
}
