//! Row ordering for the stats table.

use hashbrown::HashSet;
use spyglass_types::ColumnName;

use super::{KnownPlayer, Player};

/// Sort key for one player: `(is_enemy, stats_unknown, stat)`.
///
/// Rows are ordered by this key descending, so enemies sort above party
/// members, unresolved identities (nicks and errors) sort above players with
/// known stats, and within those groups the selected stat decides.
pub fn rate_player(
    player: &Player,
    party_members: &HashSet<String>,
    column: ColumnName,
    sort_ascending: bool,
) -> (bool, bool, f64) {
    let is_enemy = !party_members.contains(player.username());

    // On the username column every player rates 0 so the alphabetical
    // fallback decides. Rating by name here would sort reverse alphabetical,
    // and negating the zero would order it against the unnegated ones.
    if column == ColumnName::Username {
        return (is_enemy, player.stats_unknown(), 0.0);
    }

    let stat = match player {
        Player::Known(known) => {
            let stat = known_player_stat(known, column);

            // Missing stats sort to the top
            let mut stat = stat.unwrap_or(if sort_ascending {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });

            // Invert the value so an ascending sort still ranks first-shown
            // players highest
            if sort_ascending {
                stat = -stat;
            }
            stat
        }
        // Players without stats always rank worst within their group
        _ => f64::NEG_INFINITY,
    };

    (is_enemy, player.stats_unknown(), stat)
}

fn known_player_stat(player: &KnownPlayer, column: ColumnName) -> Option<f64> {
    match column {
        ColumnName::Username => Some(0.0),
        ColumnName::Stars => Some(player.stars),
        ColumnName::Index => Some(player.stats.index),
        ColumnName::Fkdr => Some(player.stats.fkdr),
        ColumnName::Kdr => Some(player.stats.kdr),
        ColumnName::Bblr => Some(player.stats.bblr),
        ColumnName::Wlr => Some(player.stats.wlr),
        ColumnName::Winstreak => player.stats.winstreak.map(|winstreak| winstreak as f64),
        ColumnName::Kills => Some(player.stats.kills as f64),
        ColumnName::Finals => Some(player.stats.finals as f64),
        ColumnName::Beds => Some(player.stats.beds as f64),
        ColumnName::Wins => Some(player.stats.wins as f64),
        ColumnName::Sessiontime => player.sessiontime_seconds(),
    }
}

/// Sort the players by the given column.
///
/// Orders party members last and players with unobtainable stats (nick or
/// error, not pending) first. Ties fall back to username, alphabetically.
pub fn sort_players(
    mut players: Vec<Player>,
    party_members: &HashSet<String>,
    column: ColumnName,
    sort_ascending: bool,
) -> Vec<Player> {
    players.sort_by(|a, b| {
        let rating_a = rate_player(a, party_members, column, sort_ascending);
        let rating_b = rate_player(b, party_members, column, sort_ascending);

        rating_b
            .0
            .cmp(&rating_a.0)
            .then_with(|| rating_b.1.cmp(&rating_a.1))
            .then_with(|| rating_b.2.total_cmp(&rating_a.2))
            .then_with(|| a.username().cmp(b.username()))
    });
    players
}
