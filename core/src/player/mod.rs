//! Player variants and their stats.
//!
//! A name seen in the lobby resolves to one of four variants: stats fetched
//! ([`KnownPlayer`]), hidden behind an unresolvable nick (`Nicked`), lookup
//! still in flight (`Pending`), or failed outright (`Unknown`). The overlay
//! renders all four, so the accessors here are total over the variants.

use spyglass_types::ColumnName;
use spyglass_types::formatting::{CellValue, format_seconds_short, truncate_float};

pub mod rating;


pub use rating::{rate_player, sort_players};

/// Winstreaks for each core gamemode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Winstreaks {
    pub overall: Option<i64>,
    pub solo: Option<i64>,
    pub doubles: Option<i64>,
    pub threes: Option<i64>,
    pub fours: Option<i64>,
}

pub const MISSING_WINSTREAKS: Winstreaks = Winstreaks {
    overall: None,
    solo: None,
    doubles: None,
    threes: None,
    fours: None,
};

/// How strongly an external report source flags a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagSeverity {
    #[default]
    None,
    Medium,
    High,
}

/// Report tags carried on a known player for display. Nothing in the
/// pipeline acts on these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTags {
    pub sniping: TagSeverity,
    pub cheating: TagSeverity,
}

/// A known player's Bedwars stats.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    /// stars * fkdr^2
    pub index: f64,
    pub fkdr: f64,
    pub kdr: f64,
    pub bblr: f64,
    pub wlr: f64,
    pub winstreak: Option<i64>,
    /// False when `winstreak` is an estimate (or absent).
    pub winstreak_accurate: bool,
    pub kills: i64,
    pub finals: i64,
    pub beds: i64,
    pub wins: i64,
}

impl Stats {
    /// Fill in a missing winstreak. Keeps an already accurate or already
    /// present value.
    pub fn update_winstreak(self, winstreak: Option<i64>, winstreak_accurate: bool) -> Self {
        if self.winstreak_accurate || self.winstreak.is_some() {
            return self;
        }

        Self {
            winstreak,
            winstreak_accurate,
            ..self
        }
    }
}

/// A player whose stats were fetched successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownPlayer {
    pub username: String,
    pub uuid: String,
    /// Set when this player was resolved through a nickname.
    pub nick: Option<String>,
    pub stars: f64,
    pub stats: Stats,
    /// Wall clock milliseconds when the stats were received.
    pub data_received_at_ms: i64,
    pub last_login_ms: Option<i64>,
    pub last_logout_ms: Option<i64>,
    pub tags: Option<PlayerTags>,
}

impl KnownPlayer {
    /// True if the overall winstreak is still unknown.
    pub fn is_missing_winstreaks(&self) -> bool {
        self.stats.winstreak.is_none()
    }

    /// Seconds this player has been online, or `None` when offline or when
    /// the login/logout stats are missing or inconsistent.
    pub fn sessiontime_seconds(&self) -> Option<f64> {
        let last_login_ms = self.last_login_ms?;
        let last_logout_ms = self.last_logout_ms?;

        if last_logout_ms > last_login_ms || last_login_ms > self.data_received_at_ms {
            return None;
        }

        Some((self.data_received_at_ms - last_login_ms) as f64 / 1000.0)
    }

    /// Fold fetched winstreaks into the stats. Only the overall winstreak is
    /// displayed, and it is never downgraded from an accurate value.
    pub fn update_winstreaks(self, winstreaks: Winstreaks, winstreaks_accurate: bool) -> Self {
        Self {
            stats: self
                .stats
                .update_winstreak(winstreaks.overall, winstreaks_accurate),
            ..self
        }
    }
}

/// One player row in the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Player {
    Known(KnownPlayer),
    /// The name could not be resolved to a real account.
    Nicked { nick: String },
    /// Stats lookup is in flight.
    Pending { username: String },
    /// Stats lookup failed for a reason other than nicking.
    Unknown { username: String },
}

/// One cell of a player row before styling.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Text(String),
    Number(CellValue),
    /// The stat cannot be known for this variant ("nick", "error", "-").
    Placeholder(&'static str),
}

impl Player {
    /// The name this player is displayed under. For nicked players that is
    /// the nick itself.
    pub fn username(&self) -> &str {
        match self {
            Player::Known(player) => &player.username,
            Player::Nicked { nick } => nick,
            Player::Pending { username } | Player::Unknown { username } => username,
        }
    }

    /// Every name this player is known by, used as cache keys.
    pub fn aliases(&self) -> Vec<&str> {
        match self {
            Player::Known(player) => match &player.nick {
                Some(nick) => vec![&player.username, nick],
                None => vec![&player.username],
            },
            Player::Nicked { nick } => vec![nick],
            Player::Pending { username } | Player::Unknown { username } => vec![username],
        }
    }

    /// True when the stats are known to be unobtainable (nicked or errored),
    /// as opposed to merely pending.
    pub fn stats_unknown(&self) -> bool {
        match self {
            Player::Known(_) | Player::Pending { .. } => false,
            Player::Nicked { .. } | Player::Unknown { .. } => true,
        }
    }

    /// The value displayed in the given column for this player.
    pub fn stat_value(&self, column: ColumnName) -> StatValue {
        let player = match self {
            Player::Known(player) => player,
            Player::Nicked { nick } => {
                return match column {
                    ColumnName::Username => StatValue::Text(nick.clone()),
                    _ => StatValue::Placeholder("nick"),
                };
            }
            Player::Pending { username } => {
                return match column {
                    ColumnName::Username => StatValue::Text(username.clone()),
                    _ => StatValue::Placeholder("-"),
                };
            }
            Player::Unknown { username } => {
                return match column {
                    ColumnName::Username => StatValue::Text(username.clone()),
                    _ => StatValue::Placeholder("error"),
                };
            }
        };

        match column {
            ColumnName::Username => StatValue::Text(match &player.nick {
                Some(nick) => format!("{} ({nick})", player.username),
                None => player.username.clone(),
            }),
            ColumnName::Stars => StatValue::Number(CellValue::Float(player.stars)),
            ColumnName::Index => StatValue::Number(CellValue::Float(player.stats.index)),
            ColumnName::Fkdr => StatValue::Number(CellValue::Float(player.stats.fkdr)),
            ColumnName::Kdr => StatValue::Number(CellValue::Float(player.stats.kdr)),
            ColumnName::Bblr => StatValue::Number(CellValue::Float(player.stats.bblr)),
            ColumnName::Wlr => StatValue::Number(CellValue::Float(player.stats.wlr)),
            ColumnName::Winstreak => match player.stats.winstreak {
                // Estimated winstreaks are marked with a tilde
                Some(winstreak) if player.stats.winstreak_accurate => {
                    StatValue::Text(winstreak.to_string())
                }
                Some(winstreak) => StatValue::Text(format!("~{winstreak}")),
                None => StatValue::Placeholder("-"),
            },
            ColumnName::Kills => StatValue::Number(CellValue::Int(player.stats.kills)),
            ColumnName::Finals => StatValue::Number(CellValue::Int(player.stats.finals)),
            ColumnName::Beds => StatValue::Number(CellValue::Int(player.stats.beds)),
            ColumnName::Wins => StatValue::Number(CellValue::Int(player.stats.wins)),
            ColumnName::Sessiontime => match player.sessiontime_seconds() {
                Some(seconds) => {
                    StatValue::Text(format_seconds_short(seconds, column.decimals()))
                }
                None => StatValue::Placeholder("-"),
            },
        }
    }

    /// Render the given column as the string shown in the table.
    pub fn render_stat(&self, column: ColumnName) -> String {
        match self.stat_value(column) {
            StatValue::Text(text) => text,
            StatValue::Placeholder(text) => text.to_owned(),
            StatValue::Number(CellValue::Int(value)) => value.to_string(),
            StatValue::Number(CellValue::Float(value)) => {
                truncate_float(value, column.decimals())
            }
        }
    }
}
