//! Stat column identifiers.
//!
//! The same set of names is used for the sort-order setting, the column
//! layout setting, and the per-column stat accessors, so it lives here
//! where both the core library and front-ends can reach it.

use serde::{Deserialize, Serialize};

/// A displayable (and sortable) stat column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnName {
    /// Player name, with the nick in parentheses when resolved through one
    Username,
    /// Bedwars star level, fractional
    Stars,
    /// stars * fkdr^2
    #[default]
    Index,
    /// Final kills / final deaths
    Fkdr,
    /// Kills / deaths
    Kdr,
    /// Beds broken / beds lost
    Bblr,
    /// Wins / losses
    Wlr,
    /// Current winstreak, when known
    Winstreak,
    Kills,
    Finals,
    Beds,
    Wins,
    /// Time since the current login, when online
    Sessiontime,
}

/// Every column in canonical display order.
pub const ALL_COLUMNS: [ColumnName; 13] = [
    ColumnName::Username,
    ColumnName::Stars,
    ColumnName::Index,
    ColumnName::Fkdr,
    ColumnName::Kdr,
    ColumnName::Bblr,
    ColumnName::Wlr,
    ColumnName::Winstreak,
    ColumnName::Kills,
    ColumnName::Finals,
    ColumnName::Beds,
    ColumnName::Wins,
    ColumnName::Sessiontime,
];

/// Column layout used when the settings file has none.
pub const DEFAULT_COLUMN_ORDER: [ColumnName; 6] = [
    ColumnName::Username,
    ColumnName::Stars,
    ColumnName::Fkdr,
    ColumnName::Kdr,
    ColumnName::Winstreak,
    ColumnName::Sessiontime,
];

impl ColumnName {
    /// Header text shown above this column.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Username => "IGN (Nick)",
            Self::Stars => "Stars",
            Self::Index => "Index",
            Self::Fkdr => "FKDR",
            Self::Kdr => "KDR",
            Self::Bblr => "BBLR",
            Self::Wlr => "WLR",
            Self::Winstreak => "WS",
            Self::Kills => "Kills",
            Self::Finals => "Finals",
            Self::Beds => "Beds",
            Self::Wins => "Wins",
            Self::Sessiontime => "Time",
        }
    }

    /// Decimal places shown for this column. Ratios get two, counts none.
    pub fn decimals(&self) -> usize {
        match self {
            Self::Stars | Self::Fkdr | Self::Kdr | Self::Bblr | Self::Wlr => 2,
            Self::Username
            | Self::Index
            | Self::Winstreak
            | Self::Kills
            | Self::Finals
            | Self::Beds
            | Self::Wins
            | Self::Sessiontime => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct SortConfig {
        sort_order: ColumnName,
        column_order: Vec<ColumnName>,
    }

    #[test]
    fn test_column_name_toml_roundtrip() {
        let config = SortConfig {
            sort_order: ColumnName::Index,
            column_order: DEFAULT_COLUMN_ORDER.to_vec(),
        };
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("sort_order = \"index\""));
        assert!(serialized.contains("\"sessiontime\""));

        let parsed: SortConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.sort_order, ColumnName::Index);
        assert_eq!(parsed.column_order, DEFAULT_COLUMN_ORDER.to_vec());
    }

    #[test]
    fn test_column_name_from_snake_case() {
        let parsed: SortConfig =
            toml::from_str("sort_order = \"fkdr\"\ncolumn_order = [\"username\", \"wlr\"]")
                .unwrap();
        assert_eq!(parsed.sort_order, ColumnName::Fkdr);
        assert_eq!(
            parsed.column_order,
            vec![ColumnName::Username, ColumnName::Wlr]
        );
    }

    #[test]
    fn test_unknown_column_name_rejected() {
        let result: Result<SortConfig, _> =
            toml::from_str("sort_order = \"tags\"\ncolumn_order = []");
        assert!(result.is_err());
    }

    #[test]
    fn test_headers_unique() {
        for (i, a) in ALL_COLUMNS.iter().enumerate() {
            for b in &ALL_COLUMNS[i + 1..] {
                assert_ne!(a.header(), b.header());
            }
        }
    }
}
