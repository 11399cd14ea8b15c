/// One parsed log line.
///
/// Every variant is produced from exactly one physical line; the party
/// roster dump is the only multi-line exchange, and each of its lines
/// still parses independently (`PartyListIncoming` header followed by
/// one `PartyMembershipList` per role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Client lifecycle
    InitializeAs {
        username: String,
    },
    NewNickname {
        nick: String,
    },

    // Lobby changes
    LobbySwap,
    LobbyJoin {
        username: String,
        player_count: usize,
        player_cap: usize,
    },
    LobbyLeave {
        username: String,
    },
    /// Full roster snapshot from /who. Highest-trust event.
    LobbyList {
        usernames: Vec<String>,
    },

    // Party changes
    PartyAttach {
        username: String,
    },
    PartyDetach,
    PartyJoin {
        usernames: Vec<String>,
    },
    PartyLeave {
        usernames: Vec<String>,
    },
    /// Header of the /party list response
    PartyListIncoming,
    PartyMembershipList {
        usernames: Vec<String>,
        role: PartyRole,
    },

    // Game lifecycle
    BedwarsGameStartingSoon {
        seconds: u32,
    },
    StartBedwarsGame,
    EndBedwarsGame,

    // In-game deaths and reconnects
    BedwarsFinalKill {
        dead_player: String,
        raw_message: String,
    },
    BedwarsDisconnect {
        username: String,
    },
    BedwarsReconnect {
        username: String,
    },

    // Whisper command responses
    WhisperCommandSetNick {
        nick: String,
        username: Option<String>,
    },

    /// Ordinary chat of the shape `Name: text`. Parsed last so every
    /// templated pattern gets a chance first.
    ChatMessage {
        username: String,
        message: String,
    },
}

/// Role heading in a /party list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Leader,
    Moderators,
    Members,
}

impl PartyRole {
    /// All roles, in the order the party list prints them.
    pub const ALL: [PartyRole; 3] = [PartyRole::Leader, PartyRole::Moderators, PartyRole::Members];

    /// The `Party <Role>: ` line prefix announcing this role's members.
    pub fn line_prefix(&self) -> &'static str {
        match self {
            PartyRole::Leader => "Party Leader: ",
            PartyRole::Moderators => "Party Moderators: ",
            PartyRole::Members => "Party Members: ",
        }
    }
}
