//! Lobby, party and queue tracking.
//!
//! [`OverlayState`] is a plain snapshot of everything derived from the log so
//! far. Transitions live in [`crate::events::processor`]; this module only
//! provides the snapshot and its builder methods.

use std::time::Instant;

use hashbrown::HashSet;
use tracing::{info, warn};


/// Snapshot of the tracked game state.
///
/// Never mutated in place. Every builder method consumes the snapshot and
/// returns its successor, so callers can hold on to the previous value and
/// compare states for equality in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    /// Current party roster. Contains our own username whenever it is known.
    pub party_members: HashSet<String>,
    /// Everyone known to be in the current lobby or game.
    pub lobby_players: HashSet<String>,
    /// Lobby players that have not been final killed or disconnected.
    /// Always a subset of `lobby_players`.
    pub alive_players: HashSet<String>,
    /// True when the tracked roster disagrees with server-reported counts.
    pub out_of_sync: bool,
    /// True between queueing for a game and that game starting.
    pub in_queue: bool,
    pub own_username: Option<String>,
    /// When the current game started. `None` means we are not in a game.
    pub last_game_start: Option<Instant>,
}

impl OverlayState {
    pub fn new(own_username: Option<String>) -> Self {
        let party_members = own_username.iter().cloned().collect();
        Self {
            party_members,
            own_username,
            ..Self::default()
        }
    }

    /// True while a game is running.
    pub fn in_game(&self) -> bool {
        self.last_game_start.is_some()
    }

    /// Time elapsed since the current game started.
    pub fn time_in_game(&self) -> Option<std::time::Duration> {
        self.last_game_start.map(|start| start.elapsed())
    }

    /// Enter the queue for a new game.
    ///
    /// Entering a fresh queue discards the previous lobby, unless the roster
    /// is still pristine (nobody marked dead). That happens when the user runs
    /// the who command before the join messages arrive, and in that case the
    /// roster is likely already correct for the new game.
    pub fn join_queue(self) -> Self {
        if self.in_queue {
            return self;
        }

        info!("joining a new queue");
        let base = if self.lobby_players == self.alive_players {
            self
        } else {
            self.clear_lobby()
        };

        Self {
            in_queue: true,
            ..base
        }
    }

    /// Leave the queue. A game starting counts as leaving the queue.
    pub fn leave_queue(self) -> Self {
        info!("leaving the queue");
        Self {
            in_queue: false,
            ..self
        }
    }

    /// Record that a game just started.
    pub fn join_game(self) -> Self {
        Self {
            last_game_start: Some(Instant::now()),
            ..self
        }
    }

    /// Record that the current game is over.
    pub fn leave_game(self) -> Self {
        Self {
            last_game_start: None,
            ..self
        }
    }

    pub fn add_to_party(mut self, username: &str) -> Self {
        self.party_members.insert(username.to_owned());
        self
    }

    pub fn remove_from_party(mut self, username: &str) -> Self {
        if !self.party_members.remove(username) {
            warn!(username, "tried removing player from party, but they were not in it");
        }
        self
    }

    /// Remove everyone but ourselves from the party.
    pub fn clear_party(mut self) -> Self {
        info!("clearing the party");
        self.party_members.clear();
        match &self.own_username {
            Some(own_username) => {
                self.party_members.insert(own_username.clone());
            }
            None => warn!("own username is not set, party is now empty"),
        }
        self
    }

    /// Add the given username to the lobby and mark them alive.
    pub fn add_to_lobby(mut self, username: &str) -> Self {
        self.lobby_players.insert(username.to_owned());
        self.alive_players.insert(username.to_owned());
        self
    }

    pub fn remove_from_lobby(mut self, username: &str) -> Self {
        if !self.lobby_players.remove(username) {
            warn!(username, "tried removing player from lobby, but they were not in it");
        }
        if !self.alive_players.remove(username) {
            warn!(username, "tried removing player from lobby, but they were not alive");
        }
        self
    }

    /// Replace the lobby roster, marking every listed player alive.
    pub fn set_lobby(self, usernames: Vec<String>) -> Self {
        let lobby_players: HashSet<String> = usernames.into_iter().collect();
        Self {
            alive_players: lobby_players.clone(),
            lobby_players,
            ..self
        }
    }

    /// Remove all players from the lobby.
    pub fn clear_lobby(self) -> Self {
        // Our own name is left out on purpose. It usually arrives as a join
        // message anyway, and we may be nicked.
        self.set_lobby(Vec::new())
    }

    /// Mark the given player as dead.
    ///
    /// A final kill for a player we never saw join means the who command was
    /// not run this game. Backfill them into the lobby so the roster stays a
    /// superset of the alive set.
    pub fn mark_dead(mut self, username: &str) -> Self {
        if !self.lobby_players.contains(username) {
            warn!(username, "marking player dead, but they were not in the lobby. Adding them");
            self.lobby_players.insert(username.to_owned());
        }

        if !self.alive_players.remove(username) {
            warn!(username, "tried marking player dead, but they were not alive");
        }
        self
    }

    /// Mark the given player as alive, backfilling the lobby if needed.
    pub fn mark_alive(mut self, username: &str) -> Self {
        if !self.alive_players.insert(username.to_owned()) {
            warn!(username, "tried marking player alive, but they already were");
        }

        if !self.lobby_players.contains(username) {
            warn!(username, "marked player alive, but they were not in the lobby. Adding them");
            self.lobby_players.insert(username.to_owned());
        }
        self
    }

    pub fn set_out_of_sync(self, out_of_sync: bool) -> Self {
        if self.out_of_sync == out_of_sync {
            return self;
        }
        Self {
            out_of_sync,
            ..self
        }
    }
}
