//! Chat message parsing.
//!
//! Tests the message against an ordered list of templates, first match
//! wins. The order is load bearing: specific templates sit above the
//! substring checks they would otherwise cross-match (`"You'll be
//! partying with: "` before the generic `" joined the party"`), and the
//! generic `Name: message` chat shape is tried dead last. Malformed
//! near-matches fail the word-by-word target check and yield `None`
//! rather than a partially populated event.

use tracing::debug;

use super::text::{
    PUNCTUATION_AND_WHITESPACE, remove_colors, remove_deduplication_suffix, remove_ranks,
    valid_username, words_match,
};
use crate::events::{Event, PartyRole};

/// Parse a chat message into an event.
///
/// The message must already be stripped of its `... [CHAT] ` prefix.
pub fn parse_chat_message(message: &str) -> Option<Event> {
    debug!(message, "chat message");

    let message = remove_colors(remove_deduplication_suffix(message));
    let message = message.as_str();

    // Lobby changes

    if let Some(suffix) = message.strip_prefix("ONLINE: ") {
        // ONLINE: <username1>, <username2>, ..., <usernameN>
        let usernames = suffix.split(", ").map(String::from).collect();
        return Some(Event::LobbyList { usernames });
    }

    if message.starts_with("You are now nicked as ") {
        // You are now nicked as AmazingNick!
        let words: Vec<&str> = message.split(' ').collect();
        if !words_match(&words[..words.len() - 1], "You are now nicked as") {
            return None;
        }

        let nick = words[words.len() - 1].trim_matches(PUNCTUATION_AND_WHITESPACE);
        return Some(Event::NewNickname {
            nick: nick.to_string(),
        });
    }

    if message.starts_with("Sending you to ") {
        return Some(Event::LobbySwap);
    }

    if message.trim_matches(PUNCTUATION_AND_WHITESPACE)
        == "You were sent to a lobby because someone in your party left"
    {
        return Some(Event::LobbySwap);
    }

    if message.starts_with("The game starts in ") {
        // The game starts in 5 seconds!
        let words: Vec<&str> = message.split(' ').collect();
        if words.len() != 6 {
            return None;
        }

        let unit = words[5].trim_matches(PUNCTUATION_AND_WHITESPACE);
        if unit != "second" && unit != "seconds" {
            debug!("last two words invalid");
            return None;
        }
        if !words[4].bytes().all(|b| b.is_ascii_digit()) {
            debug!("last two words invalid");
            return None;
        }

        let seconds = words[4].parse().ok()?;
        return Some(Event::BedwarsGameStartingSoon { seconds });
    }

    // This header also appears at the end of a game, before the 1st
    // Killer line is sent
    if message.trim().starts_with("Bed Wars") {
        if message.trim().starts_with("Bed Wars Duels") {
            return None;
        }
        return Some(Event::StartBedwarsGame);
    }

    if message
        .trim_matches(PUNCTUATION_AND_WHITESPACE)
        .ends_with("FINAL KILL")
        && message.matches(' ').count() > 2
    {
        // The message starts with the dead player's name, so there is
        // little to validate against. Best effort.
        let words: Vec<&str> = message.split(' ').collect();
        if words.len() >= 4 && words[1] == ">" {
            // Party > Player1: inc please void FINAL KILL!
            return None;
        }

        let dead_player = words[0];
        if !valid_username(dead_player) {
            return None;
        }

        return Some(Event::BedwarsFinalKill {
            dead_player: dead_player.to_string(),
            raw_message: message.to_string(),
        });
    }

    if message
        .trim_matches(PUNCTUATION_AND_WHITESPACE)
        .ends_with("disconnected")
        && message.matches(' ').count() == 1
    {
        // Player1 disconnected.
        let (username, _) = message.split_once(' ')?;
        if !valid_username(username) {
            return None;
        }

        return Some(Event::BedwarsDisconnect {
            username: username.to_string(),
        });
    }

    if message
        .trim_matches(PUNCTUATION_AND_WHITESPACE)
        .ends_with("reconnected")
        && message.matches(' ').count() == 1
    {
        // Player1 reconnected.
        let (username, _) = message.split_once(' ')?;
        if !valid_username(username) {
            return None;
        }

        return Some(Event::BedwarsReconnect {
            username: username.to_string(),
        });
    }

    if message.trim().starts_with("1st Killer") {
        //                     1st Killer - [MVP+] Player1 - 7
        return Some(Event::EndBedwarsGame);
    }

    if message.contains(" has joined (") {
        // <username> has joined (<x>/<N>)!
        let words: Vec<&str> = message.split(' ').collect();
        if words.len() < 4 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[1..3], "has joined") {
            return None;
        }

        let username = words[0];
        let Some((player_count, player_cap)) = parse_lobby_fill(words[3]) else {
            debug!(fill = words[3], "fill string does not match '(x/N)!'");
            return None;
        };

        return Some(Event::LobbyJoin {
            username: username.to_string(),
            player_count,
            player_cap,
        });
    }

    if message.contains(" has quit") {
        // <username> has quit!
        let words: Vec<&str> = message.split(' ').collect();
        if words.len() < 3 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[1..3], "has quit!") {
            return None;
        }

        return Some(Event::LobbyLeave {
            username: words[0].to_string(),
        });
    }

    // Party changes

    if message.starts_with("You left the party") {
        return Some(Event::PartyDetach);
    }

    if message.starts_with("You are not currently in a party") {
        return Some(Event::PartyDetach);
    }

    if message.trim_matches(PUNCTUATION_AND_WHITESPACE)
        == "The party was disbanded because all invites expired and the party was empty"
    {
        return Some(Event::PartyDetach);
    }

    if message.contains(" has disbanded the party") {
        // [MVP++] Player1 has disbanded the party!
        let clean = remove_ranks(message);
        let words: Vec<&str> = clean.split(' ').collect();
        if words.len() < 5 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[1..], "has disbanded the party!") {
            return None;
        }

        return Some(Event::PartyDetach);
    }

    if message.starts_with("You have been kicked from the party by ") {
        return Some(Event::PartyDetach);
    }

    if let Some(suffix) = message.strip_prefix("You have joined ") {
        // You have joined [MVP++] <username>'s party!
        let Some(apostrophe_index) = suffix.find('\'') else {
            debug!(message, "could not find apostrophe");
            return None;
        };

        let username = remove_ranks(&suffix[..apostrophe_index]);
        return Some(Event::PartyAttach { username });
    }

    if let Some(suffix) = message.strip_prefix("You'll be partying with: ") {
        // You'll be partying with: Player2, [MVP++] Player3, [MVP+] Player4
        let names = remove_ranks(suffix);
        return Some(Event::PartyJoin {
            usernames: names.split(", ").map(String::from).collect(),
        });
    }

    if message.contains(" joined the party") {
        // [VIP+] <username> joined the party.
        let suffix = remove_ranks(message);
        let words: Vec<&str> = suffix.split(' ').collect();
        if words.len() < 4 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[1..4], "joined the party.") {
            return None;
        }

        return Some(Event::PartyJoin {
            usernames: vec![words[0].to_string()],
        });
    }

    if message.contains(" has left the party") {
        // [VIP+] <username> has left the party.
        let suffix = remove_ranks(message);
        let words: Vec<&str> = suffix.split(' ').collect();
        if words.len() < 5 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[1..5], "has left the party.") {
            return None;
        }

        return Some(Event::PartyLeave {
            usernames: vec![words[0].to_string()],
        });
    }

    if message.contains(" has been removed from the party") {
        // [VIP+] <username> has been removed from the party.
        let suffix = remove_ranks(message);
        let words: Vec<&str> = suffix.split(' ').collect();
        if words.len() < 7 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[1..], "has been removed from the party.") {
            return None;
        }

        return Some(Event::PartyLeave {
            usernames: vec![words[0].to_string()],
        });
    }

    if message.contains(" was removed from the party because they disconnected")
        || message.contains(" was removed from your party because they disconnected")
    {
        // [MVP+] Player1 was removed from the party because they disconnected
        let cleaned = remove_ranks(message);
        let words: Vec<&str> = cleaned.split(' ').collect();
        if words.len() < 9 {
            debug!("message is too short");
            return None;
        }
        if !words_match(
            &words[1..],
            "was removed from the party because they disconnected",
        ) && !words_match(
            &words[1..],
            "was removed from your party because they disconnected.",
        ) {
            return None;
        }

        return Some(Event::PartyLeave {
            usernames: vec![words[0].to_string()],
        });
    }

    if message.starts_with("Kicked ") && message.contains(" because they were offline") {
        // Kicked [VIP] <username1>, <username2> because they were offline.
        let cleaned = remove_ranks(&message["Kicked ".len()..]);
        let words: Vec<&str> = cleaned.split(' ').collect();
        if words.len() < 5 {
            debug!("message is too short");
            return None;
        }
        if !words_match(&words[words.len() - 4..], "because they were offline.") {
            return None;
        }

        let usernames = words[..words.len() - 4].join(" ");
        return Some(Event::PartyLeave {
            usernames: usernames.split(", ").map(String::from).collect(),
        });
    }

    if let Some(suffix) = message.strip_prefix("The party was transferred to ") {
        // ... transferred to [VIP] <someone> because [MVP++] <username> left
        let without_ranks = remove_ranks(suffix);
        let words: Vec<&str> = without_ranks.split(' ').collect();
        if words.len() < 4 {
            debug!("message is too short");
            return None;
        }

        // Every other word should be <someone> because <username> left
        let odd_words: Vec<&str> = words.iter().copied().skip(1).step_by(2).collect();
        if !words_match(&odd_words, "because left") {
            return None;
        }

        return Some(Event::PartyLeave {
            usernames: vec![words[2].to_string()],
        });
    }

    if message.starts_with("Party Members (") {
        // Party Members (<n>) - response from /party list
        return Some(Event::PartyListIncoming);
    }

    for role in PartyRole::ALL {
        // Party <Role>: [MVP++] <username> ●
        let Some(suffix) = message.strip_prefix(role.line_prefix()) else {
            continue;
        };

        let dirty_string = remove_ranks(suffix);
        let clean_string = dirty_string
            .trim()
            .replace(" \u{25cf}", "") // Online orb
            .replace(" ?", "") // Orb mangled by the console encoding
            .replace(" \u{fffd}", ""); // Orb mangled by lossy decoding

        let usernames = clean_string.split(' ').map(String::from).collect();
        return Some(Event::PartyMembershipList { usernames, role });
    }

    if let Some(command) = message.strip_prefix("Can't find a player by the name of '!") {
        // Response to a whisper sent to an invalid username, used as a
        // makeshift command interface: /w !<nick>=<username>
        if command.is_empty() {
            debug!("whisper command too short");
            return None;
        }
        let Some(command) = command.strip_suffix('\'') else {
            debug!("whisper command missing closing '");
            return None;
        };

        if command.contains('=') {
            let arguments: Vec<&str> = command.split('=').collect();
            if arguments.len() != 2 {
                debug!("whisper setnick command got too many arguments");
                return None;
            }

            let (nick, username) = (arguments[0], arguments[1]);
            return Some(Event::WhisperCommandSetNick {
                nick: nick.to_string(),
                username: (!username.is_empty()).then(|| username.to_string()),
            });
        }

        return None;
    }

    if let Some(colon_index) = message.find(':') {
        // §7Player1§7: gl to all (colors are stripped at this point)
        let username = remove_ranks(&message[..colon_index]);
        if !valid_username(&username) {
            return None;
        }

        if message.len() <= colon_index + 1 || message.as_bytes()[colon_index + 1] != b' ' {
            debug!("no space after colon");
            return None;
        }

        let player_message = &message[colon_index + 2..];
        return Some(Event::ChatMessage {
            username,
            message: player_message.to_string(),
        });
    }

    None
}

/// Parse a lobby fill string of the exact shape `(<count>/<cap>)!`.
fn parse_lobby_fill(fill: &str) -> Option<(usize, usize)> {
    let inner = fill.strip_prefix('(')?.strip_suffix(")!")?;
    let (count, cap) = inner.split_once('/')?;

    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if cap.is_empty() || !cap.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some((count.parse().ok()?, cap.parse().ok()?))
}
