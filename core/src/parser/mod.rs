//! Log line parsing.
//!
//! Every launcher wraps chat output in its own transport prefix, so a
//! line is first classified by prefix and only then is the payload
//! parsed. Chat payloads are user controlled: a player can type text
//! that *contains* a chat prefix, so among candidate chat prefixes the
//! one ending earliest in the line wins. Client info lines are written
//! by the client itself and some prefixes are substrings of others, so
//! there the latest-ending match wins.

pub mod chat;
pub mod text;


pub use chat::parse_chat_message;

use memchr::memmem;
use tracing::debug;

use crate::events::Event;
use text::valid_username;

// [22:02:22] [Client thread/INFO]: Setting user: Player1
const CLIENT_INFO_PREFIXES: [&str; 6] = [
    "(Client thread) Info ",
    "[Client thread/INFO]: ",
    "INFO]: [LC] ",
    "[Render thread/INFO]: ",
    "[Client thread/INFO]: [LC] ",
    "[Client thread/INFO] [Alpine Client/]: ",
];

// [22:02:44] [Client thread/INFO]: [CHAT] Player1 has joined (1/16)!
const CHAT_PREFIXES: [&str; 5] = [
    "(Client thread) Info [CHAT] ",
    "[Client thread/INFO]: [CHAT] ",
    "[Render thread/INFO]: [CHAT] ",
    "[Render thread/INFO]: [System] [CHAT] ",
    "[Astolfo HTTP Bridge]: [CHAT] ",
];

/// Parse a single log line into an event.
///
/// Total over all inputs: unrecognized or malformed lines yield `None`,
/// never an error.
pub fn parse_logline(line: &str) -> Option<Event> {
    if let Some(end) = lowest_prefix_end(line, &CHAT_PREFIXES) {
        return parse_chat_message(line[end..].trim_end());
    }

    if let Some(end) = alpine_chat_prefix_end(line) {
        return parse_chat_message(line[end..].trim_end());
    }

    if let Some(end) = netty_chat_prefix_end(line) {
        return parse_chat_message(line[end..].trim_end());
    }

    if let Some(end) = highest_prefix_end(line, &CLIENT_INFO_PREFIXES) {
        return parse_client_info(line[end..].trim_end());
    }

    None
}

fn parse_client_info(info: &str) -> Option<Event> {
    // Vanilla and most launchers: Setting user: <username>
    if let Some(username) = info.strip_prefix("Setting user: ") {
        return Some(Event::InitializeAs {
            username: username.to_string(),
        });
    }

    // Lunar: Setting account (name=<username>, uuid=<uuid>, ...)
    if let Some(suffix) = info.strip_prefix("Setting account (name=") {
        let Some(comma_index) = suffix.find(',') else {
            debug!(info, "missing comma after account name");
            return None;
        };

        let username = &suffix[..comma_index];
        if !valid_username(username) {
            return None;
        }

        return Some(Event::InitializeAs {
            username: username.to_string(),
        });
    }

    None
}

/// End index of the earliest-ending prefix present in the line.
fn lowest_prefix_end(line: &str, prefixes: &[&str]) -> Option<usize> {
    prefixes
        .iter()
        .filter_map(|prefix| {
            memmem::find(line.as_bytes(), prefix.as_bytes()).map(|start| start + prefix.len())
        })
        .min()
}

/// End index of the latest-ending prefix present in the line.
fn highest_prefix_end(line: &str, prefixes: &[&str]) -> Option<usize> {
    prefixes
        .iter()
        .filter_map(|prefix| {
            memmem::find(line.as_bytes(), prefix.as_bytes()).map(|start| start + prefix.len())
        })
        .max()
}

// [22:02:44] [Client thread/INFO] [AlpineClient/0.1]: [CHAT] ONLINE: Player1
fn alpine_chat_prefix_end(line: &str) -> Option<usize> {
    // The version segment varies, so the prefix is matched piecewise on
    // a lowercased copy. Lowercasing is ascii-only, which keeps byte
    // offsets valid in the original line.
    let lower = line.to_ascii_lowercase();
    if !lower.contains("alpine") {
        return None;
    }

    const HEAD: &[u8] = b"[client thread/info] [alpine";
    const TAIL: &[u8] = b"]: [chat] ";

    let bytes = lower.as_bytes();
    let head_start = memmem::find(bytes, HEAD)?;

    let mut cursor = head_start + HEAD.len();
    if bytes.get(cursor) == Some(&b' ') {
        cursor += 1;
    }
    if !bytes[cursor..].starts_with(b"client") {
        return None;
    }
    cursor += b"client".len();

    let tail_start = memmem::rfind(&bytes[cursor..], TAIL)?;
    Some(cursor + tail_start + TAIL.len())
}

// [22:02:44] [Netty Client IO #2/INFO]: [CHAT] Player1 has joined (1/16)!
fn netty_chat_prefix_end(line: &str) -> Option<usize> {
    const CLIENT_FRAGMENT: &str = "[Netty Client IO #";
    const CHAT_FRAGMENT: &str = "/INFO]: [CHAT] ";

    let bytes = line.as_bytes();
    let chat_index = memmem::find(bytes, CHAT_FRAGMENT.as_bytes())?;
    let client_index = memmem::find(bytes, CLIENT_FRAGMENT.as_bytes())?;

    if client_index >= chat_index {
        return None;
    }
    // Only the io thread number sits between the fragments
    if chat_index.saturating_sub(client_index + CLIENT_FRAGMENT.len()) > 3 {
        return None;
    }

    Some(chat_index + CHAT_FRAGMENT.len())
}
