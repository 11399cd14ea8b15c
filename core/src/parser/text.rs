//! Text helpers shared by the line and chat-message parsers.

use memchr::memchr;
use tracing::debug;

/// Characters stripped from word boundaries before template comparison.
pub const PUNCTUATION_AND_WHITESPACE: &[char] = &['.', '!', ':', ',', ' ', '\t'];

/// Remove all rank tags (`[MVP++] `, `[VIP] `, ...) from a player string.
///
/// A rank is a bracketed run of ASCII letters and `+` followed by a single
/// space. Bracketed runs containing digits or other punctuation are left
/// alone so usernames quoted with literal brackets survive. The match is
/// deliberately permissive to cover ranks that do not exist yet, so other
/// bracketed tags (`[SHOUT] `, `[GREEN] `) are removed as well.
pub fn remove_ranks(playerstring: &str) -> String {
    let bytes = playerstring.as_bytes();
    let mut result = String::with_capacity(playerstring.len());
    let mut copied = 0;
    let mut search = 0;

    while search < bytes.len() {
        let Some(offset) = memchr(b'[', &bytes[search..]) else {
            break;
        };
        let start = search + offset;

        let mut end = start + 1;
        while end < bytes.len() && (bytes[end].is_ascii_alphabetic() || bytes[end] == b'+') {
            end += 1;
        }

        // At least one tag character, a closing bracket, and the trailing space
        if end > start + 1 && end + 1 < bytes.len() && bytes[end] == b']' && bytes[end + 1] == b' '
        {
            result.push_str(&playerstring[copied..start]);
            copied = end + 2;
            search = end + 2;
        } else {
            search = start + 1;
        }
    }

    result.push_str(&playerstring[copied..]);
    result
}

/// Remove Minecraft formatting codes (`§a`, `§l`, ...) from a string.
///
/// The section sign sometimes arrives mangled into U+FFFD by lossy
/// decoding, so that variant is stripped too.
pub fn remove_colors(string: &str) -> String {
    let mut result = String::with_capacity(string.len());
    let mut chars = string.chars().peekable();

    while let Some(c) = chars.next() {
        if (c == '§' || c == '\u{fffd}')
            && chars
                .peek()
                .is_some_and(|&next| matches!(next, '0'..='9' | 'a'..='f' | 'k'..='o' | 'r'))
        {
            chars.next();
            continue;
        }
        result.push(c);
    }

    result
}

/// Strip a trailing `[x<count>]` marker left by chat deduplication.
pub fn remove_deduplication_suffix(message: &str) -> &str {
    if !message.ends_with(']') {
        return message;
    }

    let (rest, last_word) = match message.rfind(' ') {
        Some(i) => (&message[..i], &message[i + 1..]),
        None => ("", message),
    };

    let Some(counter) = last_word
        .strip_prefix("[x")
        .and_then(|w| w.strip_suffix(']'))
    else {
        return message;
    };

    if !counter.is_empty() && counter.chars().all(char::is_numeric) {
        debug!(marker = last_word, "removed deduplication suffix");
        rest
    } else {
        message
    }
}

/// Compare `words` against the space separated words in `target`,
/// ignoring punctuation at either end.
pub fn words_match(words: &[&str], target: &str) -> bool {
    let joined = words.join(" ");
    let full_match = joined.trim_matches(PUNCTUATION_AND_WHITESPACE)
        == target.trim_matches(PUNCTUATION_AND_WHITESPACE);

    if !full_match {
        debug!(joined, target, "words do not match target");
    }

    full_match
}

/// True if `username` could be a real Minecraft username.
///
/// Officially usernames are 3-16 characters of `[0-9a-zA-Z_]`, but some
/// grandfathered accounts fall outside that, so the length bounds here
/// are the looser ones the uuid api accepts.
pub fn valid_username(username: &str) -> bool {
    let length = username.chars().count();
    if !(1..=25).contains(&length) {
        debug!(username, "invalid username length");
        return false;
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_')
    {
        debug!(username, "illegal characters in username");
        return false;
    }

    true
}
