//! Log line classification: which lines are worth relaying, and how to
//! rewrite them for a public audience.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

/// Only main-thread info lines are candidates (unless allow-listed).
pub const SERVER_INFO_MARKER: &str = "] [Server thread/INFO]";

/// Substrings that make a line relayable regardless of anything else.
pub const ALLOW_LIST: &[&str] = &["has made the advancement", "[Async Chat Thread"];

/// Substrings that suppress an otherwise relayable server line.
pub const DENY_LIST: &[&str] = &[
    // command echoes
    "issued server command: /me",
    "issued server command: /tell",
    "issued server command: /help",
    "issued server command: /w",
    "issued server command: /msg",
    // startup
    "Preparing spawn area",
    "Preparing start",
    "Time elapsed:",
    "permissions.yml",
    // plugin banners
    "[TabTPS]",
    "[BlueMap]",
    "[spark]",
    "[MoonriseCommon]",
    "[ChunkTaskScheduler]",
    "Paper:",
    "[SpigotLibraryLoader]",
    // join/leave
    " left the game",
    " logged in with entity id",
    "lost connection",
    // performance
    "Can't keep up! Is the server overloaded?",
    "moved too quickly",
    "Skipping update ",
    // our own relay traffic
    "[Telegram]",
    "[Hibernate]",
    "RCON",
];

/// Remnant of an ANSI reset sequence whose escape byte was already dropped.
const ANSI_RESET_REMNANT: &str = "[m";

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\d+:\d+:\d+\] \[[^\]]+\]:\s+").expect("static header regex must compile")
});

static HEADER_PARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d+):(\d+):(\d+)\] \[([^\]]+)\]:")
        .expect("static header regex must compile")
});

static IP_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[/\d+\.\d+\.\d+\.\d+:\d+\]").expect("static ip regex must compile")
});

/// Decide whether a raw log line should be relayed to chat.
pub fn should_emit(line: &str) -> bool {
    if ALLOW_LIST.iter().any(|s| line.contains(s)) {
        return true;
    }
    if !line.contains(SERVER_INFO_MARKER) {
        return false;
    }
    !DENY_LIST.iter().any(|s| line.contains(s))
}

/// Rewrite a relayable line into its public form.
///
/// Strips the `[H:MM:SS] [thread]: ` header, every `[/a.b.c.d:port]` tag and
/// every `[m` remnant. Rewrites repeat until the text is stable, so
/// `clean(clean(x)) == clean(x)`.
pub fn clean(line: &str) -> String {
    let mut current = clean_once(line);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(line: &str) -> String {
    let without_header = HEADER_RE.replace(line, "");
    let without_ip = IP_TAG_RE.replace_all(&without_header, "");
    without_ip.replace(ANSI_RESET_REMNANT, "")
}

/// Extract the timestamp and thread tag from a line's header, if it has one.
pub fn parse_header(line: &str) -> (Option<NaiveTime>, Option<&str>) {
    let Some(caps) = HEADER_PARTS_RE.captures(line) else {
        return (None, None);
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let timestamp = match (field(1), field(2), field(3)) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s),
        _ => None,
    };
    let thread = caps.get(4).map(|m| m.as_str());
    (timestamp, thread)
}
