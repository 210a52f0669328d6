//! IRC line parsing
//!
//! Only `PRIVMSG` lines matter to the monitor; every other command is skipped.

use actmon_core::is_channel;
use thiserror::Error;

/// Errors from message ingestion
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Malformed line: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A chat message addressed to a channel or a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender prefix (`nick!user@host`), if present
    pub prefix: Option<String>,
    /// Channel or nickname the message was sent to
    pub target: String,
    pub text: String,
}

impl InboundMessage {
    /// Nickname part of the sender prefix
    pub fn nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.split(['!', '@']).next().unwrap_or(p))
            .filter(|n| !n.is_empty())
    }

    /// Whether the message was sent to a channel
    pub fn is_channel_message(&self) -> bool {
        is_channel(&self.target)
    }
}

/// Parse one raw protocol line.
///
/// Returns `Ok(None)` for blank lines and commands other than `PRIVMSG`.
pub fn parse_line(line: &str) -> Result<Option<InboundMessage>, IngestError> {
    let mut rest = line.trim_end_matches(['\r', '\n']).trim_start();
    if rest.is_empty() {
        return Ok(None);
    }

    // IRCv3 message tags
    if rest.starts_with('@') {
        rest = split_token(rest).1;
    }

    let mut prefix = None;
    if let Some(stripped) = rest.strip_prefix(':') {
        let (p, remainder) = split_token(stripped);
        if p.is_empty() || remainder.is_empty() {
            return Err(IngestError::Malformed(line.to_string()));
        }
        prefix = Some(p.to_string());
        rest = remainder;
    }

    let (command, params) = split_token(rest);
    if !command.eq_ignore_ascii_case("PRIVMSG") {
        return Ok(None);
    }

    let (target, text) = split_token(params);
    if target.is_empty() || target.starts_with(':') {
        return Err(IngestError::Malformed(line.to_string()));
    }
    let text = text.strip_prefix(':').unwrap_or(text);

    Ok(Some(InboundMessage {
        prefix,
        target: target.to_string(),
        text: text.to_string(),
    }))
}

fn split_token(s: &str) -> (&str, &str) {
    match s.split_once(' ') {
        Some((head, tail)) => (head, tail.trim_start_matches(' ')),
        None => (s, ""),
    }
}

/// Channel named by an `!activity [<channel>]` query, if `text` is one.
///
/// The argument must itself be a channel; anything else is not a query.
pub fn parse_activity_query<'a>(text: &'a str, target: &'a str) -> Option<&'a str> {
    let mut words = text.split_whitespace();
    if words.next()? != "!activity" {
        return None;
    }

    match words.next() {
        Some(channel) if is_channel(channel) => Some(channel),
        Some(_) => None,
        None if is_channel(target) => Some(target),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_message() {
        let msg = parse_line(":alice!a@example.org PRIVMSG #rust :hello there\r\n")
            .unwrap()
            .unwrap();

        assert_eq!(msg.prefix.as_deref(), Some("alice!a@example.org"));
        assert_eq!(msg.nick(), Some("alice"));
        assert_eq!(msg.target, "#rust");
        assert_eq!(msg.text, "hello there");
        assert!(msg.is_channel_message());
    }

    #[test]
    fn test_parse_without_prefix_or_colon() {
        let msg = parse_line("PRIVMSG bob hi").unwrap().unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.nick(), None);
        assert_eq!(msg.target, "bob");
        assert_eq!(msg.text, "hi");
        assert!(!msg.is_channel_message());
    }

    #[test]
    fn test_parse_with_tags() {
        let msg = parse_line("@time=2020-01-01T00:00:00Z :n!u@h privmsg #a :x")
            .unwrap()
            .unwrap();
        assert_eq!(msg.target, "#a");
    }

    #[test]
    fn test_other_commands_are_skipped() {
        assert!(parse_line(":server 001 nick :Welcome").unwrap().is_none());
        assert!(parse_line("PING :server").unwrap().is_none());
        assert!(parse_line(":n!u@h JOIN #rust").unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(parse_line(":prefixonly"), Err(IngestError::Malformed(_))));
        assert!(matches!(parse_line("PRIVMSG"), Err(IngestError::Malformed(_))));
        assert!(matches!(parse_line("PRIVMSG :text"), Err(IngestError::Malformed(_))));
    }

    #[test]
    fn test_activity_query() {
        assert_eq!(parse_activity_query("!activity", "#rust"), Some("#rust"));
        assert_eq!(parse_activity_query("!activity #go", "#rust"), Some("#go"));
        assert_eq!(parse_activity_query("!activity #go", "bot"), Some("#go"));
        assert_eq!(parse_activity_query("!activity", "bot"), None);
        assert_eq!(parse_activity_query("!activity alice", "bot"), None);
        assert_eq!(parse_activity_query("!activity alice", "#rust"), None);
        assert_eq!(parse_activity_query("what is !activity", "#rust"), None);
        assert_eq!(parse_activity_query("", "#rust"), None);
    }
}
