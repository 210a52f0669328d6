//! Channel keys
//!
//! Channel names are folded with the RFC 1459 case mapping so that
//! `#Rust` and `#rust` share one counter. Keys are otherwise opaque.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading characters that mark a message target as a channel
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Normalized channel identifier used as the registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Fold a channel name with the RFC 1459 case mapping
    pub fn normalize(name: &str) -> Self {
        Self(name.chars().map(fold_char).collect())
    }

    /// Use `raw` verbatim, without case folding
    pub fn verbatim(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn fold_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        c => c.to_ascii_lowercase(),
    }
}

/// Whether a message target names a channel rather than a user
pub fn is_channel(target: &str) -> bool {
    let mut chars = target.chars();
    match chars.next() {
        Some(first) if CHANNEL_PREFIXES.contains(&first) => {
            target.len() > 1 && !target.contains([' ', ',', '\x07'])
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_case() {
        assert_eq!(ChannelKey::normalize("#Rust"), ChannelKey::normalize("#rust"));
        assert_eq!(ChannelKey::normalize("#Foo[Bar]\\~").as_str(), "#foo{bar}|^");
    }

    #[test]
    fn test_normalize_leaves_non_ascii() {
        assert_eq!(ChannelKey::normalize("#Ünïcode").as_str(), "#Ünïcode");
    }

    #[test]
    fn test_verbatim_keeps_case() {
        assert_ne!(ChannelKey::verbatim("#Rust"), ChannelKey::normalize("#Rust"));
        assert_eq!(ChannelKey::verbatim("").as_str(), "");
    }

    #[test]
    fn test_is_channel() {
        assert!(is_channel("#rust"));
        assert!(is_channel("&local"));
        assert!(is_channel("+modeless"));
        assert!(is_channel("!ABCDEsafe"));

        assert!(!is_channel("nickname"));
        assert!(!is_channel("#"));
        assert!(!is_channel(""));
        assert!(!is_channel("#a,#b"));
        assert!(!is_channel("#with space"));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&ChannelKey::normalize("#Rust")).unwrap();
        assert_eq!(json, "\"#rust\"");
    }
}
