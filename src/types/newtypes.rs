//! NewType wrappers for primitive types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery channel of a message (`email`, `sms`, `slack`, `teams`, ...).
///
/// The value is lower-cased on construction so every comparison downstream is
/// case-insensitive. A missing channel is the empty string and matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub struct Channel(String);

impl Channel {
    /// Create a channel, normalizing it to lower case.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().to_lowercase())
    }

    /// The empty channel, used when the caller supplied none.
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Get the normalized channel string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if no channel was supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if this channel is one of `names` (expected lower case).
    pub fn is_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| *name == self.0)
    }
}

impl From<&str> for Channel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Channel {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Option<String>> for Channel {
    fn from(s: Option<String>) -> Self {
        s.map(Self::new).unwrap_or_default()
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
