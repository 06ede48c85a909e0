//! Platform identifiers for users, guilds and channels.
//!
//! Identifiers are opaque 64-bit snowflakes handed over by the transport.
//! The engine never interprets them beyond equality, hashing and display.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a user (message author or mention target).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserId(pub u64);

/// Identifier of a guild (a deployment with its own configuration).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GuildId(pub u64);

/// Identifier of a channel (a single conversation).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelId(pub u64);

impl UserId {
    /// Creates a user ID from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the canonical mention form (`<@id>`).
    #[must_use]
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }

    /// Returns the nickname mention form (`<@!id>`).
    #[must_use]
    pub fn nick_mention(self) -> String {
        format!("<@!{}>", self.0)
    }

    /// Parses a user mention (`<@id>` or `<@!id>`) or a bare numeric ID.
    ///
    /// Returns `None` for anything else, including role mentions (`<@&id>`).
    #[must_use]
    pub fn parse_mention(text: &str) -> Option<Self> {
        let digits = match text.strip_prefix("<@") {
            Some(inner) => {
                let inner = inner.strip_suffix('>')?;
                inner.strip_prefix('!').unwrap_or(inner)
            }
            None => text,
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl GuildId {
    /// Creates a guild ID from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl ChannelId {
    /// Creates a channel ID from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GuildId({})", self.0)
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelId({})", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
