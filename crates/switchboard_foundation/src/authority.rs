//! Invoker permission levels.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// Permission level of the user invoking a command.
///
/// Levels form a total order: `Regular < BotMod < Admin < Owner < Author`.
/// The transport computes the level of each author; the engine only
/// compares levels.
///
/// `Owner` (the guild owner) and `Author` (a recognised author of the bot
/// itself) are informational floors used by specific built-ins, such as
/// refusing to botban them.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AuthorityLevel {
    /// Any user.
    #[default]
    Regular,
    /// Guild moderator or a user holding a bot-moderator role.
    BotMod,
    /// Guild administrator.
    Admin,
    /// Owner of the guild.
    Owner,
    /// Author of the bot.
    Author,
}

impl AuthorityLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Regular,
        Self::BotMod,
        Self::Admin,
        Self::Owner,
        Self::Author,
    ];

    /// Returns true if this level meets or exceeds `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    /// Returns true if this level bypasses administrative disablement.
    #[must_use]
    pub fn bypasses_toggles(self) -> bool {
        self.satisfies(Self::BotMod)
    }

    /// Returns the stable name of this level, used as a response argument.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::BotMod => "bot-mod",
            Self::Admin => "admin",
            Self::Owner => "owner",
            Self::Author => "author",
        }
    }
}

impl fmt::Display for AuthorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthorityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "regular" | "user" => Ok(Self::Regular),
            "bot-mod" | "botmod" | "mod" => Ok(Self::BotMod),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            "author" => Ok(Self::Author),
            other => Err(Error::new(ErrorKind::Config(format!(
                "unknown authority level: {other}"
            )))),
        }
    }
}
