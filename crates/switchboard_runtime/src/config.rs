//! Process configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or none at all) is a valid
//! configuration:
//!
//! ```toml
//! log_filter = "info"
//!
//! [dispatch]
//! default_invoker = "+"
//! bot_user = 1000
//! default_language = "en"
//! quotes = ["\"\"", "''", "«»"]
//! authors = [1]
//! denial_cooldown_secs = 60
//!
//! [limits]
//! sweep_interval_secs = 300
//!
//! [console]
//! user = 1
//! guild = 1
//! channel = 1
//! authority = "admin"
//!
//! [locale]
//! catalog = "locale.toml"
//!
//! [state]
//! snapshot = "state.msgpack"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_engine::DispatchConfig;
use switchboard_foundation::{AuthorityLevel, ChannelId, Error, ErrorKind, GuildId, Result, UserId};
use switchboard_parser::QuotePair;
use switchboard_parser::tokenizer::DEFAULT_QUOTES;

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dispatcher settings.
    pub dispatch: DispatchSection,
    /// Rate limiter housekeeping.
    pub limits: LimitsSection,
    /// Identity used by the console.
    pub console: ConsoleSection,
    /// Extra localization catalog.
    pub locale: LocaleSection,
    /// Persistence of guild state.
    pub state: StateSection,
    /// `tracing` filter directive; `RUST_LOG` overrides it.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch: DispatchSection::default(),
            limits: LimitsSection::default(),
            console: ConsoleSection::default(),
            locale: LocaleSection::default(),
            state: StateSection::default(),
            log_filter: "info".to_string(),
        }
    }
}

/// `[dispatch]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSection {
    /// Process-wide invoker.
    pub default_invoker: String,
    /// The bot's user ID, enabling mention invokers.
    pub bot_user: Option<u64>,
    /// Fallback language code.
    pub default_language: String,
    /// Quote pairs, each written as its two characters.
    pub quotes: Vec<String>,
    /// User IDs of the bot's authors.
    pub authors: Vec<u64>,
    /// Seconds between two denial notices for one user and command.
    pub denial_cooldown_secs: u64,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            default_invoker: "+".to_string(),
            bot_user: None,
            default_language: "en".to_string(),
            quotes: DEFAULT_QUOTES
                .iter()
                .map(|pair| format!("{}{}", pair.open, pair.close))
                .collect(),
            authors: Vec::new(),
            denial_cooldown_secs: 60,
        }
    }
}

/// `[limits]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    /// Seconds between sweeps of expired rate-limit buckets.
    pub sweep_interval_secs: u64,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 300,
        }
    }
}

/// `[console]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    /// Simulated author.
    pub user: u64,
    /// Simulated guild; absent for a direct conversation.
    pub guild: Option<u64>,
    /// Simulated channel.
    pub channel: u64,
    /// Simulated author level.
    pub authority: AuthorityLevel,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            user: 1,
            guild: Some(1),
            channel: 1,
            authority: AuthorityLevel::Regular,
        }
    }
}

/// `[locale]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSection {
    /// TOML catalog merged over the bundled English lines.
    pub catalog: Option<PathBuf>,
}

/// `[state]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSection {
    /// Snapshot file loaded at start and written at exit.
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the text is not valid.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// Loads the configuration from `path`, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if an explicitly named file cannot be read,
    /// or a `Config` error if it is not valid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::Io(format!(
                "failed to read config '{}': {e}",
                path.display()
            )))
        })?;
        Self::from_toml(&text)
    }

    /// Builds the dispatcher settings.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for a quote entry that is not exactly two
    /// characters.
    pub fn dispatch_config(&self) -> Result<DispatchConfig> {
        let section = &self.dispatch;
        let quotes = section
            .quotes
            .iter()
            .map(|pair| parse_quote_pair(pair))
            .collect::<Result<Vec<_>>>()?;

        Ok(DispatchConfig {
            default_invoker: section.default_invoker.clone(),
            bot_user: section.bot_user.map(UserId),
            default_language: section.default_language.clone(),
            quotes,
            authors: section.authors.iter().copied().map(UserId).collect(),
            denial_cooldown: Duration::from_secs(section.denial_cooldown_secs),
        })
    }

    /// Returns the rate-limit sweep interval.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.limits.sweep_interval_secs.max(1))
    }

    /// Returns the console's simulated guild and channel.
    #[must_use]
    pub fn console_location(&self) -> (Option<GuildId>, ChannelId) {
        (
            self.console.guild.map(GuildId),
            ChannelId(self.console.channel),
        )
    }
}

fn parse_quote_pair(text: &str) -> Result<QuotePair> {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(open), Some(close), None) => Ok(QuotePair::new(open, close)),
        _ => Err(Error::new(ErrorKind::Config(format!(
            "quote pair must be two characters, got {text:?}"
        )))),
    }
}
