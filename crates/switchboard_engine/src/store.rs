//! The guild store: per-guild configuration owned by the persistence layer.
//!
//! The engine reads invokers, languages, disabled paths and botbans through
//! [`GuildStore`] and writes them from the built-in commands. Every method is
//! keyed by guild, channel or user; implementations must be safe under
//! concurrent calls for different keys and must make [`GuildStore::toggle_path`]
//! and [`GuildStore::toggle_botban`] atomic flips.

use std::collections::BTreeSet;

use async_trait::async_trait;
use switchboard_foundation::{ChannelId, GuildId, PathPattern, Result, UserId};

/// Where a language setting applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LanguageTarget {
    /// Every channel of a guild without its own setting.
    Guild(GuildId),
    /// A single channel; overrides the guild setting.
    Channel(ChannelId),
}

/// Persistence collaborator for guild runtime state.
#[async_trait]
pub trait GuildStore: Send + Sync {
    /// Returns the guild's custom invokers in insertion order.
    async fn get_invokers(&self, guild: GuildId) -> Result<Vec<String>>;

    /// Adds a custom invoker. Returns false if it was already present.
    async fn add_invoker(&self, guild: GuildId, invoker: &str) -> Result<bool>;

    /// Removes a custom invoker. Returns false if it was absent.
    async fn remove_invoker(&self, guild: GuildId, invoker: &str) -> Result<bool>;

    /// Returns whether the process-default invoker is active in the guild.
    async fn default_invoker_enabled(&self, guild: GuildId) -> Result<bool>;

    /// Enables or disables the process-default invoker. Returns the previous state.
    async fn set_default_invoker(&self, guild: GuildId, enabled: bool) -> Result<bool>;

    /// Returns the language for a channel, falling back to its guild's.
    async fn get_language(
        &self,
        guild: Option<GuildId>,
        channel: ChannelId,
    ) -> Result<Option<String>>;

    /// Sets the language for a guild or a channel.
    async fn set_language(&self, target: LanguageTarget, language: &str) -> Result<()>;

    /// Returns the guild's disabled set.
    async fn get_disabled_paths(&self, guild: GuildId) -> Result<BTreeSet<PathPattern>>;

    /// Flips one entry of the disabled set. Returns true if it is now disabled.
    async fn toggle_path(&self, guild: GuildId, pattern: &PathPattern) -> Result<bool>;

    /// Adds or removes entries explicitly. Returns how many changed.
    async fn set_paths(
        &self,
        guild: GuildId,
        patterns: &[PathPattern],
        disabled: bool,
    ) -> Result<usize>;

    /// Returns true if `user` is botbanned in `guild`.
    async fn is_botbanned(&self, guild: GuildId, user: UserId) -> Result<bool>;

    /// Returns every botbanned user of the guild, sorted.
    async fn get_botbans(&self, guild: GuildId) -> Result<Vec<UserId>>;

    /// Flips a user's botban. Returns true if the user is now banned.
    async fn toggle_botban(&self, guild: GuildId, user: UserId) -> Result<bool>;

    /// Bans a user. Returns false if already banned.
    async fn ban_user(&self, guild: GuildId, user: UserId) -> Result<bool>;

    /// Unbans a user. Returns false if not banned.
    async fn unban_user(&self, guild: GuildId, user: UserId) -> Result<bool>;
}
