//! In-memory [`GuildStore`] backend.
//!
//! Guild and channel state live in [`KeyedState`] maps, so unrelated guilds
//! never contend. Collections are persistent `im` structures: reads clone
//! them cheaply and release the lock immediately.
//!
//! The whole store can be exported to a [`StoreSnapshot`] and restored from
//! one; the runtime encodes snapshots to disk.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};
use switchboard_foundation::{ChannelId, GuildId, PathPattern, Result, UserId};

use crate::keyed::KeyedState;
use crate::store::{GuildStore, LanguageTarget};

/// Runtime state of one guild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildState {
    /// Custom invokers, in insertion order.
    pub invokers: Vector<String>,
    /// True once the guild removed the process-default invoker.
    pub default_invoker_disabled: bool,
    /// Guild language.
    pub language: Option<String>,
    /// Disabled set.
    pub disabled: OrdSet<PathPattern>,
    /// Botbanned users.
    pub botbans: OrdSet<UserId>,
}

/// Serializable copy of a [`MemoryStore`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Per-guild state.
    pub guilds: BTreeMap<GuildId, GuildState>,
    /// Per-channel language overrides.
    pub channels: BTreeMap<ChannelId, String>,
}

/// Thread-safe in-memory guild store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    guilds: KeyedState<GuildId, GuildState>,
    channels: KeyedState<ChannelId, Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the contents of `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        store.restore(snapshot);
        store
    }

    /// Copies the current contents.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            guilds: self
                .guilds
                .snapshot()
                .into_iter()
                .filter(|(_, state)| *state != GuildState::default())
                .collect(),
            channels: self
                .channels
                .snapshot()
                .into_iter()
                .filter_map(|(channel, language)| language.map(|l| (channel, l)))
                .collect(),
        }
    }

    /// Replaces the contents with `snapshot`.
    pub fn restore(&self, snapshot: StoreSnapshot) {
        self.guilds.replace_all(snapshot.guilds);
        self.channels.replace_all(
            snapshot
                .channels
                .into_iter()
                .map(|(channel, language)| (channel, Some(language))),
        );
    }

    fn read<R>(&self, guild: GuildId, f: impl FnOnce(&GuildState) -> R) -> R {
        let state = self
            .guilds
            .with_existing(&guild, |state| state.clone())
            .unwrap_or_default();
        f(&state)
    }
}

#[async_trait]
impl GuildStore for MemoryStore {
    async fn get_invokers(&self, guild: GuildId) -> Result<Vec<String>> {
        Ok(self.read(guild, |state| state.invokers.iter().cloned().collect()))
    }

    async fn add_invoker(&self, guild: GuildId, invoker: &str) -> Result<bool> {
        Ok(self.guilds.with(&guild, |state| {
            if state.invokers.contains(&invoker.to_string()) {
                return false;
            }
            state.invokers.push_back(invoker.to_string());
            true
        }))
    }

    async fn remove_invoker(&self, guild: GuildId, invoker: &str) -> Result<bool> {
        Ok(self.guilds.with(&guild, |state| {
            let before = state.invokers.len();
            state.invokers.retain(|existing| existing != invoker);
            state.invokers.len() != before
        }))
    }

    async fn default_invoker_enabled(&self, guild: GuildId) -> Result<bool> {
        Ok(self.read(guild, |state| !state.default_invoker_disabled))
    }

    async fn set_default_invoker(&self, guild: GuildId, enabled: bool) -> Result<bool> {
        Ok(self.guilds.with(&guild, |state| {
            let previous = !state.default_invoker_disabled;
            state.default_invoker_disabled = !enabled;
            previous
        }))
    }

    async fn get_language(
        &self,
        guild: Option<GuildId>,
        channel: ChannelId,
    ) -> Result<Option<String>> {
        if let Some(language) = self.channels.with_existing(&channel, |l| l.clone()).flatten() {
            return Ok(Some(language));
        }
        Ok(guild.and_then(|guild| self.read(guild, |state| state.language.clone())))
    }

    async fn set_language(&self, target: LanguageTarget, language: &str) -> Result<()> {
        match target {
            LanguageTarget::Guild(guild) => self
                .guilds
                .with(&guild, |state| state.language = Some(language.to_string())),
            LanguageTarget::Channel(channel) => self
                .channels
                .with(&channel, |slot| *slot = Some(language.to_string())),
        }
        Ok(())
    }

    async fn get_disabled_paths(&self, guild: GuildId) -> Result<BTreeSet<PathPattern>> {
        Ok(self.read(guild, |state| state.disabled.iter().cloned().collect()))
    }

    async fn toggle_path(&self, guild: GuildId, pattern: &PathPattern) -> Result<bool> {
        Ok(self.guilds.with(&guild, |state| {
            if state.disabled.remove(pattern).is_some() {
                false
            } else {
                state.disabled.insert(pattern.clone());
                true
            }
        }))
    }

    async fn set_paths(
        &self,
        guild: GuildId,
        patterns: &[PathPattern],
        disabled: bool,
    ) -> Result<usize> {
        Ok(self.guilds.with(&guild, |state| {
            patterns
                .iter()
                .filter(|pattern| {
                    if disabled {
                        state.disabled.insert((*pattern).clone()).is_none()
                    } else {
                        state.disabled.remove(*pattern).is_some()
                    }
                })
                .count()
        }))
    }

    async fn is_botbanned(&self, guild: GuildId, user: UserId) -> Result<bool> {
        Ok(self.read(guild, |state| state.botbans.contains(&user)))
    }

    async fn get_botbans(&self, guild: GuildId) -> Result<Vec<UserId>> {
        Ok(self.read(guild, |state| state.botbans.iter().copied().collect()))
    }

    async fn toggle_botban(&self, guild: GuildId, user: UserId) -> Result<bool> {
        Ok(self.guilds.with(&guild, |state| {
            if state.botbans.remove(&user).is_some() {
                false
            } else {
                state.botbans.insert(user);
                true
            }
        }))
    }

    async fn ban_user(&self, guild: GuildId, user: UserId) -> Result<bool> {
        Ok(self
            .guilds
            .with(&guild, |state| state.botbans.insert(user).is_none()))
    }

    async fn unban_user(&self, guild: GuildId, user: UserId) -> Result<bool> {
        Ok(self
            .guilds
            .with(&guild, |state| state.botbans.remove(&user).is_some()))
    }
}
