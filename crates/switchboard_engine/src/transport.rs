//! The chat-platform transport collaborator.
//!
//! The engine consumes one [`Incoming`] per message and sends rendered text
//! back through [`Transport::send`]. Sends are best-effort: a failure is
//! logged by the caller and never aborts an invocation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use switchboard_foundation::{AuthorityLevel, ChannelId, Error, GuildId, Result, UserId};

/// One message as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Incoming {
    /// Raw message text.
    pub text: String,
    /// Author.
    pub author: UserId,
    /// Author's level, as computed by the transport.
    pub authority: AuthorityLevel,
    /// Guild, or `None` in a direct conversation.
    pub guild: Option<GuildId>,
    /// Channel the message arrived in.
    pub channel: ChannelId,
}

impl Incoming {
    /// Creates a message from a regular user in a guild channel.
    #[must_use]
    pub fn new(text: impl Into<String>, author: UserId, guild: Option<GuildId>, channel: ChannelId) -> Self {
        Self {
            text: text.into(),
            author,
            authority: AuthorityLevel::Regular,
            guild,
            channel,
        }
    }

    /// Sets the author's level.
    #[must_use]
    pub fn with_authority(mut self, authority: AuthorityLevel) -> Self {
        self.authority = authority;
        self
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `text` to `channel`.
    async fn send(&self, channel: ChannelId, text: String) -> Result<()>;

    /// Returns the level of another guild member, if known.
    async fn member_authority(&self, _guild: GuildId, _user: UserId) -> Option<AuthorityLevel> {
        None
    }

    /// Returns the guild owner, if known.
    async fn guild_owner(&self, _guild: GuildId) -> Option<UserId> {
        None
    }
}

/// A transport that records every send. Used by tests and the console.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(ChannelId, String)>>,
    members: Mutex<HashMap<(GuildId, UserId), AuthorityLevel>>,
    owners: Mutex<HashMap<GuildId, UserId>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Removes and returns the texts sent so far.
    pub fn take(&self) -> Vec<String> {
        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        sent.drain(..).map(|(_, text)| text).collect()
    }

    /// Records a member's level.
    pub fn set_member_authority(&self, guild: GuildId, user: UserId, level: AuthorityLevel) {
        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((guild, user), level);
    }

    /// Records a guild's owner.
    pub fn set_owner(&self, guild: GuildId, owner: UserId) {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(guild, owner);
    }

    /// Makes every later send fail, simulating a disconnect.
    pub fn disconnect(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, channel: ChannelId, text: String) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::internal("transport disconnected"));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, text));
        Ok(())
    }

    async fn member_authority(&self, guild: GuildId, user: UserId) -> Option<AuthorityLevel> {
        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(guild, user))
            .copied()
    }

    async fn guild_owner(&self, guild: GuildId) -> Option<UserId> {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&guild)
            .copied()
    }
}
