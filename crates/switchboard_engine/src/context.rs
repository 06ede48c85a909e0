//! Per-invocation handler context.

use std::sync::Arc;

use switchboard_foundation::{AuthorityLevel, ChannelId, CommandPath, GuildId, Response, UserId};
use switchboard_parser::NodeId;
use tracing::warn;

use crate::dispatcher::{DispatchConfig, Shared};
use crate::gate::AccessState;
use crate::handler::{CommandError, Registry};
use crate::locale::Localizer;
use crate::store::GuildStore;
use crate::transport::Transport;

/// Facts about one invocation, fixed before the handler runs.
#[derive(Clone, Debug)]
pub(crate) struct Invocation {
    pub(crate) author: UserId,
    pub(crate) authority: AuthorityLevel,
    pub(crate) guild: Option<GuildId>,
    pub(crate) channel: ChannelId,
    pub(crate) node: NodeId,
    pub(crate) path: CommandPath,
    pub(crate) language: String,
    pub(crate) access: AccessState,
}

/// What a handler can see and do.
///
/// Cheap to clone; every clone refers to the same invocation.
#[derive(Clone)]
pub struct Context {
    shared: Arc<Shared>,
    invocation: Arc<Invocation>,
}

impl Context {
    pub(crate) fn new(shared: Arc<Shared>, invocation: Invocation) -> Self {
        Self {
            shared,
            invocation: Arc::new(invocation),
        }
    }

    /// Returns the invoking user.
    #[must_use]
    pub fn author(&self) -> UserId {
        self.invocation.author
    }

    /// Returns the invoker's effective level.
    #[must_use]
    pub fn authority(&self) -> AuthorityLevel {
        self.invocation.authority
    }

    /// Returns the guild, or `None` in a direct conversation.
    #[must_use]
    pub fn guild(&self) -> Option<GuildId> {
        self.invocation.guild
    }

    /// Returns the channel.
    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.invocation.channel
    }

    /// Returns the running command's node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.invocation.node
    }

    /// Returns the running command's path.
    #[must_use]
    pub fn path(&self) -> &CommandPath {
        &self.invocation.path
    }

    /// Returns the conversation's language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.invocation.language
    }

    /// Returns the guild state the gate decided on.
    #[must_use]
    pub fn access(&self) -> &AccessState {
        &self.invocation.access
    }

    /// Returns the command tree.
    #[must_use]
    pub fn tree(&self) -> &Registry {
        &self.shared.tree
    }

    /// Finds the node named by `words` in the conversation's language.
    #[must_use]
    pub fn lookup<'s>(&self, words: impl IntoIterator<Item = &'s str>) -> Option<NodeId> {
        self.shared.tree.lookup_localized(words, |path| {
            self.shared.localizer.command_names(path, self.language())
        })
    }

    /// Returns the name `id` is shown under in the conversation's language.
    #[must_use]
    pub fn command_name(&self, id: NodeId) -> String {
        let node = self.shared.tree.node(id);
        self.shared
            .localizer
            .command_names(node.path(), self.language())
            .into_iter()
            .next()
            .unwrap_or_else(|| node.name().to_string())
    }

    /// Returns the guild store.
    #[must_use]
    pub fn store(&self) -> &dyn GuildStore {
        self.shared.store.as_ref()
    }

    /// Returns the localizer.
    #[must_use]
    pub fn localizer(&self) -> &dyn Localizer {
        self.shared.localizer.as_ref()
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.shared.transport.as_ref()
    }

    /// Returns the dispatcher configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.shared.config
    }

    /// Renders `response` in the conversation's language.
    ///
    /// Unscoped responses are scoped to the running command.
    #[must_use]
    pub fn render(&self, response: &Response) -> String {
        self.render_in(response, self.language())
    }

    /// Renders `response` in `language`.
    #[must_use]
    pub fn render_in(&self, response: &Response, language: &str) -> String {
        let scoped = response.clone().or_scope(self.path());
        self.shared.localizer.render(&scoped, language)
    }

    /// Renders and sends `response`.
    pub async fn reply(&self, response: Response) {
        let text = self.render(&response);
        self.say(text).await;
    }

    /// Sends raw text. Failures are logged and otherwise ignored.
    pub async fn say(&self, text: String) {
        if let Err(error) = self.shared.transport.send(self.channel(), text).await {
            warn!(
                channel = %self.channel(),
                command = %self.path(),
                %error,
                "failed to send response"
            );
        }
    }

    /// Returns the guild, or aborts in a direct conversation.
    ///
    /// # Errors
    ///
    /// Aborts with `error_no_pm` outside guilds.
    pub fn require_guild(&self) -> Result<GuildId, CommandError> {
        self.guild()
            .ok_or_else(|| CommandError::abort("error_no_pm"))
    }

    /// Aborts unless the invoker is at least `level`.
    ///
    /// # Errors
    ///
    /// Aborts with `error_authority` naming the required level.
    pub fn require_authority(&self, level: AuthorityLevel) -> Result<(), CommandError> {
        if self.authority().satisfies(level) {
            Ok(())
        } else {
            Err(CommandError::Abort(
                Response::new("error_authority").arg(level.name()),
            ))
        }
    }

    /// Returns true if `user` is a configured author of the bot.
    #[must_use]
    pub fn is_author(&self, user: UserId) -> bool {
        self.shared.config.authors.contains(&user)
    }
}
