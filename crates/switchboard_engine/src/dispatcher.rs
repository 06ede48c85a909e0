//! The dispatcher: the engine's entry point.
//!
//! [`Dispatcher::dispatch`] takes one incoming message through every stage
//! and reports what happened as an [`Outcome`]:
//!
//! ```text
//! invoker match → language → resolve → guild state → gate → rate limit → bind → handler
//! ```
//!
//! Everything before the handler is decided here and answered directly.
//! Handlers run in their own task, so a panic inside one is reported as a
//! fault for that invocation only.

use std::sync::Arc;
use std::time::Duration;

use switchboard_foundation::{
    AuthorityLevel, CommandPath, Error, Response, Result, UserId,
};
use switchboard_parser::tokenizer::DEFAULT_QUOTES;
use switchboard_parser::{
    Args, BindingFailure, CommandSpec, NodeId, QuotePair, RateLimitSpec, Tokenizer, bind,
};
use tracing::{Instrument, debug, error, info_span, warn};

use crate::builtins;
use crate::context::{Context, Invocation};
use crate::gate::{AccessState, Denial, authorize};
use crate::handler::{BoxedHandler, CommandError, Registry};
use crate::locale::Localizer;
use crate::ratelimit::{RateKey, RateLimiter, Subject};
use crate::store::GuildStore;
use crate::transport::{Incoming, Transport};

/// Dispatcher settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Process-wide invoker, active in every guild that has not removed it.
    pub default_invoker: String,
    /// The bot's own user; its mentions always act as invokers.
    pub bot_user: Option<UserId>,
    /// Language used when none is selected or the selection is unknown.
    pub default_language: String,
    /// Quote pairs recognised by the tokenizer.
    pub quotes: Vec<QuotePair>,
    /// Authors of the bot. They invoke at `Author` level everywhere.
    pub authors: Vec<UserId>,
    /// Minimum time between two denial notices for one user and command.
    pub denial_cooldown: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_invoker: "+".to_string(),
            bot_user: None,
            default_language: "en".to_string(),
            quotes: DEFAULT_QUOTES.to_vec(),
            authors: Vec::new(),
            denial_cooldown: Duration::from_secs(60),
        }
    }
}

/// What happened to one message.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The message did not start with an invoker.
    Ignored,
    /// No command matched.
    ResolutionMiss,
    /// The gate refused.
    Denied(Denial),
    /// The rate limiter refused.
    RateLimited {
        /// Time until the next allowed invocation.
        retry_after: Duration,
    },
    /// Arguments did not bind.
    BindingFailed(BindingFailure),
    /// The handler finished.
    Completed(CommandPath),
    /// The handler aborted with a response.
    Aborted(Response),
    /// The handler or the store failed.
    Faulted,
}

/// Where an invoker comes from. Breaks ties between equally long matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvokerKind {
    /// The process-default invoker.
    Default,
    /// A guild's custom invoker.
    Guild,
    /// A mention of the bot.
    Mention,
}

/// Returns the length and kind of the invoker `text` starts with, if any.
///
/// The longest matching candidate wins; on equal length a mention beats a
/// guild invoker, which beats the default.
#[must_use]
pub fn longest_invoker(
    text: &str,
    candidates: &[(String, InvokerKind)],
) -> Option<(usize, InvokerKind)> {
    candidates
        .iter()
        .filter(|(invoker, _)| !invoker.is_empty() && text.starts_with(invoker.as_str()))
        .map(|(invoker, kind)| (invoker.len(), *kind))
        .max()
}

pub(crate) struct Shared {
    pub(crate) tree: Registry,
    pub(crate) store: Arc<dyn GuildStore>,
    pub(crate) localizer: Arc<dyn Localizer>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) config: DispatchConfig,
    tokenizer: Tokenizer,
    limiter: RateLimiter,
    notices: RateLimiter,
}

/// Routes messages to handlers.
///
/// Cheap to clone; clones share the command tree and all state.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    /// Starts building a dispatcher with the built-in commands registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in fails to register.
    pub fn builder(
        store: Arc<dyn GuildStore>,
        localizer: Arc<dyn Localizer>,
        transport: Arc<dyn Transport>,
    ) -> Result<DispatcherBuilder> {
        let mut tree = Registry::new();
        builtins::register(&mut tree)?;
        Ok(DispatcherBuilder {
            tree,
            store,
            localizer,
            transport,
            config: DispatchConfig::default(),
        })
    }

    /// Returns the command tree.
    #[must_use]
    pub fn tree(&self) -> &Registry {
        &self.shared.tree
    }

    /// Returns the guild store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn GuildStore> {
        &self.shared.store
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.shared.config
    }

    /// Discards expired rate-limit buckets. Returns how many.
    pub fn sweep(&self) -> usize {
        self.shared.limiter.sweep() + self.shared.notices.sweep()
    }

    /// Handles one message.
    pub async fn dispatch(&self, incoming: Incoming) -> Outcome {
        let span = info_span!(
            "dispatch",
            guild = ?incoming.guild,
            channel = %incoming.channel,
            user = %incoming.author,
        );
        self.run(&incoming).instrument(span).await
    }

    async fn run(&self, incoming: &Incoming) -> Outcome {
        let shared = &self.shared;
        let text = incoming.text.trim_start();

        let prefix = match self.match_invoker(incoming, text).await {
            Ok(Some((prefix, kind))) => {
                debug!(invoker = ?kind, "invoker matched");
                prefix
            }
            Ok(None) => return Outcome::Ignored,
            Err(error) => {
                error!(%error, "failed to load invokers");
                return Outcome::Faulted;
            }
        };

        let body = &text[prefix..];
        let language = self.load_language(incoming).await;
        let word_language = language
            .as_deref()
            .unwrap_or(&shared.config.default_language)
            .to_string();
        let resolution = shared
            .tree
            .resolve_localized(shared.tokenizer.cursor(body), |path| {
                shared.localizer.command_names(path, &word_language)
            });
        let node = shared.tree.node(resolution.node);
        let Some(handler) = node.handler().cloned() else {
            debug!(text = body, "no command matched");
            return Outcome::ResolutionMiss;
        };

        let authority = self.effective_authority(incoming);
        let state = match language {
            Ok(language) => self.load_access(incoming).await.map(|access| (language, access)),
            Err(error) => Err(error),
        };
        let (language, access, loaded) = match state {
            Ok((language, access)) => (language, access, true),
            Err(error) => {
                let error = annotate(error, &resolution.path, body, "load_state");
                error!(
                    command = %resolution.path,
                    %error,
                    context = %describe_context(&error),
                    "failed to load guild state"
                );
                (shared.config.default_language.clone(), AccessState::default(), false)
            }
        };
        let ctx = self.context(incoming, resolution.node, &resolution.path, authority, language, access);
        if !loaded {
            ctx.reply(Response::new("error_internal")).await;
            return Outcome::Faulted;
        }

        if let Err(denial) = authorize(&shared.tree, resolution.node, authority, ctx.access()) {
            self.deny(&ctx, &denial).await;
            return Outcome::Denied(denial);
        }

        if let Some(spec) = node.rate_limit() {
            let key = RateKey::for_invocation(&spec, incoming.author, incoming.guild, ctx.path());
            if let Err(limited) = shared.limiter.check(&key, Some(&spec)) {
                debug!(command = %ctx.path(), retry_after = ?limited.retry_after, "rate limited");
                let secs = limited.retry_after_secs();
                ctx.reply(
                    Response::new("error_ratelimit")
                        .arg(secs)
                        .count(i64::try_from(secs).unwrap_or(i64::MAX)),
                )
                .await;
                return Outcome::RateLimited {
                    retry_after: limited.retry_after,
                };
            }
        }

        let args = match bind(node.params(), resolution.remainder, node.is_strict()) {
            Ok(args) => args,
            Err(failure) => {
                debug!(command = %ctx.path(), %failure, "arguments did not bind");
                ctx.reply(failure.response()).await;
                return Outcome::BindingFailed(failure);
            }
        };

        Self::invoke(ctx, handler, args).await
    }

    async fn match_invoker(
        &self,
        incoming: &Incoming,
        text: &str,
    ) -> Result<Option<(usize, InvokerKind)>> {
        let config = &self.shared.config;
        let mut candidates = Vec::new();

        if let Some(bot) = config.bot_user {
            candidates.push((bot.mention(), InvokerKind::Mention));
            candidates.push((bot.nick_mention(), InvokerKind::Mention));
        }

        let default_enabled = match incoming.guild {
            Some(guild) => {
                candidates.extend(
                    self.shared
                        .store
                        .get_invokers(guild)
                        .await?
                        .into_iter()
                        .map(|invoker| (invoker, InvokerKind::Guild)),
                );
                self.shared.store.default_invoker_enabled(guild).await?
            }
            None => true,
        };
        if default_enabled {
            candidates.push((config.default_invoker.clone(), InvokerKind::Default));
        }

        Ok(longest_invoker(text, &candidates))
    }

    fn effective_authority(&self, incoming: &Incoming) -> AuthorityLevel {
        if self.shared.config.authors.contains(&incoming.author) {
            AuthorityLevel::Author
        } else {
            incoming.authority
        }
    }

    /// Returns the conversation's language, or the default if the stored
    /// one is unsupported.
    async fn load_language(&self, incoming: &Incoming) -> Result<String> {
        Ok(self
            .shared
            .store
            .get_language(incoming.guild, incoming.channel)
            .await?
            .filter(|code| self.shared.localizer.has_language(code))
            .unwrap_or_else(|| self.shared.config.default_language.clone()))
    }

    async fn load_access(&self, incoming: &Incoming) -> Result<AccessState> {
        let store = &self.shared.store;
        let access = match incoming.guild {
            Some(guild) => AccessState {
                botbanned: store.is_botbanned(guild, incoming.author).await?,
                in_guild: true,
                disabled: store.get_disabled_paths(guild).await?,
            },
            None => AccessState::default(),
        };
        Ok(access)
    }

    fn context(
        &self,
        incoming: &Incoming,
        node: NodeId,
        path: &CommandPath,
        authority: AuthorityLevel,
        language: String,
        access: AccessState,
    ) -> Context {
        Context::new(
            Arc::clone(&self.shared),
            Invocation {
                author: incoming.author,
                authority,
                guild: incoming.guild,
                channel: incoming.channel,
                node,
                path: path.clone(),
                language,
                access,
            },
        )
    }

    /// Announces a denial, at most once per cooldown for the user and command.
    async fn deny(&self, ctx: &Context, denial: &Denial) {
        let Some(response) = denial.response() else {
            debug!(command = %ctx.path(), "ignoring botbanned user");
            return;
        };

        let key = RateKey {
            subject: Subject::User(ctx.author()),
            path: ctx.path().clone(),
        };
        let cooldown = RateLimitSpec::per_user(1, self.shared.config.denial_cooldown);
        if self.shared.notices.check(&key, Some(&cooldown)).is_ok() {
            warn!(command = %ctx.path(), ?denial, "command denied");
            ctx.reply(response).await;
        } else {
            debug!(command = %ctx.path(), ?denial, "command denied, notice suppressed");
        }
    }

    async fn invoke(ctx: Context, handler: BoxedHandler, args: Args) -> Outcome {
        let path = ctx.path().clone();
        let input = args
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        let task_ctx = ctx.clone();
        let joined = tokio::spawn(async move { handler.call(task_ctx, args).await }).await;

        match joined {
            Ok(Ok(())) => {
                debug!(command = %path, "command completed");
                Outcome::Completed(path)
            }
            Ok(Err(CommandError::Abort(response))) => {
                let response = response.or_scope(&path);
                debug!(command = %path, key = response.key(), "command aborted");
                ctx.reply(response.clone()).await;
                Outcome::Aborted(response)
            }
            Ok(Err(CommandError::Internal(error))) => {
                let error = annotate(error, &path, &input, "handler");
                error!(
                    guild = ?ctx.guild(),
                    channel = %ctx.channel(),
                    user = %ctx.author(),
                    command = %path,
                    %error,
                    context = %describe_context(&error),
                    "command failed"
                );
                ctx.reply(Response::new("error_internal")).await;
                Outcome::Faulted
            }
            Err(join_error) => {
                error!(
                    guild = ?ctx.guild(),
                    channel = %ctx.channel(),
                    user = %ctx.author(),
                    command = %path,
                    error = %join_error,
                    "command panicked"
                );
                ctx.reply(Response::new("error_internal")).await;
                Outcome::Faulted
            }
        }
    }
}

/// Records where an infrastructure failure happened.
fn annotate(mut error: Error, path: &CommandPath, input: &str, frame: &str) -> Error {
    let context = error.context.take().unwrap_or_default();
    error.with_context(
        context
            .with_path(path.clone())
            .with_input(input)
            .with_frame(frame),
    )
}

fn describe_context(error: &Error) -> String {
    error
        .context
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Collects commands and collaborators for a [`Dispatcher`].
pub struct DispatcherBuilder {
    tree: Registry,
    store: Arc<dyn GuildStore>,
    localizer: Arc<dyn Localizer>,
    transport: Arc<dyn Transport>,
    config: DispatchConfig,
}

impl DispatcherBuilder {
    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a command.
    ///
    /// # Errors
    ///
    /// Returns the tree's registration error.
    pub fn command(mut self, path: &[&str], spec: CommandSpec<BoxedHandler>) -> Result<Self> {
        self.tree.register(path, spec)?;
        Ok(self)
    }

    /// Finishes the dispatcher. The command tree is frozen from here on.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let tokenizer = Tokenizer::with_quotes(self.config.quotes.iter().copied());
        Dispatcher {
            shared: Arc::new(Shared {
                tree: self.tree,
                store: self.store,
                localizer: self.localizer,
                transport: self.transport,
                config: self.config,
                tokenizer,
                limiter: RateLimiter::new(),
                notices: RateLimiter::new(),
            }),
        }
    }
}
