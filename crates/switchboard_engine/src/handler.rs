//! Command handlers and their result type.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use switchboard_foundation::{Error, Response};
use switchboard_parser::{Args, CommandSpec, CommandTree};

use crate::context::Context;

/// Why a handler stopped early.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Render this response and stop. Not a bug.
    #[error("aborted with {0}")]
    Abort(Response),
    /// An unexpected failure. Logged, and answered with a generic apology.
    #[error(transparent)]
    Internal(#[from] Error),
}

impl CommandError {
    /// Aborts with a single response key.
    #[must_use]
    pub fn abort(key: impl Into<String>) -> Self {
        Self::Abort(Response::new(key))
    }
}

impl From<Response> for CommandError {
    fn from(response: Response) -> Self {
        Self::Abort(response)
    }
}

/// Result of running a handler.
pub type CommandResult = Result<(), CommandError>;

/// Code run for an invoked command.
///
/// Implemented for every `Fn(Context, Args) -> impl Future<Output = CommandResult>`,
/// so plain `async fn`s can be registered directly.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs the command.
    async fn call(&self, ctx: Context, args: Args) -> CommandResult;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Context, Args) -> Fut + Send + Sync,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    async fn call(&self, ctx: Context, args: Args) -> CommandResult {
        self(ctx, args).await
    }
}

/// A shared handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// The command tree as used by the dispatcher.
pub type Registry = CommandTree<BoxedHandler>;

/// Starts a command declaration run by `handler`.
#[must_use]
pub fn command(handler: impl Handler + 'static) -> CommandSpec<BoxedHandler> {
    let handler: BoxedHandler = Arc::new(handler);
    CommandSpec::new(handler)
}

/// Starts a declaration for a node that only hosts subcommands.
#[must_use]
pub fn group() -> CommandSpec<BoxedHandler> {
    CommandSpec::group()
}
