//! Command execution for Switchboard.
//!
//! This crate runs resolved commands: it loads per-guild state, applies the
//! authority gate and rate limits, binds arguments, runs handlers and turns
//! every outcome into a localized reply.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Incoming    ┌──────────────────────────────────────┐
//! │  Transport   │ ────────────▶ │             Dispatcher               │
//! └──────────────┘               │  invoker → resolve → gate → limit →  │
//!        ▲                       │  bind → handler (own task)           │
//!        │ rendered text         └──────────────────────────────────────┘
//!        │                          │            │              │
//! ┌──────────────┐          ┌────────────┐ ┌────────────┐ ┌────────────┐
//! │  Localizer   │ ◀─────── │  Context   │ │ GuildStore │ │ RateLimiter│
//! └──────────────┘ Response └────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! # Modules
//!
//! - [`keyed`] - maps of independently locked values
//! - [`store`] - the guild store collaborator; [`memory`] - its in-memory backend
//! - [`gate`] - botban, scope, authority and toggle checks
//! - [`ratelimit`] - sliding-window rate limiting
//! - [`locale`] - the localizer collaborator and the bundled catalog
//! - [`transport`] - the chat platform collaborator
//! - [`handler`] and [`context`] - what command code implements and sees
//! - [`dispatcher`] - the entry point
//! - [`builtins`] - help, language, alias, toggle and botban

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builtins;
pub mod context;
pub mod dispatcher;
pub mod gate;
pub mod handler;
pub mod keyed;
pub mod locale;
pub mod memory;
pub mod ratelimit;
pub mod store;
pub mod transport;

pub use context::Context;
pub use dispatcher::{DispatchConfig, Dispatcher, DispatcherBuilder, InvokerKind, Outcome};
pub use gate::{AccessState, Denial, authorize};
pub use handler::{BoxedHandler, CommandError, CommandResult, Handler, Registry, command, group};
pub use locale::{Catalog, CommandWords, Localizer};
pub use memory::{GuildState, MemoryStore, StoreSnapshot};
pub use ratelimit::{RateKey, RateLimited, RateLimiter, Subject, whole_secs};
pub use store::{GuildStore, LanguageTarget};
pub use transport::{Incoming, RecordingTransport, Transport};
