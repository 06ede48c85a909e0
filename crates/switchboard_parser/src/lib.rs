//! Command text parsing for Switchboard.
//!
//! This crate turns the text after an invoker prefix into a resolved command
//! node and a typed argument list.
//!
//! # Architecture
//!
//! ```text
//! "remove user <@1> <@2> 50"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   TOKENIZER     │  → cursor over the raw text (tokens on demand)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ COMMAND TREE    │  → node remove.user, remainder "<@1> <@2> 50"
//! │ RESOLVER        │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ ARGUMENT        │  → users = [1, 2], limit = 50
//! │ BINDER          │
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tokenizer`] - quote-aware tokens and the [`Remainder`] cursor
//! - [`value`] - typed argument values
//! - [`converter`] - simple and manual converters, plus the built-in set
//! - [`tree`] - the command tree arena and resolver
//! - [`binder`] - binds declared parameters against a remainder

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binder;
pub mod converter;
pub mod tokenizer;
pub mod tree;
pub mod value;

pub use binder::{Args, BindingFailure, Param, bind};
pub use converter::{ConversionFailure, Converter, ManualConverter, SimpleConverter};
pub use tokenizer::{QuotePair, Remainder, Token, TokenKind, Tokenizer};
pub use tree::{
    CommandNode, CommandSpec, CommandTree, NodeId, RateLimitScope, RateLimitSpec, Resolution,
    Scope,
};
pub use value::{FromValue, Value};
