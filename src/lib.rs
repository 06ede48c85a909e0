//! Switchboard - command routing for multi-guild chat bots
//!
//! This crate re-exports all layers of the Switchboard system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: switchboard_runtime   : Configuration, console, snapshots, CLI
//! Layer 2: switchboard_engine    : Gate, rate limits, store, dispatcher, built-ins
//! Layer 1: switchboard_parser    : Tokenizer, converters, command tree, binder
//! Layer 0: switchboard_foundation: Core types (ids, paths, Response, Error)
//! ```

pub use switchboard_engine as engine;
pub use switchboard_foundation as foundation;
pub use switchboard_parser as parser;
pub use switchboard_runtime as runtime;
