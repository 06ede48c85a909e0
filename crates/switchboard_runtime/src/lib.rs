//! Configuration, console and persistence for Switchboard.
//!
//! This crate provides:
//! - [`Config`] - TOML configuration for the process
//! - [`Console`] - a terminal transport driving the dispatcher
//! - [`serialize`] - `MessagePack` snapshots of guild state
//! - the `switchboard` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod console;
pub mod editor;
pub mod serialize;

pub use config::Config;
pub use console::{Console, ConsoleTransport, Identity, Meta, parse_meta};
pub use editor::{LineEditor, ReadResult, RustylineEditor, ScriptedEditor};
pub use serialize::{from_bytes, load_from_file, save_to_file, to_bytes};
