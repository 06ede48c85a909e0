//! Core types shared by every Switchboard layer.
//!
//! This crate provides:
//! - [`UserId`], [`GuildId`], [`ChannelId`] - platform identifiers
//! - [`AuthorityLevel`] - the total order of invoker permission levels
//! - [`CommandPath`] and [`PathPattern`] - command addressing and toggle rules
//! - [`Response`] - a render request handed to the localization collaborator
//! - [`Error`] - rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod authority;
pub mod error;
pub mod ids;
pub mod path;
pub mod response;

pub use authority::AuthorityLevel;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use ids::{ChannelId, GuildId, UserId};
pub use path::{CommandPath, PathPattern};
pub use response::Response;
