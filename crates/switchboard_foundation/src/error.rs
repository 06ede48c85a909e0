//! Error types for Switchboard.
//!
//! Uses `thiserror` for error definitions. These are internal errors:
//! registration mistakes, store failures and bugs. User-facing failures
//! (bad arguments, denials) are reported as responses, not as errors.

use std::fmt;

use thiserror::Error;

use crate::path::CommandPath;

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Switchboard operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a duplicate alias error.
    #[must_use]
    pub fn duplicate_alias(parent: CommandPath, alias: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateAlias {
            parent,
            alias: alias.into(),
        })
    }

    /// Creates a store error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err.to_string()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Two siblings in the command tree share a name or alias.
    #[error("duplicate alias {alias:?} under {parent:?}")]
    DuplicateAlias {
        /// Path of the parent node.
        parent: CommandPath,
        /// The colliding name or alias (lowercased).
        alias: String,
    },

    /// A command name or alias is empty or contains whitespace.
    #[error("invalid command name: {0:?}")]
    InvalidCommandName(String),

    /// A toggle pattern is malformed.
    #[error("invalid path pattern: {0:?}")]
    InvalidPattern(String),

    /// An argument could not be extracted with the requested type.
    #[error("argument {name}: expected {expected}")]
    ArgumentType {
        /// Parameter name.
        name: String,
        /// Expected value kind.
        expected: &'static str,
    },

    /// A handler asked for an argument that was not bound.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// The guild store failed.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Command path being handled.
    pub path: Option<CommandPath>,
    /// Raw message text, when relevant.
    pub input: Option<String>,
    /// Call chain (handler, store operation).
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command path.
    #[must_use]
    pub fn with_path(mut self, path: CommandPath) -> Self {
        self.path = Some(path);
        self
    }

    /// Sets the raw input.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "in command {path}")?;
        }
        if let Some(input) = &self.input {
            write!(f, " (input {input:?})")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
