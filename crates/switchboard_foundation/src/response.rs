//! Render requests.
//!
//! The engine never builds user-facing prose. It selects a response key,
//! attaches arguments, and hands the resulting [`Response`] to the
//! localization collaborator, which owns the templates.

use std::collections::BTreeMap;
use std::fmt;

use crate::path::CommandPath;

/// A request to render one localized line.
///
/// A response carries an ordered list of keys and the command path it was
/// produced in. Lookup tries every key in the most specific scope first,
/// then walks up to the root; see [`Response::candidate_keys`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    keys: Vec<String>,
    scope: CommandPath,
    args: Vec<String>,
    named: BTreeMap<String, String>,
    count: Option<i64>,
}

impl Response {
    /// Creates a response for a single key, scoped to the root.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            keys: vec![key.into()],
            ..Self::default()
        }
    }

    /// Creates a response that tries `keys` in order.
    #[must_use]
    pub fn chain<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the command path whose catalog is searched first.
    #[must_use]
    pub fn in_scope(mut self, scope: CommandPath) -> Self {
        self.scope = scope;
        self
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Sets a named argument.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.named.insert(name.into(), value.to_string());
        self
    }

    /// Sets the count used for pluralization.
    #[must_use]
    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the scope only if none was set yet.
    ///
    /// Used by the dispatcher to scope handler aborts to the running command.
    #[must_use]
    pub fn or_scope(self, scope: &CommandPath) -> Self {
        if self.scope.is_root() {
            self.in_scope(scope.clone())
        } else {
            self
        }
    }

    /// Returns the primary key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.keys.first().map_or("", String::as_str)
    }

    /// Returns every key in preference order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the scope.
    #[must_use]
    pub fn scope(&self) -> &CommandPath {
        &self.scope
    }

    /// Returns the positional arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the named arguments.
    #[must_use]
    pub fn named_args(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    /// Returns the pluralization count.
    #[must_use]
    pub fn plural_count(&self) -> Option<i64> {
        self.count
    }

    /// Returns the fully-qualified keys to try, most specific first.
    ///
    /// For keys `[a, b]` in scope `toggle.enable` this yields
    /// `toggle.enable.a`, `toggle.enable.b`, `toggle.a`, `toggle.b`, `a`, `b`.
    #[must_use]
    pub fn candidate_keys(&self) -> Vec<String> {
        let mut scope = Some(self.scope.clone());
        let mut out = Vec::with_capacity(self.keys.len() * (self.scope.len() + 1));
        while let Some(current) = scope {
            for key in &self.keys {
                if current.is_root() {
                    out.push(key.clone());
                } else {
                    out.push(format!("{current}.{key}"));
                }
            }
            scope = current.parent();
        }
        out
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(", "))?;
        }
        Ok(())
    }
}
