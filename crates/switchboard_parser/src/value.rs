//! Typed argument values produced by converters.

use std::fmt;

use switchboard_foundation::{PathPattern, UserId};

/// A converted argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value (an optional parameter without default).
    None,
    /// Free text.
    Str(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// A user reference.
    User(UserId),
    /// A toggle pattern.
    Path(PathPattern),
    /// Several values, from a greedy converter.
    List(Vec<Value>),
}

impl Value {
    /// Returns the name of this value's kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::User(_) => "user",
            Self::Path(_) => "path",
            Self::List(_) => "list",
        }
    }

    /// Returns true for [`Value::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::User(id) => f.write_str(&id.mention()),
            Self::Path(pattern) => write!(f, "{pattern}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<UserId> for Value {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

/// Extraction of a Rust type from a [`Value`].
pub trait FromValue: Sized {
    /// Name of the expected kind, for error messages.
    const EXPECTED: &'static str;

    /// Extracts `Self`, or `None` on a kind mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for UserId {
    const EXPECTED: &'static str = "user";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::User(id) => Some(*id),
            _ => None,
        }
    }
}

impl FromValue for PathPattern {
    const EXPECTED: &'static str = "path";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(pattern) => Some(pattern.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::None => Some(Vec::new()),
            _ => None,
        }
    }
}
