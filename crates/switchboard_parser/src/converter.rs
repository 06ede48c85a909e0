//! The converter protocol.
//!
//! A converter turns command text into a typed [`Value`]. There are two
//! shapes:
//!
//! - [`SimpleConverter`] sees exactly one token that the binder has already
//!   extracted. It cannot influence how much text is consumed.
//! - [`ManualConverter`] sees the [`Remainder`] cursor and consumes as much
//!   as it needs, token-aligned or not. On failure it must leave the cursor
//!   where it found it; [`Converter::apply`] restores it regardless.
//!
//! A failed conversion is a [`ConversionFailure`], a plain value carrying
//! the response key that explains it. It is never an [`Error`].
//!
//! [`Error`]: switchboard_foundation::Error

use std::fmt;
use std::sync::Arc;

use switchboard_foundation::{PathPattern, UserId};
use thiserror::Error;

use crate::tokenizer::Remainder;
use crate::value::Value;

/// Response key reported when input is absent.
pub const MISSING_KEY: &str = "ARG_MISSING";

/// Why a conversion failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot convert {input:?} for {param}: {key}")]
pub struct ConversionFailure {
    /// Parameter being bound; filled in by the binder.
    pub param: String,
    /// The offending input.
    pub input: String,
    /// Response key describing the failure (`INT_RESOLVE_error`).
    pub key: String,
}

impl ConversionFailure {
    /// Creates a failure for `input` with response key `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            param: String::new(),
            input: input.into(),
            key: key.into(),
        }
    }

    /// Creates a failure meaning "nothing to convert".
    #[must_use]
    pub fn missing() -> Self {
        Self::new(MISSING_KEY, "")
    }

    /// Returns true if this failure means the input was absent.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.key == MISSING_KEY
    }

    /// Attaches the parameter name.
    #[must_use]
    pub fn for_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}

/// Converts a single, already-extracted token.
pub trait SimpleConverter: Send + Sync {
    /// Converts `token` into a value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] if the token is not acceptable.
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure>;
}

/// Converts by consuming directly from the unparsed text.
pub trait ManualConverter: Send + Sync {
    /// Converts from `remaining`, advancing it past the consumed input.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionFailure`] if no acceptable input is found.
    /// `remaining` must be left untouched in that case.
    fn convert(&self, remaining: &mut Remainder<'_>) -> Result<Value, ConversionFailure>;
}

/// A converter of either shape, chosen per parameter at registration.
#[derive(Clone)]
pub enum Converter {
    /// Token-at-a-time converter.
    Simple(Arc<dyn SimpleConverter>),
    /// Cursor-consuming converter.
    Manual(Arc<dyn ManualConverter>),
}

impl Converter {
    /// Wraps a simple converter.
    #[must_use]
    pub fn simple(converter: impl SimpleConverter + 'static) -> Self {
        Self::Simple(Arc::new(converter))
    }

    /// Wraps a manual converter.
    #[must_use]
    pub fn manual(converter: impl ManualConverter + 'static) -> Self {
        Self::Manual(Arc::new(converter))
    }

    /// Free text, one token.
    #[must_use]
    pub fn string() -> Self {
        Self::simple(StringConverter)
    }

    /// Signed integer.
    #[must_use]
    pub fn int() -> Self {
        Self::simple(IntConverter)
    }

    /// Floating point number.
    #[must_use]
    pub fn float() -> Self {
        Self::simple(FloatConverter)
    }

    /// Yes/no style boolean.
    #[must_use]
    pub fn bool() -> Self {
        Self::simple(BoolConverter)
    }

    /// A user mention or raw user ID.
    #[must_use]
    pub fn user() -> Self {
        Self::simple(UserMentionConverter)
    }

    /// A toggle path pattern.
    #[must_use]
    pub fn path_pattern() -> Self {
        Self::simple(PathPatternConverter)
    }

    /// One of a fixed set of keywords, case-insensitive.
    #[must_use]
    pub fn choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::simple(Choice::new(options))
    }

    /// Everything left on the line.
    #[must_use]
    pub fn rest_of_line() -> Self {
        Self::manual(RestOfLine)
    }

    /// As many `inner` values as possible, at least `min`.
    #[must_use]
    pub fn greedy(inner: Converter, min: usize) -> Self {
        Self::manual(Greedy { inner, min })
    }

    /// The first of `alternatives` that succeeds.
    #[must_use]
    pub fn one_of(alternatives: Vec<Converter>) -> Self {
        Self::manual(OneOf { alternatives })
    }

    /// Returns true for the manual shape.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }

    /// Applies this converter at the cursor.
    ///
    /// A simple converter consumes one token on success. A manual converter
    /// consumes what it chooses. Either way the cursor is unchanged on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns the converter's failure, or a missing-input failure when a
    /// simple converter finds no token.
    pub fn apply(&self, remaining: &mut Remainder<'_>) -> Result<Value, ConversionFailure> {
        let saved = *remaining;
        let result = match self {
            Self::Simple(converter) => {
                let token = remaining.next_token().ok_or_else(ConversionFailure::missing)?;
                converter.convert(&token.text)
            }
            Self::Manual(converter) => converter.convert(remaining),
        };
        if result.is_err() {
            remaining.restore(saved);
        }
        result
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(_) => f.write_str("Converter::Simple"),
            Self::Manual(_) => f.write_str("Converter::Manual"),
        }
    }
}

// =============================================================================
// Simple converters
// =============================================================================

/// Accepts any token as text.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringConverter;

impl SimpleConverter for StringConverter {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        Ok(Value::Str(token.to_string()))
    }
}

/// Parses a signed 64-bit integer.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntConverter;

impl SimpleConverter for IntConverter {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        token
            .parse()
            .map(Value::Int)
            .map_err(|_| ConversionFailure::new("INT_RESOLVE_error", token))
    }
}

/// Parses a finite floating point number.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatConverter;

impl SimpleConverter for FloatConverter {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        match token.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(Value::Float(x)),
            _ => Err(ConversionFailure::new("FLOAT_RESOLVE_error", token)),
        }
    }
}

/// Parses yes/no, true/false, on/off, enable/disable and 1/0.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolConverter;

impl SimpleConverter for BoolConverter {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        match token.to_lowercase().as_str() {
            "yes" | "y" | "true" | "on" | "enable" | "1" => Ok(Value::Bool(true)),
            "no" | "n" | "false" | "off" | "disable" | "0" => Ok(Value::Bool(false)),
            _ => Err(ConversionFailure::new("BOOL_RESOLVE_error", token)),
        }
    }
}

/// Shortest bare number accepted as a user ID. Shorter numbers are counts.
pub const MIN_SNOWFLAKE_DIGITS: usize = 15;

/// Parses a user mention (`<@id>`, `<@!id>`) or a bare snowflake ID.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserMentionConverter;

impl SimpleConverter for UserMentionConverter {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        let bare_too_short = !token.starts_with('<') && token.len() < MIN_SNOWFLAKE_DIGITS;
        UserId::parse_mention(token)
            .filter(|_| !bare_too_short)
            .map(Value::User)
            .ok_or_else(|| ConversionFailure::new("MEMBER_RESOLVE_not_found", token))
    }
}

/// Parses a toggle pattern (`a.b`, `a.*`, `*`).
#[derive(Clone, Copy, Debug, Default)]
pub struct PathPatternConverter;

impl SimpleConverter for PathPatternConverter {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        PathPattern::parse(token)
            .map(Value::Path)
            .map_err(|_| ConversionFailure::new("PATH_RESOLVE_error", token))
    }
}

/// Accepts one of a fixed set of keywords, yielding its canonical spelling.
#[derive(Clone, Debug)]
pub struct Choice {
    options: Vec<String>,
}

impl Choice {
    /// Creates a choice among `options`.
    #[must_use]
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

impl SimpleConverter for Choice {
    fn convert(&self, token: &str) -> Result<Value, ConversionFailure> {
        self.options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(token))
            .map(|option| Value::Str(option.clone()))
            .ok_or_else(|| ConversionFailure::new("CHOICE_RESOLVE_error", token))
    }
}

// =============================================================================
// Manual converters
// =============================================================================

/// Consumes the rest of the line verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct RestOfLine;

impl ManualConverter for RestOfLine {
    fn convert(&self, remaining: &mut Remainder<'_>) -> Result<Value, ConversionFailure> {
        if remaining.is_empty() {
            return Err(ConversionFailure::missing());
        }
        Ok(Value::Str(remaining.take_rest().to_string()))
    }
}

/// Applies `inner` until it fails or the text runs out.
///
/// Produces a [`Value::List`]. Fails, consuming nothing, when fewer than
/// `min` values convert.
#[derive(Clone, Debug)]
pub struct Greedy {
    inner: Converter,
    min: usize,
}

impl Greedy {
    /// Creates a greedy converter.
    #[must_use]
    pub fn new(inner: Converter, min: usize) -> Self {
        Self { inner, min }
    }
}

impl ManualConverter for Greedy {
    fn convert(&self, remaining: &mut Remainder<'_>) -> Result<Value, ConversionFailure> {
        let saved = *remaining;
        let mut items = Vec::new();
        let mut stopped_on = None;

        while !remaining.is_empty() {
            let before = remaining.position();
            match self.inner.apply(remaining) {
                Ok(value) => items.push(value),
                Err(failure) => {
                    stopped_on = Some(failure);
                    break;
                }
            }
            if remaining.position() == before {
                break;
            }
        }

        if items.len() < self.min {
            remaining.restore(saved);
            return Err(stopped_on.unwrap_or_else(ConversionFailure::missing));
        }
        Ok(Value::List(items))
    }
}

/// Tries each alternative in order, keeping the first success.
#[derive(Clone, Debug)]
pub struct OneOf {
    alternatives: Vec<Converter>,
}

impl OneOf {
    /// Creates a union of `alternatives`.
    #[must_use]
    pub fn new(alternatives: Vec<Converter>) -> Self {
        Self { alternatives }
    }
}

impl ManualConverter for OneOf {
    fn convert(&self, remaining: &mut Remainder<'_>) -> Result<Value, ConversionFailure> {
        if remaining.is_empty() {
            return Err(ConversionFailure::missing());
        }
        for alternative in &self.alternatives {
            if let Ok(value) = alternative.apply(remaining) {
                return Ok(value);
            }
        }
        let input = remaining.peek().map(|t| t.text).unwrap_or_default();
        Err(ConversionFailure::new("UNION_RESOLVE_error", input))
    }
}
