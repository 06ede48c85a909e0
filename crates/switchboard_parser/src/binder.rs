//! Argument binding.
//!
//! [`bind`] walks a node's declared parameters in order against the
//! unconsumed text. Simple parameters take the next token; manual parameters
//! hand the cursor to their converter. The first failure aborts the bind and
//! no partial argument list escapes.

use switchboard_foundation::{Error, ErrorKind, Response, Result};

use crate::converter::{ConversionFailure, Converter};
use crate::tokenizer::Remainder;
use crate::value::{FromValue, Value};

/// Generic argument error key, last in the conversion fallback chain.
pub const ARG_ERROR_KEY: &str = "ARG_ERROR";

/// Generic missing argument key.
pub const ARG_MISSING_KEY: &str = "ARG_MISSING";

/// Trailing text key for strict commands.
pub const ARG_TRAILING_KEY: &str = "ARG_TRAILING";

/// A declared parameter.
#[derive(Clone, Debug)]
pub struct Param {
    /// Name used in response keys and [`Args::get`].
    pub name: String,
    /// How to convert the input.
    pub converter: Converter,
    /// Whether absence is an error.
    pub required: bool,
    /// Value used when an optional parameter has no input.
    pub default: Value,
}

impl Param {
    /// Declares a required parameter.
    #[must_use]
    pub fn required(name: impl Into<String>, converter: Converter) -> Self {
        Self {
            name: name.into(),
            converter,
            required: true,
            default: Value::None,
        }
    }

    /// Declares an optional parameter defaulting to [`Value::None`].
    #[must_use]
    pub fn optional(name: impl Into<String>, converter: Converter) -> Self {
        Self {
            required: false,
            ..Self::required(name, converter)
        }
    }

    /// Makes this parameter optional with the given default.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = default.into();
        self
    }
}

/// Why binding failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindingFailure {
    /// A required parameter had no input.
    #[error("missing argument {param}")]
    MissingArgument {
        /// Parameter name.
        param: String,
    },
    /// A converter rejected its input.
    #[error(transparent)]
    Conversion(ConversionFailure),
    /// A strict command was given more text than it declares.
    #[error("unexpected trailing text {text:?}")]
    TrailingText {
        /// The unconsumed text.
        text: String,
    },
}

impl BindingFailure {
    /// Returns the response reporting this failure.
    ///
    /// Missing arguments try `<param>_ARG_MISSING` then `ARG_MISSING`;
    /// conversion failures try `<param>_<key>`, `<key>`, then `ARG_ERROR`,
    /// with the offending input as the first argument.
    #[must_use]
    pub fn response(&self) -> Response {
        match self {
            Self::MissingArgument { param } => {
                Response::chain([format!("{param}_{ARG_MISSING_KEY}"), ARG_MISSING_KEY.into()])
                    .named("param", param)
            }
            Self::Conversion(failure) => Response::chain([
                format!("{}_{}", failure.param, failure.key),
                failure.key.clone(),
                ARG_ERROR_KEY.into(),
            ])
            .arg(&failure.input)
            .named("param", &failure.param),
            Self::TrailingText { text } => Response::new(ARG_TRAILING_KEY).arg(text),
        }
    }
}

/// Bound arguments, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    values: Vec<(String, Value)>,
    rest: String,
}

impl Args {
    /// Creates an argument list directly.
    #[must_use]
    pub fn new(values: Vec<(String, Value)>, rest: impl Into<String>) -> Self {
        Self {
            values,
            rest: rest.into(),
        }
    }

    /// Returns the raw value bound to `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Returns the value bound to `name` as `T`.
    ///
    /// # Errors
    ///
    /// Returns `MissingArgument` if no such parameter was bound, or
    /// `ArgumentType` if the value has another kind.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self
            .value(name)
            .ok_or_else(|| Error::new(ErrorKind::MissingArgument(name.to_string())))?;
        T::from_value(value).ok_or_else(|| {
            Error::new(ErrorKind::ArgumentType {
                name: name.to_string(),
                expected: T::EXPECTED,
            })
        })
    }

    /// Returns the values in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        self.values.iter().map(|(_, value)| value).collect()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no parameters were bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns text left after the last parameter.
    #[must_use]
    pub fn rest(&self) -> &str {
        &self.rest
    }
}

/// Binds `params` against `remaining`.
///
/// Trailing text is kept in [`Args::rest`] unless `strict` is set, in which
/// case it is a [`BindingFailure::TrailingText`].
///
/// # Errors
///
/// Returns the first parameter's failure; nothing is bound in that case.
pub fn bind(
    params: &[Param],
    mut remaining: Remainder<'_>,
    strict: bool,
) -> std::result::Result<Args, BindingFailure> {
    let mut values = Vec::with_capacity(params.len());

    for param in params {
        let value = if param.converter.is_manual() {
            bind_manual(param, &mut remaining)?
        } else {
            bind_simple(param, &mut remaining)?
        };
        values.push((param.name.clone(), value));
    }

    let rest = remaining.as_str().trim_end();
    if strict && !rest.is_empty() {
        return Err(BindingFailure::TrailingText {
            text: rest.to_string(),
        });
    }

    Ok(Args {
        values,
        rest: rest.to_string(),
    })
}

fn bind_simple(
    param: &Param,
    remaining: &mut Remainder<'_>,
) -> std::result::Result<Value, BindingFailure> {
    if remaining.is_empty() {
        if param.required {
            return Err(BindingFailure::MissingArgument {
                param: param.name.clone(),
            });
        }
        return Ok(param.default.clone());
    }

    param
        .converter
        .apply(remaining)
        .map_err(|failure| BindingFailure::Conversion(failure.for_param(&param.name)))
}

fn bind_manual(
    param: &Param,
    remaining: &mut Remainder<'_>,
) -> std::result::Result<Value, BindingFailure> {
    let was_empty = remaining.is_empty();
    match param.converter.apply(remaining) {
        Ok(value) => Ok(value),
        Err(_) if !param.required => Ok(param.default.clone()),
        Err(failure) if was_empty || failure.is_missing() => Err(BindingFailure::MissingArgument {
            param: param.name.clone(),
        }),
        Err(failure) => Err(BindingFailure::Conversion(failure.for_param(&param.name))),
    }
}
