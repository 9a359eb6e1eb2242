//! Conversion of raw tokens into typed values.
//!
//! Coercion is pure: every function here maps one string to one value or a
//! [`CoercionError`] describing why it could not.
//!
//! # Examples
//!
//! ```
//! use typed_args_core::{ElementType, ScalarValue, coerce};
//!
//! assert_eq!(coerce("-42", ElementType::Int32).unwrap(), ScalarValue::Int32(-42));
//! assert_eq!(coerce("true", ElementType::Bool).unwrap(), ScalarValue::Bool(true));
//! assert!(coerce("True", ElementType::Bool).is_err());
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ElementType, FieldKind};
use crate::value::ScalarValue;

/// Separator between key and value of a map entry.
pub const MAP_ENTRY_SEPARATOR: char = '=';

/// The type a token was expected to coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// A single value of the given type.
    Element(ElementType),
    /// A `key=value` entry of a map field.
    Entry { key: ElementType, value: ElementType },
}

impl ExpectedType {
    /// Returns what a value token for a field of `kind` must coerce to.
    pub fn for_field(kind: &FieldKind) -> Self {
        match *kind {
            FieldKind::Map { key, value } => ExpectedType::Entry { key, value },
            other => ExpectedType::Element(other.element()),
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Element(element) => write!(f, "{element}"),
            ExpectedType::Entry { key, value } => write!(f, "map<{key}, {value}>"),
        }
    }
}

/// A token that could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{raw}' is not a valid {expected}: {reason}")]
pub struct CoercionError {
    /// The token as given.
    pub raw: String,
    /// What the token should have been.
    pub expected: ExpectedType,
    /// The underlying parse error.
    pub reason: String,
}

impl CoercionError {
    fn new(raw: &str, expected: ExpectedType, reason: impl ToString) -> Self {
        Self {
            raw: raw.to_string(),
            expected,
            reason: reason.to_string(),
        }
    }
}

/// Coerces a single token to `kind`.
///
/// Integers are base-10 with an optional sign and fail on overflow, floats
/// accept decimal and exponential notation, and booleans accept exactly
/// `true` and `false`. Strings and paths are taken verbatim.
///
/// # Errors
///
/// Returns a [`CoercionError`] carrying the token, the target type, and the
/// underlying parse error.
pub fn coerce(raw: &str, kind: ElementType) -> Result<ScalarValue, CoercionError> {
    let expected = ExpectedType::Element(kind);
    let value = match kind {
        ElementType::String => ScalarValue::String(raw.to_string()),
        ElementType::Path => ScalarValue::Path(PathBuf::from(raw)),
        ElementType::Int32 => raw
            .parse()
            .map(ScalarValue::Int32)
            .map_err(|err| CoercionError::new(raw, expected, err))?,
        ElementType::Int64 => raw
            .parse()
            .map(ScalarValue::Int64)
            .map_err(|err| CoercionError::new(raw, expected, err))?,
        ElementType::Float32 => raw
            .parse()
            .map(ScalarValue::Float32)
            .map_err(|err| CoercionError::new(raw, expected, err))?,
        ElementType::Float64 => raw
            .parse()
            .map(ScalarValue::Float64)
            .map_err(|err| CoercionError::new(raw, expected, err))?,
        ElementType::Bool => match raw {
            "true" => ScalarValue::Bool(true),
            "false" => ScalarValue::Bool(false),
            _ => {
                return Err(CoercionError::new(
                    raw,
                    expected,
                    "only 'true' and 'false' are allowed",
                ));
            }
        },
    };
    Ok(value)
}

/// Coerces a `key=value` token for a map field.
///
/// The token must contain exactly one `=`. Failures of the key or value
/// coercion are reported against the whole entry.
///
/// # Examples
///
/// ```
/// use typed_args_core::{ElementType, ScalarValue, coerce_entry};
///
/// let (key, value) = coerce_entry("1=one", ElementType::Int32, ElementType::String).unwrap();
/// assert_eq!(key, ScalarValue::Int32(1));
/// assert_eq!(value, ScalarValue::String("one".into()));
///
/// assert!(coerce_entry("one", ElementType::String, ElementType::String).is_err());
/// assert!(coerce_entry("one=", ElementType::String, ElementType::String).is_err());
/// assert!(coerce_entry("a=b=c", ElementType::String, ElementType::String).is_err());
/// ```
pub fn coerce_entry(
    raw: &str,
    key: ElementType,
    value: ElementType,
) -> Result<(ScalarValue, ScalarValue), CoercionError> {
    let expected = ExpectedType::Entry { key, value };
    let (raw_key, raw_value) = match raw.split_once(MAP_ENTRY_SEPARATOR) {
        None | Some((_, "")) => {
            return Err(CoercionError::new(
                raw,
                expected,
                "no valid 'key=value' pair, it has no value",
            ));
        }
        Some((_, rest)) if rest.contains(MAP_ENTRY_SEPARATOR) => {
            return Err(CoercionError::new(
                raw,
                expected,
                "no valid 'key=value' pair, it has more than one equal sign",
            ));
        }
        Some(pair) => pair,
    };

    let coerced_key =
        coerce(raw_key, key).map_err(|err| CoercionError::new(raw, expected, err))?;
    let coerced_value =
        coerce(raw_value, value).map_err(|err| CoercionError::new(raw, expected, err))?;
    Ok((coerced_key, coerced_value))
}
