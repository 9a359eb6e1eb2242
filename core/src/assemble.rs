//! Typed result assembly.
//!
//! Callers describe their result types by implementing [`FromArgs`]; the
//! engine parses, then hands each type its [`SchemaValues`]. Values are read
//! with [`SchemaValues::get`], which converts through [`FromValue`].
//!
//! # Examples
//!
//! ```
//! use typed_args_core::*;
//!
//! #[derive(Debug)]
//! struct Server {
//!     port: i32,
//!     tags: Vec<String>,
//! }
//!
//! impl FromArgs for Server {
//!     fn args_type() -> ArgsType {
//!         Schema::new("Server")
//!             .with_field(FieldSchema::scalar("port", ElementType::Int32))
//!             .with_field(FieldSchema::list("tags", ElementType::String))
//!             .into()
//!     }
//!
//!     fn from_values(values: &SchemaValues) -> std::result::Result<Self, ConstructionError> {
//!         let port: i32 = values.get("port")?;
//!         if port <= 0 {
//!             return Err(ConstructionError::new("port must be positive"));
//!         }
//!         Ok(Server { port, tags: values.get("tags")? })
//!     }
//! }
//!
//! let server: Server = parse(&["--port", "80", "--tags", "a", "b"]).unwrap();
//! assert_eq!(server.port, 80);
//! assert_eq!(server.tags, ["a", "b"]);
//!
//! let err = parse::<Server, _>(&["--port", "-1"]).unwrap_err();
//! assert_eq!(
//!     err.as_parse_failure().unwrap().codes(),
//!     vec![DiagnosticCode::FailedConstruction]
//! );
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;

use tracing::debug;

use crate::diagnostic::{ConstructionError, Diagnostic};
use crate::error::{ArgsError, ParseFailure, Result};
use crate::parse::{ParseOptions, ParsedArgs, SchemaValues, parse_with};
use crate::types::ArgsType;
use crate::value::{ScalarValue, Value};

/// Conversion from a single coerced value.
pub trait FromScalar: Sized {
    /// Returns `None` if `value` holds a different element type.
    fn from_scalar(value: &ScalarValue) -> Option<Self>;
}

/// Conversion from a field's final value.
pub trait FromValue: Sized {
    /// Returns `None` if `value` has a different shape or element type.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(value: &ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    value.as_scalar().and_then(<$ty>::from_scalar)
                }
            }
        )*
    };
}

impl_from_scalar! {
    String => String,
    PathBuf => Path,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
}

impl FromScalar for ScalarValue {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromScalar> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Optional(None) => Some(None),
            Value::Optional(Some(inner)) | Value::Scalar(inner) => T::from_scalar(inner).map(Some),
            _ => None,
        }
    }
}

impl<T: FromScalar> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_scalar).collect()
    }
}

impl<K, V> FromValue for HashMap<K, V>
where
    K: FromScalar + Eq + Hash,
    V: FromScalar,
{
    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_map()?
            .iter()
            .map(|(key, value)| Some((K::from_scalar(key)?, V::from_scalar(value)?)))
            .collect()
    }
}

impl SchemaValues {
    /// Reads a field as `T`.
    ///
    /// # Errors
    ///
    /// Fails if the field holds no value or a value `T` cannot represent.
    pub fn get<T: FromValue>(&self, name: &str) -> std::result::Result<T, ConstructionError> {
        let value = self.value(name).ok_or_else(|| {
            ConstructionError::new(format!("'{}' has no value for field '{name}'", self.schema()))
        })?;
        T::from_value(value).ok_or_else(|| {
            ConstructionError::new(format!(
                "field '{name}' of '{}' cannot be read as {}",
                self.schema(),
                type_name::<T>()
            ))
        })
    }
}

/// A type that can be built from parsed arguments.
///
/// For a [`VariantFamily`](crate::VariantFamily),
/// [`SchemaValues::schema`] names the selected member.
pub trait FromArgs: Sized {
    /// Describes the fields this type needs.
    fn args_type() -> ArgsType;

    /// Builds the value from the parsed fields.
    fn from_values(values: &SchemaValues) -> std::result::Result<Self, ConstructionError>;
}

/// Typed parse front end.
///
/// # Examples
///
/// ```
/// use typed_args_core::*;
///
/// struct Verbose(bool);
///
/// impl FromArgs for Verbose {
///     fn args_type() -> ArgsType {
///         Schema::new("Verbose")
///             .with_field(FieldSchema::scalar("verbose", ElementType::Bool).with_default("false"))
///             .into()
///     }
///
///     fn from_values(values: &SchemaValues) -> std::result::Result<Self, ConstructionError> {
///         Ok(Verbose(values.get("verbose")?))
///     }
/// }
///
/// let parser = Parser::new().lenient(true);
/// let Verbose(verbose) = parser.parse(&["--verbose", "--color"]).unwrap();
/// assert!(verbose);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    /// Creates a strict parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Sets whether unknown arguments are ignored.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.options.lenient = lenient;
        self
    }

    /// Returns the options in use.
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parses one type.
    ///
    /// # Errors
    ///
    /// See [`parse_with`]; construction failures are reported as
    /// [`Diagnostic::FailedConstruction`].
    pub fn parse<T: FromArgs, S: AsRef<str>>(&self, tokens: &[S]) -> Result<T> {
        let parsed = parse_with(tokens, &[T::args_type()], self.options)?;
        let mut failures = Vec::new();
        let value = construct::<T>(&parsed, &mut failures);
        match value {
            Some(value) => Ok(value),
            None => Err(construction_failure(&parsed, &[T::args_type()], failures)),
        }
    }

    /// Parses two types from the same tokens.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse`].
    pub fn parse2<A, B, S>(&self, tokens: &[S]) -> Result<(A, B)>
    where
        A: FromArgs,
        B: FromArgs,
        S: AsRef<str>,
    {
        let types = [A::args_type(), B::args_type()];
        let parsed = parse_with(tokens, &types, self.options)?;
        let mut failures = Vec::new();
        let a = construct::<A>(&parsed, &mut failures);
        let b = construct::<B>(&parsed, &mut failures);
        match (a, b) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(construction_failure(&parsed, &types, failures)),
        }
    }

    /// Parses three types from the same tokens.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse`].
    pub fn parse3<A, B, C, S>(&self, tokens: &[S]) -> Result<(A, B, C)>
    where
        A: FromArgs,
        B: FromArgs,
        C: FromArgs,
        S: AsRef<str>,
    {
        let types = [A::args_type(), B::args_type(), C::args_type()];
        let parsed = parse_with(tokens, &types, self.options)?;
        let mut failures = Vec::new();
        let a = construct::<A>(&parsed, &mut failures);
        let b = construct::<B>(&parsed, &mut failures);
        let c = construct::<C>(&parsed, &mut failures);
        match (a, b, c) {
            (Some(a), Some(b), Some(c)) => Ok((a, b, c)),
            _ => Err(construction_failure(&parsed, &types, failures)),
        }
    }
}

fn construct<T: FromArgs>(parsed: &ParsedArgs, failures: &mut Vec<Diagnostic>) -> Option<T> {
    let args_type = T::args_type();
    let requested = args_type.name();

    let Some(values) = parsed.get(requested) else {
        failures.push(Diagnostic::FailedConstruction {
            schema: requested.to_string(),
            error: ConstructionError::new("no values were parsed for this type"),
        });
        return None;
    };

    match T::from_values(values) {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(schema = values.schema(), error = %error, "construction failed");
            failures.push(Diagnostic::FailedConstruction {
                schema: values.schema().to_string(),
                error,
            });
            None
        }
    }
}

fn construction_failure(parsed: &ParsedArgs, types: &[ArgsType], failures: Vec<Diagnostic>) -> ArgsError {
    ParseFailure::new(
        parsed.tokens().to_vec(),
        types.iter().map(|ty| ty.name().to_string()).collect(),
        failures,
        Vec::new(),
    )
    .into()
}

/// Parses `tokens` into `T`, failing on any diagnostic.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse<T: FromArgs, S: AsRef<str>>(tokens: &[S]) -> Result<T> {
    Parser::new().parse(tokens)
}

/// Parses `tokens` into `A` and `B`.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse2<A: FromArgs, B: FromArgs, S: AsRef<str>>(tokens: &[S]) -> Result<(A, B)> {
    Parser::new().parse2(tokens)
}

/// Parses `tokens` into `A`, `B` and `C`.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse3<A: FromArgs, B: FromArgs, C: FromArgs, S: AsRef<str>>(
    tokens: &[S],
) -> Result<(A, B, C)> {
    Parser::new().parse3(tokens)
}

/// Parses `tokens` into `T`, ignoring unknown arguments.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse_leniently<T: FromArgs, S: AsRef<str>>(tokens: &[S]) -> Result<T> {
    Parser::new().lenient(true).parse(tokens)
}
