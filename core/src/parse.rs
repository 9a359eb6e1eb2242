//! Parse entry points.
//!
//! [`parse_tokens`] runs the whole engine and returns a [`ParseOutcome`]
//! holding values and diagnostics side by side. [`parse_with`] turns the
//! outcome into a [`ParsedArgs`] or a [`ParseFailure`] according to
//! [`ParseOptions`].

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::{DefinitionError, ParseFailure, Result};
use crate::machine::run_machine;
use crate::registry::FieldRegistry;
use crate::types::ArgsType;
use crate::validate::validate_definitions;
use crate::value::Value;
use crate::variant::resolve;

/// Engine-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop unknown-argument warnings instead of failing on them.
    pub lenient: bool,
}

impl ParseOptions {
    /// Fails on every diagnostic, warnings included.
    pub fn strict() -> Self {
        Self { lenient: false }
    }

    /// Ignores unknown arguments.
    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

/// Field values of the schema selected for one requested type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaValues {
    schema: String,
    values: IndexMap<String, Value>,
}

impl SchemaValues {
    /// Creates values for `schema`.
    pub fn new(schema: impl Into<String>, values: IndexMap<String, Value>) -> Self {
        Self {
            schema: schema.into(),
            values,
        }
    }

    /// Identifier of the schema the values belong to; for a family, the
    /// selected member.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the raw value of a field.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields holding a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no field holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw result of one engine run.
///
/// Values and diagnostics are both present: a failed field is simply
/// missing from its schema's values.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The tokens as given.
    pub tokens: Vec<String>,
    /// Identifiers of the requested types, in request order.
    pub types: Vec<String>,
    /// Values per requested type whose schema could be selected.
    pub values: IndexMap<String, SchemaValues>,
    /// Errors, variant resolution first.
    pub errors: Vec<Diagnostic>,
    /// Warnings.
    pub warnings: Vec<Diagnostic>,
    /// Required fields that were never given.
    pub missing: Vec<String>,
}

impl ParseOutcome {
    /// Returns `true` if there are neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Applies `options` and converts into a final result.
    ///
    /// # Errors
    ///
    /// Returns every remaining diagnostic as a [`ParseFailure`]. In lenient
    /// mode unknown-argument warnings are dropped first.
    pub fn into_result(mut self, options: ParseOptions) -> std::result::Result<ParsedArgs, ParseFailure> {
        if options.lenient {
            self.warnings
                .retain(|w| w.code() != DiagnosticCode::UnknownArgument);
        }

        if self.is_clean() {
            return Ok(ParsedArgs {
                tokens: self.tokens,
                values: self.values,
            });
        }

        Err(ParseFailure::new(
            self.tokens,
            self.types,
            self.errors,
            self.warnings,
        ))
    }
}

/// Successfully parsed values, keyed by requested type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArgs {
    tokens: Vec<String>,
    values: IndexMap<String, SchemaValues>,
}

impl ParsedArgs {
    /// Returns the values of a requested type.
    pub fn get(&self, type_name: &str) -> Option<&SchemaValues> {
        self.values.get(type_name)
    }

    /// The tokens the values were parsed from.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Iterates requested types in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaValues)> {
        self.values.iter().map(|(name, values)| (name.as_str(), values))
    }

    /// Returns the number of requested types.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ParsedArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

/// Runs the engine on `tokens` for the requested `types`.
///
/// # Errors
///
/// Only definition problems are errors here; everything wrong with the
/// tokens is reported inside the outcome.
///
/// # Examples
///
/// ```
/// use typed_args_core::*;
///
/// let schema = Schema::new("Person")
///     .with_field(FieldSchema::scalar("name", ElementType::String))
///     .with_field(FieldSchema::optional("count", ElementType::Int32));
///
/// let outcome = parse_tokens(&["--name", "bob", "--count", "x"], &[schema.into()]).unwrap();
/// assert_eq!(outcome.errors.len(), 1);
/// assert_eq!(outcome.errors[0].code(), DiagnosticCode::IllegalValue);
/// ```
pub fn parse_tokens<S: AsRef<str>>(
    tokens: &[S],
    types: &[ArgsType],
) -> std::result::Result<ParseOutcome, DefinitionError> {
    validate_definitions(types)?;

    let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
    debug!(tokens = ?tokens, types = types.len(), "parsing arguments");

    let resolution = resolve(tokens.clone(), types);
    let registry = FieldRegistry::register(&resolution.schemas)?;
    let output = run_machine(&registry, &resolution.tokens);

    let values = registry
        .schemas()
        .iter()
        .zip(output.values)
        .map(|(active, values)| {
            (
                active.requested.to_string(),
                SchemaValues::new(active.schema.name.clone(), values),
            )
        })
        .collect();

    let mut errors = resolution.errors;
    errors.extend(output.errors);

    let outcome = ParseOutcome {
        tokens,
        types: types.iter().map(|ty| ty.name().to_string()).collect(),
        values,
        errors,
        warnings: output.warnings,
        missing: output.missing,
    };
    debug!(
        errors = outcome.errors.len(),
        warnings = outcome.warnings.len(),
        missing = ?outcome.missing,
        "parse finished"
    );
    Ok(outcome)
}

/// Parses `tokens` and applies `options`.
///
/// # Errors
///
/// Returns [`ArgsError::Definition`](crate::ArgsError::Definition) for bad
/// schemas and [`ArgsError::Parse`](crate::ArgsError::Parse) for bad input.
///
/// # Examples
///
/// ```
/// use typed_args_core::*;
///
/// let schema = Schema::new("Server").with_field(FieldSchema::list("tags", ElementType::String));
/// let types = [ArgsType::from(schema)];
///
/// let parsed = parse_with(&["--tags", "a", "b"], &types, ParseOptions::strict()).unwrap();
/// assert_eq!(parsed.get("Server").unwrap().len(), 1);
///
/// assert!(parse_with(&["--other"], &types, ParseOptions::strict()).is_err());
/// assert!(parse_with(&["--other"], &types, ParseOptions::lenient()).is_ok());
/// ```
pub fn parse_with<S: AsRef<str>>(
    tokens: &[S],
    types: &[ArgsType],
    options: ParseOptions,
) -> Result<ParsedArgs> {
    let outcome = parse_tokens(tokens, types)?;
    Ok(outcome.into_result(options)?)
}
