//! Error types for argument parsing.
//!
//! Two tiers: [`DefinitionError`] for mistakes in how schemas were declared,
//! found before any token is read, and [`ParseFailure`] for everything wrong
//! with a particular command line. [`ArgsError`] unifies both.

use std::fmt;

use thiserror::Error;

use crate::coerce::CoercionError;
use crate::diagnostic::{Diagnostic, DiagnosticCode};

/// Two schemas that define a field of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConflict {
    /// The shared field name.
    pub name: String,
    /// Schema that defined the field first.
    pub first_schema: String,
    /// Schema that defined it again.
    pub second_schema: String,
}

impl fmt::Display for FieldConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate field '{}' in schemas '{}' and '{}'",
            self.name, self.first_schema, self.second_schema
        )
    }
}

/// Schema definition errors.
///
/// These do not depend on the tokens; they mean the schemas handed to the
/// parser cannot work together and must be fixed by their author.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// No types were requested.
    #[error("at least one args type must be given")]
    NoTypes,
    /// A schema or family identifier is empty or whitespace-only.
    #[error("args type names cannot be empty")]
    EmptyTypeName,
    /// Two requested types share an identifier.
    #[error("duplicate args type: {0}")]
    DuplicateType(String),
    /// A field name is empty or whitespace-only.
    #[error("schema '{schema}' has a field without a name")]
    EmptyFieldName { schema: String },
    /// Field names collide across schemas; every collision is listed.
    #[error("{}", join_lines(.0))]
    DuplicateFields(Vec<FieldConflict>),
    /// A family has no members, so none can be selected.
    #[error("variant family '{family}' has no members")]
    EmptyFamily { family: String },
    /// Two members of one family derive the same selector name.
    #[error("members '{first}' and '{second}' of '{family}' both derive the name '{name}'")]
    DuplicateMemberName {
        family: String,
        name: String,
        first: String,
        second: String,
    },
    /// More than one family is selected by the first token.
    #[error("there can only be one action, but '{second}' is the second after '{first}'")]
    MultipleActions { first: String, second: String },
    /// A mode family's selector flag is also a field name.
    #[error("selector '{flag}' of '{family}' collides with a field of the same name")]
    SelectorConflict { family: String, flag: String },
    /// A default was declared on a field that is not a scalar.
    #[error("field '{field}' is not a scalar and cannot have a default")]
    DefaultOnNonScalar { field: String },
    /// A declared default does not coerce to the field's type.
    #[error("default of field '{field}' is invalid: {cause}")]
    InvalidDefault {
        field: String,
        #[source]
        cause: CoercionError,
    },
}

fn join_lines(conflicts: &[FieldConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The command line could not be parsed into the requested types.
///
/// Carries every error and warning of the call plus the raw tokens and the
/// requested type names for debugging. `Display` joins the rendered
/// diagnostics, one per line, errors first.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    tokens: Vec<String>,
    types: Vec<String>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl ParseFailure {
    pub(crate) fn new(
        tokens: Vec<String>,
        types: Vec<String>,
        errors: Vec<Diagnostic>,
        warnings: Vec<Diagnostic>,
    ) -> Self {
        Self {
            tokens,
            types,
            errors,
            warnings,
        }
    }

    /// The tokens as passed to the parser.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Names of the types that were supposed to be created.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Diagnostics that are errors.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Diagnostics that are warnings.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// All diagnostics, errors first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(&self.warnings)
    }

    /// Codes of all diagnostics, errors first.
    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.diagnostics().map(Diagnostic::code).collect()
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {diagnostic}", diagnostic.code())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}

/// Any failure of a parse call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgsError {
    /// The schemas themselves are invalid.
    #[error("invalid args definition: {0}")]
    Definition(#[from] DefinitionError),
    /// The tokens do not fit the schemas.
    #[error("{0}")]
    Parse(#[from] ParseFailure),
}

impl ArgsError {
    /// Returns the parse failure, if this is one.
    pub fn as_parse_failure(&self) -> Option<&ParseFailure> {
        match self {
            ArgsError::Parse(failure) => Some(failure),
            ArgsError::Definition(_) => None,
        }
    }
}

/// Convenience alias for results with [`ArgsError`].
pub type Result<T> = std::result::Result<T, ArgsError>;
