//! Parse-time diagnostics.
//!
//! Every problem the parser finds in the tokens becomes a [`Diagnostic`].
//! They are collected, never thrown one at a time, so a single call reports
//! everything that is wrong with the input.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coerce::{CoercionError, ExpectedType};

/// A problem found while parsing the tokens.
///
/// All variants but [`UnknownArgument`](Diagnostic::UnknownArgument) are
/// errors. Names are given without the `--` marker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    /// A required field (or a mode selector) was never given.
    #[error("no value for required argument '{name}'")]
    MissingArgument { name: String },

    /// A field was named but no value followed.
    #[error("no value was assigned to argument '{name}'")]
    MissingValue { name: String },

    /// A value could not be coerced to the field's type.
    #[error("value '{value}' could not be parsed to '{name}'s type {expected}")]
    IllegalValue {
        name: String,
        expected: ExpectedType,
        value: String,
        #[source]
        cause: CoercionError,
    },

    /// A value appeared where an argument name was expected.
    #[error("expected an option but got argument '{value}' instead")]
    UnexpectedValue { value: String },

    /// A single-valued field was named a second time.
    #[error("argument '{name}' was given more than once")]
    RepeatedArgument { name: String },

    /// A mode selector named no member of its family.
    #[error(
        "value '{actual_value}' did not match any of the values allowed for '{name}': [ {} ]",
        quoted(.allowed_values)
    )]
    IllegalModeValue {
        name: String,
        allowed_values: Vec<String>,
        actual_value: String,
    },

    /// The input was empty but an action was required.
    #[error("no arguments provided, first argument must be one of [ {} ]", quoted(.allowed_values))]
    MissingAction { allowed_values: Vec<String> },

    /// The first token named no action.
    #[error(
        "first argument '{actual_value}' did not match any of the allowed values: [ {} ]",
        quoted(.allowed_values)
    )]
    UnknownAction {
        allowed_values: Vec<String>,
        actual_value: String,
    },

    /// A name that matches no active field; its value is skipped.
    #[error("encountered name of unknown argument '{name}'")]
    UnknownArgument { name: String },

    /// Building the result from the parsed values failed.
    #[error("constructing '{schema}' failed: {error}")]
    FailedConstruction {
        schema: String,
        #[source]
        error: ConstructionError,
    },
}

fn quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Diagnostic {
    /// Returns the stable code of this diagnostic's kind.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Diagnostic::MissingArgument { .. } => DiagnosticCode::MissingArgument,
            Diagnostic::MissingValue { .. } => DiagnosticCode::MissingValue,
            Diagnostic::IllegalValue { .. } => DiagnosticCode::IllegalValue,
            Diagnostic::UnexpectedValue { .. } => DiagnosticCode::UnexpectedValue,
            Diagnostic::RepeatedArgument { .. } => DiagnosticCode::RepeatedArgument,
            Diagnostic::IllegalModeValue { .. } => DiagnosticCode::IllegalModeValue,
            Diagnostic::MissingAction { .. } => DiagnosticCode::MissingAction,
            Diagnostic::UnknownAction { .. } => DiagnosticCode::UnknownAction,
            Diagnostic::UnknownArgument { .. } => DiagnosticCode::UnknownArgument,
            Diagnostic::FailedConstruction { .. } => DiagnosticCode::FailedConstruction,
        }
    }

    /// Returns `true` for diagnostics that only warn.
    pub fn is_warning(&self) -> bool {
        self.code().is_warning()
    }

    /// Returns the field or selector name the diagnostic refers to, if any.
    pub fn argument_name(&self) -> Option<&str> {
        match self {
            Diagnostic::MissingArgument { name }
            | Diagnostic::MissingValue { name }
            | Diagnostic::IllegalValue { name, .. }
            | Diagnostic::RepeatedArgument { name }
            | Diagnostic::IllegalModeValue { name, .. }
            | Diagnostic::UnknownArgument { name } => Some(name),
            _ => None,
        }
    }
}

/// Discriminant of a [`Diagnostic`], for callers that branch on kinds.
///
/// # Examples
///
/// ```
/// use typed_args_core::DiagnosticCode;
///
/// assert!(DiagnosticCode::UnknownArgument.is_warning());
/// assert_eq!(DiagnosticCode::MissingValue.to_string(), "missing_value");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    MissingArgument,
    MissingValue,
    IllegalValue,
    UnexpectedValue,
    RepeatedArgument,
    IllegalModeValue,
    MissingAction,
    UnknownAction,
    UnknownArgument,
    FailedConstruction,
}

impl DiagnosticCode {
    /// Returns the snake_case code.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::MissingArgument => "missing_argument",
            DiagnosticCode::MissingValue => "missing_value",
            DiagnosticCode::IllegalValue => "illegal_value",
            DiagnosticCode::UnexpectedValue => "unexpected_value",
            DiagnosticCode::RepeatedArgument => "repeated_argument",
            DiagnosticCode::IllegalModeValue => "illegal_mode_value",
            DiagnosticCode::MissingAction => "missing_action",
            DiagnosticCode::UnknownAction => "unknown_action",
            DiagnosticCode::UnknownArgument => "unknown_argument",
            DiagnosticCode::FailedConstruction => "failed_construction",
        }
    }

    /// Returns `true` for codes that only warn.
    pub fn is_warning(self) -> bool {
        self == DiagnosticCode::UnknownArgument
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a result constructor.
///
/// Keeps the constructor's message and, if given, the error that caused it
/// so the chain survives into the [`Diagnostic`]. Two construction errors
/// are equal if their messages are.
///
/// # Examples
///
/// ```
/// use std::error::Error;
/// use typed_args_core::ConstructionError;
///
/// let parse_err = "x".parse::<u8>().unwrap_err();
/// let err = ConstructionError::with_source("port out of range", parse_err);
/// assert_eq!(err.to_string(), "port out of range");
/// assert!(err.source().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ConstructionError {
    message: String,
    source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl ConstructionError {
    /// Creates an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that wraps its cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Returns the constructor's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ConstructionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

impl PartialEq for ConstructionError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

#[cfg(test)]
mod tests {
    use crate::types::ElementType;

    use super::*;

    #[test]
    fn test_messages_render_structured_context() {
        let diag = Diagnostic::IllegalModeValue {
            name: "mode".to_string(),
            allowed_values: vec!["withString".to_string(), "withList".to_string()],
            actual_value: "withStringies".to_string(),
        };
        assert_eq!(
            diag.to_string(),
            "value 'withStringies' did not match any of the values allowed for 'mode': [ 'withString', 'withList' ]"
        );

        let diag = Diagnostic::MissingAction {
            allowed_values: vec!["start".to_string()],
        };
        assert_eq!(
            diag.to_string(),
            "no arguments provided, first argument must be one of [ 'start' ]"
        );
    }

    #[test]
    fn test_illegal_value_keeps_cause() {
        let cause = crate::coerce::coerce("five", ElementType::Int32).unwrap_err();
        let diag = Diagnostic::IllegalValue {
            name: "count".to_string(),
            expected: ExpectedType::Element(ElementType::Int32),
            value: "five".to_string(),
            cause,
        };

        assert_eq!(
            diag.to_string(),
            "value 'five' could not be parsed to 'count's type int32"
        );
        assert!(diag.source().is_some());
        assert_eq!(diag.argument_name(), Some("count"));
    }

    #[test]
    fn test_only_unknown_argument_warns() {
        let warning = Diagnostic::UnknownArgument {
            name: "x".to_string(),
        };
        let error = Diagnostic::UnexpectedValue {
            value: "x".to_string(),
        };

        assert!(warning.is_warning());
        assert!(!error.is_warning());
        assert_eq!(error.code(), DiagnosticCode::UnexpectedValue);
        assert_eq!(error.argument_name(), None);
    }

    #[test]
    fn test_failed_construction_preserves_chain() {
        let parse_err = "300".parse::<u8>().unwrap_err();
        let diag = Diagnostic::FailedConstruction {
            schema: "Server".to_string(),
            error: ConstructionError::with_source("port out of range", parse_err),
        };

        assert_eq!(diag.to_string(), "constructing 'Server' failed: port out of range");
        let source = diag.source().unwrap();
        assert_eq!(source.to_string(), "port out of range");
        assert!(source.source().is_some());
    }
}
