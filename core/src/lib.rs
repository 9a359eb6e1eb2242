//! Schema-driven parsing of command-line tokens into typed values.
//!
//! Callers describe what they expect as data:
//!
//! - [`Schema`]: named, typed fields ([`FieldSchema`]) of one result type.
//! - [`VariantFamily`]: mutually exclusive schemas, selected either by the
//!   first token ([`VariantKind::Action`]) or by a `--<family> <member>` pair
//!   ([`VariantKind::Mode`]).
//! - [`ArgsType`]: either of the above, as requested from one call.
//!
//! [`parse_tokens`] checks the definitions ([`validate_definitions`]),
//! resolves variant families, and walks the remaining tokens with a state
//! machine, coercing values ([`coerce`], [`coerce_entry`]) into
//! [`Value`]s. Every problem with the input becomes a [`Diagnostic`]; one
//! call reports all of them at once. [`parse_with`] applies
//! [`ParseOptions`], and the [`FromArgs`] layer ([`parse`], [`parse2`],
//! [`parse3`], [`parse_leniently`]) builds caller types from the values.
//!
//! # Example
//!
//! ```
//! use typed_args_core::*;
//!
//! let mode = VariantFamily::mode("Mode")
//!     .with_member(Schema::new("Fast").with_field(FieldSchema::scalar("threads", ElementType::Int32)))
//!     .with_member(Schema::new("Safe"));
//! let common = Schema::new("Common")
//!     .with_field(FieldSchema::list("files", ElementType::Path))
//!     .with_field(FieldSchema::scalar("verbose", ElementType::Bool).with_default("false"));
//! let types = [ArgsType::from(mode), common.into()];
//!
//! let parsed = parse_with(
//!     &["--files", "a", "b", "--mode", "fast", "--threads", "4", "--verbose"],
//!     &types,
//!     ParseOptions::strict(),
//! )
//! .unwrap();
//! assert_eq!(parsed.get("Mode").unwrap().schema(), "Fast");
//! assert_eq!(parsed.get("Common").unwrap().get::<bool>("verbose").unwrap(), true);
//!
//! let err = parse_with(&["--mode", "slow"], &types, ParseOptions::strict()).unwrap_err();
//! assert_eq!(
//!     err.as_parse_failure().unwrap().codes(),
//!     vec![DiagnosticCode::IllegalModeValue, DiagnosticCode::UnknownArgument]
//! );
//! ```

mod assemble;
mod coerce;
mod diagnostic;
mod error;
mod machine;
mod parse;
mod registry;
mod types;
mod validate;
mod value;
mod variant;

pub use assemble::{FromArgs, FromScalar, FromValue, Parser, parse, parse_leniently, parse2, parse3};
pub use coerce::{CoercionError, ExpectedType, MAP_ENTRY_SEPARATOR, coerce, coerce_entry};
pub use diagnostic::{ConstructionError, Diagnostic, DiagnosticCode};
pub use error::{ArgsError, DefinitionError, FieldConflict, ParseFailure, Result};
pub use machine::{MachineOutput, ParseState, run_machine};
pub use parse::{ParseOptions, ParseOutcome, ParsedArgs, SchemaValues, parse_tokens, parse_with};
pub use registry::{ActiveSchema, FieldId, FieldRegistry, RegisteredField};
pub use types::*;
pub use validate::validate_definitions;
pub use value::{MapValue, ScalarValue, Value};
pub use variant::{Resolution, derive_name, resolve};
