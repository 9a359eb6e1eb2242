//! Token state machine.
//!
//! Walks the token stream once, left to right, assigning values to the
//! registered fields. Problems are collected as diagnostics and never stop
//! the walk, so one run reports everything that is wrong with the input.

use indexmap::IndexMap;
use tracing::trace;

use crate::coerce::{ExpectedType, coerce, coerce_entry};
use crate::diagnostic::Diagnostic;
use crate::registry::{FieldId, FieldRegistry};
use crate::types::{FieldKind, LONG_OPTION_MARKER};
use crate::value::{MapValue, ScalarValue, Value};

/// What the machine expects from the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// An argument name.
    ExpectingName,
    /// A value for the given field.
    ExpectingValue(FieldId),
    /// Another name, or one more value for a list or map field.
    ExpectingNameOrAdditionalValue(FieldId),
    /// A value that belongs to an unknown or repeated name and is dropped.
    IgnoringValue,
}

#[derive(Debug)]
enum SlotValue {
    Unset,
    Single(ScalarValue),
    Many(Vec<ScalarValue>),
    Entries(MapValue),
}

#[derive(Debug)]
struct Slot {
    mentioned: bool,
    value: SlotValue,
}

impl Slot {
    fn for_kind(kind: &FieldKind) -> Self {
        let value = match kind {
            FieldKind::Scalar { .. } | FieldKind::Optional { .. } => SlotValue::Unset,
            FieldKind::List { .. } => SlotValue::Many(Vec::new()),
            FieldKind::Map { .. } => SlotValue::Entries(MapValue::new()),
        };
        Self {
            mentioned: false,
            value,
        }
    }

    fn holds_single(&self) -> bool {
        matches!(self.value, SlotValue::Single(_))
    }
}

/// Everything the machine produced for one token stream.
#[derive(Debug)]
pub struct MachineOutput {
    /// Field values per active schema, in registry order. Scalars without a
    /// value are left out.
    pub values: Vec<IndexMap<String, Value>>,
    /// Errors in the order they were found.
    pub errors: Vec<Diagnostic>,
    /// Warnings in the order they were found.
    pub warnings: Vec<Diagnostic>,
    /// Required fields that were never mentioned.
    pub missing: Vec<String>,
}

/// Runs the state machine over `tokens`.
///
/// # Examples
///
/// ```
/// use typed_args_core::{ActiveSchema, ElementType, FieldRegistry, FieldSchema, Schema, run_machine};
///
/// let schema = Schema::new("S")
///     .with_field(FieldSchema::scalar("verbose", ElementType::Bool))
///     .with_field(FieldSchema::list("files", ElementType::Path));
/// let registry = FieldRegistry::register(&[ActiveSchema { requested: "S", schema: &schema }]).unwrap();
///
/// let tokens = ["--files", "a", "b", "--verbose"].map(String::from);
/// let output = run_machine(&registry, &tokens);
/// assert!(output.errors.is_empty());
/// assert_eq!(output.values[0].len(), 2);
/// ```
pub fn run_machine(registry: &FieldRegistry<'_>, tokens: &[String]) -> MachineOutput {
    let mut machine = TokenMachine::new(registry);
    for token in tokens {
        machine.step(token);
    }
    machine.finish()
}

struct TokenMachine<'r, 's> {
    registry: &'r FieldRegistry<'s>,
    slots: Vec<Slot>,
    state: ParseState,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'r, 's> TokenMachine<'r, 's> {
    fn new(registry: &'r FieldRegistry<'s>) -> Self {
        let slots = registry
            .fields()
            .map(|(_, field)| Slot::for_kind(field.kind()))
            .collect();
        Self {
            registry,
            slots,
            state: ParseState::ExpectingName,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn step(&mut self, token: &str) {
        let before = self.state;
        match token.strip_prefix(LONG_OPTION_MARKER) {
            Some(name) => self.on_name(name),
            None => self.on_value(token),
        }
        trace!(token, from = ?before, to = ?self.state, "step");
    }

    fn on_name(&mut self, name: &str) {
        self.settle_pending();

        let Some(id) = self.registry.lookup(name) else {
            self.warnings.push(Diagnostic::UnknownArgument {
                name: name.to_string(),
            });
            self.state = ParseState::IgnoringValue;
            return;
        };

        let slot = &mut self.slots[id.index()];
        if slot.holds_single() {
            self.errors.push(Diagnostic::RepeatedArgument {
                name: name.to_string(),
            });
            self.state = ParseState::IgnoringValue;
            return;
        }

        slot.mentioned = true;
        self.state = ParseState::ExpectingValue(id);
    }

    fn on_value(&mut self, token: &str) {
        match self.state {
            ParseState::ExpectingName => {
                self.errors.push(Diagnostic::UnexpectedValue {
                    value: token.to_string(),
                });
            }
            ParseState::ExpectingValue(id) => {
                self.accept(id, token);
                self.state = if self.registry.field(id).field.shape().is_repeated() {
                    ParseState::ExpectingNameOrAdditionalValue(id)
                } else {
                    ParseState::ExpectingName
                };
            }
            ParseState::ExpectingNameOrAdditionalValue(id) => self.accept(id, token),
            ParseState::IgnoringValue => self.state = ParseState::ExpectingName,
        }
    }

    /// Resolves a name that is still waiting for its value.
    fn settle_pending(&mut self) {
        let ParseState::ExpectingValue(id) = self.state else {
            return;
        };
        let field = self.registry.field(id);
        if field.kind().is_switch() {
            self.slots[id.index()].value = SlotValue::Single(ScalarValue::Bool(true));
        } else {
            self.errors.push(Diagnostic::MissingValue {
                name: field.name().to_string(),
            });
        }
        self.state = ParseState::ExpectingName;
    }

    fn accept(&mut self, id: FieldId, token: &str) {
        let field = self.registry.field(id);
        let kind = *field.kind();
        let slot = &mut self.slots[id.index()];

        let result = match (kind, &mut slot.value) {
            (FieldKind::Map { key, value }, SlotValue::Entries(map)) => {
                coerce_entry(token, key, value).map(|(k, v)| {
                    map.insert(k, v);
                })
            }
            (FieldKind::List { element }, SlotValue::Many(values)) => {
                coerce(token, element).map(|v| values.push(v))
            }
            (_, single) => coerce(token, kind.element()).map(|v| *single = SlotValue::Single(v)),
        };

        if let Err(cause) = result {
            self.errors.push(Diagnostic::IllegalValue {
                name: field.name().to_string(),
                expected: ExpectedType::for_field(&kind),
                value: token.to_string(),
                cause,
            });
        }
    }

    fn finish(mut self) -> MachineOutput {
        self.settle_pending();

        let mut values: Vec<IndexMap<String, Value>> =
            vec![IndexMap::new(); self.registry.schemas().len()];
        let mut missing = Vec::new();

        for ((_, field), slot) in self.registry.fields().zip(self.slots) {
            let name = field.name().to_string();
            let value = match (field.kind(), slot.value) {
                (FieldKind::Scalar { .. }, SlotValue::Single(v)) => Some(Value::Scalar(v)),
                (FieldKind::Scalar { .. }, _) if !slot.mentioned => match &field.default {
                    Some(default) => Some(Value::Scalar(default.clone())),
                    None => {
                        self.errors.push(Diagnostic::MissingArgument { name: name.clone() });
                        missing.push(name.clone());
                        None
                    }
                },
                (FieldKind::Scalar { .. }, _) => None,
                (_, SlotValue::Single(v)) => Some(Value::Optional(Some(v))),
                (_, SlotValue::Many(list)) => Some(Value::List(list)),
                (_, SlotValue::Entries(map)) => Some(Value::Map(map)),
                (_, SlotValue::Unset) => Some(Value::Optional(None)),
            };
            if let Some(value) = value {
                values[field.schema_index].insert(name, value);
            }
        }

        trace!(
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "token stream consumed"
        );

        MachineOutput {
            values,
            errors: self.errors,
            warnings: self.warnings,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::ActiveSchema;
    use crate::types::{ElementType, FieldSchema, Schema};

    use super::*;

    fn run(schema: &Schema, raw: &[&str]) -> MachineOutput {
        let registry = FieldRegistry::register(&[ActiveSchema {
            requested: &schema.name,
            schema,
        }])
        .unwrap();
        let tokens: Vec<String> = raw.iter().map(|t| t.to_string()).collect();
        run_machine(&registry, &tokens)
    }

    fn schema() -> Schema {
        Schema::new("Fields")
            .with_field(FieldSchema::scalar("name", ElementType::String))
            .with_field(FieldSchema::optional("count", ElementType::Int32))
            .with_field(FieldSchema::list("files", ElementType::Path))
            .with_field(FieldSchema::map("env", ElementType::String, ElementType::Int64))
            .with_field(FieldSchema::scalar("verbose", ElementType::Bool).with_default("false"))
    }

    fn s(v: &str) -> ScalarValue {
        ScalarValue::String(v.to_string())
    }

    #[test]
    fn test_assigns_all_shapes() {
        let output = run(
            &schema(),
            &["--env", "a=1", "b=2", "--name", "bob", "--files", "x", "y", "--count", "3"],
        );

        assert!(output.errors.is_empty(), "{:?}", output.errors);
        let values = &output.values[0];
        assert_eq!(values["name"], Value::Scalar(s("bob")));
        assert_eq!(values["count"], Value::Optional(Some(ScalarValue::Int32(3))));
        assert_eq!(values["files"].as_list().map(<[_]>::len), Some(2));
        assert_eq!(values["env"].as_map().map(MapValue::len), Some(2));
        assert_eq!(values["verbose"], Value::Scalar(ScalarValue::Bool(false)));
    }

    #[test]
    fn test_never_mentioned_fields() {
        let output = run(&schema(), &[]);

        assert_eq!(
            output.errors,
            vec![Diagnostic::MissingArgument {
                name: "name".to_string()
            }]
        );
        assert_eq!(output.missing, vec!["name"]);
        let values = &output.values[0];
        assert!(!values.contains_key("name"));
        assert_eq!(values["count"], Value::Optional(None));
        assert_eq!(values["files"], Value::List(Vec::new()));
        assert_eq!(values["env"], Value::Map(MapValue::new()));
    }

    #[test]
    fn test_switch_sugar() {
        let output = run(&schema(), &["--verbose", "--name", "x"]);
        assert!(output.errors.is_empty());
        assert_eq!(output.values[0]["verbose"], Value::Scalar(ScalarValue::Bool(true)));

        let output = run(&schema(), &["--name", "x", "--verbose"]);
        assert!(output.errors.is_empty());
        assert_eq!(output.values[0]["verbose"], Value::Scalar(ScalarValue::Bool(true)));

        let output = run(&schema(), &["--name", "x", "--verbose", "false"]);
        assert_eq!(output.values[0]["verbose"], Value::Scalar(ScalarValue::Bool(false)));

        let optional = Schema::new("Switches")
            .with_field(FieldSchema::optional("dryRun", ElementType::Bool))
            .with_field(FieldSchema::optional("level", ElementType::Int32));
        let on = Value::Optional(Some(ScalarValue::Bool(true)));

        let output = run(&optional, &["--dryRun"]);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        assert_eq!(output.values[0]["dryRun"], on);

        let output = run(&optional, &["--dryRun", "--level", "2"]);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        assert_eq!(output.values[0]["dryRun"], on);
        assert_eq!(output.values[0]["level"], Value::Optional(Some(ScalarValue::Int32(2))));

        let output = run(&optional, &[]);
        assert_eq!(output.values[0]["dryRun"], Value::Optional(None));
    }

    #[test]
    fn test_missing_value_is_not_reported_as_missing_argument() {
        let output = run(&schema(), &["--count", "--name"]);

        assert_eq!(
            output.errors,
            vec![
                Diagnostic::MissingValue {
                    name: "count".to_string()
                },
                Diagnostic::MissingValue {
                    name: "name".to_string()
                },
            ]
        );
        assert!(output.missing.is_empty());
    }

    #[test]
    fn test_illegal_values_are_collected() {
        let output = run(&schema(), &["--name", "x", "--count", "x", "--env", "a", "b=z"]);

        let names: Vec<_> = output
            .errors
            .iter()
            .map(|e| e.argument_name().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["count", "env", "env"]);
        assert!(matches!(
            &output.errors[1],
            Diagnostic::IllegalValue { expected: ExpectedType::Entry { .. }, value, .. } if value == "a"
        ));
    }

    #[test]
    fn test_unexpected_and_unknown() {
        let output = run(&schema(), &["stray", "--name", "x", "--nope", "skipped", "--count", "1"]);

        assert_eq!(
            output.errors,
            vec![Diagnostic::UnexpectedValue {
                value: "stray".to_string()
            }]
        );
        assert_eq!(
            output.warnings,
            vec![Diagnostic::UnknownArgument {
                name: "nope".to_string()
            }]
        );
        assert_eq!(output.values[0]["count"], Value::Optional(Some(ScalarValue::Int32(1))));
    }

    #[test]
    fn test_repeated_scalar_keeps_first_value() {
        let output = run(&schema(), &["--name", "first", "--name", "second"]);

        assert_eq!(
            output.errors,
            vec![Diagnostic::RepeatedArgument {
                name: "name".to_string()
            }]
        );
        assert_eq!(output.values[0]["name"], Value::Scalar(s("first")));
    }

    #[test]
    fn test_list_and_map_accumulate_across_mentions() {
        let output = run(
            &schema(),
            &["--name", "x", "--files", "a", "--env", "k=1", "--files", "b", "--env", "k=2"],
        );

        assert!(output.errors.is_empty());
        let values = &output.values[0];
        assert_eq!(
            values["files"],
            Value::List(vec![
                ScalarValue::Path("a".into()),
                ScalarValue::Path("b".into())
            ])
        );
        let env = values["env"].as_map().unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get(&s("k")), Some(&ScalarValue::Int64(2)));
    }

    #[test]
    fn test_value_after_list_terminated_by_flag() {
        let output = run(&schema(), &["--files", "a", "--name", "x", "b"]);
        assert_eq!(
            output.errors,
            vec![Diagnostic::UnexpectedValue {
                value: "b".to_string()
            }]
        );
        assert_eq!(output.values[0]["files"].as_list().map(<[_]>::len), Some(1));
    }
}
