//! Field registry.
//!
//! Flattens the fields of every active schema into one arena indexed by
//! [`FieldId`], so the state machine can look fields up by name while the
//! assembled values can still be grouped per schema.

use std::collections::HashMap;

use crate::coerce::coerce;
use crate::error::{DefinitionError, FieldConflict};
use crate::types::{FieldKind, FieldSchema, Schema};
use crate::value::ScalarValue;

/// A schema taking part in a parse, with the type it was requested as.
#[derive(Debug, Clone, Copy)]
pub struct ActiveSchema<'s> {
    /// Identifier of the requested type (the family name for members).
    pub requested: &'s str,
    /// The schema whose fields are active.
    pub schema: &'s Schema,
}

/// Stable index of a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl FieldId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A field together with its owner and coerced default.
#[derive(Debug, Clone)]
pub struct RegisteredField<'s> {
    /// Position of the owning schema in [`FieldRegistry::schemas`].
    pub schema_index: usize,
    /// The field's declaration.
    pub field: &'s FieldSchema,
    /// Coerced default value, for scalar fields that declare one.
    pub default: Option<ScalarValue>,
}

impl RegisteredField<'_> {
    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Returns the field's shape and element types.
    pub fn kind(&self) -> &FieldKind {
        &self.field.kind
    }
}

/// Name index over the fields of all active schemas.
///
/// # Examples
///
/// ```
/// use typed_args_core::{ActiveSchema, ElementType, FieldRegistry, FieldSchema, Schema};
///
/// let schema = Schema::new("Server")
///     .with_field(FieldSchema::scalar("host", ElementType::String))
///     .with_field(FieldSchema::scalar("port", ElementType::Int32).with_default("80"));
/// let active = [ActiveSchema { requested: "Server", schema: &schema }];
///
/// let registry = FieldRegistry::register(&active).unwrap();
/// let port = registry.lookup("port").unwrap();
/// assert_eq!(registry.field(port).name(), "port");
/// assert!(registry.field(port).default.is_some());
/// assert!(registry.lookup("debug").is_none());
/// ```
#[derive(Debug)]
pub struct FieldRegistry<'s> {
    schemas: Vec<ActiveSchema<'s>>,
    fields: Vec<RegisteredField<'s>>,
    by_name: HashMap<&'s str, FieldId>,
}

impl<'s> FieldRegistry<'s> {
    /// Registers the fields of `schemas`.
    ///
    /// # Errors
    ///
    /// Fails with [`DefinitionError::DuplicateFields`] listing every name
    /// defined more than once, or on the first empty field name or bad
    /// default.
    pub fn register(schemas: &[ActiveSchema<'s>]) -> Result<Self, DefinitionError> {
        let mut fields = Vec::new();
        let mut by_name: HashMap<&'s str, FieldId> = HashMap::new();
        let mut conflicts = Vec::new();

        for (schema_index, active) in schemas.iter().enumerate() {
            for field in &active.schema.fields {
                if field.name.trim().is_empty() {
                    return Err(DefinitionError::EmptyFieldName {
                        schema: active.schema.name.clone(),
                    });
                }

                let id = FieldId(fields.len());
                if let Some(&existing) = by_name.get(field.name.as_str()) {
                    let owner: &RegisteredField<'_> = &fields[existing.0];
                    conflicts.push(FieldConflict {
                        name: field.name.clone(),
                        first_schema: schemas[owner.schema_index].schema.name.clone(),
                        second_schema: active.schema.name.clone(),
                    });
                    continue;
                }

                by_name.insert(field.name.as_str(), id);
                fields.push(RegisteredField {
                    schema_index,
                    field,
                    default: coerce_default(field)?,
                });
            }
        }

        if !conflicts.is_empty() {
            return Err(DefinitionError::DuplicateFields(conflicts));
        }

        Ok(Self {
            schemas: schemas.to_vec(),
            fields,
            by_name,
        })
    }

    /// Finds a field by its name (without the `--` marker).
    pub fn lookup(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    /// Returns a registered field.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    pub fn field(&self, id: FieldId) -> &RegisteredField<'s> {
        &self.fields[id.0]
    }

    /// Iterates all fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &RegisteredField<'s>)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| (FieldId(index), field))
    }

    /// Returns the active schemas in registration order.
    pub fn schemas(&self) -> &[ActiveSchema<'s>] {
        &self.schemas
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no schema declares a field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn coerce_default(field: &FieldSchema) -> Result<Option<ScalarValue>, DefinitionError> {
    let Some(raw) = &field.default else {
        return Ok(None);
    };
    let FieldKind::Scalar { element } = field.kind else {
        return Err(DefinitionError::DefaultOnNonScalar {
            field: field.name.clone(),
        });
    };
    coerce(raw, element)
        .map(Some)
        .map_err(|cause| DefinitionError::InvalidDefault {
            field: field.name.clone(),
            cause,
        })
}
