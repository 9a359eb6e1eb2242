//! Definition validation.
//!
//! Checks the requested types for mistakes that make them unusable no matter
//! what the command line says: empty or duplicate names, empty families,
//! colliding member names, more than one action, selector flags shadowing
//! fields, bad defaults, and field names shared between schemas that can be
//! active at the same time.
//!
//! # Examples
//!
//! ```
//! use typed_args_core::*;
//!
//! let server = Schema::new("Server").with_field(FieldSchema::scalar("port", ElementType::Int32));
//! assert!(validate_definitions(&[server.clone().into()]).is_ok());
//!
//! // Same field in two plain schemas
//! let other = Schema::new("Other").with_field(FieldSchema::scalar("port", ElementType::Int64));
//! let err = validate_definitions(&[server.into(), other.into()]).unwrap_err();
//! assert!(matches!(err, DefinitionError::DuplicateFields(_)));
//! ```

use std::collections::{HashMap, HashSet};

use crate::coerce::coerce;
use crate::error::{DefinitionError, FieldConflict};
use crate::types::{ArgsType, FieldKind, Schema, VariantFamily, VariantKind};
use crate::variant::derive_name;

/// Validates a set of requested types.
///
/// Members of the same family may share field names, since only one of them
/// is ever active. Every other pair of schemas must have disjoint field
/// names. All such collisions are reported together; other problems are
/// reported one at a time.
///
/// # Errors
///
/// Returns the first [`DefinitionError`] found.
pub fn validate_definitions(types: &[ArgsType]) -> Result<(), DefinitionError> {
    if types.is_empty() {
        return Err(DefinitionError::NoTypes);
    }

    let mut seen_types: HashSet<&str> = HashSet::new();
    for ty in types {
        let name = ty.name().trim();
        if name.is_empty() {
            return Err(DefinitionError::EmptyTypeName);
        }
        if !seen_types.insert(name) {
            return Err(DefinitionError::DuplicateType(name.to_string()));
        }
    }

    let mut first_action: Option<&str> = None;
    for family in types.iter().filter_map(ArgsType::as_family) {
        validate_family(family)?;
        if family.kind == VariantKind::Action {
            if let Some(first) = first_action {
                return Err(DefinitionError::MultipleActions {
                    first: first.to_string(),
                    second: family.name.clone(),
                });
            }
            first_action = Some(&family.name);
        }
    }

    for schema in types.iter().flat_map(ArgsType::schemas) {
        validate_fields(schema)?;
    }

    let conflicts = find_field_conflicts(types);
    if !conflicts.is_empty() {
        return Err(DefinitionError::DuplicateFields(conflicts));
    }

    validate_selectors(types)
}

fn validate_family(family: &VariantFamily) -> Result<(), DefinitionError> {
    if family.members.is_empty() {
        return Err(DefinitionError::EmptyFamily {
            family: family.name.clone(),
        });
    }

    let mut seen: HashMap<String, &str> = HashMap::new();
    for member in &family.members {
        if member.name.trim().is_empty() {
            return Err(DefinitionError::EmptyTypeName);
        }
        let derived = derive_name(&member.name);
        if let Some(first) = seen.insert(derived.clone(), &member.name) {
            return Err(DefinitionError::DuplicateMemberName {
                family: family.name.clone(),
                name: derived,
                first: first.to_string(),
                second: member.name.clone(),
            });
        }
    }

    Ok(())
}

fn validate_fields(schema: &Schema) -> Result<(), DefinitionError> {
    for field in &schema.fields {
        if field.name.trim().is_empty() {
            return Err(DefinitionError::EmptyFieldName {
                schema: schema.name.clone(),
            });
        }

        let Some(raw) = &field.default else {
            continue;
        };
        let FieldKind::Scalar { element } = field.kind else {
            return Err(DefinitionError::DefaultOnNonScalar {
                field: field.name.clone(),
            });
        };
        coerce(raw, element).map_err(|cause| DefinitionError::InvalidDefault {
            field: field.name.clone(),
            cause,
        })?;
    }

    Ok(())
}

struct Owner<'a> {
    type_index: usize,
    member_index: usize,
    schema: &'a str,
}

/// Finds field names defined by two schemas that can be active together.
fn find_field_conflicts(types: &[ArgsType]) -> Vec<FieldConflict> {
    let mut owners: HashMap<&str, Vec<Owner<'_>>> = HashMap::new();
    let mut conflicts = Vec::new();

    for (type_index, ty) in types.iter().enumerate() {
        for (member_index, schema) in ty.schemas().enumerate() {
            for field in &schema.fields {
                let previous = owners.entry(field.name.as_str()).or_default();
                let clash = previous
                    .iter()
                    .find(|o| o.type_index != type_index || o.member_index == member_index);
                if let Some(other) = clash {
                    conflicts.push(FieldConflict {
                        name: field.name.clone(),
                        first_schema: other.schema.to_string(),
                        second_schema: schema.name.clone(),
                    });
                }
                previous.push(Owner {
                    type_index,
                    member_index,
                    schema: &schema.name,
                });
            }
        }
    }

    conflicts
}

fn validate_selectors(types: &[ArgsType]) -> Result<(), DefinitionError> {
    let field_names: HashSet<&str> = types
        .iter()
        .flat_map(ArgsType::schemas)
        .flat_map(|schema| schema.fields.iter().map(|f| f.name.as_str()))
        .collect();

    for family in types.iter().filter_map(ArgsType::as_family) {
        if family.kind != VariantKind::Mode {
            continue;
        }
        let selector = family.selector_name();
        if field_names.contains(selector.as_str()) {
            return Err(DefinitionError::SelectorConflict {
                family: family.name.clone(),
                flag: family.selector_flag(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::types::{ElementType, FieldSchema};

    use super::*;

    fn with_string(name: &str) -> Schema {
        Schema::new(name).with_field(FieldSchema::scalar("stringArg", ElementType::String))
    }

    fn with_many() -> Schema {
        Schema::new("WithMany")
            .with_field(FieldSchema::scalar("stringArg", ElementType::String))
            .with_field(FieldSchema::optional("pathArg", ElementType::Path))
            .with_field(FieldSchema::scalar("intArg", ElementType::Int32))
            .with_field(FieldSchema::list("numberArgs", ElementType::Int32))
    }

    #[test]
    fn test_validate_rejects_no_types() {
        assert_eq!(validate_definitions(&[]), Err(DefinitionError::NoTypes));
    }

    #[test]
    fn test_validate_rejects_duplicate_fields_across_schemas() {
        let types = [
            with_many().into(),
            with_string("WithString").into(),
            Schema::new("WithInteger")
                .with_field(FieldSchema::scalar("intArg", ElementType::Int32))
                .into(),
        ];

        let err = validate_definitions(&types).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateFields(vec![
                FieldConflict {
                    name: "stringArg".to_string(),
                    first_schema: "WithMany".to_string(),
                    second_schema: "WithString".to_string(),
                },
                FieldConflict {
                    name: "intArg".to_string(),
                    first_schema: "WithMany".to_string(),
                    second_schema: "WithInteger".to_string(),
                },
            ])
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_field_within_schema() {
        let schema = with_string("Twice").with_field(FieldSchema::list("stringArg", ElementType::String));
        let err = validate_definitions(&[schema.into()]).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateFields(ref c) if c.len() == 1));
    }

    #[test]
    fn test_validate_allows_overlapping_family_members() {
        let family = VariantFamily::mode("SubtypesWithOverlappingComponents")
            .with_member(with_string("WithString"))
            .with_member(with_string("AnotherWithString"));

        assert!(validate_definitions(&[family.into()]).is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap_between_family_and_schema() {
        let family = VariantFamily::mode("Mode").with_member(with_string("WithString"));
        let types = [family.into(), with_string("Plain").into()];

        let err = validate_definitions(&types).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateFields(_)));
    }

    #[test]
    fn test_validate_rejects_multiple_actions() {
        let types = [
            VariantFamily::action("Action")
                .with_member(Schema::new("WithInteger"))
                .into(),
            VariantFamily::action("ActionArgs")
                .with_member(Schema::new("WithPath"))
                .into(),
        ];

        assert_eq!(
            validate_definitions(&types),
            Err(DefinitionError::MultipleActions {
                first: "Action".to_string(),
                second: "ActionArgs".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_member_name_collision() {
        let family = VariantFamily::mode("Mode")
            .with_member(Schema::new("WithString"))
            .with_member(Schema::new("WithStringArgs"));

        assert_eq!(
            validate_definitions(&[family.into()]),
            Err(DefinitionError::DuplicateMemberName {
                family: "Mode".to_string(),
                name: "withString".to_string(),
                first: "WithString".to_string(),
                second: "WithStringArgs".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_family_and_names() {
        assert_eq!(
            validate_definitions(&[VariantFamily::mode("Mode").into()]),
            Err(DefinitionError::EmptyFamily {
                family: "Mode".to_string()
            })
        );
        assert_eq!(
            validate_definitions(&[Schema::new(" ").into()]),
            Err(DefinitionError::EmptyTypeName)
        );
        assert_eq!(
            validate_definitions(&[Schema::new("A").into(), Schema::new("A").into()]),
            Err(DefinitionError::DuplicateType("A".to_string()))
        );

        let nameless = Schema::new("A").with_field(FieldSchema::scalar("", ElementType::String));
        assert_eq!(
            validate_definitions(&[nameless.into()]),
            Err(DefinitionError::EmptyFieldName {
                schema: "A".to_string()
            })
        );
    }

    #[test]
    fn test_validate_checks_defaults() {
        let bad = Schema::new("A").with_field(FieldSchema::scalar("port", ElementType::Int32).with_default("http"));
        assert!(matches!(
            validate_definitions(&[bad.into()]),
            Err(DefinitionError::InvalidDefault { ref field, .. }) if field == "port"
        ));

        let misplaced = Schema::new("A").with_field(FieldSchema::list("ports", ElementType::Int32).with_default("1"));
        assert_eq!(
            validate_definitions(&[misplaced.into()]),
            Err(DefinitionError::DefaultOnNonScalar {
                field: "ports".to_string()
            })
        );

        let good = Schema::new("A").with_field(FieldSchema::scalar("port", ElementType::Int32).with_default("8080"));
        assert!(validate_definitions(&[good.into()]).is_ok());
    }

    #[test]
    fn test_validate_rejects_selector_shadowing_field() {
        let family = VariantFamily::mode("Mode").with_member(Schema::new("Fast"));
        let plain = Schema::new("Plain").with_field(FieldSchema::scalar("mode", ElementType::String));

        assert_eq!(
            validate_definitions(&[family.into(), plain.into()]),
            Err(DefinitionError::SelectorConflict {
                family: "Mode".to_string(),
                flag: "--mode".to_string(),
            })
        );
    }
}
