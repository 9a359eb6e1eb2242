//! Variant resolution.
//!
//! Before fields can be parsed, every requested [`VariantFamily`] must have
//! its active member chosen. An action family is chosen by the first token,
//! a mode family by a `--<family> <member>` pair anywhere in the input. The
//! selecting tokens are removed from the stream so the state machine never
//! sees them.

use heck::ToLowerCamelCase;
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::registry::ActiveSchema;
use crate::types::{ArgsType, LONG_OPTION_MARKER, Schema, VariantFamily, VariantKind};

const ARGS_SUFFIX: &str = "Args";

/// Derives the command-line name of a family or member from its identifier.
///
/// A trailing `Args` is stripped (unless nothing would be left) and the rest
/// converted to lower camel case.
///
/// # Examples
///
/// ```
/// use typed_args_core::derive_name;
///
/// assert_eq!(derive_name("WithStringArgs"), "withString");
/// assert_eq!(derive_name("with_string"), "withString");
/// assert_eq!(derive_name("Mode"), "mode");
/// assert_eq!(derive_name("Args"), "args");
/// ```
pub fn derive_name(identifier: &str) -> String {
    let base = match identifier.strip_suffix(ARGS_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => identifier,
    };
    base.to_lower_camel_case()
}

/// Result of resolving all variant families of one call.
#[derive(Debug)]
pub struct Resolution<'s> {
    /// Tokens left after removing selectors.
    pub tokens: Vec<String>,
    /// Schemas whose fields are active, in request order.
    pub schemas: Vec<ActiveSchema<'s>>,
    /// Problems found while resolving.
    pub errors: Vec<Diagnostic>,
}

/// Chooses the active member of every family and strips its selector.
///
/// The action family, if any, is resolved first against the unmodified first
/// token. Mode families follow in declaration order; only the first
/// occurrence of a mode flag selects, later ones stay in the stream. A family
/// that cannot be resolved contributes no schema and one error.
pub fn resolve<'s>(mut tokens: Vec<String>, types: &'s [ArgsType]) -> Resolution<'s> {
    let mut errors = Vec::new();
    let mut selected: Vec<Option<&'s Schema>> = vec![None; types.len()];

    let actions = types
        .iter()
        .enumerate()
        .filter_map(|(i, ty)| ty.as_family().map(|family| (i, family)))
        .filter(|(_, family)| family.kind == VariantKind::Action);
    for (index, family) in actions {
        selected[index] = resolve_action(family, &mut tokens, &mut errors);
    }

    for (index, ty) in types.iter().enumerate() {
        match ty {
            ArgsType::Schema(schema) => selected[index] = Some(schema),
            ArgsType::Family(family) if family.kind == VariantKind::Mode => {
                selected[index] = resolve_mode(family, &mut tokens, &mut errors);
            }
            ArgsType::Family(_) => {}
        }
    }

    let schemas = types
        .iter()
        .zip(selected)
        .filter_map(|(ty, schema)| {
            schema.map(|schema| ActiveSchema {
                requested: ty.name(),
                schema,
            })
        })
        .collect();

    Resolution {
        tokens,
        schemas,
        errors,
    }
}

fn resolve_action<'s>(
    family: &'s VariantFamily,
    tokens: &mut Vec<String>,
    errors: &mut Vec<Diagnostic>,
) -> Option<&'s Schema> {
    let Some(first) = tokens.first() else {
        errors.push(Diagnostic::MissingAction {
            allowed_values: family.member_names(),
        });
        return None;
    };

    match family.find_member(first) {
        Some(member) => {
            debug!(family = %family.name, member = %member.name, "resolved action");
            tokens.remove(0);
            Some(member)
        }
        None => {
            errors.push(Diagnostic::UnknownAction {
                allowed_values: family.member_names(),
                actual_value: first.clone(),
            });
            None
        }
    }
}

fn resolve_mode<'s>(
    family: &'s VariantFamily,
    tokens: &mut Vec<String>,
    errors: &mut Vec<Diagnostic>,
) -> Option<&'s Schema> {
    let name = family.selector_name();
    let flag = format!("{LONG_OPTION_MARKER}{name}");

    let Some(position) = tokens.iter().position(|t| *t == flag) else {
        errors.push(Diagnostic::MissingArgument { name });
        return None;
    };
    let Some(value) = tokens.get(position + 1) else {
        errors.push(Diagnostic::MissingValue { name });
        tokens.remove(position);
        return None;
    };

    match family.find_member(value) {
        Some(member) => {
            debug!(family = %family.name, member = %member.name, "resolved mode");
            tokens.drain(position..=position + 1);
            Some(member)
        }
        None => {
            errors.push(Diagnostic::IllegalModeValue {
                name,
                allowed_values: family.member_names(),
                actual_value: value.clone(),
            });
            None
        }
    }
}
