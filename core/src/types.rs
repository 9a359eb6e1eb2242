//! Schema type definitions for argument structure modeling.
//!
//! This module defines the declarative description a caller hands to the
//! parser: typed fields grouped into schemas, and schemas grouped into
//! closed variant families. The types derive [`serde`] traits so a full
//! definition can be loaded from YAML or JSON as well as built in code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::variant::derive_name;

/// Prefix that marks a token as an argument name (`--name`).
pub const LONG_OPTION_MARKER: &str = "--";

/// Primitive type of a single value.
///
/// # Examples
///
/// ```
/// use typed_args_core::ElementType;
///
/// assert_eq!(ElementType::Int32.to_string(), "int32");
/// assert!(ElementType::Bool.is_bool());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// UTF-8 string, taken verbatim.
    String,
    /// File system path, not validated.
    Path,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// `true` or `false`.
    Bool,
}

impl ElementType {
    /// Returns the lowercase type name used in messages and definition files.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::String => "string",
            ElementType::Path => "path",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Bool => "bool",
        }
    }

    /// Returns `true` for [`ElementType::Bool`].
    pub fn is_bool(self) -> bool {
        self == ElementType::Bool
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cardinality category of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Exactly one value, required unless a default is declared.
    Scalar,
    /// Zero or one value.
    Optional,
    /// Ordered sequence of values.
    List,
    /// `key=value` pairs with unique keys.
    Map,
}

impl Shape {
    /// Returns `true` if the field keeps accepting values after the first one.
    pub fn is_repeated(self) -> bool {
        matches!(self, Shape::List | Shape::Map)
    }
}

/// Shape plus element type(s) of a field.
///
/// Serialized with an internal `shape` tag, so a definition file reads
/// `{ name: port, shape: scalar, type: int32 }` or
/// `{ name: env, shape: map, key: string, type: int32 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FieldKind {
    /// A single required value.
    Scalar {
        /// Type of the value.
        #[serde(rename = "type")]
        element: ElementType,
    },
    /// A single value that may be absent.
    Optional {
        /// Type of the value.
        #[serde(rename = "type")]
        element: ElementType,
    },
    /// Any number of values.
    List {
        /// Type of each value.
        #[serde(rename = "type")]
        element: ElementType,
    },
    /// Any number of `key=value` pairs.
    Map {
        /// Type of each key.
        key: ElementType,
        /// Type of each value.
        #[serde(rename = "type")]
        value: ElementType,
    },
}

impl FieldKind {
    /// Returns the cardinality category.
    pub fn shape(&self) -> Shape {
        match self {
            FieldKind::Scalar { .. } => Shape::Scalar,
            FieldKind::Optional { .. } => Shape::Optional,
            FieldKind::List { .. } => Shape::List,
            FieldKind::Map { .. } => Shape::Map,
        }
    }

    /// Returns the value type (for maps, the type of the map's values).
    pub fn element(&self) -> ElementType {
        match *self {
            FieldKind::Scalar { element }
            | FieldKind::Optional { element }
            | FieldKind::List { element } => element,
            FieldKind::Map { value, .. } => value,
        }
    }

    /// Returns the key type for maps, `None` otherwise.
    pub fn key(&self) -> Option<ElementType> {
        match *self {
            FieldKind::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Returns `true` if a bare `--name` without a value means `true`.
    ///
    /// Only single-valued boolean fields get this treatment.
    pub fn is_switch(&self) -> bool {
        matches!(
            self,
            FieldKind::Scalar {
                element: ElementType::Bool
            } | FieldKind::Optional {
                element: ElementType::Bool
            }
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar { element } => write!(f, "{element}"),
            FieldKind::Optional { element } => write!(f, "optional<{element}>"),
            FieldKind::List { element } => write!(f, "list<{element}>"),
            FieldKind::Map { key, value } => write!(f, "map<{key}, {value}>"),
        }
    }
}

/// Schema for a single named field.
///
/// Use the constructors [`scalar`](FieldSchema::scalar),
/// [`optional`](FieldSchema::optional), [`list`](FieldSchema::list) and
/// [`map`](FieldSchema::map), then chain builder methods.
///
/// # Examples
///
/// ```
/// use typed_args_core::{ElementType, FieldSchema, Shape};
///
/// let port = FieldSchema::scalar("port", ElementType::Int32).with_default("8080");
/// assert_eq!(port.shape(), Shape::Scalar);
/// assert_eq!(port.default.as_deref(), Some("8080"));
///
/// let env = FieldSchema::map("env", ElementType::String, ElementType::String);
/// assert_eq!(env.flag(), "--env");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Name addressed on the command line as `--<name>`.
    pub name: String,
    /// Shape and element type(s).
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Raw default for scalar fields, coerced when the definition is checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSchema {
    /// Creates a field with an explicit [`FieldKind`].
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            description: None,
        }
    }

    /// Creates a required single-valued field.
    pub fn scalar(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::Scalar { element })
    }

    /// Creates a field that may be absent.
    pub fn optional(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::Optional { element })
    }

    /// Creates a field that collects any number of values.
    pub fn list(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::List { element })
    }

    /// Creates a field that collects `key=value` pairs.
    pub fn map(name: impl Into<String>, key: ElementType, value: ElementType) -> Self {
        Self::new(name, FieldKind::Map { key, value })
    }

    /// Sets the raw default used when the field is never mentioned.
    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns the cardinality category.
    pub fn shape(&self) -> Shape {
        self.kind.shape()
    }

    /// Returns the token that addresses this field, e.g. `--port`.
    pub fn flag(&self) -> String {
        format!("{LONG_OPTION_MARKER}{}", self.name)
    }
}

/// An ordered set of fields describing one constructable result.
///
/// # Examples
///
/// ```
/// use typed_args_core::{ElementType, FieldSchema, Schema};
///
/// let schema = Schema::new("Server")
///     .with_field(FieldSchema::scalar("host", ElementType::String))
///     .with_field(FieldSchema::optional("port", ElementType::Int32));
///
/// assert_eq!(schema.field_names(), vec!["host", "port"]);
/// assert!(schema.find_field("port").is_some());
/// assert!(schema.find_field("debug").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Identifier of the schema, e.g. `WithString` or `ServerArgs`.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    /// Creates an empty schema with the given identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a field.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Finds a field by name.
    pub fn find_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Gets all field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// How the member of a [`VariantFamily`] is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// The first token of the input names the member.
    Action,
    /// `--<family> <member>` names the member.
    Mode,
}

/// A closed set of mutually exclusive schemas.
///
/// Member and selector names are derived from identifiers: a trailing `Args`
/// is stripped and the rest is converted to lower camel case.
///
/// # Examples
///
/// ```
/// use typed_args_core::{Schema, VariantFamily};
///
/// let family = VariantFamily::mode("OutputModeArgs")
///     .with_member(Schema::new("JsonArgs"))
///     .with_member(Schema::new("PlainText"));
///
/// assert_eq!(family.selector_flag(), "--outputMode");
/// assert_eq!(family.member_names(), vec!["json", "plainText"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantFamily {
    /// Identifier of the family, e.g. `Action` or `Mode`.
    pub name: String,
    /// Selection mechanism.
    pub kind: VariantKind,
    /// Alternatives, exactly one of which is selected per parse.
    #[serde(default)]
    pub members: Vec<Schema>,
}

impl VariantFamily {
    /// Creates an empty family of the given kind.
    pub fn new(name: impl Into<String>, kind: VariantKind) -> Self {
        Self {
            name: name.into(),
            kind,
            members: Vec::new(),
        }
    }

    /// Creates an empty family selected by the first positional token.
    pub fn action(name: impl Into<String>) -> Self {
        Self::new(name, VariantKind::Action)
    }

    /// Creates an empty family selected by a `--<family>` flag.
    pub fn mode(name: impl Into<String>) -> Self {
        Self::new(name, VariantKind::Mode)
    }

    /// Adds a member schema.
    pub fn with_member(mut self, member: Schema) -> Self {
        self.members.push(member);
        self
    }

    /// Returns the derived name used for the selector flag.
    pub fn selector_name(&self) -> String {
        derive_name(&self.name)
    }

    /// Returns the selector flag, e.g. `--mode`.
    pub fn selector_flag(&self) -> String {
        format!("{LONG_OPTION_MARKER}{}", self.selector_name())
    }

    /// Gets the derived names of all members in declaration order.
    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().map(|m| derive_name(&m.name)).collect()
    }

    /// Finds the member whose derived name equals `selector`.
    pub fn find_member(&self, selector: &str) -> Option<&Schema> {
        self.members
            .iter()
            .find(|member| derive_name(&member.name) == selector)
    }
}

/// One requested result type: a plain schema or a variant family.
///
/// Serialized with an internal `type` tag: `{ type: schema, name: Server,
/// fields: [...] }` or `{ type: family, name: Mode, kind: mode, members:
/// [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgsType {
    /// A single schema whose fields are always active.
    Schema(Schema),
    /// A closed family of schemas, one of which is selected by the input.
    Family(VariantFamily),
}

impl ArgsType {
    /// Returns the identifier of the schema or family.
    pub fn name(&self) -> &str {
        match self {
            ArgsType::Schema(schema) => &schema.name,
            ArgsType::Family(family) => &family.name,
        }
    }

    /// Returns the family if this is one.
    pub fn as_family(&self) -> Option<&VariantFamily> {
        match self {
            ArgsType::Family(family) => Some(family),
            ArgsType::Schema(_) => None,
        }
    }

    /// Iterates every schema this type may contribute.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        let slice: &[Schema] = match self {
            ArgsType::Schema(schema) => std::slice::from_ref(schema),
            ArgsType::Family(family) => &family.members,
        };
        slice.iter()
    }
}

impl From<Schema> for ArgsType {
    fn from(schema: Schema) -> Self {
        ArgsType::Schema(schema)
    }
}

impl From<VariantFamily> for ArgsType {
    fn from(family: VariantFamily) -> Self {
        ArgsType::Family(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_schema_creation() {
        let field = FieldSchema::list("items", ElementType::String).with_description("Things");

        assert_eq!(field.name, "items");
        assert_eq!(field.shape(), Shape::List);
        assert_eq!(field.kind.element(), ElementType::String);
        assert_eq!(field.kind.key(), None);
        assert_eq!(field.flag(), "--items");
    }

    #[test]
    fn test_field_kind_switch() {
        assert!(FieldSchema::scalar("v", ElementType::Bool).kind.is_switch());
        assert!(FieldSchema::optional("v", ElementType::Bool).kind.is_switch());
        assert!(!FieldSchema::list("v", ElementType::Bool).kind.is_switch());
        assert!(!FieldSchema::scalar("v", ElementType::String).kind.is_switch());
    }

    #[test]
    fn test_field_kind_display() {
        let map = FieldKind::Map {
            key: ElementType::Int32,
            value: ElementType::String,
        };
        assert_eq!(map.to_string(), "map<int32, string>");
        assert_eq!(
            FieldKind::Optional {
                element: ElementType::Path
            }
            .to_string(),
            "optional<path>"
        );
    }

    #[test]
    fn test_family_derived_names() {
        let family = VariantFamily::action("ActionArgs")
            .with_member(Schema::new("WithInteger"))
            .with_member(Schema::new("WithPathArgs"));

        assert_eq!(family.selector_name(), "action");
        assert_eq!(family.member_names(), vec!["withInteger", "withPath"]);
        assert_eq!(family.find_member("withPath").unwrap().name, "WithPathArgs");
        assert!(family.find_member("WithPath").is_none());
    }

    #[test]
    fn test_field_schema_flattened_shape() {
        let field: FieldSchema = serde_json::from_value(serde_json::json!({
            "name": "env",
            "shape": "map",
            "key": "string",
            "type": "int32"
        }))
        .unwrap();

        assert_eq!(
            field.kind,
            FieldKind::Map {
                key: ElementType::String,
                value: ElementType::Int32
            }
        );
        assert_eq!(field.default, None);

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["shape"], "map");
        assert_eq!(json["type"], "int32");
    }

    #[test]
    fn test_args_type_internal_tag() {
        let ty: ArgsType = serde_json::from_value(serde_json::json!({
            "type": "family",
            "name": "Mode",
            "kind": "mode",
            "members": [{ "name": "Fast" }]
        }))
        .unwrap();

        assert_eq!(
            ty,
            ArgsType::Family(VariantFamily::mode("Mode").with_member(Schema::new("Fast")))
        );
        let json = serde_json::to_value(ArgsType::from(Schema::new("Plain"))).unwrap();
        assert_eq!(json["type"], "schema");
    }

    #[test]
    fn test_args_type_schemas() {
        let plain: ArgsType = Schema::new("Plain").into();
        let family: ArgsType = VariantFamily::mode("Mode")
            .with_member(Schema::new("A"))
            .with_member(Schema::new("B"))
            .into();

        assert_eq!(plain.schemas().count(), 1);
        assert_eq!(family.schemas().count(), 2);
        assert_eq!(family.name(), "Mode");
        assert!(plain.as_family().is_none());
    }
}
