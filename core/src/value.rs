//! Typed values produced by coercion.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::types::{ElementType, Shape};

/// A single coerced value of one [`ElementType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Path(PathBuf),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
}

impl ScalarValue {
    /// Returns the element type this value was coerced to.
    pub fn element_type(&self) -> ElementType {
        match self {
            ScalarValue::String(_) => ElementType::String,
            ScalarValue::Path(_) => ElementType::Path,
            ScalarValue::Int32(_) => ElementType::Int32,
            ScalarValue::Int64(_) => ElementType::Int64,
            ScalarValue::Float32(_) => ElementType::Float32,
            ScalarValue::Float64(_) => ElementType::Float64,
            ScalarValue::Bool(_) => ElementType::Bool,
        }
    }

    /// Renders the value as the token that coerces back to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_args_core::{ElementType, ScalarValue, coerce};
    ///
    /// let value = ScalarValue::Float64(0.1);
    /// assert_eq!(coerce(&value.to_token(), ElementType::Float64).unwrap(), value);
    /// ```
    pub fn to_token(&self) -> String {
        match self {
            ScalarValue::String(s) => s.clone(),
            ScalarValue::Path(p) => p.to_string_lossy().into_owned(),
            ScalarValue::Int32(n) => n.to_string(),
            ScalarValue::Int64(n) => n.to_string(),
            ScalarValue::Float32(n) => n.to_string(),
            ScalarValue::Float64(n) => n.to_string(),
            ScalarValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

/// Key-unique `key=value` pairs.
///
/// Inserting an existing key replaces its value. Equality ignores insertion
/// order. Keys may be floats, so entries are kept in a vector rather than a
/// hashed map.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    entries: Vec<(ScalarValue, ScalarValue)>,
}

impl MapValue {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair, returning the previous value for `key` if there was one.
    pub fn insert(&mut self, key: ScalarValue, value: ScalarValue) -> Option<ScalarValue> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Looks up the value for `key`.
    pub fn get(&self, key: &ScalarValue) -> Option<&ScalarValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ScalarValue, &ScalarValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl FromIterator<(ScalarValue, ScalarValue)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (ScalarValue, ScalarValue)>>(iter: I) -> Self {
        let mut map = MapValue::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for MapValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k.to_token(), v)))
    }
}

/// The final value of a field, tagged by its [`Shape`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(ScalarValue),
    Optional(Option<ScalarValue>),
    List(Vec<ScalarValue>),
    Map(MapValue),
}

impl Value {
    /// Returns the shape this value was produced for.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::Scalar,
            Value::Optional(_) => Shape::Optional,
            Value::List(_) => Shape::List,
            Value::Map(_) => Shape::Map,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_optional(&self) -> Option<Option<&ScalarValue>> {
        match self {
            Value::Optional(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScalarValue]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(value: ScalarValue) -> Self {
        Value::Scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> ScalarValue {
        ScalarValue::String(v.to_string())
    }

    #[test]
    fn test_map_insert_replaces_existing_key() {
        let mut map = MapValue::new();
        assert_eq!(map.insert(ScalarValue::Int32(1), s("one")), None);
        assert_eq!(map.insert(ScalarValue::Int32(1), s("uno")), Some(s("one")));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&ScalarValue::Int32(1)), Some(&s("uno")));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a: MapValue = [(s("k1"), s("v1")), (s("k2"), s("v2"))].into_iter().collect();
        let b: MapValue = [(s("k2"), s("v2")), (s("k1"), s("v1"))].into_iter().collect();
        let c: MapValue = [(s("k1"), s("v1"))].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_serializes_plainly() {
        let map: MapValue = [(ScalarValue::Int32(1), s("one"))].into_iter().collect();
        let json = serde_json::to_value(Value::Map(map)).unwrap();
        assert_eq!(json, serde_json::json!({ "1": "one" }));

        let json = serde_json::to_value(Value::Optional(None)).unwrap();
        assert_eq!(json, serde_json::Value::Null);

        let json = serde_json::to_value(Value::List(vec![ScalarValue::Bool(true)])).unwrap();
        assert_eq!(json, serde_json::json!([true]));
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::List(vec![s("a"), s("b")]);
        assert_eq!(value.shape(), Shape::List);
        assert_eq!(value.as_list().map(<[_]>::len), Some(2));
        assert!(value.as_scalar().is_none());
        assert_eq!(Value::Optional(None).as_optional(), Some(None));
    }
}
