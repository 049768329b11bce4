//! The dynamically-typed `fields` value used for per-type custom fields.
//!
//! A [`FieldValue`] is a tagged variant: `text`, `int`, `date`, `bool`,
//! `list`, or `enum`. Storage serializes the tagged value as JSON; the
//! owning [`crate::template::TypeTemplate`] declares the expected variant
//! per field name, and a mismatch is a validation error at the engine
//! layer.

use serde::{Deserialize, Serialize};

/// One value of a custom field on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Int(i64),
    /// ISO-8601 date or date-time string, stored verbatim.
    Date(String),
    Bool(bool),
    List(Vec<String>),
    /// A symbol from the field's declared `options` list.
    Enum(String),
}

impl FieldValue {
    /// The variant name, matching [`crate::template::FieldType`]'s `as_str`.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Int(_) => "int",
            FieldValue::Date(_) => "date",
            FieldValue::Bool(_) => "bool",
            FieldValue::List(_) => "list",
            FieldValue::Enum(_) => "enum",
        }
    }

    /// A field is "unpopulated" iff absent, null, or a string whose
    /// trimmed value is empty. `0`, `false`, and an empty list are
    /// populated (spec.md §4.3 step 4).
    pub fn is_unpopulated(&self) -> bool {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) | FieldValue::Enum(s) => {
                s.trim().is_empty()
            }
            FieldValue::Int(_) | FieldValue::Bool(_) | FieldValue::List(_) => false,
        }
    }
}

/// A `fields` map: field name -> value. `None` values (absent keys) count
/// as unpopulated; this wrapper provides the "absent or unpopulated" check
/// used throughout transition validation.
pub fn is_unpopulated(fields: &serde_json::Map<String, serde_json::Value>, name: &str) -> bool {
    match fields.get(name) {
        None => true,
        Some(serde_json::Value::Null) => true,
        Some(v) => serde_json::from_value::<FieldValue>(v.clone())
            .map(|fv| fv.is_unpopulated())
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_serde_roundtrip() {
        let v = FieldValue::Text("hello".into());
        let json = serde_json::to_string(&v).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn unpopulated_rules() {
        assert!(FieldValue::Text("".into()).is_unpopulated());
        assert!(FieldValue::Text("  ".into()).is_unpopulated());
        assert!(!FieldValue::Text("x".into()).is_unpopulated());
        assert!(!FieldValue::Int(0).is_unpopulated());
        assert!(!FieldValue::Bool(false).is_unpopulated());
        assert!(!FieldValue::List(vec![]).is_unpopulated());
    }

    #[test]
    fn map_is_unpopulated_absent_and_null() {
        let mut map = serde_json::Map::new();
        map.insert(
            "a".into(),
            json!({"kind": "text", "value": ""}),
        );
        map.insert("b".into(), serde_json::Value::Null);
        map.insert(
            "c".into(),
            json!({"kind": "int", "value": 0}),
        );
        assert!(is_unpopulated(&map, "a"));
        assert!(is_unpopulated(&map, "b"));
        assert!(is_unpopulated(&map, "missing"));
        assert!(!is_unpopulated(&map, "c"));
    }
}
