//! Named-argument binding against a [`ToolSignature`]
//!
//! This is the invocation-time safety net for best-effort adaptation: the
//! JSON arguments a model produced are checked against the signature and
//! converted into [`TypedValue`]s before anything is sent to a tool server.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{fields_to_json, FieldSpec, RecordValue, SemanticType, ToolSignature, TypedValue};

/// Why a set of arguments does not fit a signature
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing required argument '{0}'")]
    Missing(String),

    #[error("unexpected argument '{0}'")]
    Unexpected(String),

    #[error("argument '{path}' expected {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: &'static str,
    },
}

/// Arguments validated against a signature, in parameter order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundArguments {
    values: Vec<(String, TypedValue)>,
}

impl BoundArguments {
    /// Get a bound value by parameter name
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Whether the caller supplied a value for `name`
    pub fn is_provided(&self, name: &str) -> bool {
        self.get(name).map_or(false, |v| !v.is_absent())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// JSON arguments for the wire; absent values are left out
    pub fn to_json_map(&self) -> Map<String, Value> {
        fields_to_json(&self.values)
    }
}

impl ToolSignature {
    /// Validate `args` and bind them to this signature's named parameters.
    ///
    /// `null` is treated as an empty argument object. An explicit `null`
    /// for an optional parameter binds as [`TypedValue::Absent`].
    pub fn bind(&self, args: &Value) -> Result<BoundArguments, BindError> {
        let empty = Map::new();
        let map = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => return Err(BindError::NotAnObject(json_kind(other))),
        };
        let fields: Vec<&FieldSpec> = self.named().collect();
        let values = bind_fields(&fields, self.open, map, "")?;
        Ok(BoundArguments { values })
    }
}

fn bind_fields(
    fields: &[&FieldSpec],
    open: bool,
    map: &Map<String, Value>,
    prefix: &str,
) -> Result<Vec<(String, TypedValue)>, BindError> {
    let mut values = Vec::with_capacity(fields.len());

    for field in fields {
        let path = join_path(prefix, &field.name);
        let value = match map.get(&field.name) {
            None | Some(Value::Null) if !field.required => TypedValue::Absent,
            None => return Err(BindError::Missing(path)),
            Some(v) => coerce(&field.ty, v, &path)?,
        };
        values.push((field.name.clone(), value));
    }

    for (key, value) in map {
        if fields.iter().any(|f| &f.name == key) {
            continue;
        }
        if !open {
            return Err(BindError::Unexpected(join_path(prefix, key)));
        }
        values.push((key.clone(), TypedValue::Any(value.clone())));
    }

    Ok(values)
}

fn coerce(ty: &SemanticType, value: &Value, path: &str) -> Result<TypedValue, BindError> {
    let mismatch = || BindError::TypeMismatch {
        path: path.to_string(),
        expected: ty.to_string(),
        found: json_kind(value),
    };

    match ty {
        SemanticType::Any => Ok(TypedValue::Any(value.clone())),
        SemanticType::Null => match value {
            Value::Null => Ok(TypedValue::Null),
            _ => Err(mismatch()),
        },
        SemanticType::Text => value
            .as_str()
            .map(|s| TypedValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        SemanticType::Integer => integer(value).map(TypedValue::Integer).ok_or_else(mismatch),
        SemanticType::Number => value.as_f64().map(TypedValue::Number).ok_or_else(mismatch),
        SemanticType::Boolean => value.as_bool().map(TypedValue::Boolean).ok_or_else(mismatch),
        SemanticType::Array(element) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| coerce(element, item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(TypedValue::Array)
        }
        SemanticType::Record(record) => {
            let map = value.as_object().ok_or_else(mismatch)?;
            let fields: Vec<&FieldSpec> = record.fields.iter().collect();
            let fields = bind_fields(&fields, record.open, map, path)?;
            Ok(TypedValue::Record(RecordValue {
                type_name: record.name.clone(),
                fields,
            }))
        }
    }
}

/// Integers arrive as JSON integers or as floats with no fractional part
fn integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaAdapter;
    use serde_json::json;

    fn edit_file_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "edits": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "oldText": {"type": "string"},
                            "newText": {"type": "string"}
                        },
                        "required": ["oldText", "newText"],
                        "additionalProperties": false
                    }
                },
                "dryRun": {"type": "boolean"}
            },
            "required": ["path", "edits"],
            "additionalProperties": false
        })
    }

    #[test]
    fn test_bind_required_and_optional() {
        let sig = SchemaAdapter::new().adapt("edit_file", &edit_file_schema());
        let bound = sig
            .bind(&json!({
                "path": "src/lib.rs",
                "edits": [{"oldText": "a", "newText": "b"}]
            }))
            .unwrap();

        assert_eq!(bound.get("path"), Some(&TypedValue::Text("src/lib.rs".into())));
        assert_eq!(bound.get("dryRun"), Some(&TypedValue::Absent));
        assert!(!bound.is_provided("dryRun"));
        assert!(bound.is_provided("edits"));
    }

    #[test]
    fn test_missing_required_argument() {
        let sig = SchemaAdapter::new().adapt("edit_file", &edit_file_schema());
        let err = sig.bind(&json!({"edits": []})).unwrap_err();
        assert_eq!(err, BindError::Missing("path".into()));
    }

    #[test]
    fn test_nested_field_errors_carry_a_path() {
        let sig = SchemaAdapter::new().adapt("edit_file", &edit_file_schema());
        let err = sig
            .bind(&json!({"path": "x", "edits": [{"oldText": "a", "newText": 3}]}))
            .unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                path: "edits[0].newText".into(),
                expected: "text".into(),
                found: "integer",
            }
        );
    }

    #[test]
    fn test_closed_schema_rejects_unknown_arguments() {
        let sig = SchemaAdapter::new().adapt("edit_file", &edit_file_schema());
        let err = sig
            .bind(&json!({"path": "x", "edits": [], "force": true}))
            .unwrap_err();
        assert_eq!(err, BindError::Unexpected("force".into()));
    }

    #[test]
    fn test_open_schema_keeps_unknown_arguments() {
        let sig = SchemaAdapter::new().adapt("t", &json!({"properties": {"a": {"type": "string"}}}));
        let bound = sig.bind(&json!({"a": "x", "extra": [1, 2]})).unwrap();
        assert_eq!(bound.get("extra"), Some(&TypedValue::Any(json!([1, 2]))));
        assert_eq!(bound.to_json_map().len(), 2);
    }

    #[test]
    fn test_null_and_non_object_arguments() {
        let sig = SchemaAdapter::new().adapt("list_allowed_directories", &json!({}));
        assert!(sig.bind(&Value::Null).unwrap().to_json_map().is_empty());
        assert_eq!(sig.bind(&json!([1])).unwrap_err(), BindError::NotAnObject("array"));
    }

    #[test]
    fn test_explicit_null_for_optional_is_absent() {
        let sig = SchemaAdapter::new().adapt(
            "read_file",
            &json!({"properties": {"path": {"type": "string"}, "head": {"type": "integer"}}, "required": ["path"]}),
        );
        let bound = sig.bind(&json!({"path": "a", "head": null})).unwrap();
        assert_eq!(bound.get("head"), Some(&TypedValue::Absent));
        assert_eq!(bound.to_json_map(), json!({"path": "a"}).as_object().unwrap().clone());

        let err = sig.bind(&json!({"path": null})).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn test_integer_accepts_whole_floats_only() {
        let sig = SchemaAdapter::new().adapt("t", &json!({"properties": {"n": {"type": "integer"}}}));
        assert_eq!(sig.bind(&json!({"n": 3.0})).unwrap().get("n"), Some(&TypedValue::Integer(3)));
        assert!(sig.bind(&json!({"n": 3.5})).is_err());
        assert!(sig.bind(&json!({"n": "3"})).is_err());
    }

    #[test]
    fn test_nested_record_round_trip() {
        let schema = edit_file_schema();
        let sig = SchemaAdapter::new().adapt("edit_file", &schema);
        let args = json!({
            "path": "README.md",
            "edits": [
                {"oldText": "foo", "newText": "bar"},
                {"oldText": "baz", "newText": ""}
            ],
            "dryRun": true
        });

        let bound = sig.bind(&args).unwrap();
        let Some(TypedValue::Array(edits)) = bound.get("edits") else {
            panic!("edits should bind as an array");
        };
        let TypedValue::Record(first) = &edits[0] else {
            panic!("edit items should bind as records");
        };
        assert_eq!(first.type_name, "EditsItem");

        let serialized = Value::Object(bound.to_json_map());
        assert_eq!(serialized, args);
        assert_eq!(sig.bind(&serialized).unwrap(), bound);
    }
}
