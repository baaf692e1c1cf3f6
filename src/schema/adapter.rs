//! Schema adapter - turns a tool's JSON Schema into a [`ToolSignature`]
//!
//! Adaptation is best-effort and never fails: a schema without
//! `properties` yields a signature with only the context parameter, and
//! unrecognized type names become [`SemanticType::Any`]. Validation of the
//! actual arguments happens later, in [`ToolSignature::bind`].

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::registry::RecordRegistry;
use super::types::{FieldSpec, Parameter, RecordType, SemanticType, ToolSignature};

/// Builds tool signatures, sharing nested record types through a registry
#[derive(Debug, Clone, Default)]
pub struct SchemaAdapter {
    records: Arc<RecordRegistry>,
}

impl SchemaAdapter {
    /// Create an adapter with a fresh record registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(RecordRegistry::new()))
    }

    /// Create an adapter that shares an existing record registry
    pub fn with_registry(records: Arc<RecordRegistry>) -> Self {
        SchemaAdapter { records }
    }

    /// The registry backing this adapter
    pub fn registry(&self) -> &Arc<RecordRegistry> {
        &self.records
    }

    /// Derive the callable shape of a tool from its input schema
    pub fn adapt(&self, tool: &str, schema: &Value) -> ToolSignature {
        let mut params = vec![Parameter::Context];
        let fields = self.fields(schema, |name| capitalize(name));
        debug!("Adapted tool '{}' with {} parameters", tool, fields.len());
        params.extend(fields.into_iter().map(Parameter::Named));

        ToolSignature {
            tool: tool.to_string(),
            params,
            open: is_open(schema),
        }
    }

    /// Build the fields of an object schema. `record_name` maps a property
    /// name to the record name used if that property is itself an object.
    fn fields(&self, schema: &Value, record_name: impl Fn(&str) -> String) -> Vec<FieldSpec> {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        properties
            .iter()
            .map(|(name, prop)| FieldSpec {
                name: name.clone(),
                ty: self.resolve(prop, record_name(name)),
                required: required.contains(&name.as_str()),
                description: prop
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .collect()
    }

    /// Resolve the semantic type of one property schema
    fn resolve(&self, prop: &Value, record_name: String) -> SemanticType {
        match declared_type(prop).as_deref() {
            Some("array") => {
                let element = match prop.get("items") {
                    Some(items) if items.is_object() => {
                        self.resolve(items, format!("{}Item", record_name))
                    }
                    _ => SemanticType::Any,
                };
                SemanticType::Array(Box::new(element))
            }
            Some("object") => {
                if prop.get("properties").map_or(false, Value::is_object) {
                    SemanticType::Record(self.record(prop, &record_name))
                } else {
                    SemanticType::Any
                }
            }
            Some(other) => SemanticType::primitive(other).unwrap_or(SemanticType::Any),
            None => SemanticType::Any,
        }
    }

    fn record(&self, schema: &Value, name: &str) -> Arc<RecordType> {
        self.records.get_or_build(name, schema, || RecordType {
            name: name.to_string(),
            fields: self.fields(schema, |field| format!("{}_{}", name, capitalize(field))),
            open: is_open(schema),
        })
    }
}

/// The single JSON Schema type a property declares.
///
/// A `type` list collapses to its only non-null entry. Without `type`,
/// `properties` implies an object and `items` an array.
fn declared_type(prop: &Value) -> Option<String> {
    match prop.get("type") {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Array(names)) => {
            let non_null: Vec<&str> = names
                .iter()
                .filter_map(Value::as_str)
                .filter(|n| *n != "null")
                .collect();
            match non_null.as_slice() {
                [single] => Some(single.to_string()),
                [] if !names.is_empty() => Some("null".to_string()),
                _ => None,
            }
        }
        Some(_) => None,
        None if prop.get("properties").is_some() => Some("object".to_string()),
        None if prop.get("items").is_some() => Some("array".to_string()),
        None => None,
    }
}

fn is_open(schema: &Value) -> bool {
    !matches!(schema.get("additionalProperties"), Some(Value::Bool(false)))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
