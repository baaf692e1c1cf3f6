//! Semantic parameter types derived from tool schemas

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The semantic type of a single tool parameter or record field
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticType {
    /// JSON `string`
    Text,
    /// JSON `integer`, held as a 64-bit signed integer
    Integer,
    /// JSON `number`, held as a double
    Number,
    /// JSON `boolean`
    Boolean,
    /// JSON `array` with a resolved element type
    Array(Box<SemanticType>),
    /// JSON `object` with declared properties
    Record(Arc<RecordType>),
    /// JSON `null`
    Null,
    /// Unrecognized or unconstrained schema; accepts any value
    Any,
}

impl SemanticType {
    /// Map a primitive JSON Schema type name to its semantic type.
    ///
    /// `array` and `object` need their sub-schemas and are resolved by the
    /// adapter, so they return `None` here along with unknown names.
    pub fn primitive(name: &str) -> Option<Self> {
        match name {
            "string" => Some(SemanticType::Text),
            "integer" => Some(SemanticType::Integer),
            "number" => Some(SemanticType::Number),
            "boolean" => Some(SemanticType::Boolean),
            "null" => Some(SemanticType::Null),
            _ => None,
        }
    }

    /// Get the nested record type, if this is a record
    pub fn as_record(&self) -> Option<&Arc<RecordType>> {
        match self {
            SemanticType::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Text => write!(f, "text"),
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Number => write!(f, "number"),
            SemanticType::Boolean => write!(f, "boolean"),
            SemanticType::Array(inner) => write!(f, "list[{}]", inner),
            SemanticType::Record(record) => write!(f, "{}", record.name),
            SemanticType::Null => write!(f, "null"),
            SemanticType::Any => write!(f, "any"),
        }
    }
}

/// A named field of a record or a named tool parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Property name as it appears in the schema
    pub name: String,
    /// Resolved semantic type
    pub ty: SemanticType,
    /// Whether the caller must supply this field
    pub required: bool,
    /// Human-readable description from the schema
    pub description: Option<String>,
}

impl FieldSpec {
    /// Default value for the field.
    ///
    /// Required fields have no default. Optional fields default to
    /// [`TypedValue::Absent`], never to a zero or empty value.
    pub fn default_value(&self) -> Option<TypedValue> {
        if self.required {
            None
        } else {
            Some(TypedValue::Absent)
        }
    }
}

/// A nested record type generated from an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    /// Deterministic name derived from the parent property
    pub name: String,
    /// Declared fields in schema order
    pub fields: Vec<FieldSpec>,
    /// Whether undeclared keys are accepted (`additionalProperties` not false)
    pub open: bool,
}

impl RecordType {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One entry of a tool's parameter list
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// The invocation context handed to every tool handler
    Context,
    /// A named argument taken from the tool schema
    Named(FieldSpec),
}

impl Parameter {
    /// Parameter name (`ctx` for the context parameter)
    pub fn name(&self) -> &str {
        match self {
            Parameter::Context => "ctx",
            Parameter::Named(field) => &field.name,
        }
    }
}

/// The callable shape of a tool: context parameter first, then one
/// parameter per schema property in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSignature {
    /// Tool name
    pub tool: String,
    /// Ordered parameter list
    pub params: Vec<Parameter>,
    /// Whether undeclared arguments are accepted
    pub open: bool,
}

impl ToolSignature {
    /// Total parameter count, including the context parameter
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// A signature always carries the context parameter
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over the named (schema-derived) parameters
    pub fn named(&self) -> impl Iterator<Item = &FieldSpec> {
        self.params.iter().filter_map(|p| match p {
            Parameter::Named(field) => Some(field),
            Parameter::Context => None,
        })
    }

    /// Look up a named parameter
    pub fn param(&self, name: &str) -> Option<&FieldSpec> {
        self.named().find(|f| f.name == name)
    }
}

/// A validated, typed argument value
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Optional argument that was not provided
    Absent,
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Array(Vec<TypedValue>),
    Record(RecordValue),
    /// Value accepted without a declared type
    Any(Value),
}

/// A value of a generated record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    pub type_name: String,
    pub fields: Vec<(String, TypedValue)>,
}

impl TypedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, TypedValue::Absent)
    }

    /// Convert back to JSON. Absent values have no JSON form.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            TypedValue::Absent => None,
            TypedValue::Null => Some(Value::Null),
            TypedValue::Text(s) => Some(Value::String(s.clone())),
            TypedValue::Integer(i) => Some(Value::from(*i)),
            TypedValue::Number(n) => Some(Value::from(*n)),
            TypedValue::Boolean(b) => Some(Value::Bool(*b)),
            TypedValue::Array(items) => Some(Value::Array(
                items.iter().filter_map(TypedValue::to_json).collect(),
            )),
            TypedValue::Record(record) => Some(Value::Object(fields_to_json(&record.fields))),
            TypedValue::Any(v) => Some(v.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Serialize named values, omitting absent ones
pub(crate) fn fields_to_json(fields: &[(String, TypedValue)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(name, value)| value.to_json().map(|v| (name.clone(), v)))
        .collect()
}
