//! Typed record schemas and the values exchanged with the generator.
//!
//! ## Wire format
//!
//! A schema travels as a JSON object whose keys are field names, in
//! declaration order. Each field is tagged by `type`:
//!
//! ```json
//! {
//!   "code":   { "type": "string", "regex": "^[a-z]{3}$" },
//!   "age":    { "type": "integer", "min": 18, "max": 99 },
//!   "tags":   { "type": "array", "length": 3, "items": { "type": "name" } },
//!   "home":   { "type": "object", "schema": { "city": { "type": "string" } } }
//! }
//! ```

use serde::de::{MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

use super::error::{DeliveryError, ValidationError};

/// Every field type the builder and the generator understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Name,
    Email,
    Phone,
    Date,
    Uuid,
    ImageUrl,
    FileUrl,
    Object,
    Array,
}

impl FieldType {
    pub const ALL: [FieldType; 13] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::Name,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Date,
        FieldType::Uuid,
        FieldType::ImageUrl,
        FieldType::FileUrl,
        FieldType::Object,
        FieldType::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Name => "name",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Date => "date",
            FieldType::Uuid => "uuid",
            FieldType::ImageUrl => "image_url",
            FieldType::FileUrl => "file_url",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    /// Primitive and semantic types, i.e. anything that does not nest.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, FieldType::Object | FieldType::Array)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

impl From<NumericKind> for FieldType {
    fn from(kind: NumericKind) -> Self {
        match kind {
            NumericKind::Integer => FieldType::Integer,
            NumericKind::Float => FieldType::Float,
        }
    }
}

/// Constraint carried by a `string` field. Regex and enum are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StringConstraint {
    #[default]
    Unconstrained,
    Regex(String),
    Enum(Vec<String>),
}

/// One field of a [`Schema`].
///
/// Values built through [`SchemaField::of`] or decoded from the wire are
/// canonical: `string` is always `Text`, numeric types are always `Ranged`,
/// and `Primitive` only holds the remaining non-nesting types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireField", into = "WireField")]
pub enum SchemaField {
    Primitive(FieldType),
    Ranged {
        kind: NumericKind,
        min: Option<f64>,
        max: Option<f64>,
    },
    Text(StringConstraint),
    Object(Schema),
    Array {
        length: Option<u32>,
        items: Box<SchemaField>,
    },
}

impl SchemaField {
    /// Canonical unconstrained field of the given primitive type.
    ///
    /// `object` and `array` have no unconstrained form; they map to an empty
    /// object and an array of `name` respectively.
    pub fn of(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => SchemaField::Text(StringConstraint::Unconstrained),
            FieldType::Integer => SchemaField::Ranged {
                kind: NumericKind::Integer,
                min: None,
                max: None,
            },
            FieldType::Float => SchemaField::Ranged {
                kind: NumericKind::Float,
                min: None,
                max: None,
            },
            FieldType::Object => SchemaField::Object(Schema::new()),
            FieldType::Array => SchemaField::Array {
                length: None,
                items: Box::new(SchemaField::Primitive(FieldType::Name)),
            },
            other => SchemaField::Primitive(other),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            SchemaField::Primitive(t) => *t,
            SchemaField::Ranged { kind, .. } => (*kind).into(),
            SchemaField::Text(_) => FieldType::String,
            SchemaField::Object(_) => FieldType::Object,
            SchemaField::Array { .. } => FieldType::Array,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireField {
    #[serde(rename = "type")]
    field_type: FieldType,
    /// Non-numeric bounds (e.g. date strings) are accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    regex: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<SchemaField>>,
}

impl WireField {
    fn bare(field_type: FieldType) -> Self {
        Self {
            field_type,
            min: None,
            max: None,
            regex: None,
            enum_values: None,
            schema: None,
            length: None,
            items: None,
        }
    }
}

impl TryFrom<WireField> for SchemaField {
    type Error = String;

    fn try_from(wire: WireField) -> Result<Self, Self::Error> {
        let field = match wire.field_type {
            FieldType::Integer | FieldType::Float => {
                let kind = if wire.field_type == FieldType::Integer {
                    NumericKind::Integer
                } else {
                    NumericKind::Float
                };
                SchemaField::Ranged {
                    kind,
                    min: wire.min.as_ref().and_then(Value::as_f64),
                    max: wire.max.as_ref().and_then(Value::as_f64),
                }
            }
            FieldType::String => {
                let regex = wire.regex.filter(|r| !r.is_empty());
                let values = wire.enum_values.filter(|v| !v.is_empty());
                match (regex, values) {
                    (Some(_), Some(_)) => {
                        return Err("string field cannot carry both regex and enum".to_string())
                    }
                    (Some(pattern), None) => SchemaField::Text(StringConstraint::Regex(pattern)),
                    (None, Some(values)) => SchemaField::Text(StringConstraint::Enum(values)),
                    (None, None) => SchemaField::Text(StringConstraint::Unconstrained),
                }
            }
            FieldType::Object => match wire.schema {
                Some(schema) if !schema.is_empty() => SchemaField::Object(schema),
                _ => return Err("object field requires a non-empty `schema`".to_string()),
            },
            FieldType::Array => {
                let items = wire
                    .items
                    .ok_or_else(|| "array field requires `items`".to_string())?;
                if wire.length == Some(0) {
                    return Err("array `length` must be positive".to_string());
                }
                SchemaField::Array {
                    length: wire.length,
                    items,
                }
            }
            other => SchemaField::Primitive(other),
        };
        Ok(field)
    }
}

impl From<SchemaField> for WireField {
    fn from(field: SchemaField) -> Self {
        let mut wire = WireField::bare(field.field_type());
        match field {
            SchemaField::Primitive(_) => {}
            SchemaField::Ranged { kind, min, max } => {
                wire.min = min.and_then(|v| wire_number(kind, v)).map(Value::Number);
                wire.max = max.and_then(|v| wire_number(kind, v)).map(Value::Number);
            }
            SchemaField::Text(StringConstraint::Unconstrained) => {}
            SchemaField::Text(StringConstraint::Regex(pattern)) => wire.regex = Some(pattern),
            SchemaField::Text(StringConstraint::Enum(values)) => wire.enum_values = Some(values),
            SchemaField::Object(schema) => wire.schema = Some(schema),
            SchemaField::Array { length, items } => {
                wire.length = length;
                wire.items = Some(items);
            }
        }
        wire
    }
}

// Integral bounds on integer fields go out as JSON integers.
fn wire_number(kind: NumericKind, value: f64) -> Option<Number> {
    if kind == NumericKind::Integer && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// Ordered mapping from field name to [`SchemaField`].
///
/// Declaration order is kept because it decides the key order of generated
/// records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<(String, SchemaField)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing (in place) any field with the same name.
    pub fn insert(&mut self, name: impl Into<String>, field: SchemaField) -> Option<SchemaField> {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, field)),
            None => {
                self.fields.push((name, field));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaField)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }
}

impl FromIterator<(String, SchemaField)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, SchemaField)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, field) in iter {
            schema.insert(name, field);
        }
        schema
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, field) in &self.fields {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field name to field definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, field)) = access.next_entry::<String, SchemaField>()? {
                    schema.insert(name, field);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

fn default_count() -> u32 {
    1
}

/// A validated schema plus the number of records to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub schema: Schema,
    #[serde(default = "default_count")]
    pub count: u32,
}

impl GenerationRequest {
    /// Pair a schema with a record count. A zero count is rejected here, in the
    /// validation stage, so it can never reach the generator.
    pub fn new(schema: Schema, count: u32) -> Result<Self, ValidationError> {
        if count == 0 {
            return Err(ValidationError::InvalidCount);
        }
        Ok(Self { schema, count })
    }

    /// Like [`GenerationRequest::new`] but for an untyped count as sent by a
    /// browser: any positive integral JSON number is accepted.
    pub fn from_raw_count(schema: Schema, count: &Value) -> Result<Self, ValidationError> {
        let count = match count {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
            _ => None,
        };
        let count = count
            .and_then(|c| u32::try_from(c).ok())
            .ok_or(ValidationError::InvalidCount)?;
        Self::new(schema, count)
    }
}

/// The collaborator's parsed output, passed through verbatim.
///
/// Normally a JSON array of records; `{}` when the collaborator printed nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationResult(Value);

impl GenerationResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The result used when the collaborator produced no output.
    pub fn empty() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    pub fn records(&self) -> Option<&[Value]> {
        self.0.as_array().map(Vec::as_slice)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// A downstream URL that receives the generated batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryTarget(String);

impl DeliveryTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Split a comma-separated list, trimming entries and dropping empty ones.
    pub fn parse_list(raw: &str) -> Vec<DeliveryTarget> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(DeliveryTarget::new)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of delivering one batch to one target.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    pub target: DeliveryTarget,
    /// HTTP status on success.
    pub result: Result<u16, DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for DeliveryOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DeliveryOutcome", 3)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("success", &self.is_success())?;
        match &self.result {
            Ok(status) => state.serialize_field("status", status)?,
            Err(err) => state.serialize_field("error", &err.to_string())?,
        }
        state.end()
    }
}
