//! Turns raw form input into a validated [`Schema`].
//!
//! The UI only reports what the user typed; every structural rule lives here
//! so it can be exercised without a browser. Validation never stops at the
//! first bad field: each field is checked on its own and all errors are
//! returned together.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::error::ValidationError;
use super::schema::{FieldType, NumericKind, Schema, SchemaField, StringConstraint};

fn default_item_type() -> FieldType {
    FieldType::Name
}

/// One entry of an object's nested field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNestedField {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// A field exactly as entered in the builder form.
///
/// Constraint inputs that do not apply to `field_type` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFieldInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub regex: Option<String>,
    /// Comma-separated enum values.
    #[serde(rename = "enum", default)]
    pub enum_values: Option<String>,
    #[serde(default)]
    pub nested: Vec<RawNestedField>,
    /// Number or numeric text; blank means variable length.
    #[serde(default)]
    pub length: Option<Value>,
    #[serde(default = "default_item_type")]
    pub item_type: FieldType,
}

impl RawFieldInput {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            min: None,
            max: None,
            regex: None,
            enum_values: None,
            nested: Vec::new(),
            length: None,
            item_type: default_item_type(),
        }
    }
}

/// Accumulates raw field inputs and assembles them into a [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<RawFieldInput>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, field: RawFieldInput) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn remove_field(&mut self, index: usize) -> Option<RawFieldInput> {
        (index < self.fields.len()).then(|| self.fields.remove(index))
    }

    pub fn fields(&self) -> &[RawFieldInput] {
        &self.fields
    }

    pub fn build(&self) -> Result<Schema, Vec<ValidationError>> {
        Self::validate(&self.fields)
    }

    /// Validate every field in declaration order.
    ///
    /// On success the schema holds all fields in their original order. On
    /// failure nothing is returned but the errors: a partial schema is never
    /// produced.
    pub fn validate(inputs: &[RawFieldInput]) -> Result<Schema, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut schema = Schema::new();

        for (index, input) in inputs.iter().enumerate() {
            match Self::build_field(index, input) {
                Ok((name, field)) => {
                    if schema.contains(&name) {
                        errors.push(ValidationError::DuplicateFieldName(name));
                    } else {
                        schema.insert(name, field);
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(schema)
        } else {
            Err(errors)
        }
    }

    fn build_field(
        index: usize,
        input: &RawFieldInput,
    ) -> Result<(String, SchemaField), ValidationError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyFieldName(index));
        }

        let field = match input.field_type {
            FieldType::Integer => Self::ranged(name, NumericKind::Integer, input)?,
            FieldType::Float => Self::ranged(name, NumericKind::Float, input)?,
            FieldType::String => Self::text(name, input)?,
            FieldType::Object => Self::object(name, &input.nested)?,
            FieldType::Array => Self::array(name, input)?,
            other => SchemaField::Primitive(other),
        };

        Ok((name.to_string(), field))
    }

    fn ranged(
        name: &str,
        kind: NumericKind,
        input: &RawFieldInput,
    ) -> Result<SchemaField, ValidationError> {
        if let (Some(min), Some(max)) = (input.min, input.max) {
            if min > max {
                return Err(ValidationError::InvalidRange(name.to_string()));
            }
        }
        Ok(SchemaField::Ranged {
            kind,
            min: input.min,
            max: input.max,
        })
    }

    fn text(name: &str, input: &RawFieldInput) -> Result<SchemaField, ValidationError> {
        let regex = input.regex.as_deref().map(str::trim).unwrap_or_default();
        let enum_raw = input.enum_values.as_deref().map(str::trim).unwrap_or_default();

        if !regex.is_empty() && !enum_raw.is_empty() {
            return Err(ValidationError::ConflictingStringConstraints(name.to_string()));
        }

        if !regex.is_empty() {
            regex::Regex::new(regex).map_err(|_| ValidationError::InvalidRegex(name.to_string()))?;
            return Ok(SchemaField::Text(StringConstraint::Regex(regex.to_string())));
        }

        if !enum_raw.is_empty() {
            let values: Vec<String> = enum_raw
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect();
            if values.is_empty() {
                return Err(ValidationError::EmptyEnum(name.to_string()));
            }
            return Ok(SchemaField::Text(StringConstraint::Enum(values)));
        }

        Ok(SchemaField::Text(StringConstraint::Unconstrained))
    }

    fn object(name: &str, nested: &[RawNestedField]) -> Result<SchemaField, ValidationError> {
        if nested.is_empty() {
            return Err(ValidationError::EmptyObject(name.to_string()));
        }

        let mut schema = Schema::new();
        for entry in nested {
            let nested_name = entry.name.trim();
            if nested_name.is_empty() {
                return Err(ValidationError::EmptyNestedFieldName(name.to_string()));
            }
            if !entry.field_type.is_primitive() {
                return Err(ValidationError::UnsupportedNestedType(name.to_string()));
            }
            if schema.contains(nested_name) {
                return Err(ValidationError::DuplicateFieldName(format!(
                    "{}.{}",
                    name, nested_name
                )));
            }
            // Nested entries carry their type only.
            schema.insert(nested_name, SchemaField::of(entry.field_type));
        }

        Ok(SchemaField::Object(schema))
    }

    fn array(name: &str, input: &RawFieldInput) -> Result<SchemaField, ValidationError> {
        if !input.item_type.is_primitive() {
            return Err(ValidationError::UnsupportedItemType(name.to_string()));
        }
        let length = match &input.length {
            None => None,
            Some(raw) => parse_length(raw)
                .ok_or_else(|| ValidationError::InvalidArrayLength(name.to_string()))?,
        };
        Ok(SchemaField::Array {
            length,
            items: Box::new(SchemaField::of(input.item_type)),
        })
    }
}

/// `Some(None)` for a blank length, `Some(Some(n))` for a positive integer,
/// `None` for anything else.
fn parse_length(raw: &Value) -> Option<Option<u32>> {
    let number = match raw {
        Value::Null => return Some(None),
        Value::String(s) if s.trim().is_empty() => return Some(None),
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if number.is_finite() && number.fract() == 0.0 && number >= 1.0 && number <= u32::MAX as f64 {
        Some(Some(number as u32))
    } else {
        None
    }
}
