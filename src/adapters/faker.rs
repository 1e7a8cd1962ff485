//! Synthetic record generation for a [`Schema`].
//!
//! Used by the `dataforge-generator` binary and by the in-process transport.
//! Values are plausible, not realistic: the only contract is that each record
//! has the schema's keys in order and each value has the declared type.

use chrono::{Duration, NaiveDate};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use serde_json::{json, Map, Value};
use regex_syntax::hir::{Class, Hir, HirKind};
use tracing::warn;

use crate::domain::{FieldType, NumericKind, Schema, SchemaField, StringConstraint};

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;
const MAX_VARIABLE_ARRAY_LEN: u32 = 5;
const UNBOUNDED_REPEAT: u32 = 5;
const PRINTABLE_ASCII: (u32, u32) = (0x20, 0x7E);

#[derive(Debug, Default, Clone, Copy)]
pub struct RecordSynthesizer;

impl RecordSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Generate `count` records.
    pub fn generate_batch(&self, schema: &Schema, count: u32) -> Vec<Value> {
        (0..count).map(|_| self.generate_record(schema)).collect()
    }

    pub fn generate_record(&self, schema: &Schema) -> Value {
        let mut record = Map::new();
        for (name, field) in schema.iter() {
            record.insert(name.to_string(), self.generate_value(field));
        }
        Value::Object(record)
    }

    pub fn generate_value(&self, field: &SchemaField) -> Value {
        let mut rng = rand::thread_rng();
        match field {
            SchemaField::Ranged { kind, min, max } => {
                let (lo, hi) = ordered(min.unwrap_or(DEFAULT_MIN), max.unwrap_or(DEFAULT_MAX));
                match kind {
                    NumericKind::Integer => {
                        let (lo, hi) = (lo.ceil() as i64, hi.floor() as i64);
                        if lo > hi {
                            json!(lo)
                        } else {
                            json!(rng.gen_range(lo..=hi))
                        }
                    }
                    NumericKind::Float => json!(sample_float(&mut rng, lo, hi)),
                }
            }
            SchemaField::Text(StringConstraint::Unconstrained) => json!(Word().fake::<String>()),
            SchemaField::Text(StringConstraint::Regex(pattern)) => match expand_pattern(pattern) {
                Ok(text) => json!(text),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "unusable regex, generating a plain word");
                    json!(Word().fake::<String>())
                }
            },
            SchemaField::Text(StringConstraint::Enum(values)) => {
                if values.is_empty() {
                    json!("")
                } else {
                    json!(values[rng.gen_range(0..values.len())].clone())
                }
            }
            SchemaField::Primitive(field_type) => {
                match field_type {
                    FieldType::Boolean => json!(rng.gen_bool(0.5)),
                    FieldType::Name => json!(Name().fake::<String>()),
                    FieldType::Email => json!(SafeEmail().fake::<String>()),
                    FieldType::Phone => json!(PhoneNumber().fake::<String>()),
                    FieldType::Date => json!(random_date(&mut rng)),
                    FieldType::Uuid => json!(uuid::Uuid::new_v4().to_string()),
                    FieldType::ImageUrl => json!(format!(
                        "https://picsum.photos/seed/{}/640/480",
                        rng.gen_range(1..100_000u32)
                    )),
                    FieldType::FileUrl => json!(format!(
                        "https://files.example.com/{}.pdf",
                        uuid::Uuid::new_v4()
                    )),
                    // Canonical fields never carry these as primitives.
                    FieldType::String | FieldType::Integer | FieldType::Float => {
                        json!(Sentence(1..5).fake::<String>())
                    }
                    FieldType::Object => json!({}),
                    FieldType::Array => json!([]),
                }
            }
            SchemaField::Object(nested) => self.generate_record(nested),
            SchemaField::Array { length, items } => {
                let len = length.unwrap_or_else(|| rng.gen_range(1..=MAX_VARIABLE_ARRAY_LEN));
                Value::Array((0..len).map(|_| self.generate_value(items)).collect())
            }
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn random_date(rng: &mut impl Rng) -> String {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or_default();
    let span = (end - start).num_days().max(0);
    let date = start + Duration::days(rng.gen_range(0..=span));
    date.format("%Y-%m-%d").to_string()
}

/// Produce a string matching `pattern`.
///
/// The pattern is parsed with the same parser the builder validates with,
/// so every accepted construct (groups, alternation, negated classes, case
/// folding) is honoured. Look-around assertions such as anchors and word
/// boundaries emit nothing. Unbounded repetitions stop after
/// `UNBOUNDED_REPEAT` extra copies.
pub fn expand_pattern(pattern: &str) -> Result<String, regex_syntax::Error> {
    let hir = regex_syntax::Parser::new().parse(pattern)?;
    let mut out = String::new();
    expand_hir(&hir, &mut rand::thread_rng(), &mut out);
    Ok(out)
}

fn expand_hir(hir: &Hir, rng: &mut impl Rng, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => out.push_str(&String::from_utf8_lossy(&literal.0)),
        HirKind::Class(Class::Unicode(class)) => {
            let ranges: Vec<(char, char)> = class.ranges().iter().map(|r| (r.start(), r.end())).collect();
            if let Some(c) = pick_char(&ranges, rng) {
                out.push(c);
            }
        }
        HirKind::Class(Class::Bytes(class)) => {
            // Only the ASCII part of a byte class can be written to a string.
            let ranges: Vec<(char, char)> = class
                .ranges()
                .iter()
                .filter(|r| r.start() <= 0x7F)
                .map(|r| (char::from(r.start()), char::from(r.end().min(0x7F))))
                .collect();
            if let Some(c) = pick_char(&ranges, rng) {
                out.push(c);
            }
        }
        HirKind::Repetition(rep) => {
            let max = rep.max.unwrap_or(rep.min.saturating_add(UNBOUNDED_REPEAT));
            for _ in 0..rng.gen_range(rep.min..=max.max(rep.min)) {
                expand_hir(&rep.sub, rng, out);
            }
        }
        HirKind::Capture(capture) => expand_hir(&capture.sub, rng, out),
        HirKind::Concat(parts) => {
            for part in parts {
                expand_hir(part, rng, out);
            }
        }
        HirKind::Alternation(branches) => {
            if !branches.is_empty() {
                expand_hir(&branches[rng.gen_range(0..branches.len())], rng, out);
            }
        }
    }
}

/// Pick a character from a class, preferring printable ASCII members.
fn pick_char(ranges: &[(char, char)], rng: &mut impl Rng) -> Option<char> {
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|&(start, end)| {
            let lo = (start as u32).max(PRINTABLE_ASCII.0);
            let hi = (end as u32).min(PRINTABLE_ASCII.1);
            (lo <= hi).then_some((lo, hi))
        })
        .collect();
    let candidates: Vec<(u32, u32)> = if printable.is_empty() {
        ranges.iter().map(|&(start, end)| (start as u32, end as u32)).collect()
    } else {
        printable
    };

    let total: u64 = candidates.iter().map(|&(lo, hi)| u64::from(hi - lo) + 1).sum();
    if total == 0 {
        return None;
    }
    let mut index = rng.gen_range(0..total);
    for &(lo, hi) in &candidates {
        let size = u64::from(hi - lo) + 1;
        if index < size {
            // A range spanning the surrogate gap can land on a non-char.
            return char::from_u32(lo + index as u32).or_else(|| char::from_u32(lo));
        }
        index -= size;
    }
    None
}

/// Uniform float in `[lo, hi]`, rounded to cents when that stays in range.
fn sample_float(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    let value = if (hi - lo).is_finite() {
        rng.gen_range(lo..=hi)
    } else {
        // The span overflows f64; sample in half scale.
        let half = lo / 2.0 + rng.gen::<f64>() * (hi / 2.0 - lo / 2.0);
        (half * 2.0).clamp(lo, hi)
    };
    let rounded = (value * 100.0).round() / 100.0;
    if (lo..=hi).contains(&rounded) {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_records_follow_schema_order_and_types() {
        let schema = schema(json!({
            "id": { "type": "uuid" },
            "age": { "type": "integer", "min": 18, "max": 20 },
            "score": { "type": "float", "min": 0.5, "max": 0.9 },
            "active": { "type": "boolean" },
            "email": { "type": "email" },
            "born": { "type": "date" },
            "avatar": { "type": "image_url" },
            "tags": { "type": "array", "length": 3, "items": { "type": "name" } },
            "home": { "type": "object", "schema": { "city": { "type": "string" } } }
        }));

        let batch = RecordSynthesizer::new().generate_batch(&schema, 4);
        assert_eq!(batch.len(), 4);

        for record in &batch {
            let obj = record.as_object().unwrap();
            let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            assert_eq!(
                keys,
                vec!["id", "age", "score", "active", "email", "born", "avatar", "tags", "home"]
            );

            let age = obj["age"].as_i64().unwrap();
            assert!((18..=20).contains(&age));
            let score = obj["score"].as_f64().unwrap();
            assert!((0.5..=0.9).contains(&score));
            assert!(obj["active"].is_boolean());
            assert!(obj["email"].as_str().unwrap().contains('@'));
            assert!(NaiveDate::parse_from_str(obj["born"].as_str().unwrap(), "%Y-%m-%d").is_ok());
            assert!(uuid::Uuid::parse_str(obj["id"].as_str().unwrap()).is_ok());
            assert!(obj["avatar"].as_str().unwrap().starts_with("https://"));
            assert_eq!(obj["tags"].as_array().unwrap().len(), 3);
            assert!(obj["home"]["city"].is_string());
        }
    }

    #[test]
    fn test_enum_values_are_respected() {
        let field = SchemaField::Text(StringConstraint::Enum(vec![
            "red".to_string(),
            "green".to_string(),
        ]));
        for _ in 0..20 {
            let value = RecordSynthesizer::new().generate_value(&field);
            assert!(value == "red" || value == "green");
        }
    }

    #[test]
    fn test_variable_length_arrays_stay_bounded() {
        let field = SchemaField::Array {
            length: None,
            items: Box::new(SchemaField::of(FieldType::Boolean)),
        };
        for _ in 0..20 {
            let len = RecordSynthesizer::new()
                .generate_value(&field)
                .as_array()
                .unwrap()
                .len();
            assert!((1..=MAX_VARIABLE_ARRAY_LEN as usize).contains(&len));
        }
    }

    #[test]
    fn test_expanded_patterns_match_their_regex() {
        let patterns = [
            "^[a-z]{3}$",
            "^[A-Z]{3}[0-9]{2}$",
            r"^\d{4}-\d{2}$",
            "^ab?c+$",
            r"^[a-f0-9]{2,6}\w*$",
            "^ORD-[0-9]{1,}$",
            "^(cat|dog)$",
            "^[^0-9]{3}$",
            "^(ab)+c?$",
            "(?i)^x[a-c]{2}$",
            r"^\w+@\w+\.com$",
            "^.{5}$",
            r"^[^\s]{2}\s[^a-z]$",
            "^(red|green|(light|dark)blue)-[0-9]{2}$",
        ];
        for pattern in patterns {
            let re = Regex::new(pattern).unwrap();
            for _ in 0..50 {
                let value = expand_pattern(pattern).unwrap();
                assert!(re.is_match(&value), "{:?} does not match {}", value, pattern);
            }
        }
    }

    #[test]
    fn test_unparseable_pattern_is_an_error() {
        assert!(expand_pattern("[a-").is_err());

        let field = SchemaField::Text(StringConstraint::Regex("(unclosed".to_string()));
        assert!(RecordSynthesizer::new().generate_value(&field).is_string());
    }

    #[test]
    fn test_extreme_float_range_stays_finite_and_bounded() {
        let field = SchemaField::Ranged {
            kind: NumericKind::Float,
            min: Some(-1e308),
            max: Some(1e308),
        };
        for _ in 0..50 {
            let value = RecordSynthesizer::new().generate_value(&field).as_f64().unwrap();
            assert!(value.is_finite());
            assert!((-1e308..=1e308).contains(&value));
        }
    }

    #[test]
    fn test_narrow_float_range_is_not_rounded_out() {
        let field = SchemaField::Ranged {
            kind: NumericKind::Float,
            min: Some(0.001),
            max: Some(0.004),
        };
        for _ in 0..50 {
            let value = RecordSynthesizer::new().generate_value(&field).as_f64().unwrap();
            assert!((0.001..=0.004).contains(&value), "{} out of range", value);
        }

        let field = SchemaField::Ranged {
            kind: NumericKind::Float,
            min: Some(1.234),
            max: Some(1.236),
        };
        for _ in 0..50 {
            let value = RecordSynthesizer::new().generate_value(&field).as_f64().unwrap();
            assert!((1.234..=1.236).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn test_extreme_integer_range_does_not_panic() {
        let field = SchemaField::Ranged {
            kind: NumericKind::Integer,
            min: Some(-1e308),
            max: Some(1e308),
        };
        assert!(RecordSynthesizer::new().generate_value(&field).is_i64());
    }
}
