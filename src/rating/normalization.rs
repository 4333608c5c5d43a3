use serde_json::Value;

use crate::domain::{RawRecord, Trait, TraitRatings};
use crate::errors::ValidationError;

/// Coerce one stored field into an integer in [0, 100].
/// Only JSON numbers and numeric strings are coerced; `null`, `""` and booleans are rejected, never read as 0 or 1.
pub fn normalize(field: &'static str, raw: Option<&Value>) -> Result<u8, ValidationError> {
    let number = to_number(field, raw)?;

    if !number.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }

    Ok(clamp_to_scale(number.round()))
}

/// Accept a record only if all four fields normalize
pub fn normalize_record(record: &RawRecord) -> Result<TraitRatings, ValidationError> {
    if !record.is_object() {
        return Err(ValidationError::NotAnObject);
    }

    let field = |t: Trait| normalize(t.as_str(), record.field(t.as_str()));

    Ok(TraitRatings {
        humble: field(Trait::Humble)?,
        considerate: field(Trait::Considerate)?,
        kind: field(Trait::Kind)?,
        smart: field(Trait::Smart)?,
    })
}

fn to_number(field: &'static str, raw: Option<&Value>) -> Result<f64, ValidationError> {
    match raw {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| not_numeric(field, raw)),
        Some(Value::String(s)) => parse_numeric_text(s).ok_or_else(|| not_numeric(field, raw)),
        Some(_) => Err(not_numeric(field, raw)),
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn clamp_to_scale(value: f64) -> u8 {
    value.clamp(TraitRatings::MIN as f64, TraitRatings::MAX as f64) as u8
}

fn not_numeric(field: &'static str, raw: Option<&Value>) -> ValidationError {
    ValidationError::NotNumeric {
        field,
        value: raw.map(Value::to_string).unwrap_or_default(),
    }
}
