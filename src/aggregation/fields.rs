//! Tolerant accessors over raw registry records.
//!
//! Every accessor tolerates absent or mistyped fields and returns `None`
//! rather than failing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::{is_valid_age, AgeGroup, PatientAggregate};
use crate::registry::RawRecord;

/// First element of an array field.
fn first<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record.get(key)?.as_array()?.first()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_owned)
}

/// Label of a coded concept: first coding's display, then the concept text.
pub fn concept_label(concept: &Value) -> Option<String> {
    first(concept, "coding")
        .and_then(|c| str_field(c, "display"))
        .filter(|s| !s.is_empty())
        .or_else(|| str_field(concept, "text"))
}

/// Label of the first category of a record.
pub fn category_label(record: &RawRecord) -> Option<String> {
    first(record, "category").and_then(concept_label)
}

pub fn severity_label(record: &RawRecord) -> Option<String> {
    record.get("severity").and_then(concept_label)
}

/// `(code, display)` of a record's `code` concept.
///
/// With a coding present the code is the first coding's code and the display
/// its display, falling back to the concept text. Without one both are the
/// concept text.
pub fn coded_value(record: &RawRecord) -> (Option<String>, Option<String>) {
    let Some(concept) = record.get("code") else {
        return (None, None);
    };
    match first(concept, "coding") {
        Some(coding) => {
            let display = str_field(coding, "display")
                .filter(|s| !s.is_empty())
                .or_else(|| str_field(concept, "text"));
            (str_field(coding, "code"), display)
        }
        None => {
            let text = str_field(concept, "text");
            (text.clone(), text)
        }
    }
}

/// Id part of a `"<ResourceType>/<id>"` reference held under `key`.
pub fn reference_id(record: &RawRecord, key: &str) -> Option<String> {
    let reference = record.get(key)?.get("reference")?.as_str()?;
    reference
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

/// Year of a birth date given as `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or a date-time.
pub fn birth_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.year());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(d.year());
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok();
    }
    None
}

/// Whole-year age in `current_year`. Month and day are ignored, so the age
/// can be one year high before the birthday. Out-of-range ages are `None`.
pub fn age_as_of(birth_date: &str, current_year: i32) -> Option<i32> {
    birth_year(birth_date)
        .map(|year| current_year - year)
        .filter(|age| is_valid_age(*age))
}

/// Flatten a raw patient record.
pub fn to_patient(record: &RawRecord, current_year: i32) -> PatientAggregate {
    let birth_date = str_field(record, "birthDate");
    let age = birth_date
        .as_deref()
        .and_then(|b| age_as_of(b, current_year));
    PatientAggregate {
        id: str_field(record, "id").unwrap_or_default(),
        gender: str_field(record, "gender"),
        age,
        age_group: age.and_then(AgeGroup::from_age),
        birth_date,
    }
}
