use chrono::{DateTime, NaiveDate};

use crate::aggregation::UNKNOWN;
use crate::models::{AgeGroup, ConditionAggregate, FilterValue, ObservationAggregate, PatientAggregate};

/// A filterable field of the normalized dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Gender,
    AgeGroup,
    Age,
    Category,
    Severity,
    Code,
    Display,
    Date,
}

impl FilterField {
    /// Resolve a declared field name. Case, `_`, `-` and spaces are ignored.
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "gender" | "sex" => Some(Self::Gender),
            "agegroup" | "agegroups" | "agebucket" => Some(Self::AgeGroup),
            "age" | "agerange" | "ages" => Some(Self::Age),
            "category" | "observationcategory" | "conditioncategory" => Some(Self::Category),
            "severity" | "conditionseverity" => Some(Self::Severity),
            "code" | "testcode" | "conditioncode" => Some(Self::Code),
            "display" | "testname" | "conditionname" => Some(Self::Display),
            "date" | "daterange" | "effectivedate" | "effectivedatetime" | "onsetdate"
            | "onsetdatetime" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn is_patient_field(self) -> bool {
        matches!(self, Self::Gender | Self::AgeGroup | Self::Age)
    }
}

// ── Per-entity matching ──────────────────────────────────
//
// `None` means the entity has no such field and the filter does not apply.

pub fn patient_matches(p: &PatientAggregate, field: FilterField, value: &FilterValue) -> Option<bool> {
    match field {
        FilterField::Gender => Some(text_matches(or_unknown(&p.gender), value)),
        FilterField::AgeGroup | FilterField::Age => Some(age_matches(p, value)),
        _ => None,
    }
}

pub fn observation_matches(
    o: &ObservationAggregate,
    field: FilterField,
    value: &FilterValue,
) -> Option<bool> {
    match field {
        FilterField::Category => Some(text_matches(or_unknown(&o.category), value)),
        FilterField::Code => Some(text_matches(o.code.as_deref(), value)),
        FilterField::Display => Some(text_matches(o.display.as_deref(), value)),
        FilterField::Date => Some(date_matches(o.date.as_deref(), value)),
        _ => None,
    }
}

pub fn condition_matches(
    c: &ConditionAggregate,
    field: FilterField,
    value: &FilterValue,
) -> Option<bool> {
    match field {
        FilterField::Category => Some(text_matches(or_unknown(&c.category), value)),
        FilterField::Severity => Some(text_matches(or_unknown(&c.severity), value)),
        FilterField::Code => Some(text_matches(c.code.as_deref(), value)),
        FilterField::Display => Some(text_matches(c.display.as_deref(), value)),
        FilterField::Date => Some(date_matches(c.onset_date.as_deref(), value)),
        _ => None,
    }
}

// ── Value predicates ─────────────────────────────────────

/// Missing labels match the `"unknown"` bucket the aggregates count them under.
pub(crate) fn or_unknown(label: &Option<String>) -> Option<&str> {
    Some(label.as_deref().unwrap_or(UNKNOWN))
}

fn text_matches(actual: Option<&str>, value: &FilterValue) -> bool {
    match (actual, value) {
        (Some(actual), FilterValue::Text(expected)) => actual.eq_ignore_ascii_case(expected),
        _ => false,
    }
}

fn age_matches(p: &PatientAggregate, value: &FilterValue) -> bool {
    match value {
        FilterValue::Text(label) => match label.parse::<AgeGroup>() {
            Ok(group) => p.age_group == Some(group),
            Err(_) => label
                .trim()
                .parse::<i32>()
                .is_ok_and(|n| p.age == Some(n)),
        },
        FilterValue::Number(n) => p.age.is_some_and(|a| f64::from(a) == *n),
        FilterValue::NumberRange { min, max } => p.age.is_some_and(|a| {
            let a = f64::from(a);
            min.map_or(true, |m| a >= m) && max.map_or(true, |m| a <= m)
        }),
        FilterValue::DateRange { .. } => false,
    }
}

/// A record without a date never matches a date filter.
fn date_matches(actual: Option<&str>, value: &FilterValue) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match value {
        FilterValue::Text(prefix) => actual.starts_with(prefix.as_str()),
        FilterValue::DateRange { from, to } => {
            let Some(day) = calendar_day(actual) else {
                return false;
            };
            let after_from = from
                .as_deref()
                .and_then(calendar_day)
                .map_or(true, |f| day >= f);
            let before_to = to
                .as_deref()
                .and_then(calendar_day)
                .map_or(true, |t| day <= t);
            after_from && before_to
        }
        FilterValue::Number(_) | FilterValue::NumberRange { .. } => false,
    }
}

/// Calendar day of `YYYY-MM-DD` or an RFC 3339 date-time.
pub fn calendar_day(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}
