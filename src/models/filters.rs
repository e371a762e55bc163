use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::FilterKind;

// ═══════════════════════════════════════════════════════════
// Filter declarations
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: Value,
    pub count: Option<usize>,
}

/// A filter control declared by the report generator. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    pub field: String,
    pub options: Option<Vec<FilterOption>>,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Filter values
// ═══════════════════════════════════════════════════════════

/// One acceptable value for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Number(f64),
    NumberRange { min: Option<f64>, max: Option<f64> },
    /// Inclusive calendar-day bounds, `YYYY-MM-DD` or RFC 3339.
    DateRange { from: Option<String>, to: Option<String> },
}

impl FilterValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Interpret a loosely-typed JSON value (a default value, an option
    /// value) as filter values. Arrays are flattened; nulls yield nothing.
    pub fn list_from_json(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.iter().filter_map(Self::from_json).collect(),
            other => Self::from_json(other).into_iter().collect(),
        }
    }

    /// Interpret one scalar or range object. Arrays and nulls are rejected.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Object(map) => {
                if let Ok(typed) = serde_json::from_value::<Self>(value.clone()) {
                    return Some(typed);
                }
                let text = |keys: &[&str]| {
                    keys.iter()
                        .find_map(|k| map.get(*k).and_then(Value::as_str))
                        .map(str::to_owned)
                };
                let number = |key: &str| map.get(key).and_then(Value::as_f64);

                if map.contains_key("min") || map.contains_key("max") {
                    Some(Self::NumberRange {
                        min: number("min"),
                        max: number("max"),
                    })
                } else if ["from", "to", "start", "end"].iter().any(|k| map.contains_key(*k)) {
                    Some(Self::DateRange {
                        from: text(&["from", "start"]),
                        to: text(&["to", "end"]),
                    })
                } else {
                    None
                }
            }
            Value::Array(_) | Value::Null => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// FilterSet
// ═══════════════════════════════════════════════════════════

/// Field name → acceptable values. Values within a field are alternatives;
/// fields are conjunctive. A field never maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, Vec<FilterValue>>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manual filters seeded from each definition's default value.
    pub fn from_defaults(definitions: &[FilterDefinition]) -> Self {
        let mut set = Self::new();
        for def in definitions {
            if let Some(default) = &def.default_value {
                for value in FilterValue::list_from_json(default) {
                    set.push_unique(&def.field, value);
                }
            }
        }
        set
    }

    /// Replace a field's values. An empty list clears the field.
    pub fn set(&mut self, field: &str, values: Vec<FilterValue>) {
        if values.is_empty() {
            self.0.remove(field);
        } else {
            self.0.insert(field.to_string(), values);
        }
    }

    pub fn get(&self, field: &str) -> &[FilterValue] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn remove(&mut self, field: &str) -> Option<Vec<FilterValue>> {
        self.0.remove(field)
    }

    /// Append `value` unless the field already holds it. Returns whether it was added.
    pub fn push_unique(&mut self, field: &str, value: FilterValue) -> bool {
        let values = self.0.entry(field.to_string()).or_default();
        if values.contains(&value) {
            false
        } else {
            values.push(value);
            true
        }
    }

    pub fn is_active(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

// ═══════════════════════════════════════════════════════════
// Cross-filters
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrossFilterValue {
    One(FilterValue),
    Many(Vec<FilterValue>),
}

impl CrossFilterValue {
    /// Flattened values.
    pub fn values(&self) -> &[FilterValue] {
        match self {
            Self::One(v) => std::slice::from_ref(v),
            Self::Many(vs) => vs,
        }
    }
}

impl From<FilterValue> for CrossFilterValue {
    fn from(value: FilterValue) -> Self {
        Self::One(value)
    }
}

/// A filter created by clicking a visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossFilterEntry {
    pub source_visualization_id: String,
    pub filter_field: String,
    pub filter_value: CrossFilterValue,
    pub timestamp: DateTime<Utc>,
}
