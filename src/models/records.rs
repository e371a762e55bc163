use serde::{Deserialize, Serialize};

use super::enums::AgeGroup;

/// One patient, flattened for filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAggregate {
    pub id: String,
    pub gender: Option<String>,
    /// Whole-year difference between the current year and the birth year.
    pub age: Option<i32>,
    pub age_group: Option<AgeGroup>,
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationAggregate {
    pub id: String,
    pub patient_id: Option<String>,
    pub category: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionAggregate {
    pub id: String,
    pub patient_id: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
    pub severity: Option<String>,
    pub category: Option<String>,
    pub onset_date: Option<String>,
}
