use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::DemographicSummary;
use crate::registry::RawRecord;

use super::top_k::CodeCount;

/// Compact statistical payload handed to the report generator.
/// A resource kind that was not fetched is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patients: Option<PatientSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<ObservationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub total_count: usize,
    pub demographics: DemographicSummary,
    pub sample_records: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSummary {
    pub total_count: usize,
    pub by_category: BTreeMap<String, usize>,
    pub common_tests: Vec<CodeCount>,
    pub sample_records: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSummary {
    pub total_count: usize,
    pub top_conditions: Vec<CodeCount>,
    pub severity_distribution: BTreeMap<String, usize>,
    pub sample_records: Vec<RawRecord>,
}
