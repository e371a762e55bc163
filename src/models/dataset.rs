use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::AgeGroup;
use super::records::{ConditionAggregate, ObservationAggregate, PatientAggregate};

/// Population statistics over a patient list.
///
/// `age_groups` always carries all five buckets, and its values sum to the
/// number of patients with a resolvable age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicSummary {
    pub total_patients: usize,
    pub gender_distribution: BTreeMap<String, usize>,
    pub age_groups: BTreeMap<AgeGroup, usize>,
    pub average_age: Option<f64>,
    pub median_age: Option<i32>,
}

impl DemographicSummary {
    /// Zero-state summary: no patients, every bucket at zero.
    pub fn empty() -> Self {
        Self {
            total_patients: 0,
            gender_distribution: BTreeMap::new(),
            age_groups: AgeGroup::ALL.iter().map(|g| (*g, 0)).collect(),
            average_age: None,
            median_age: None,
        }
    }
}

impl Default for DemographicSummary {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub patient_count: usize,
    pub observation_count: usize,
    pub condition_count: usize,
    pub generated_at: String,
    pub data_source: String,
}

/// Normalized, filterable population snapshot. Never mutated once built;
/// filtering produces new datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDataset {
    pub patients: Option<Vec<PatientAggregate>>,
    pub observations: Option<Vec<ObservationAggregate>>,
    pub conditions: Option<Vec<ConditionAggregate>>,
    pub demographics: Option<DemographicSummary>,
    pub metadata: Option<DatasetMetadata>,
}

impl SourceDataset {
    pub fn patients(&self) -> &[PatientAggregate] {
        self.patients.as_deref().unwrap_or_default()
    }

    pub fn observations(&self) -> &[ObservationAggregate] {
        self.observations.as_deref().unwrap_or_default()
    }

    pub fn conditions(&self) -> &[ConditionAggregate] {
        self.conditions.as_deref().unwrap_or_default()
    }

    /// Bring metadata counts in line with the current array lengths.
    pub fn sync_metadata_counts(&mut self) {
        let (p, o, c) = (
            self.patients().len(),
            self.observations().len(),
            self.conditions().len(),
        );
        if let Some(meta) = self.metadata.as_mut() {
            meta.patient_count = p;
            meta.observation_count = o;
            meta.condition_count = c;
        }
    }
}
