//! Dataset Normalizer: one flattened record per raw record, plus a
//! demographic summary computed by the aggregation algorithm.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

use crate::aggregation::{fields, summarize_demographics};
use crate::models::{
    ConditionAggregate, DatasetMetadata, ObservationAggregate, PatientAggregate, SourceDataset,
};
use crate::registry::{RawCollections, RawRecord};

pub fn normalize(raw: &RawCollections, data_source: &str) -> SourceDataset {
    normalize_as_of(raw, data_source, Utc::now())
}

/// Normalize with ages and `generatedAt` taken from `now`.
pub fn normalize_as_of(raw: &RawCollections, data_source: &str, now: DateTime<Utc>) -> SourceDataset {
    let year = now.year();

    let patients: Option<Vec<PatientAggregate>> = raw
        .patients
        .as_ref()
        .map(|records| records.iter().map(|r| normalize_patient(r, year)).collect());
    let observations: Option<Vec<ObservationAggregate>> = raw
        .observations
        .as_ref()
        .map(|records| records.iter().map(normalize_observation).collect());
    let conditions: Option<Vec<ConditionAggregate>> = raw
        .conditions
        .as_ref()
        .map(|records| records.iter().map(normalize_condition).collect());

    let demographics = patients.as_deref().map(summarize_demographics);

    let mut dataset = SourceDataset {
        patients,
        observations,
        conditions,
        demographics,
        metadata: Some(DatasetMetadata {
            patient_count: 0,
            observation_count: 0,
            condition_count: 0,
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            data_source: data_source.to_string(),
        }),
    };
    dataset.sync_metadata_counts();

    tracing::debug!(
        patients = dataset.patients().len(),
        observations = dataset.observations().len(),
        conditions = dataset.conditions().len(),
        "Dataset normalized"
    );
    dataset
}

pub fn normalize_patient(record: &RawRecord, current_year: i32) -> PatientAggregate {
    fields::to_patient(record, current_year)
}

pub fn normalize_observation(record: &RawRecord) -> ObservationAggregate {
    let (code, display) = fields::coded_value(record);
    let quantity = record.get("valueQuantity");
    ObservationAggregate {
        id: string(record, "id").unwrap_or_default(),
        patient_id: fields::reference_id(record, "subject"),
        category: fields::category_label(record),
        code,
        display,
        value: quantity.and_then(|q| q.get("value")).and_then(|v| v.as_f64()),
        unit: quantity.and_then(|q| string(q, "unit")),
        date: string(record, "effectiveDateTime"),
    }
}

pub fn normalize_condition(record: &RawRecord) -> ConditionAggregate {
    let (code, display) = fields::coded_value(record);
    ConditionAggregate {
        id: string(record, "id").unwrap_or_default(),
        patient_id: fields::reference_id(record, "subject"),
        code,
        display,
        severity: fields::severity_label(record),
        category: fields::category_label(record),
        onset_date: string(record, "onsetDateTime"),
    }
}

fn string(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_owned)
}
