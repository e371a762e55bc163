//! Small normalized population shared by the dashboard tests.

use crate::aggregation::summarize_demographics;
use crate::models::{
    AgeGroup, ConditionAggregate, DatasetMetadata, ObservationAggregate, PatientAggregate,
    SourceDataset,
};

fn patient(id: &str, gender: Option<&str>, age: Option<i32>) -> PatientAggregate {
    PatientAggregate {
        id: id.to_string(),
        gender: gender.map(str::to_owned),
        age,
        age_group: age.and_then(AgeGroup::from_age),
        birth_date: age.map(|a| format!("{}-01-01", 2026 - a)),
    }
}

fn observation(
    id: &str,
    patient: Option<&str>,
    category: Option<&str>,
    code: &str,
    display: &str,
    date: Option<&str>,
) -> ObservationAggregate {
    ObservationAggregate {
        id: id.to_string(),
        patient_id: patient.map(str::to_owned),
        category: category.map(str::to_owned),
        code: Some(code.to_string()),
        display: Some(display.to_string()),
        value: Some(1.0),
        unit: None,
        date: date.map(str::to_owned),
    }
}

fn condition(
    id: &str,
    patient: &str,
    display: &str,
    severity: Option<&str>,
    onset: Option<&str>,
) -> ConditionAggregate {
    ConditionAggregate {
        id: id.to_string(),
        patient_id: Some(patient.to_string()),
        code: Some(display.to_lowercase()),
        display: Some(display.to_string()),
        severity: severity.map(str::to_owned),
        category: Some("problem-list-item".to_string()),
        onset_date: onset.map(str::to_owned),
    }
}

/// Five patients, six observations, four conditions.
pub(crate) fn dataset() -> SourceDataset {
    let patients = vec![
        patient("p1", Some("female"), Some(40)),
        patient("p2", Some("male"), Some(10)),
        patient("p3", Some("female"), Some(25)),
        patient("p4", Some("male"), Some(75)),
        patient("p5", None, None),
    ];
    let observations = vec![
        observation("o1", Some("p1"), Some("Vital Signs"), "8867-4", "Heart rate", Some("2025-03-01")),
        observation("o2", Some("p1"), Some("Laboratory"), "2339-0", "Glucose", Some("2024-06-10")),
        observation("o3", Some("p3"), Some("Vital Signs"), "8867-4", "Heart rate", None),
        observation("o4", Some("p2"), Some("Laboratory"), "718-7", "Hemoglobin", Some("2025-07-04T10:00:00Z")),
        observation("o5", Some("p4"), Some("Vital Signs"), "8867-4", "Heart rate", Some("2023-01-01")),
        observation("o6", None, None, "29463-7", "Body weight", None),
    ];
    let conditions = vec![
        condition("c1", "p1", "Hypertension", Some("Moderate"), Some("2025-02-01")),
        condition("c2", "p2", "Asthma", Some("Severe"), Some("2019-05-05")),
        condition("c3", "p4", "Diabetes", Some("Mild"), None),
        condition("c4", "p4", "Hypertension", None, Some("2024-12-31T23:00:00Z")),
    ];

    let mut dataset = SourceDataset {
        demographics: Some(summarize_demographics(&patients)),
        patients: Some(patients),
        observations: Some(observations),
        conditions: Some(conditions),
        metadata: Some(DatasetMetadata {
            patient_count: 0,
            observation_count: 0,
            condition_count: 0,
            generated_at: "2026-03-01T12:00:00.000Z".to_string(),
            data_source: "HAPI FHIR R4".to_string(),
        }),
    };
    dataset.sync_metadata_counts();
    dataset
}
