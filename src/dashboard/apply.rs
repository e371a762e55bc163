use std::collections::HashSet;

use crate::aggregation::summarize_demographics;
use crate::models::{FilterSet, FilterValue, SourceDataset};

use super::field::{condition_matches, observation_matches, patient_matches, FilterField};

/// Filters resolved to known fields, inactive ones dropped.
struct ActiveFilters<'a> {
    patient: Vec<(FilterField, &'a [FilterValue])>,
    entity: Vec<(FilterField, &'a [FilterValue])>,
}

impl<'a> ActiveFilters<'a> {
    fn resolve(filters: &'a FilterSet) -> Self {
        let mut active = Self {
            patient: Vec::new(),
            entity: Vec::new(),
        };
        for (name, values) in filters.iter() {
            if values.is_empty() {
                continue;
            }
            let Some(field) = FilterField::parse(name) else {
                tracing::debug!(field = name, "Ignoring filter on unrecognised field");
                continue;
            };
            if field.is_patient_field() {
                active.patient.push((field, values));
            } else {
                active.entity.push((field, values));
            }
        }
        active
    }

    fn is_empty(&self) -> bool {
        self.patient.is_empty() && self.entity.is_empty()
    }
}

/// Evaluate a record against every applicable filter: any value within a
/// field, all fields together. Fields the record does not have are skipped.
fn passes<T>(
    record: &T,
    filters: &[(FilterField, &[FilterValue])],
    matches: impl Fn(&T, FilterField, &FilterValue) -> Option<bool>,
) -> bool {
    filters.iter().all(|(field, values)| {
        let mut applicable = false;
        for value in values.iter() {
            match matches(record, *field, value) {
                Some(true) => return true,
                Some(false) => applicable = true,
                None => {}
            }
        }
        !applicable
    })
}

/// Apply a combined filter set, producing a new dataset.
///
/// Patient fields select the patients, and their ids then restrict
/// observations and conditions. Entity fields (category, severity, code,
/// display, date) restrict the entities that carry them. Demographics are
/// recomputed over the remaining patients; metadata counts follow the arrays.
pub fn apply_filters(dataset: &SourceDataset, filters: &FilterSet) -> SourceDataset {
    let active = ActiveFilters::resolve(filters);
    if active.is_empty() {
        return dataset.clone();
    }

    let patients = dataset.patients.as_ref().map(|patients| {
        patients
            .iter()
            .filter(|p| passes(*p, &active.patient, patient_matches))
            .cloned()
            .collect::<Vec<_>>()
    });

    // No patients loaded but a patient filter active: nobody qualifies.
    let patient_ids: Option<HashSet<&str>> = if active.patient.is_empty() {
        None
    } else {
        Some(
            patients
                .iter()
                .flatten()
                .map(|p| p.id.as_str())
                .collect(),
        )
    };
    let linked = |patient_id: Option<&str>| match &patient_ids {
        Some(ids) => patient_id.is_some_and(|id| ids.contains(id)),
        None => true,
    };

    let observations = dataset.observations.as_ref().map(|observations| {
        observations
            .iter()
            .filter(|o| linked(o.patient_id.as_deref()))
            .filter(|o| passes(*o, &active.entity, observation_matches))
            .cloned()
            .collect::<Vec<_>>()
    });
    let conditions = dataset.conditions.as_ref().map(|conditions| {
        conditions
            .iter()
            .filter(|c| linked(c.patient_id.as_deref()))
            .filter(|c| passes(*c, &active.entity, condition_matches))
            .cloned()
            .collect::<Vec<_>>()
    });

    let demographics = patients.as_deref().map(summarize_demographics);

    let mut filtered = SourceDataset {
        patients,
        observations,
        conditions,
        demographics,
        metadata: dataset.metadata.clone(),
    };
    filtered.sync_metadata_counts();

    tracing::debug!(
        patients = filtered.patients().len(),
        observations = filtered.observations().len(),
        conditions = filtered.conditions().len(),
        "Filters applied"
    );
    filtered
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
