//! Aggregation Engine: reduces raw registry collections to population
//! statistics plus a small sample of each kind.
//!
//! - Patients: gender histogram, five-bucket age distribution, mean/median age
//! - Observations: category histogram, ten most common tests
//! - Conditions: fifteen most common conditions, severity histogram
//!
//! Pure functions; the only clock read is the current year in `aggregate`.

pub mod demographics;
pub mod fields;
pub mod top_k;
pub mod types;

pub use demographics::summarize_demographics;
pub use top_k::{histogram, top_codes, CodeCount};
pub use types::*;

use chrono::{Datelike, Utc};

use crate::models::PatientAggregate;
use crate::registry::{RawCollections, RawRecord};

/// Raw records carried along with each summary.
pub const SAMPLE_SIZE: usize = 5;
pub const TOP_TESTS: usize = 10;
pub const TOP_CONDITIONS: usize = 15;
/// Label for an absent gender, category or severity.
pub const UNKNOWN: &str = "unknown";

pub fn aggregate(raw: &RawCollections) -> AggregatedSummary {
    aggregate_as_of(raw, Utc::now().year())
}

/// Aggregate with ages computed against `current_year`.
pub fn aggregate_as_of(raw: &RawCollections, current_year: i32) -> AggregatedSummary {
    AggregatedSummary {
        patients: raw
            .patients
            .as_deref()
            .map(|p| summarize_patients(p, current_year)),
        observations: raw.observations.as_deref().map(summarize_observations),
        conditions: raw.conditions.as_deref().map(summarize_conditions),
    }
}

pub fn summarize_patients(records: &[RawRecord], current_year: i32) -> PatientSummary {
    let patients: Vec<PatientAggregate> = records
        .iter()
        .map(|r| fields::to_patient(r, current_year))
        .collect();

    PatientSummary {
        total_count: records.len(),
        demographics: summarize_demographics(&patients),
        sample_records: sample(records),
    }
}

pub fn summarize_observations(records: &[RawRecord]) -> ObservationSummary {
    ObservationSummary {
        total_count: records.len(),
        by_category: histogram(records.iter().map(|r| label_or_unknown(fields::category_label(r)))),
        common_tests: top_codes(records.iter().map(fields::coded_value), TOP_TESTS),
        sample_records: sample(records),
    }
}

pub fn summarize_conditions(records: &[RawRecord]) -> ConditionSummary {
    ConditionSummary {
        total_count: records.len(),
        top_conditions: top_codes(records.iter().map(fields::coded_value), TOP_CONDITIONS),
        severity_distribution: histogram(
            records
                .iter()
                .map(|r| label_or_unknown(fields::severity_label(r))),
        ),
        sample_records: sample(records),
    }
}

fn label_or_unknown(label: Option<String>) -> String {
    label
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn sample(records: &[RawRecord]) -> Vec<RawRecord> {
    records.iter().take(SAMPLE_SIZE).cloned().collect()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
