//! Report data assembly: pick the resource kinds a request needs, fetch them
//! concurrently, and produce both the aggregated payload and the filterable
//! dataset from the same fetch.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::{aggregate_as_of, AggregatedSummary};
use crate::models::{DataSource, SourceDataset};
use crate::normalizer::normalize_as_of;
use crate::registry::{CachedRegistry, RawCollections, ResourceKind};

/// Everything a generated report keeps about its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub aggregated: AggregatedSummary,
    pub source_data: SourceDataset,
    pub data_fetched_at: DateTime<Utc>,
    pub data_source: DataSource,
}

/// Resource kinds mentioned in a request; all of them when none is.
pub fn select_resource_kinds(query: &str) -> Vec<ResourceKind> {
    let lower = query.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let mut kinds = Vec::new();
    if mentions(&["patient"]) {
        kinds.push(ResourceKind::Patient);
    }
    if mentions(&["observation", "vital", "measurement"]) {
        kinds.push(ResourceKind::Observation);
    }
    if mentions(&["condition", "diagnosis"]) {
        kinds.push(ResourceKind::Condition);
    }

    if kinds.is_empty() {
        ResourceKind::ALL.to_vec()
    } else {
        kinds
    }
}

/// Data for a new report.
///
/// With `use_cache` and a previous report, its data is reused as-is and
/// marked cached. Otherwise the kinds selected by `query` are fetched live.
pub async fn load_report_data(
    registry: &CachedRegistry,
    query: &str,
    previous: Option<&ReportData>,
    use_cache: bool,
) -> ReportData {
    if use_cache {
        if let Some(previous) = previous {
            tracing::info!(
                fetched_at = %previous.data_fetched_at,
                "Reusing data from previous report"
            );
            return ReportData {
                data_source: DataSource::Cached,
                ..previous.clone()
            };
        }
        tracing::info!("No previous report data, fetching fresh data");
    }

    let kinds = select_resource_kinds(query);
    let raw = fetch_collections(registry, &kinds).await;
    build_report_data(&raw, &registry.config().data_source_label, Utc::now())
}

/// Fetch the requested kinds concurrently. Unrequested kinds stay `None`.
pub async fn fetch_collections(registry: &CachedRegistry, kinds: &[ResourceKind]) -> RawCollections {
    let wanted = |kind: ResourceKind| kinds.contains(&kind);

    let (patients, observations, conditions) = tokio::join!(
        async {
            if wanted(ResourceKind::Patient) {
                Some(registry.get_patients(None).await)
            } else {
                None
            }
        },
        async {
            if wanted(ResourceKind::Observation) {
                Some(registry.get_observations(None).await)
            } else {
                None
            }
        },
        async {
            if wanted(ResourceKind::Condition) {
                Some(registry.get_conditions(None).await)
            } else {
                None
            }
        },
    );

    RawCollections {
        patients,
        observations,
        conditions,
    }
}

/// Aggregate and normalize against the same instant.
pub fn build_report_data(raw: &RawCollections, data_source_label: &str, now: DateTime<Utc>) -> ReportData {
    let aggregated = aggregate_as_of(raw, now.year());
    let source_data = normalize_as_of(raw, data_source_label, now);

    tracing::info!(
        patients = source_data.patients().len(),
        observations = source_data.observations().len(),
        conditions = source_data.conditions().len(),
        "Report data assembled"
    );

    ReportData {
        aggregated,
        source_data,
        data_fetched_at: now,
        data_source: DataSource::Live,
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::MockRegistry;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn kinds_follow_keywords() {
        use ResourceKind::*;
        assert_eq!(select_resource_kinds("Patient age breakdown"), vec![Patient]);
        assert_eq!(select_resource_kinds("latest vitals"), vec![Observation]);
        assert_eq!(select_resource_kinds("Top diagnosis codes"), vec![Condition]);
        assert_eq!(
            select_resource_kinds("patients with conditions and measurements"),
            vec![Patient, Observation, Condition]
        );
        assert_eq!(select_resource_kinds("summarize the registry"), ResourceKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn live_fetch_only_requests_selected_kinds() {
        let mock = MockRegistry::builder()
            .records(
                "Patient",
                vec![
                    json!({"resourceType": "Patient", "id": "p1", "gender": "female", "birthDate": "1980-01-01"}),
                    json!({"resourceType": "Patient", "id": "p2", "gender": "male"}),
                ],
            )
            .start()
            .await;
        let registry = CachedRegistry::new(mock.config()).unwrap();

        let data = load_report_data(&registry, "patient demographics", None, false).await;

        assert_eq!(data.data_source, DataSource::Live);
        assert_eq!(data.aggregated.patients.as_ref().unwrap().total_count, 2);
        assert!(data.aggregated.observations.is_none());
        assert!(data.source_data.observations.is_none());
        assert_eq!(data.source_data.metadata.as_ref().unwrap().patient_count, 2);
        assert!(mock.requests().iter().all(|r| r.resource == "Patient"));
    }

    #[tokio::test]
    async fn unspecific_query_fetches_everything() {
        let mock = MockRegistry::builder().synthetic(30).start().await;
        let registry = CachedRegistry::new(mock.config()).unwrap();

        let data = load_report_data(&registry, "give me an overview", None, false).await;

        assert_eq!(data.source_data.patients().len(), 30);
        assert_eq!(data.source_data.observations().len(), 30);
        assert_eq!(data.source_data.conditions().len(), 30);
        assert_eq!(data.aggregated.conditions.unwrap().total_count, 30);
    }

    #[tokio::test]
    async fn cached_reuse_skips_the_registry() {
        let mock = MockRegistry::builder().synthetic(10).start().await;
        let registry = CachedRegistry::new(mock.config()).unwrap();
        let fetched_at = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        let previous = build_report_data(&RawCollections::default(), "HAPI FHIR R4", fetched_at);

        let data = load_report_data(&registry, "patients", Some(&previous), true).await;

        assert_eq!(data.data_source, DataSource::Cached);
        assert_eq!(data.data_fetched_at, fetched_at);
        assert_eq!(data.source_data, previous.source_data);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn use_cache_without_previous_goes_live() {
        let mock = MockRegistry::builder().synthetic(5).start().await;
        let registry = CachedRegistry::new(mock.config()).unwrap();

        let data = load_report_data(&registry, "conditions", None, true).await;

        assert_eq!(data.data_source, DataSource::Live);
        assert_eq!(data.source_data.conditions().len(), 5);
    }

    #[test]
    fn aggregate_and_dataset_share_one_instant() {
        let now = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        let raw = RawCollections {
            patients: Some(vec![json!({"id": "p", "birthDate": "2000-07-01"})]),
            ..RawCollections::default()
        };

        let data = build_report_data(&raw, "HAPI FHIR R4", now);

        assert_eq!(data.source_data.patients()[0].age, Some(26));
        assert_eq!(
            data.source_data.demographics.as_ref(),
            Some(&data.aggregated.patients.as_ref().unwrap().demographics)
        );
        assert_eq!(data.data_fetched_at, now);
    }
}
