use serde_json::{json, Value};

use crate::aggregation::demographics::round1;
use crate::aggregation::{histogram, summarize_demographics, top_codes, TOP_CONDITIONS, TOP_TESTS, UNKNOWN};
use crate::models::{
    ChartDataPoint, ChartDefinition, DashboardDefinitions, DefinitionCategory, DemographicSummary,
    MetricDefinition, SourceDataset,
};

use super::classify::{classify_chart, classify_metric};

/// Shown for an age metric when no patient has a resolvable age.
pub const NOT_AVAILABLE: &str = "N/A";

/// Re-derive every recognised chart and metric from a filtered dataset.
/// Unrecognised definitions come back unchanged.
pub fn recalculate(filtered: &SourceDataset, definitions: &DashboardDefinitions) -> DashboardDefinitions {
    DashboardDefinitions {
        metrics: recalculate_metrics(filtered, &definitions.metrics),
        charts: recalculate_charts(filtered, &definitions.charts),
    }
}

pub fn recalculate_charts(filtered: &SourceDataset, charts: &[ChartDefinition]) -> Vec<ChartDefinition> {
    let demographics = demographics_of(filtered);
    charts
        .iter()
        .map(|chart| match classify_chart(chart) {
            Some(category) => ChartDefinition {
                data: chart_data(category, filtered, &demographics),
                ..chart.clone()
            },
            None => chart.clone(),
        })
        .collect()
}

pub fn recalculate_metrics(filtered: &SourceDataset, metrics: &[MetricDefinition]) -> Vec<MetricDefinition> {
    let demographics = demographics_of(filtered);
    metrics
        .iter()
        .map(|metric| match classify_metric(metric) {
            Some(category) => MetricDefinition {
                value: metric_value(category, filtered, &demographics),
                // A trend computed on the full population no longer holds.
                trend: None,
                ..metric.clone()
            },
            None => metric.clone(),
        })
        .collect()
}

fn demographics_of(dataset: &SourceDataset) -> DemographicSummary {
    dataset
        .demographics
        .clone()
        .unwrap_or_else(|| summarize_demographics(dataset.patients()))
}

fn chart_data(
    category: DefinitionCategory,
    filtered: &SourceDataset,
    demographics: &DemographicSummary,
) -> Vec<ChartDataPoint> {
    let counts: Vec<(String, usize)> = match category {
        DefinitionCategory::Gender => demographics
            .gender_distribution
            .iter()
            .map(|(g, n)| (g.clone(), *n))
            .collect(),
        DefinitionCategory::Age => demographics
            .age_groups
            .iter()
            .map(|(g, n)| (g.as_str().to_string(), *n))
            .collect(),
        DefinitionCategory::Observation => top_codes(
            filtered.observations().iter().map(|o| (o.code.clone(), o.display.clone())),
            TOP_TESTS,
        )
        .into_iter()
        .map(|c| (c.display.unwrap_or(c.code), c.count))
        .collect(),
        DefinitionCategory::Condition => top_codes(
            filtered.conditions().iter().map(|c| (c.code.clone(), c.display.clone())),
            TOP_CONDITIONS,
        )
        .into_iter()
        .map(|c| (c.display.unwrap_or(c.code), c.count))
        .collect(),
        DefinitionCategory::Severity => histogram(
            filtered
                .conditions()
                .iter()
                .map(|c| c.severity.clone().unwrap_or_else(|| UNKNOWN.to_string())),
        )
        .into_iter()
        .collect(),
        // Metric-only categories never reach here.
        DefinitionCategory::PatientCount
        | DefinitionCategory::AverageAge
        | DefinitionCategory::MedianAge => Vec::new(),
    };
    to_points(counts)
}

/// Data points with percentages of the total, rounded to one decimal.
fn to_points(counts: Vec<(String, usize)>) -> Vec<ChartDataPoint> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    counts
        .into_iter()
        .map(|(name, n)| ChartDataPoint {
            name,
            value: n as f64,
            percentage: Some(if total == 0 {
                0.0
            } else {
                round1(n as f64 * 100.0 / total as f64)
            }),
        })
        .collect()
}

fn metric_value(
    category: DefinitionCategory,
    filtered: &SourceDataset,
    demographics: &DemographicSummary,
) -> Value {
    match category {
        DefinitionCategory::PatientCount => json!(demographics.total_patients),
        DefinitionCategory::Observation => json!(filtered.observations().len()),
        DefinitionCategory::Condition => json!(filtered.conditions().len()),
        DefinitionCategory::AverageAge => demographics
            .average_age
            .map_or_else(|| json!(NOT_AVAILABLE), |a| json!(a)),
        DefinitionCategory::MedianAge => demographics
            .median_age
            .map_or_else(|| json!(NOT_AVAILABLE), |a| json!(a)),
        // Chart-only categories never reach here.
        DefinitionCategory::Gender | DefinitionCategory::Age | DefinitionCategory::Severity => {
            Value::Null
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
