use crate::models::{ChartDefinition, DefinitionCategory, MetricDefinition};

/// Whether a definition is a chart or a metric card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Chart,
    Metric,
}

pub struct CategoryRule {
    pub category: DefinitionCategory,
    pub keywords: &'static [&'static str],
    pub charts: bool,
    pub metrics: bool,
}

impl CategoryRule {
    pub fn supports(&self, kind: DefinitionKind) -> bool {
        match kind {
            DefinitionKind::Chart => self.charts,
            DefinitionKind::Metric => self.metrics,
        }
    }
}

/// Classification order: the first rule whose keyword appears in the
/// definition's id or label wins.
pub static CATEGORY_RULES: [CategoryRule; 8] = [
    CategoryRule {
        category: DefinitionCategory::Gender,
        keywords: &["gender", "sex"],
        charts: true,
        metrics: false,
    },
    CategoryRule {
        category: DefinitionCategory::Age,
        keywords: &["age"],
        charts: true,
        metrics: false,
    },
    CategoryRule {
        category: DefinitionCategory::Observation,
        keywords: &["observation", "test"],
        charts: true,
        metrics: true,
    },
    CategoryRule {
        category: DefinitionCategory::Condition,
        keywords: &["condition", "diagnos"],
        charts: true,
        metrics: true,
    },
    CategoryRule {
        category: DefinitionCategory::Severity,
        keywords: &["severity"],
        charts: true,
        metrics: false,
    },
    CategoryRule {
        category: DefinitionCategory::PatientCount,
        keywords: &["patient", "cohort"],
        charts: false,
        metrics: true,
    },
    CategoryRule {
        category: DefinitionCategory::AverageAge,
        keywords: &["average age", "avg age", "mean age"],
        charts: false,
        metrics: true,
    },
    CategoryRule {
        category: DefinitionCategory::MedianAge,
        keywords: &["median age"],
        charts: false,
        metrics: true,
    },
];

pub fn rule_for(category: DefinitionCategory) -> &'static CategoryRule {
    // CATEGORY_RULES holds one rule per variant, in variant order.
    &CATEGORY_RULES[category as usize]
}

/// Infer a category from an id and label by case-insensitive substring
/// match, skipping categories that cannot regenerate `kind`.
///
/// Known false positives: "age" inside "percentage" or "average", "test"
/// inside "latest". Tag the definition explicitly to avoid them.
pub fn classify_label(kind: DefinitionKind, id: &str, label: &str) -> Option<DefinitionCategory> {
    let haystack = format!("{} {}", id.to_lowercase(), label.to_lowercase());
    CATEGORY_RULES
        .iter()
        .filter(|rule| rule.supports(kind))
        .find(|rule| rule.keywords.iter().any(|k| haystack.contains(k)))
        .map(|rule| rule.category)
}

/// An explicit tag wins when it fits the kind; otherwise fall back to the label.
fn resolve(
    kind: DefinitionKind,
    tag: Option<DefinitionCategory>,
    id: &str,
    label: &str,
) -> Option<DefinitionCategory> {
    match tag {
        Some(category) if rule_for(category).supports(kind) => Some(category),
        Some(category) => {
            tracing::debug!(id, category = %category, ?kind, "Category tag does not apply to definition kind");
            None
        }
        None => classify_label(kind, id, label),
    }
}

pub fn classify_chart(chart: &ChartDefinition) -> Option<DefinitionCategory> {
    resolve(DefinitionKind::Chart, chart.category, &chart.id, &chart.title)
}

pub fn classify_metric(metric: &MetricDefinition) -> Option<DefinitionCategory> {
    resolve(DefinitionKind::Metric, metric.category, &metric.id, &metric.label)
}
