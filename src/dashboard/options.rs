use std::collections::HashMap;

use serde_json::json;

use crate::models::{AgeGroup, FilterDefinition, FilterKind, FilterOption, SourceDataset};

use super::field::{or_unknown, FilterField};

/// Options for a select-style filter, counted over `dataset`.
///
/// Age groups list all five buckets in order; other fields list their
/// distinct values, most frequent first, with missing gender, category and
/// severity counted as `"unknown"`. Range, search and unrecognised
/// filters keep their declared options.
pub fn filter_options(dataset: &SourceDataset, definition: &FilterDefinition) -> Vec<FilterOption> {
    let declared = || definition.options.clone().unwrap_or_default();
    if !matches!(definition.kind, FilterKind::Select | FilterKind::Multiselect) {
        return declared();
    }
    let Some(field) = FilterField::parse(&definition.field) else {
        return declared();
    };

    let labels: Vec<Option<&str>> = match field {
        FilterField::Gender => dataset
            .patients()
            .iter()
            .map(|p| or_unknown(&p.gender))
            .collect(),
        FilterField::AgeGroup => {
            return AgeGroup::ALL
                .iter()
                .map(|group| FilterOption {
                    label: group.as_str().to_string(),
                    value: json!(group.as_str()),
                    count: Some(
                        dataset
                            .patients()
                            .iter()
                            .filter(|p| p.age_group == Some(*group))
                            .count(),
                    ),
                })
                .collect();
        }
        FilterField::Category => dataset
            .observations()
            .iter()
            .map(|o| or_unknown(&o.category))
            .chain(dataset.conditions().iter().map(|c| or_unknown(&c.category)))
            .collect(),
        FilterField::Severity => dataset
            .conditions()
            .iter()
            .map(|c| or_unknown(&c.severity))
            .collect(),
        FilterField::Code => dataset
            .observations()
            .iter()
            .map(|o| o.code.as_deref())
            .chain(dataset.conditions().iter().map(|c| c.code.as_deref()))
            .collect(),
        FilterField::Display => dataset
            .observations()
            .iter()
            .map(|o| o.display.as_deref())
            .chain(dataset.conditions().iter().map(|c| c.display.as_deref()))
            .collect(),
        FilterField::Age | FilterField::Date => return declared(),
    };

    counted_options(labels.into_iter().flatten())
}

fn counted_options<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<FilterOption> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    counts
        .into_iter()
        .map(|(label, count)| FilterOption {
            label: label.to_string(),
            value: json!(label),
            count: Some(count),
        })
        .collect()
}
