use crate::models::{CrossFilterEntry, FilterSet};

/// Merge manual filters with cross-filters.
///
/// Manual filters are taken as-is. Each cross-filter's values (flattened)
/// are appended to its field unless already present. Equal inputs always
/// give equal output.
pub fn combine(manual: &FilterSet, cross_filters: &[CrossFilterEntry]) -> FilterSet {
    let mut combined = manual.clone();
    for entry in cross_filters {
        for value in entry.filter_value.values() {
            combined.push_unique(&entry.filter_field, value.clone());
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CrossFilterValue, FilterValue};
    use chrono::{TimeZone, Utc};

    fn entry(source: &str, field: &str, value: CrossFilterValue) -> CrossFilterEntry {
        CrossFilterEntry {
            source_visualization_id: source.to_string(),
            filter_field: field.to_string(),
            filter_value: value,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
        }
    }

    fn manual() -> FilterSet {
        let mut set = FilterSet::new();
        set.set("gender", vec![FilterValue::text("female")]);
        set
    }

    #[test]
    fn no_cross_filters_is_manual() {
        assert_eq!(combine(&manual(), &[]), manual());
    }

    #[test]
    fn cross_filter_values_are_appended_and_flattened() {
        let cross = vec![
            entry("age-chart", "ageGroup", FilterValue::text("19-30").into()),
            entry(
                "gender-chart",
                "gender",
                CrossFilterValue::Many(vec![FilterValue::text("male"), FilterValue::text("female")]),
            ),
        ];

        let combined = combine(&manual(), &cross);

        assert_eq!(combined.get("ageGroup"), &[FilterValue::text("19-30")]);
        assert_eq!(
            combined.get("gender"),
            &[FilterValue::text("female"), FilterValue::text("male")]
        );
    }

    #[test]
    fn same_value_from_two_sources_appears_once() {
        let cross = vec![
            entry("a", "severity", FilterValue::text("Severe").into()),
            entry("b", "severity", FilterValue::text("Severe").into()),
        ];

        assert_eq!(combine(&FilterSet::new(), &cross).get("severity").len(), 1);
    }

    #[test]
    fn equal_inputs_equal_outputs() {
        let cross = vec![entry("a", "category", FilterValue::text("Laboratory").into())];
        assert_eq!(combine(&manual(), &cross), combine(&manual(), &cross));
    }
}
