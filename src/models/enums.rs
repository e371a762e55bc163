use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate a wire-string enum with as_str + std::str::FromStr.
/// Variant order is the declared order, which also drives `Ord`.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    /// The five fixed age buckets. Mutually exclusive and exhaustive over `[0, 120)`.
    AgeGroup {
        Child => "0-18",
        YoungAdult => "19-30",
        Adult => "31-50",
        MiddleAged => "51-70",
        Senior => "70+",
    }
);

impl AgeGroup {
    /// Bucket for an age. Ages outside `[0, 120)` have no bucket.
    pub fn from_age(age: i32) -> Option<Self> {
        if !is_valid_age(age) {
            return None;
        }
        Some(match age {
            0..=18 => Self::Child,
            19..=30 => Self::YoungAdult,
            31..=50 => Self::Adult,
            51..=70 => Self::MiddleAged,
            _ => Self::Senior,
        })
    }
}

pub fn is_valid_age(age: i32) -> bool {
    (0..120).contains(&age)
}

str_enum!(FilterKind {
    Select => "select",
    Multiselect => "multiselect",
    DateRange => "daterange",
    NumberRange => "numberrange",
    Search => "search",
});

str_enum!(ChartType {
    Bar => "bar",
    Line => "line",
    Pie => "pie",
    Area => "area",
    Scatter => "scatter",
    Heatmap => "heatmap",
    Treemap => "treemap",
    Funnel => "funnel",
    Gauge => "gauge",
});

str_enum!(TrendDirection {
    Up => "up",
    Down => "down",
});

str_enum!(
    /// Semantic category of a metric or chart definition. Declared in
    /// classification priority order.
    DefinitionCategory {
        Gender => "gender",
        Age => "age",
        Observation => "observation",
        Condition => "condition",
        Severity => "severity",
        PatientCount => "patient_count",
        AverageAge => "average_age",
        MedianAge => "median_age",
    }
);

str_enum!(
    /// Where a report's data came from.
    DataSource {
        Live => "live",
        Cached => "cached",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_buckets_cover_boundaries() {
        assert_eq!(AgeGroup::from_age(0), Some(AgeGroup::Child));
        assert_eq!(AgeGroup::from_age(18), Some(AgeGroup::Child));
        assert_eq!(AgeGroup::from_age(19), Some(AgeGroup::YoungAdult));
        assert_eq!(AgeGroup::from_age(30), Some(AgeGroup::YoungAdult));
        assert_eq!(AgeGroup::from_age(50), Some(AgeGroup::Adult));
        assert_eq!(AgeGroup::from_age(70), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(71), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(119), Some(AgeGroup::Senior));
    }

    #[test]
    fn out_of_range_age_has_no_bucket() {
        assert_eq!(AgeGroup::from_age(-1), None);
        assert_eq!(AgeGroup::from_age(120), None);
    }

    #[test]
    fn age_group_wire_labels() {
        assert_eq!(serde_json::to_string(&AgeGroup::Senior).unwrap(), "\"70+\"");
        assert_eq!("19-30".parse::<AgeGroup>().unwrap(), AgeGroup::YoungAdult);
        assert!("teen".parse::<AgeGroup>().is_err());
    }

    #[test]
    fn age_groups_sort_youngest_first() {
        let mut groups = vec![AgeGroup::Senior, AgeGroup::Child, AgeGroup::Adult];
        groups.sort();
        assert_eq!(groups, vec![AgeGroup::Child, AgeGroup::Adult, AgeGroup::Senior]);
    }

    #[test]
    fn filter_kind_is_lowercase_on_the_wire() {
        let kind: FilterKind = serde_json::from_str("\"daterange\"").unwrap();
        assert_eq!(kind, FilterKind::DateRange);
        assert_eq!(DefinitionCategory::PatientCount.as_str(), "patient_count");
    }
}
