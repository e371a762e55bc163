use crate::models::{is_valid_age, AgeGroup, DemographicSummary, PatientAggregate};

use super::UNKNOWN;

/// Demographic summary over a patient list.
///
/// The one algorithm behind both the aggregated payload and the normalized
/// dataset, so the two agree exactly for the same patients. Buckets are
/// derived from `age`; patients without a valid age count towards
/// `total_patients` and the gender histogram only.
pub fn summarize_demographics(patients: &[PatientAggregate]) -> DemographicSummary {
    let mut summary = DemographicSummary::empty();
    summary.total_patients = patients.len();

    let mut ages: Vec<i32> = Vec::new();
    for patient in patients {
        let gender = patient.gender.as_deref().unwrap_or(UNKNOWN);
        *summary
            .gender_distribution
            .entry(gender.to_string())
            .or_insert(0) += 1;

        let Some(age) = patient.age.filter(|a| is_valid_age(*a)) else {
            continue;
        };
        if let Some(group) = AgeGroup::from_age(age) {
            *summary.age_groups.entry(group).or_insert(0) += 1;
        }
        ages.push(age);
    }

    summary.average_age = mean(&ages);
    summary.median_age = lower_median(&mut ages);
    summary
}

/// Mean rounded to one decimal place. `None` for no input.
fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    Some(round1(sum as f64 / values.len() as f64))
}

/// Middle element after sorting; the lower of the two middles for even counts.
fn lower_median(values: &mut [i32]) -> Option<i32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    Some(values[(values.len() - 1) / 2])
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str, gender: Option<&str>, age: Option<i32>) -> PatientAggregate {
        PatientAggregate {
            id: id.to_string(),
            gender: gender.map(str::to_owned),
            age,
            age_group: age.and_then(AgeGroup::from_age),
            birth_date: None,
        }
    }

    #[test]
    fn one_patient_per_bucket() {
        let patients: Vec<_> = [10, 25, 40, 65, 80]
            .iter()
            .enumerate()
            .map(|(i, age)| patient(&format!("p{i}"), Some("female"), Some(*age)))
            .collect();

        let summary = summarize_demographics(&patients);

        assert!(summary.age_groups.values().all(|n| *n == 1));
        assert_eq!(summary.average_age, Some(44.0));
        assert_eq!(summary.median_age, Some(40));
        assert_eq!(summary.gender_distribution.get("female"), Some(&5));
    }

    #[test]
    fn bucket_total_matches_valid_ages() {
        let patients = vec![
            patient("a", Some("male"), Some(30)),
            patient("b", None, None),
            patient("c", Some("female"), Some(150)),
            patient("d", Some("female"), Some(0)),
        ];

        let summary = summarize_demographics(&patients);

        assert_eq!(summary.total_patients, 4);
        assert_eq!(summary.age_groups.values().sum::<usize>(), 2);
        assert_eq!(summary.gender_distribution.get("unknown"), Some(&1));
        assert_eq!(summary.median_age, Some(0));
    }

    #[test]
    fn even_count_takes_lower_middle() {
        let patients: Vec<_> = [20, 60, 30, 50]
            .iter()
            .map(|age| patient("p", None, Some(*age)))
            .collect();

        let summary = summarize_demographics(&patients);

        assert_eq!(summary.median_age, Some(30));
        assert_eq!(summary.average_age, Some(40.0));
    }

    #[test]
    fn mean_rounds_to_one_decimal() {
        let patients: Vec<_> = [20, 21, 21]
            .iter()
            .map(|age| patient("p", None, Some(*age)))
            .collect();
        assert_eq!(summarize_demographics(&patients).average_age, Some(20.7));
    }

    #[test]
    fn empty_population_is_zero_state() {
        let summary = summarize_demographics(&[]);
        assert_eq!(summary, DemographicSummary::empty());
        assert!(summary.average_age.is_none());
    }
}
