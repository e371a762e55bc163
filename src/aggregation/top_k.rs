use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A distinct code with its frequency and first-seen display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCount {
    pub code: String,
    pub count: usize,
    pub display: Option<String>,
}

/// The `k` most frequent codes, most frequent first.
///
/// Ties keep first-seen order, so the same input always yields the same
/// list. Items without a code (or with an empty one) are skipped.
pub fn top_codes<I>(items: I, k: usize) -> Vec<CodeCount>
where
    I: IntoIterator<Item = (Option<String>, Option<String>)>,
{
    let mut counts: Vec<CodeCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (code, display) in items {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            continue;
        };
        match index.get(&code) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(code.clone(), counts.len());
                counts.push(CodeCount {
                    code,
                    count: 1,
                    display,
                });
            }
        }
    }

    // Stable: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(k);
    counts
}

/// Frequency of each label.
pub fn histogram<I>(labels: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = String>,
{
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
