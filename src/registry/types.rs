use serde::{Deserialize, Serialize};

/// A raw registry resource. Opaque: the engine only reads specific fields,
/// and every read tolerates their absence.
pub type RawRecord = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Patient,
    Observation,
    Condition,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Patient, Self::Observation, Self::Condition];

    /// Path segment on the registry (`<base>/<ResourceType>`).
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Observation => "Observation",
            Self::Condition => "Condition",
        }
    }

    /// Key used for this kind in payloads and cache keys.
    pub fn collection_key(&self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::Observation => "observations",
            Self::Condition => "conditions",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.resource_type())
    }
}

/// Raw fetch results, one optional collection per resource kind.
/// `None` means the kind was not requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCollections {
    pub patients: Option<Vec<RawRecord>>,
    pub observations: Option<Vec<RawRecord>>,
    pub conditions: Option<Vec<RawRecord>>,
}

// ═══════════════════════════════════════════════════════════
// Search bundle wire format
// ═══════════════════════════════════════════════════════════

/// One page of search results.
#[derive(Debug, Default, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
    #[serde(default)]
    pub link: Vec<BundleLink>,
}

#[derive(Debug, Deserialize)]
pub struct BundleEntry {
    #[serde(default)]
    pub resource: Option<RawRecord>,
}

#[derive(Debug, Deserialize)]
pub struct BundleLink {
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub url: String,
}

impl Bundle {
    /// URL of the next page, taken verbatim from `link[relation=next]`.
    pub fn next_url(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == "next" && !l.url.is_empty())
            .map(|l| l.url.as_str())
    }

    /// Resources carried by this page. Entries without a resource are skipped.
    pub fn into_resources(self) -> Vec<RawRecord> {
        self.entry.into_iter().filter_map(|e| e.resource).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundle_next_link_and_resources() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resourceType": "Bundle",
            "link": [
                {"relation": "self", "url": "http://r/Patient?_count=2"},
                {"relation": "next", "url": "http://r?_getpages=abc&_getpagesoffset=2"}
            ],
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "a"}},
                {"fullUrl": "http://r/Patient/b"},
                {"resource": {"resourceType": "Patient", "id": "c"}}
            ]
        }))
        .unwrap();

        assert_eq!(bundle.next_url(), Some("http://r?_getpages=abc&_getpagesoffset=2"));
        let resources = bundle.into_resources();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[1]["id"], "c");
    }

    #[test]
    fn empty_bundle_has_no_next() {
        let bundle: Bundle = serde_json::from_value(json!({"resourceType": "Bundle", "total": 0})).unwrap();
        assert!(bundle.next_url().is_none());
        assert!(bundle.into_resources().is_empty());
    }

    #[test]
    fn kind_names() {
        assert_eq!(ResourceKind::Observation.resource_type(), "Observation");
        assert_eq!(ResourceKind::Condition.collection_key(), "conditions");
        assert_eq!(ResourceKind::Patient.to_string(), "Patient");
    }
}
