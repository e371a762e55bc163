use std::time::Duration;

use serde::Serialize;

use crate::registry::ResourceKind;

/// Application-level constants
pub const APP_NAME: &str = "CohortScope";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Public HAPI R4 sandbox, used when `FHIR_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://hapi.fhir.org/baseR4";

/// Label written into `SourceDataset.metadata.dataSource`.
pub const DATA_SOURCE_LABEL: &str = "HAPI FHIR R4";

pub const DEFAULT_CACHE_TTL_MINUTES: u32 = 10;
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const SEARCH_PAGE_SIZE: usize = 50;
pub const SEARCH_TIMEOUT_SECS: u64 = 10;

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,cohortscope=debug"
}

// ═══════════════════════════════════════════════════════════
// Registry configuration
// ═══════════════════════════════════════════════════════════

/// Record cap for one resource kind: the cap used when the caller gives none,
/// and the hard ceiling no request may exceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindLimit {
    pub default: usize,
    pub max: usize,
}

impl KindLimit {
    /// Resolve the cap for a request. `None` and `Some(0)` fall back to the default.
    pub fn effective(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|n| *n > 0)
            .unwrap_or(self.default)
            .min(self.max)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub cache_ttl_minutes: u32,
    pub page_size: usize,
    /// Timeout applied to each page request.
    pub request_timeout: Duration,
    pub search_timeout: Duration,
    pub patients: KindLimit,
    pub observations: KindLimit,
    pub conditions: KindLimit,
    pub data_source_label: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            search_timeout: Duration::from_secs(SEARCH_TIMEOUT_SECS),
            patients: KindLimit { default: 500, max: 1000 },
            observations: KindLimit { default: 1000, max: 2000 },
            conditions: KindLimit { default: 1000, max: 2000 },
            data_source_label: DATA_SOURCE_LABEL.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FHIR_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(ConfigError::Invalid {
                    name: "FHIR_BASE_URL",
                    value: String::new(),
                });
            }
            config.base_url = url.to_string();
        }

        if let Some(v) = positive(&lookup, "CACHE_TTL_MINUTES")? {
            config.cache_ttl_minutes = u32::try_from(v).map_err(|_| ConfigError::Invalid {
                name: "CACHE_TTL_MINUTES",
                value: v.to_string(),
            })?;
        }
        if let Some(v) = positive(&lookup, "PAGE_SIZE")? {
            config.page_size = v as usize;
        }
        if let Some(v) = positive(&lookup, "REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(v);
        }

        let limits = [
            ("DEFAULT_PATIENT_LIMIT", "MAX_PATIENTS", &mut config.patients),
            ("DEFAULT_OBSERVATION_LIMIT", "MAX_OBSERVATIONS", &mut config.observations),
            ("DEFAULT_CONDITION_LIMIT", "MAX_CONDITIONS", &mut config.conditions),
        ];
        for (default_name, max_name, limit) in limits {
            if let Some(v) = positive(&lookup, default_name)? {
                limit.default = v as usize;
            }
            if let Some(v) = positive(&lookup, max_name)? {
                limit.max = v as usize;
            }
        }

        Ok(config)
    }

    pub fn limit_for(&self, kind: ResourceKind) -> KindLimit {
        match kind {
            ResourceKind::Patient => self.patients,
            ResourceKind::Observation => self.observations,
            ResourceKind::Condition => self.conditions,
        }
    }
}

fn positive<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_registry_service() {
        let config = RegistryConfig::default();
        assert_eq!(config.base_url, "https://hapi.fhir.org/baseR4");
        assert_eq!(config.cache_ttl_minutes, 10);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.patients.max, 1000);
        assert_eq!(config.observations.max, 2000);
        assert_eq!(config.conditions.max, 2000);
    }

    #[test]
    fn effective_cap_clamps_to_max() {
        let limit = KindLimit { default: 500, max: 1000 };
        assert_eq!(limit.effective(None), 500);
        assert_eq!(limit.effective(Some(0)), 500);
        assert_eq!(limit.effective(Some(250)), 250);
        assert_eq!(limit.effective(Some(5000)), 1000);
    }

    #[test]
    fn env_overrides_apply() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            ("FHIR_BASE_URL", "http://localhost:8080/fhir/"),
            ("CACHE_TTL_MINUTES", "15"),
            ("MAX_PATIENTS", "50"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/fhir");
        assert_eq!(config.cache_ttl_minutes, 15);
        assert_eq!(config.patients.max, 50);
        assert_eq!(config.patients.default, 500);
        assert_eq!(config.limit_for(ResourceKind::Patient).effective(None), 50);
    }

    #[test]
    fn zero_or_garbage_is_rejected() {
        let err = RegistryConfig::from_lookup(lookup_from(&[("PAGE_SIZE", "0")])).unwrap_err();
        assert!(err.to_string().contains("PAGE_SIZE"));

        let err =
            RegistryConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "REQUEST_TIMEOUT", .. }));
    }

    #[test]
    fn app_name_is_cohortscope() {
        assert_eq!(APP_NAME, "CohortScope");
    }
}
