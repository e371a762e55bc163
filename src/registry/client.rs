use std::time::Duration;

use crate::config::{RegistryConfig, SEARCH_PAGE_SIZE};

use super::types::{Bundle, RawRecord, ResourceKind};
use super::RegistryError;

/// HTTP client for the remote clinical registry.
pub struct RegistryClient {
    base_url: String,
    client: reqwest::Client,
    page_size: usize,
    request_timeout: Duration,
    search_timeout: Duration,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RegistryError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            page_size: config.page_size,
            request_timeout: config.request_timeout,
            search_timeout: config.search_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        format!("{}/{}", self.base_url, kind.resource_type())
    }

    /// Fetch up to `cap` records of `kind`, following next-page links.
    ///
    /// Stops when the cap is reached, a page is empty, or no next link is
    /// present. A failure mid-pagination ends the walk and returns what has
    /// been accumulated so far. The result never exceeds `cap`.
    pub async fn fetch_paginated(
        &self,
        kind: ResourceKind,
        params: &[(String, String)],
        cap: usize,
    ) -> Vec<RawRecord> {
        let mut results: Vec<RawRecord> = Vec::new();
        let mut next_url = Some(self.collection_url(kind));
        let mut first_page = true;

        while let Some(url) = next_url.take() {
            if results.len() >= cap {
                break;
            }

            // Search parameters go on the first request only; next links
            // already carry the registry's own paging state.
            let page = if first_page {
                let mut query: Vec<(String, String)> = params.to_vec();
                query.push(("_count".to_string(), self.page_size.to_string()));
                self.get_bundle(&url, &query, self.request_timeout).await
            } else {
                self.get_bundle(&url, &[], self.request_timeout).await
            };
            first_page = false;

            let bundle = match page {
                Ok(bundle) => bundle,
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        fetched = results.len(),
                        error = %e,
                        "Pagination stopped early, keeping partial results"
                    );
                    break;
                }
            };

            next_url = bundle.next_url().map(str::to_owned);
            let resources = bundle.into_resources();
            if resources.is_empty() {
                break;
            }
            results.extend(resources);
        }

        tracing::info!(
            kind = %kind,
            fetched = results.len(),
            cap,
            "Registry fetch complete"
        );

        results.truncate(cap);
        results
    }

    /// Single-page search. Any failure yields an empty list.
    pub async fn search(&self, kind: ResourceKind, params: &[(String, String)]) -> Vec<RawRecord> {
        let mut query: Vec<(String, String)> = params
            .iter()
            .filter(|(k, _)| k != "_count")
            .cloned()
            .collect();
        query.push(("_count".to_string(), SEARCH_PAGE_SIZE.to_string()));

        match self
            .get_bundle(&self.collection_url(kind), &query, self.search_timeout)
            .await
        {
            Ok(bundle) => bundle.into_resources(),
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Registry search failed");
                Vec::new()
            }
        }
    }

    async fn get_bundle(
        &self,
        url: &str,
        query: &[(String, String)],
        timeout: Duration,
    ) -> Result<Bundle, RegistryError> {
        let mut request = self.client.get(url).timeout(timeout);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout(timeout.as_secs())
            } else if e.is_connect() {
                RegistryError::Connection(self.base_url.clone())
            } else {
                RegistryError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Bundle>().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout(timeout.as_secs())
            } else {
                RegistryError::ResponseParsing(e.to_string())
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
