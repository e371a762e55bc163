//! In-process mock registry for HTTP tests.
//!
//! Serves `GET /<ResourceType>?_count=N[&page=K]` with searchset bundles and
//! `next` links, binds `127.0.0.1:0`, and records every request it receives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::RegistryConfig;

#[derive(Debug, Clone)]
pub(crate) struct MockRequest {
    pub resource: String,
    pub page: u32,
    pub query: HashMap<String, String>,
}

#[derive(Default)]
pub(crate) struct MockRegistryBuilder {
    records: HashMap<String, Vec<Value>>,
    synthetic_total: usize,
    failing_page: Option<u32>,
    slow_page: Option<(u32, Duration)>,
    delay: Duration,
    endless_links: bool,
}

impl MockRegistryBuilder {
    /// Serve exactly these records for one resource type.
    pub fn records(mut self, resource: &str, records: Vec<Value>) -> Self {
        self.records.insert(resource.to_string(), records);
        self
    }

    /// Resource types without explicit records get `total` generated ones.
    pub fn synthetic(mut self, total: usize) -> Self {
        self.synthetic_total = total;
        self
    }

    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn slow_page(mut self, page: u32, delay: Duration) -> Self {
        self.slow_page = Some((page, delay));
        self
    }

    /// Delay every response.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Always emit a `next` link, even past the last record.
    pub fn endless_links(mut self) -> Self {
        self.endless_links = true;
        self
    }

    pub async fn start(self) -> MockRegistry {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock registry should bind");
        let addr = listener.local_addr().expect("mock registry address");
        let base_url = format!("http://{addr}");

        let state = Arc::new(MockState {
            base_url: base_url.clone(),
            records: self.records,
            synthetic_total: self.synthetic_total,
            failing_page: self.failing_page,
            slow_page: self.slow_page,
            delay: self.delay,
            endless_links: self.endless_links,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/:resource", get(page_handler))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockRegistry { base_url, state }
    }
}

pub(crate) struct MockRegistry {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockRegistry {
    pub fn builder() -> MockRegistryBuilder {
        MockRegistryBuilder::default()
    }

    /// Registry config pointed at this mock, with a short page timeout.
    pub fn config(&self) -> RegistryConfig {
        RegistryConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_millis(500),
            search_timeout: Duration::from_millis(500),
            ..RegistryConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Pages served for one resource type, in request order.
    pub fn pages_served(&self, resource: &str) -> Vec<u32> {
        self.requests()
            .into_iter()
            .filter(|r| r.resource == resource)
            .map(|r| r.page)
            .collect()
    }
}

struct MockState {
    base_url: String,
    records: HashMap<String, Vec<Value>>,
    synthetic_total: usize,
    failing_page: Option<u32>,
    slow_page: Option<(u32, Duration)>,
    delay: Duration,
    endless_links: bool,
    requests: Mutex<Vec<MockRequest>>,
}

impl MockState {
    fn records_for(&self, resource: &str) -> Vec<Value> {
        if let Some(records) = self.records.get(resource) {
            return records.clone();
        }
        (0..self.synthetic_total)
            .map(|i| json!({"resourceType": resource, "id": format!("{resource}-{i}")}))
            .collect()
    }
}

async fn page_handler(
    State(state): State<Arc<MockState>>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let page: u32 = query
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1)
        .max(1);
    let count: usize = query
        .get("_count")
        .and_then(|c| c.parse().ok())
        .unwrap_or(100);

    state.requests.lock().unwrap().push(MockRequest {
        resource: resource.clone(),
        page,
        query: query.clone(),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    if let Some((slow, delay)) = state.slow_page {
        if slow == page {
            tokio::time::sleep(delay).await;
        }
    }
    if state.failing_page == Some(page) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "registry unavailable").into_response();
    }

    let records = state.records_for(&resource);
    let start = (page as usize - 1) * count;
    let entries: Vec<Value> = records
        .iter()
        .skip(start)
        .take(count)
        .map(|r| json!({"resource": r}))
        .collect();

    let mut links = vec![json!({
        "relation": "self",
        "url": format!("{}/{}?page={}&_count={}", state.base_url, resource, page, count),
    })];
    if state.endless_links || start + count < records.len() {
        links.push(json!({
            "relation": "next",
            "url": format!("{}/{}?page={}&_count={}", state.base_url, resource, page + 1, count),
        }));
    }

    Json(json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "total": records.len(),
        "link": links,
        "entry": entries,
    }))
    .into_response()
}
