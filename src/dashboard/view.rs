//! Reactive dashboard view model.
//!
//! Key properties:
//! - The source dataset is an immutable `Arc` snapshot; every filtered view
//!   is a derived copy
//! - Manual filters start from the declared defaults
//! - Results are memoized on (combined filters, dataset identity); a change
//!   to either triggers one full recomputation on next read
//! - With no filter active the declared definitions are shown as given,
//!   report trends included

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::cross_filter::{combine, CrossFilterEvent, CrossFilterState, ToggleOutcome};
use crate::models::{
    CrossFilterEntry, CrossFilterValue, DashboardDefinitions, FilterDefinition, FilterOption,
    FilterSet, FilterValue, SourceDataset,
};

use super::apply::apply_filters;
use super::options::filter_options;
use super::recalculate::recalculate;

// ═══════════════════════════════════════════════════════════
// Memo
// ═══════════════════════════════════════════════════════════

struct Memo {
    filters: FilterSet,
    dataset: Arc<SourceDataset>,
    filtered: Arc<SourceDataset>,
    definitions: Arc<DashboardDefinitions>,
}

impl Memo {
    fn is_valid_for(&self, filters: &FilterSet, dataset: &Arc<SourceDataset>) -> bool {
        Arc::ptr_eq(&self.dataset, dataset) && &self.filters == filters
    }
}

// ═══════════════════════════════════════════════════════════
// DashboardView
// ═══════════════════════════════════════════════════════════

pub struct DashboardView {
    dataset: Arc<SourceDataset>,
    definitions: DashboardDefinitions,
    filter_definitions: Vec<FilterDefinition>,
    manual: FilterSet,
    cross_filters: CrossFilterState,
    memo: Option<Memo>,
    recomputations: usize,
}

impl DashboardView {
    pub fn new(
        dataset: Arc<SourceDataset>,
        definitions: DashboardDefinitions,
        filter_definitions: Vec<FilterDefinition>,
    ) -> Self {
        let manual = FilterSet::from_defaults(&filter_definitions);
        Self {
            dataset,
            definitions,
            filter_definitions,
            manual,
            cross_filters: CrossFilterState::new(),
            memo: None,
            recomputations: 0,
        }
    }

    pub fn dataset(&self) -> &Arc<SourceDataset> {
        &self.dataset
    }

    /// Swap in a new snapshot, e.g. after a report is regenerated.
    pub fn replace_dataset(&mut self, dataset: Arc<SourceDataset>) {
        self.dataset = dataset;
    }

    pub fn filter_definitions(&self) -> &[FilterDefinition] {
        &self.filter_definitions
    }

    /// Declared filters with options counted over the unfiltered dataset.
    pub fn filter_options(&self) -> Vec<(String, Vec<FilterOption>)> {
        self.filter_definitions
            .iter()
            .map(|def| (def.id.clone(), filter_options(&self.dataset, def)))
            .collect()
    }

    // ── Manual filters ───────────────────────────────────

    pub fn manual_filters(&self) -> &FilterSet {
        &self.manual
    }

    pub fn set_manual(&mut self, field: &str, values: Vec<FilterValue>) {
        self.manual.set(field, values);
    }

    pub fn clear_manual(&mut self, field: &str) {
        self.manual.remove(field);
    }

    /// Back to the declared defaults.
    pub fn reset_manual(&mut self) {
        self.manual = FilterSet::from_defaults(&self.filter_definitions);
    }

    // ── Cross-filters ────────────────────────────────────

    pub fn click(&mut self, source: &str, field: &str, value: CrossFilterValue) -> ToggleOutcome {
        self.cross_filters.click(source, field, value)
    }

    pub fn remove_cross_filter(&mut self, source: &str) -> bool {
        self.cross_filters.remove_source(source)
    }

    pub fn clear_cross_filters(&mut self) {
        self.cross_filters.clear();
    }

    pub fn cross_filters(&self) -> &[CrossFilterEntry] {
        self.cross_filters.entries()
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<CrossFilterEvent> {
        self.cross_filters.subscribe()
    }

    // ── Derived state ────────────────────────────────────

    pub fn combined_filters(&self) -> FilterSet {
        combine(&self.manual, self.cross_filters.entries())
    }

    pub fn filtered(&mut self) -> Arc<SourceDataset> {
        Arc::clone(&self.refresh().filtered)
    }

    pub fn definitions(&mut self) -> Arc<DashboardDefinitions> {
        Arc::clone(&self.refresh().definitions)
    }

    /// How many times the filtered view has been recomputed.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    fn refresh(&mut self) -> &Memo {
        let filters = self.combined_filters();
        let memo = match self.memo.take() {
            Some(memo) if memo.is_valid_for(&filters, &self.dataset) => memo,
            _ => {
                let filtered = apply_filters(&self.dataset, &filters);
                let definitions = if filters.is_empty() {
                    self.definitions.clone()
                } else {
                    recalculate(&filtered, &self.definitions)
                };
                self.recomputations += 1;
                tracing::debug!(
                    recomputations = self.recomputations,
                    patients = filtered.patients().len(),
                    "Dashboard recomputed"
                );
                Memo {
                    filters,
                    dataset: Arc::clone(&self.dataset),
                    filtered: Arc::new(filtered),
                    definitions: Arc::new(definitions),
                }
            }
        };
        self.memo.insert(memo)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
