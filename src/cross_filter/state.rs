use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::models::{CrossFilterEntry, CrossFilterValue};

/// Capacity of each subscriber channel.
pub const SUBSCRIBER_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Replaced,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrossFilterChange {
    Toggled { source: String, outcome: ToggleOutcome },
    SourceRemoved { source: String },
    Cleared,
}

/// Published after every change: what changed, and the full entry list after it.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossFilterEvent {
    pub change: CrossFilterChange,
    pub entries: Vec<CrossFilterEntry>,
}

/// Active cross-filters, at most one per source visualization, in click order.
#[derive(Debug, Default)]
pub struct CrossFilterState {
    entries: Vec<CrossFilterEntry>,
    subscribers: Vec<mpsc::Sender<CrossFilterEvent>>,
}

impl CrossFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CrossFilterEntry] {
        &self.entries
    }

    pub fn entry_for(&self, source: &str) -> Option<&CrossFilterEntry> {
        self.entries
            .iter()
            .find(|e| e.source_visualization_id == source)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a listener for change events.
    pub fn subscribe(&mut self) -> mpsc::Receiver<CrossFilterEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers.push(tx);
        rx
    }

    pub fn click(&mut self, source: &str, field: &str, value: CrossFilterValue) -> ToggleOutcome {
        self.toggle_at(source, field, value, Utc::now())
    }

    /// Apply a click on `source`.
    ///
    /// The same `(field, value)` again removes the source's entry; anything
    /// else replaces it in place; a source without an entry gets a new one.
    pub fn toggle_at(
        &mut self,
        source: &str,
        field: &str,
        value: CrossFilterValue,
        now: DateTime<Utc>,
    ) -> ToggleOutcome {
        let position = self
            .entries
            .iter()
            .position(|e| e.source_visualization_id == source);

        let outcome = match position {
            Some(i) if self.entries[i].filter_field == field && self.entries[i].filter_value == value => {
                self.entries.remove(i);
                ToggleOutcome::Removed
            }
            Some(i) => {
                self.entries[i] = new_entry(source, field, value, now);
                ToggleOutcome::Replaced
            }
            None => {
                self.entries.push(new_entry(source, field, value, now));
                ToggleOutcome::Added
            }
        };

        tracing::debug!(source, field, ?outcome, active = self.entries.len(), "Cross-filter toggled");
        self.publish(CrossFilterChange::Toggled {
            source: source.to_string(),
            outcome,
        });
        outcome
    }

    /// Drop the entry of one source. Returns whether there was one.
    pub fn remove_source(&mut self, source: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.source_visualization_id != source);
        let removed = self.entries.len() != before;
        if removed {
            self.publish(CrossFilterChange::SourceRemoved {
                source: source.to_string(),
            });
        }
        removed
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.publish(CrossFilterChange::Cleared);
    }

    fn publish(&mut self, change: CrossFilterChange) {
        let event = CrossFilterEvent {
            change,
            entries: self.entries.clone(),
        };
        self.subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Cross-filter subscriber lagging, event dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}

fn new_entry(
    source: &str,
    field: &str,
    value: CrossFilterValue,
    now: DateTime<Utc>,
) -> CrossFilterEntry {
    CrossFilterEntry {
        source_visualization_id: source.to_string(),
        filter_field: field.to_string(),
        filter_value: value,
        timestamp: now,
    }
}
