//! Filtering & Recalculation Engine.
//!
//! `apply_filters` narrows a normalized dataset by a combined filter set;
//! `recalculate` maps metric and chart definitions back onto the narrowed
//! population; `DashboardView` ties both to manual and cross-filter state.

pub mod apply;
pub mod classify;
pub mod field;
pub mod options;
pub mod recalculate;
pub mod view;

#[cfg(test)]
pub(crate) mod test_data;

pub use apply::apply_filters;
pub use classify::{classify_chart, classify_label, classify_metric, DefinitionKind, CATEGORY_RULES};
pub use field::FilterField;
pub use options::filter_options;
pub use recalculate::{recalculate, recalculate_charts, recalculate_metrics};
pub use view::DashboardView;
