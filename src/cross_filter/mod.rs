//! Filter Combination Layer: cross-filter state driven by visualization
//! clicks, and the merge of manual and cross-filters into one filter set.

pub mod combine;
pub mod state;

pub use combine::combine;
pub use state::*;
