//! Data model shared by aggregation, normalization and the dashboard.

pub mod dataset;
pub mod display;
pub mod enums;
pub mod filters;
pub mod records;

pub use dataset::*;
pub use display::*;
pub use enums::*;
pub use filters::*;
pub use records::*;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: &'static str, value: String },
}
