//! Remote clinical registry access.
//!
//! `RegistryClient` speaks the registry's search protocol: one GET per page,
//! following `link[relation=next]` until the record cap is reached, a page
//! comes back empty, or no next link is present. `CachedRegistry` puts the
//! TTL fetch cache and per-key request coalescing in front of it.

mod cached;
mod client;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cached::*;
pub use client::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry is not reachable at {0}")]
    Connection(String),

    #[error("Registry request timed out after {0}s")]
    Timeout(u64),

    #[error("Registry returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
