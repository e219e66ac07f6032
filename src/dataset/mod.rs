//! Route dataset retrieval and time-bounded caching.

mod cache;
mod source;

pub use cache::{DatasetCache, DatasetLoad, DEFAULT_TTL};
pub use source::{HttpRouteSource, RouteSource};

use std::sync::Arc;
use thiserror::Error;

/// Failure to retrieve the route feed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to route feed failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("route feed answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("route feed payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure surfaced to callers of the cache
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The feed could not be fetched and nothing was cached yet
    #[error("route dataset unavailable: {0}")]
    Unavailable(#[source] Arc<FetchError>),
}
