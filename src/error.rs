//! Error types for the aggregation core.
//!
//! Configuration misses (an unregistered source/year combination) are not
//! errors: registry lookups signal them with `None`/`false`/empty results.
//! Only the network boundary produces a typed error, and even that is
//! absorbed at the fetch-client boundary rather than propagated to callers.

use thiserror::Error;

/// Errors from a single OData request.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}
