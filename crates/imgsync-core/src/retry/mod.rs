//! Retry and backoff policy for the transport layer.
//!
//! Classifies curl errors and HTTP statuses (timeouts, throttling, connection
//! failures, 5xx) and decides exponential backoff, so the fetch client can
//! wrap every GET in the same bounded retry loop.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status, RETRY_STATUSES};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
