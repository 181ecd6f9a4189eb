//! Country data providers.
//!
//! # Architecture
//!
//! - [`CountryProvider`] - the contract the engine depends on: a random sample of
//!   [`CountryRecord`]s, or a [`FetchError`]
//! - [`restcountries`] - the REST Countries v3.1 implementation
//!
//! # Error Handling
//!
//! Failures are returned as-is; nothing here retries. The caller decides what a
//! failed fetch means for the UI.

pub mod restcountries;

use std::time::Duration;

pub use futures_util::future::BoxFuture;
use rand::seq::SliceRandom;
use thiserror::Error;

pub use capquiz_types::CountryRecord;
pub use restcountries::RestCountries;

/// Canonical REST Countries endpoint listing every country.
pub const REST_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

const MAX_ERROR_BODY_BYTES: usize = 512;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to country source failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("country source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("country source returned malformed data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of country records.
///
/// Implementations must be cheap to share across tasks; the engine spawns the
/// returned future onto the runtime.
pub trait CountryProvider: Send + Sync {
    /// Returns `n` distinct records sampled uniformly at random, or all of them
    /// when the source has fewer than `n`.
    fn fetch_sample(&self, n: usize) -> BoxFuture<'_, Result<Vec<CountryRecord>, FetchError>>;
}

/// Shuffle-then-truncate sampling without replacement.
#[must_use]
pub fn sample_records<R: rand::Rng + ?Sized>(
    mut records: Vec<CountryRecord>,
    n: usize,
    rng: &mut R,
) -> Vec<CountryRecord> {
    records.shuffle(rng);
    records.truncate(n);
    records
}

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert("Accept", HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("capquiz/", env!("CARGO_PKG_VERSION")))
        .default_headers(default_headers)
}

pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder().build()
}

/// Cuts an error body down to something fit for a status line.
pub(crate) fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY_BYTES {
        return trimmed.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
