//! REST Countries v3.1 client.
//!
//! The upstream shape is `{cca3, name: {common}, capital: [..]}`. Only the
//! first capital is used; entries without any capital are skipped because
//! they cannot form a pair.

use futures_util::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    CountryProvider, CountryRecord, FetchError, http_client, sample_records,
    truncate_body,
};

/// Fields requested from the API; keeps the payload small.
pub const REQUESTED_FIELDS: &str = "cca3,name,capital";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCountry {
    pub cca3: String,
    pub name: ApiCountryName,
    #[serde(default)]
    pub capital: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCountryName {
    pub common: String,
}

impl ApiCountry {
    #[must_use]
    pub fn into_record(self) -> Option<CountryRecord> {
        let capital = self.capital.into_iter().next()?;
        Some(CountryRecord {
            code: self.cca3,
            name: self.name.common,
            capital,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RestCountries {
    client: reqwest::Client,
    base_url: String,
}

impl RestCountries {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self::with_client(http_client()?, base_url))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn request_url(&self) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}fields={REQUESTED_FIELDS}", self.base_url)
    }

    /// Fetches and maps the full country list, in source order.
    pub async fn fetch_all(&self) -> Result<Vec<CountryRecord>, FetchError> {
        let url = self.request_url();
        debug!(%url, "Fetching country list");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Country source returned an error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let countries: Vec<ApiCountry> = serde_json::from_str(&body)?;
        let total = countries.len();
        let records: Vec<CountryRecord> = countries
            .into_iter()
            .filter_map(ApiCountry::into_record)
            .collect();
        if records.len() < total {
            debug!(
                skipped = total - records.len(),
                "Skipped countries without a capital"
            );
        }
        Ok(records)
    }
}

impl CountryProvider for RestCountries {
    fn fetch_sample(&self, n: usize) -> BoxFuture<'_, Result<Vec<CountryRecord>, FetchError>> {
        Box::pin(async move {
            let records = self.fetch_all().await?;
            let available = records.len();
            let sample = sample_records(records, n, &mut rand::rng());
            info!(requested = n, available, sampled = sample.len(), "Fetched country sample");
            Ok(sample)
        })
    }
}
