//! One GET against one target, reduced to a [`FetchOutcome`].
//!
//! Transport failures are caught here and become [`FetchError`] entries; a
//! non-2xx status is an ordinary [`FetchResult`].

mod client;
mod curl_client;

pub use client::{build_url, HttpClient, HttpResponse, TransportError};
pub use curl_client::CurlClient;

use serde::Serialize;
use std::time::Instant;

/// Successful transfer (any HTTP status).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    pub url: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "status")]
    pub status_code: u32,
    #[serde(rename = "dt")]
    pub elapsed_seconds: f64,
}

/// Transport failure for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub url: String,
    pub cause: String,
}

/// Either shape; serialized without a tag so consumers tell them apart by
/// their fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchOutcome {
    Success(FetchResult),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn failure(url: impl Into<String>, cause: impl Into<String>) -> Self {
        FetchOutcome::Failure(FetchError {
            url: url.into(),
            cause: cause.into(),
        })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Success(r) => &r.url,
            FetchOutcome::Failure(e) => &e.url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Fetch `url` with `params` and time it. Never returns an error: transport
/// failures are folded into the outcome.
pub async fn fetch_one(
    client: &dyn HttpClient,
    url: &str,
    params: &[(String, String)],
) -> FetchOutcome {
    let started = Instant::now();
    match client.get(url, params).await {
        Ok(resp) => {
            let elapsed_seconds = started.elapsed().as_secs_f64();
            tracing::trace!(url, status = resp.status, size = resp.body_len, "fetched");
            FetchOutcome::Success(FetchResult {
                url: url.to_string(),
                size_bytes: resp.body_len,
                status_code: resp.status,
                elapsed_seconds,
            })
        }
        Err(e) => {
            tracing::warn!(url, "fetch failed: {}", e);
            FetchOutcome::failure(url, e.to_string())
        }
    }
}
