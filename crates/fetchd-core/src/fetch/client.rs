//! Transport seam: the HTTP client capability the fetch path depends on.

use async_trait::async_trait;
use thiserror::Error;

/// What the fetch path needs from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code (any value, including non-2xx).
    pub status: u32,
    /// Number of body bytes read.
    pub body_len: u64,
}

/// Transport-level failure of a single GET. HTTP status codes are never
/// reported here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection refused, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Target URL or its query could not be built.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Socket-level error from a non-curl client.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The blocking transfer task was cancelled or panicked.
    #[error("transfer task failed: {0}")]
    Join(String),
}

/// Issues one GET with query parameters and reads the whole body.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<HttpResponse, TransportError>;
}

/// Parse and normalize `url`, then append `params` as a query string.
pub fn build_url(url: &str, params: &[(String, String)]) -> Result<String, TransportError> {
    let mut parsed = url::Url::parse(url).map_err(|source| TransportError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    if !params.is_empty() {
        parsed
            .query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(parsed.into())
}
