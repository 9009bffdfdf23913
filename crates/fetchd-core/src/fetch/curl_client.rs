//! libcurl-backed [`HttpClient`].
//!
//! Each GET runs on a fresh `curl::easy::Easy` inside `spawn_blocking`, so a
//! slow transfer occupies a blocking-pool thread, not a runtime worker.

use async_trait::async_trait;
use std::time::Duration;

use super::client::{build_url, HttpClient, HttpResponse, TransportError};
use crate::config::HttpConfig;

/// Blocking curl transfers driven from the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct CurlClient {
    opts: HttpConfig,
}

impl CurlClient {
    pub fn new(opts: HttpConfig) -> Self {
        Self { opts }
    }
}

impl Default for CurlClient {
    fn default() -> Self {
        Self::new(HttpConfig::default())
    }
}

#[async_trait]
impl HttpClient for CurlClient {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let full = build_url(url, params)?;
        let opts = self.opts.clone();
        tokio::task::spawn_blocking(move || get_blocking(&full, &opts))
            .await
            .map_err(|e| TransportError::Join(e.to_string()))?
    }
}

/// Performs a GET, counting body bytes without buffering them.
/// Follows redirects. Runs in the current thread.
fn get_blocking(url: &str, opts: &HttpConfig) -> Result<HttpResponse, TransportError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(opts.connect_timeout_secs.max(1)))?;
    if opts.timeout_secs > 0 {
        easy.timeout(Duration::from_secs(opts.timeout_secs))?;
    }
    if let Some(ua) = opts.user_agent.as_deref() {
        easy.useragent(ua)?;
    }

    let mut body_len = 0u64;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body_len += data.len() as u64;
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse { status, body_len })
}
