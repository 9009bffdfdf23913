//! Session entries: raw file shape and the validated form the runners use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on `resolution` and `span`, keeping window bounds exact in
/// signed epoch seconds.
pub const MAX_TIMING_SECS: u64 = 1 << 62;

fn default_max_parallel() -> usize {
    1000
}
fn default_resolution() -> u64 {
    240
}
fn default_span() -> u64 {
    3600
}
fn default_period() -> u64 {
    300
}

/// Session as written in the config file. Every field is optional at this
/// level; [`SessionConfig::from_raw`] enforces what is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawSession {
    /// Only used by the sequence form of `sessions`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default = "default_max_parallel", alias = "max_parallel_requests")]
    pub max_parallel_requests: usize,
    #[serde(default)]
    pub timings: Option<RawTimings>,
}

impl Default for RawSession {
    fn default() -> Self {
        Self {
            name: None,
            prefix: None,
            urls: Vec::new(),
            max_parallel_requests: default_max_parallel(),
            timings: None,
        }
    }
}

/// `timings` block, all values in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawTimings {
    #[serde(default = "default_resolution")]
    pub resolution: u64,
    #[serde(default = "default_span")]
    pub span: u64,
    #[serde(default = "default_period")]
    pub period: u64,
}

impl Default for RawTimings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            span: default_span(),
            period: default_period(),
        }
    }
}

/// Why a session entry cannot run. Only that session is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required field `prefix`")]
    MissingPrefix,
    #[error("`max-parallel-requests` must be greater than zero")]
    ZeroConcurrency,
    #[error("timings.{field} must be greater than zero")]
    ZeroTiming { field: &'static str },
    #[error("timings.{field} must not exceed {max} seconds")]
    TimingTooLarge { field: &'static str, max: u64 },
}

/// Time-window and repetition policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub resolution_seconds: u64,
    pub span_seconds: u64,
    pub period_seconds: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            resolution_seconds: default_resolution(),
            span_seconds: default_span(),
            period_seconds: default_period(),
        }
    }
}

impl TryFrom<RawTimings> for TimingConfig {
    type Error = ConfigError;

    fn try_from(raw: RawTimings) -> Result<Self, Self::Error> {
        if raw.resolution == 0 {
            return Err(ConfigError::ZeroTiming { field: "resolution" });
        }
        if raw.period == 0 {
            return Err(ConfigError::ZeroTiming { field: "period" });
        }
        for (field, value) in [("resolution", raw.resolution), ("span", raw.span)] {
            if value > MAX_TIMING_SECS {
                return Err(ConfigError::TimingTooLarge {
                    field,
                    max: MAX_TIMING_SECS,
                });
            }
        }
        // span = 0 is allowed and yields an empty window; period is unbounded.
        Ok(Self {
            resolution_seconds: raw.resolution,
            span_seconds: raw.span,
            period_seconds: raw.period,
        })
    }
}

/// Validated, immutable session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub name: String,
    pub prefix: String,
    pub url_suffixes: Vec<String>,
    pub max_concurrency: usize,
    pub timings: Option<TimingConfig>,
}

impl SessionConfig {
    pub fn from_raw(name: &str, raw: &RawSession) -> Result<Self, ConfigError> {
        let prefix = raw
            .prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingPrefix)?;
        if raw.max_parallel_requests == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        let timings = raw.timings.map(TimingConfig::try_from).transpose()?;
        Ok(Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            url_suffixes: raw.urls.clone(),
            max_concurrency: raw.max_parallel_requests,
            timings,
        })
    }

    /// Full target URLs: `prefix + "/" + suffix`, in configured order.
    pub fn targets(&self) -> Vec<String> {
        self.url_suffixes
            .iter()
            .map(|suffix| format!("{}/{}", self.prefix, suffix))
            .collect()
    }
}
