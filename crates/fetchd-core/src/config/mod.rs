//! Fetch configuration: scheduler mode, HTTP options, and named sessions.
//!
//! Loaded from TOML (default) or YAML (`.yaml` / `.yml`). Session entries are
//! kept raw here and validated one by one in [`session`], so a single bad
//! session does not reject the whole file.

mod session;

pub use session::{ConfigError, MAX_TIMING_SECS, RawSession, RawTimings, SessionConfig, TimingConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fetch-config.toml";

/// Scheduler mode. `"async"` selects the bounded-concurrency scheduler; any
/// other string selects the one-shot sequential path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    #[default]
    Async,
    Sequential,
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("async") {
            Mode::Async
        } else {
            Mode::Sequential
        }
    }
}

impl From<Mode> for String {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Async => "async".to_string(),
            Mode::Sequential => "sequential".to_string(),
        }
    }
}

/// Transport options handed to the curl client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (connect + transfer).
    pub timeout_secs: u64,
    /// Optional `User-Agent` header.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            user_agent: Some(format!("fetchd/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// Sessions as written in the file: either a mapping of name -> session, or a
/// sequence of sessions with an optional `name` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionEntries {
    Map(BTreeMap<String, RawSession>),
    List(Vec<RawSession>),
}

impl Default for SessionEntries {
    fn default() -> Self {
        SessionEntries::List(Vec::new())
    }
}

impl SessionEntries {
    pub fn len(&self) -> usize {
        match self {
            SessionEntries::Map(m) => m.len(),
            SessionEntries::List(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into `(name, raw)` pairs. Unnamed sequence entries are named
    /// `session-<index>`.
    pub fn named(&self) -> Vec<(String, RawSession)> {
        match self {
            SessionEntries::Map(m) => m.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            SessionEntries::List(l) => l
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    let name = raw
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("session-{}", i));
                    (name, raw.clone())
                })
                .collect(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    200
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: Mode,
    /// How often a sleeping session re-checks the stop signal.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sessions: SessionEntries,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Async,
            poll_interval_ms: default_poll_interval_ms(),
            http: HttpConfig::default(),
            sessions: SessionEntries::default(),
        }
    }
}

/// A session that failed validation and will not run.
#[derive(Debug)]
pub struct SkippedSession {
    pub name: String,
    pub error: ConfigError,
}

impl FetchConfig {
    /// Validate every session entry. Valid ones are returned in file order;
    /// invalid ones are reported separately instead of failing the whole set.
    pub fn validated_sessions(&self) -> (Vec<SessionConfig>, Vec<SkippedSession>) {
        let mut ok = Vec::new();
        let mut skipped = Vec::new();
        for (name, raw) in self.sessions.named() {
            match SessionConfig::from_raw(&name, &raw) {
                Ok(s) => ok.push(s),
                Err(error) => skipped.push(SkippedSession { name, error }),
            }
        }
        (ok, skipped)
    }
}

/// On-disk format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Toml,
        }
    }
}

/// Parse configuration text in the given format.
pub fn parse_str(data: &str, format: ConfigFormat) -> Result<FetchConfig> {
    let cfg = match format {
        ConfigFormat::Toml => toml::from_str(data).context("invalid TOML config")?,
        ConfigFormat::Yaml => serde_yaml::from_str(data).context("invalid YAML config")?,
    };
    Ok(cfg)
}

/// Load configuration from `path`.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg = parse_str(&data, ConfigFormat::from_path(path))
        .with_context(|| format!("parse config: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        sessions = cfg.sessions.len(),
        "loaded config"
    );
    Ok(cfg)
}

/// XDG fallback location (`~/.config/fetchd/config.toml`).
pub fn xdg_config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fetchd")?;
    Ok(xdg_dirs.get_config_home().join("config.toml"))
}

/// Pick the config file: the explicit path if given, else `fetch-config.toml`
/// (or `.yaml`) in the working directory, else the XDG config file.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    for candidate in [DEFAULT_CONFIG_FILE, "fetch-config.yaml", "fetch-config.yml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return Ok(p);
        }
    }
    let xdg = xdg_config_path()?;
    if xdg.exists() {
        return Ok(xdg);
    }
    anyhow::bail!(
        "no config file found (tried ./{} and {})",
        DEFAULT_CONFIG_FILE,
        xdg.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.mode, Mode::Async);
        assert_eq!(cfg.poll_interval_ms, 200);
        assert_eq!(cfg.http.connect_timeout_secs, 15);
        assert!(cfg.sessions.is_empty());
    }

    #[test]
    fn mode_other_than_async_is_sequential() {
        assert_eq!(Mode::from("async".to_string()), Mode::Async);
        assert_eq!(Mode::from("ASYNC".to_string()), Mode::Async);
        assert_eq!(Mode::from("requests".to_string()), Mode::Sequential);
        assert_eq!(Mode::from(String::new()), Mode::Sequential);
    }

    #[test]
    fn config_toml_session_map() {
        let toml = r#"
            mode = "async"

            [sessions.metrics]
            prefix = "http://x"
            urls = ["a", "b"]
            max-parallel-requests = 1

            [sessions.metrics.timings]
            resolution = 60
            span = 600
            period = 5
        "#;
        let cfg = parse_str(toml, ConfigFormat::Toml).unwrap();
        let (sessions, skipped) = cfg.validated_sessions();
        assert!(skipped.is_empty());
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.name, "metrics");
        assert_eq!(s.prefix, "http://x");
        assert_eq!(s.url_suffixes, vec!["a", "b"]);
        assert_eq!(s.max_concurrency, 1);
        let t = s.timings.unwrap();
        assert_eq!(t.resolution_seconds, 60);
        assert_eq!(t.span_seconds, 600);
        assert_eq!(t.period_seconds, 5);
    }

    #[test]
    fn config_toml_session_list_defaults() {
        let toml = r#"
            [[sessions]]
            prefix = "http://a"

            [[sessions]]
            name = "named"
            prefix = "http://b"
            urls = ["x"]
            timings = {}
        "#;
        let cfg = parse_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(cfg.mode, Mode::Async);
        let (sessions, skipped) = cfg.validated_sessions();
        assert!(skipped.is_empty());
        assert_eq!(sessions[0].name, "session-0");
        assert!(sessions[0].url_suffixes.is_empty());
        assert_eq!(sessions[0].max_concurrency, 1000);
        assert!(sessions[0].timings.is_none());
        assert_eq!(sessions[1].name, "named");
        let t = sessions[1].timings.unwrap();
        assert_eq!(t.resolution_seconds, 240);
        assert_eq!(t.span_seconds, 3600);
        assert_eq!(t.period_seconds, 300);
    }

    #[test]
    fn config_yaml_matches_toml() {
        let yaml = r#"
mode: requests
http:
  timeout_secs: 5
sessions:
  graphs:
    prefix: http://graphite
    urls: [render/a, render/b]
    max-parallel-requests: 10
    timings:
      span: 7200
"#;
        let cfg = parse_str(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(cfg.mode, Mode::Sequential);
        assert_eq!(cfg.http.timeout_secs, 5);
        assert_eq!(cfg.http.connect_timeout_secs, 15);
        let (sessions, _) = cfg.validated_sessions();
        assert_eq!(sessions[0].name, "graphs");
        assert_eq!(sessions[0].max_concurrency, 10);
        assert_eq!(sessions[0].timings.unwrap().span_seconds, 7200);
    }

    #[test]
    fn missing_prefix_skips_only_that_session() {
        let toml = r#"
            [sessions.good]
            prefix = "http://ok"

            [sessions.bad]
            urls = ["a"]
        "#;
        let cfg = parse_str(toml, ConfigFormat::Toml).unwrap();
        let (sessions, skipped) = cfg.validated_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name, "good");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].name, "bad");
        assert!(matches!(skipped[0].error, ConfigError::MissingPrefix));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fetch-config.yml");
        fs::write(&path, "sessions:\n  - prefix: http://h\n    urls: [a]\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        let (sessions, _) = cfg.validated_sessions();
        assert_eq!(sessions[0].targets(), vec!["http://h/a".to_string()]);
    }

    #[test]
    fn resolve_path_prefers_explicit() {
        let p = resolve_path(Some(Path::new("/tmp/custom.toml"))).unwrap();
        assert_eq!(p, PathBuf::from("/tmp/custom.toml"));
    }
}
