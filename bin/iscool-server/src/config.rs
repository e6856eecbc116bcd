//! Server configuration, loaded from environment variables at startup.

use thiserror::Error;

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Runtime configuration for iscool-server.
///
/// Everything except the provider credential has a default, so a bare
/// `GEMINI_API_KEY=... iscool-server` is a working setup.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// Gemini API key. Required.
    pub api_key: String,

    /// Model used when the request carries no override.
    pub default_model: String,

    /// Gemini REST base URL, without a trailing `/models`.
    pub provider_base_url: String,

    /// Origins allowed to call the API from a browser.
    pub cors_allowed_origins: Vec<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve the OpenAPI document at `/openapi.json`.
    pub enable_docs: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("api_key", &"<redacted>")
            .field("default_model", &self.default_model)
            .field("provider_base_url", &self.provider_base_url)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("enable_docs", &self.enable_docs)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set; export it before starting the server")]
    MissingApiKey,
}

impl Config {
    /// Build [`Config`] from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            bind_address: or("ISCOOL_BIND", "0.0.0.0:8000"),
            api_key,
            default_model: or("GEMINI_MODEL", DEFAULT_MODEL),
            provider_base_url: or("GEMINI_BASE_URL", iscool_gemini::DEFAULT_BASE_URL),
            cors_allowed_origins: split_list(&or("ISCOOL_CORS_ORIGINS", "http://localhost:5173")),
            log_level: or("ISCOOL_LOG", "info"),
            log_json: get("ISCOOL_LOG_JSON").is_some_and(|v| parse_bool(&v)),
            enable_docs: get("ISCOOL_ENABLE_DOCS").is_none_or(|v| parse_bool(&v)),
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_bool(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
