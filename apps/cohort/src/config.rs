//! # Configuration
//!
//! Settings come from an optional `cohort.toml`, then environment overrides:
//!
//! - `COHORT_API_KEY`: if set and non-empty, requests need a Bearer token
//! - `COHORT_RATE_LIMIT`: requests per second (default 100, 0 to disable)
//! - `COHORT_CORS_ORIGINS`: comma-separated origins, or `*` for all
//!
//! ```toml
//! database = "cohort.db"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! rate_limit = 100
//! cors_origins = ["http://localhost:3000"]
//! ```

use cohort_core::CohortError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default rate limit: 100 requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum request body size, in bytes.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret for the Bearer check. `None` disables authentication.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Requests per second across all clients. 0 disables the limiter.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Allowed CORS origins. `None` means localhost only; `["*"]` allows all.
    #[serde(default)]
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("cohort.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_rate_limit() -> u32 {
    DEFAULT_RATE_LIMIT
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, CohortError> {
        toml::from_str(content)
            .map_err(|e| CohortError::Serialization(format!("Invalid config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, CohortError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CohortError::Storage(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load `path` if given, else `cohort.toml` if present, else defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, CohortError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let local = Path::new("cohort.toml");
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `COHORT_*` overrides through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("COHORT_API_KEY") {
            self.server.api_key = Some(key);
        }
        if let Some(limit) = lookup("COHORT_RATE_LIMIT") {
            match limit.trim().parse() {
                Ok(rps) => self.server.rate_limit = rps,
                Err(_) => tracing::warn!("Ignoring invalid COHORT_RATE_LIMIT '{}'", limit),
            }
        }
        if let Some(origins) = lookup("COHORT_CORS_ORIGINS") {
            self.server.cors_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        // An empty key means "no auth", same as unset.
        if self.server.api_key.as_deref().is_some_and(str::is_empty) {
            self.server.api_key = None;
        }
    }
}
