use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EchoConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub usage: UsageConfig,
    pub summary: SummaryConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Upper bound for a single database call made from a request handler.
    pub db_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UsageConfig {
    pub free_trial_limit: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SummaryConfig {
    pub provider: String,
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub min_notes_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of this service, as seen by the session controller.
    pub api_base_url: String,
    pub assistant_id: String,
    pub rich_summary: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            log_level: "info".into(),
            db_timeout_ms: 10_000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_echomind_dir()
            .join("echomind.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self { free_trial_limit: 3 }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-flash-latest".into(),
            api_key: None,
            max_retries: 3,
            initial_backoff_ms: 1000,
            request_timeout_secs: 30,
            min_notes_chars: 20,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".into(),
            assistant_id: String::new(),
            rich_summary: false,
        }
    }
}

/// Returns `~/.echomind/`, or `./.echomind/` when no home directory is known.
pub fn default_echomind_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".echomind")
}

/// Returns the default config file path: `~/.echomind/config.toml`
pub fn default_config_path() -> PathBuf {
    default_echomind_dir().join("config.toml")
}

impl EchoConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            EchoConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (ECHOMIND_DB, ECHOMIND_LOG_LEVEL, ECHOMIND_HOST, ECHOMIND_PORT, GEMINI_API_KEY).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("ECHOMIND_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("ECHOMIND_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("ECHOMIND_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("ECHOMIND_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("ECHOMIND_PORT is not a valid port: {val}"))?;
        }
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            if !val.is_empty() {
                self.summary.api_key = Some(val);
            }
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
