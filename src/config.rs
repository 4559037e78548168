//! `pprof-lens.toml` config loading.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::OutputFormat;

pub const DEFAULT_CONFIG_FILE: &str = "pprof-lens.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Rows shown by text and markdown reports when `--top` is not given.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub format: OutputFormat,

    /// Used when neither `RUST_LOG` nor `LOG_LEVEL` is set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Leak suspects that grew by fewer bytes are dropped.
    #[serde(default)]
    pub min_leak_bytes: i64,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_top_n() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            format: OutputFormat::default(),
            log_level: default_log_level(),
            min_leak_bytes: 0,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load_optional(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => match toml::from_str::<Config>(&s) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!("failed to parse config {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                tracing::warn!("failed to read config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Log filter directive when `RUST_LOG` is unset: a valid `LOG_LEVEL`
    /// value, else the configured level, else `info`.
    pub fn log_directive(&self, log_level_env: Option<&str>) -> String {
        [log_level_env, Some(self.log_level.as_str())]
            .into_iter()
            .flatten()
            .map(|level| level.trim().to_ascii_lowercase())
            .find(|level| LOG_LEVELS.contains(&level.as_str()))
            .unwrap_or_else(|| "info".to_string())
    }

    /// `requested` when positive, otherwise the configured default.
    pub fn effective_top_n(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n,
            _ => self.top_n.max(1),
        }
    }
}
