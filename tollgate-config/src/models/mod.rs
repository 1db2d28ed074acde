pub mod sources;

use std::path::PathBuf;

use serde::Serialize;
use tollgate_core::SessionPolicy;
use tollgate_core::chrono::Duration;

use crate::util::format_duration;

pub const DEFAULT_LOG_FILTER: &str = "info,tollgate_core=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub sessions: SessionPolicy,
    pub logging: LoggingConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Serializable view with durations in humantime form
    pub fn summary(&self) -> ConfigSummary {
        let to_std = |d: Duration| d.to_std().unwrap_or_default();
        ConfigSummary {
            refresh_token_ttl: format_duration(to_std(self.sessions.refresh_token_ttl())),
            access_token_ttl: format_duration(to_std(self.sessions.access_token_ttl())),
            sweep_batch_size: self.sessions.sweep_batch_size(),
            log_filter: self.logging.filter.clone(),
            log_ansi: self.logging.ansi,
            config_path: self.metadata.config_path.clone(),
            env_file_loaded: self.metadata.env_file_loaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Fallback `EnvFilter` directives when `RUST_LOG` is unset
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            ansi: true,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub refresh_token_ttl: String,
    pub access_token_ttl: String,
    pub sweep_batch_size: usize,
    pub log_filter: String,
    pub log_ansi: bool,
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
