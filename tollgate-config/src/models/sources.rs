use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{non_empty, parse_bool};

pub const ENV_CONFIG_PATH: &str = "TOLLGATE_CONFIG";
pub const ENV_REFRESH_TOKEN_TTL: &str = "TOLLGATE_REFRESH_TOKEN_TTL";
pub const ENV_ACCESS_TOKEN_TTL: &str = "TOLLGATE_ACCESS_TOKEN_TTL";
pub const ENV_SWEEP_BATCH_SIZE: &str = "TOLLGATE_SWEEP_BATCH_SIZE";
pub const ENV_LOG_FILTER: &str = "TOLLGATE_LOG_FILTER";
pub const ENV_LOG_ANSI: &str = "TOLLGATE_LOG_ANSI";

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub sessions: FileSessionsConfig,
    #[serde(default)]
    pub logging: FileLoggingConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileSessionsConfig {
    /// Humantime duration, e.g. `"7d"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_batch_size: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansi: Option<bool>,
}

/// Environment-derived configuration values.
///
/// Durations and the batch size stay raw here so that malformed values
/// surface as load errors naming the variable.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub refresh_token_ttl: Option<String>,
    pub access_token_ttl: Option<String>,
    pub sweep_batch_size: Option<String>,
    pub log_filter: Option<String>,
    pub log_ansi: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_empty(lookup(key));

        Self {
            config_path: var(ENV_CONFIG_PATH).map(PathBuf::from),
            refresh_token_ttl: var(ENV_REFRESH_TOKEN_TTL),
            access_token_ttl: var(ENV_ACCESS_TOKEN_TTL),
            sweep_batch_size: var(ENV_SWEEP_BATCH_SIZE),
            log_filter: var(ENV_LOG_FILTER),
            log_ansi: var(ENV_LOG_ANSI).and_then(|raw| parse_bool(&raw)),
        }
    }
}
