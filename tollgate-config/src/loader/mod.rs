pub mod error;

use once_cell::sync::Lazy;
use std::{fs, path::PathBuf, time::Duration};

use tollgate_core::auth::policy::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_REFRESH_TOKEN_TTL_SECS,
    DEFAULT_SWEEP_BATCH_SIZE,
};

use crate::models::{
    Config, ConfigMetadata, LoggingConfig,
    sources::{
        ENV_ACCESS_TOKEN_TTL, ENV_REFRESH_TOKEN_TTL, ENV_SWEEP_BATCH_SIZE,
        EnvConfig, FileConfig,
    },
};
use crate::util::parse_duration;
use crate::validation::{self, ConfigWarnings};

pub use error::ConfigLoadError;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("tollgate.toml"),
        PathBuf::from("config/tollgate.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Fully resolved configuration plus anything worth telling the operator
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

/// Resolves configuration with precedence env > file > defaults
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
    env_override: Option<EnvConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self {
            options,
            env_override: None,
        }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Use `env` instead of reading the process environment
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env_override = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = match &self.env_override {
            Some(env) => env.clone(),
            None => EnvConfig::gather(),
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = self.compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // Explicit and env-named paths must exist; defaults are optional
        let (path, required) = if let Some(explicit) = &self.options.config_path {
            (Some(explicit.clone()), true)
        } else if let Some(from_env) = &env_config.config_path {
            (Some(from_env.clone()), true)
        } else {
            let found = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned();
            (found, false)
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if required {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents = fs::read_to_string(&path).map_err(|err| {
            ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            }
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No tollgate.toml detected; using environment variables and defaults",
                "Create tollgate.toml or set TOLLGATE_CONFIG to pin session lifetimes",
            );
        }

        let FileConfig {
            sessions: file_sessions,
            logging: file_logging,
        } = file_config.unwrap_or_default();

        let refresh_token_ttl = resolve_duration(
            (ENV_REFRESH_TOKEN_TTL, "sessions.refresh_token_ttl"),
            env.refresh_token_ttl,
            file_sessions.refresh_token_ttl,
            Duration::from_secs(DEFAULT_REFRESH_TOKEN_TTL_SECS as u64),
        )?;
        let access_token_ttl = resolve_duration(
            (ENV_ACCESS_TOKEN_TTL, "sessions.access_token_ttl"),
            env.access_token_ttl,
            file_sessions.access_token_ttl,
            Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS as u64),
        )?;
        let sweep_batch_size = match env.sweep_batch_size {
            Some(raw) => raw.trim().parse().map_err(|source| {
                ConfigLoadError::InvalidInteger {
                    key: ENV_SWEEP_BATCH_SIZE,
                    value: raw.clone(),
                    source,
                }
            })?,
            None => file_sessions
                .sweep_batch_size
                .unwrap_or(DEFAULT_SWEEP_BATCH_SIZE),
        };

        let sessions = validation::session_policy(
            refresh_token_ttl,
            access_token_ttl,
            sweep_batch_size,
        )?;

        let defaults = LoggingConfig::default();
        let logging = LoggingConfig {
            filter: env
                .log_filter
                .or(file_logging.filter)
                .unwrap_or(defaults.filter),
            ansi: env.log_ansi.or(file_logging.ansi).unwrap_or(defaults.ansi),
        };

        let config = Config {
            sessions,
            logging,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        warnings.extend(validation::apply_guard_rails(&config));
        Ok((config, warnings))
    }
}

fn resolve_duration(
    (env_key, file_key): (&'static str, &'static str),
    from_env: Option<String>,
    from_file: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    let (raw, key) = match (from_env, from_file) {
        (Some(raw), _) => (raw, env_key),
        (None, Some(raw)) => (raw, file_key),
        (None, None) => return Ok(default),
    };

    parse_duration(&raw).map_err(|source| ConfigLoadError::InvalidDuration {
        key,
        value: raw.clone(),
        source,
    })
}
