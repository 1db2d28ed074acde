use std::time::Duration;

use thiserror::Error;
use tollgate_core::SessionPolicy;
use tollgate_core::auth::SessionPolicyError;

use crate::models::Config;

const LONG_REFRESH_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);
const LONG_ACCESS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const LARGE_SWEEP_BATCH: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("invalid session policy")]
    InvalidSessionPolicy(#[from] SessionPolicyError),
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

/// Build the session policy, rejecting impossible combinations
pub fn session_policy(
    refresh_token_ttl: Duration,
    access_token_ttl: Duration,
    sweep_batch_size: usize,
) -> Result<SessionPolicy, ConfigGuardRailError> {
    Ok(SessionPolicy::from_std(
        refresh_token_ttl,
        access_token_ttl,
        sweep_batch_size,
    )?)
}

/// Flag values that are valid but probably not what was intended
pub fn apply_guard_rails(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();
    let sessions = &config.sessions;

    let refresh = sessions.refresh_token_ttl().to_std().unwrap_or_default();
    if refresh > LONG_REFRESH_TTL {
        warnings.push_with_hint(
            "refresh token lifetime exceeds 90 days",
            "Long-lived refresh tokens widen the window for stolen credentials",
        );
    }

    let access = sessions.access_token_ttl().to_std().unwrap_or_default();
    if access > LONG_ACCESS_TTL {
        warnings.push_with_hint(
            "access token lifetime exceeds 24 hours",
            "Access tokens cannot be recalled once issued; keep them short",
        );
    }

    if sessions.sweep_batch_size() > LARGE_SWEEP_BATCH {
        warnings.push(format!(
            "sweep batch size {} is large; each sweep holds the whole batch in memory",
            sessions.sweep_batch_size()
        ));
    }

    if tracing_subscriber::EnvFilter::try_new(&config.logging.filter).is_err() {
        warnings.push_with_hint(
            format!("log filter '{}' is not a valid directive list", config.logging.filter),
            "Use EnvFilter syntax such as `info,tollgate_core=debug`",
        );
    }

    warnings
}
