use chrono::Duration;
use thiserror::Error;

use crate::auth::domain::credentials::{AccessTokenFactory, RefreshTokenFactory};

/// Most sessions a single user may hold at once
pub const MAX_SESSIONS_PER_USER: usize = 5;

pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionPolicyError {
    #[error("{field} must be positive")]
    NonPositiveLifetime { field: &'static str },
    #[error("access token lifetime must be shorter than refresh token lifetime")]
    AccessOutlivesRefresh,
    #[error("sweep batch size must be at least 1")]
    EmptySweepBatch,
    #[error("{field} is out of range")]
    OutOfRange { field: &'static str },
}

/// Credential lifetimes and sweep sizing, fixed when the service is built.
///
/// Lifetimes flow into the token factories and cannot be overridden per
/// call, so every credential minted by one service shares the same bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    refresh_token_ttl: Duration,
    access_token_ttl: Duration,
    sweep_batch_size: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }
}

impl SessionPolicy {
    pub fn new(
        refresh_token_ttl: Duration,
        access_token_ttl: Duration,
        sweep_batch_size: usize,
    ) -> Result<Self, SessionPolicyError> {
        if refresh_token_ttl <= Duration::zero() {
            return Err(SessionPolicyError::NonPositiveLifetime {
                field: "refresh token lifetime",
            });
        }
        if access_token_ttl <= Duration::zero() {
            return Err(SessionPolicyError::NonPositiveLifetime {
                field: "access token lifetime",
            });
        }
        if access_token_ttl >= refresh_token_ttl {
            return Err(SessionPolicyError::AccessOutlivesRefresh);
        }
        if sweep_batch_size == 0 {
            return Err(SessionPolicyError::EmptySweepBatch);
        }

        Ok(Self {
            refresh_token_ttl,
            access_token_ttl,
            sweep_batch_size,
        })
    }

    /// Build from `std` durations, as produced by configuration parsing
    pub fn from_std(
        refresh_token_ttl: std::time::Duration,
        access_token_ttl: std::time::Duration,
        sweep_batch_size: usize,
    ) -> Result<Self, SessionPolicyError> {
        let refresh = Duration::from_std(refresh_token_ttl).map_err(|_| {
            SessionPolicyError::OutOfRange {
                field: "refresh token lifetime",
            }
        })?;
        let access = Duration::from_std(access_token_ttl).map_err(|_| {
            SessionPolicyError::OutOfRange {
                field: "access token lifetime",
            }
        })?;
        Self::new(refresh, access, sweep_batch_size)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    pub fn sweep_batch_size(&self) -> usize {
        self.sweep_batch_size
    }

    pub fn refresh_token_factory(&self) -> RefreshTokenFactory {
        RefreshTokenFactory::new(self.refresh_token_ttl)
    }

    pub fn access_token_factory(&self) -> AccessTokenFactory {
        AccessTokenFactory::new(self.access_token_ttl)
    }
}
