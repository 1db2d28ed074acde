use chrono::{DateTime, Duration, Utc};
use tollgate_model::{CredentialId, ExpiresAt, RevokedAt, SessionId, UserId};

use super::{AccessToken, AccessTokenProps, RefreshToken, RefreshTokenProps};
use crate::auth::domain::value_objects::{TokenValue, ValidationError};
use crate::auth::policy::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_REFRESH_TOKEN_TTL_SECS,
};

/// Mints refresh tokens with a lifetime fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTokenFactory {
    lifetime: Duration,
}

impl Default for RefreshTokenFactory {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECS))
    }
}

impl RefreshTokenFactory {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a fresh, unrevoked token for `session_id`
    pub fn create_new(
        &self,
        token: TokenValue,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> Result<RefreshToken, ValidationError> {
        let expires_at = ExpiresAt::after(now, self.lifetime)?;

        Ok(RefreshToken::create(RefreshTokenProps {
            id: CredentialId::new(),
            session_id,
            token,
            created_at: now,
            expires_at,
            revoked_at: RevokedAt::none(),
        }))
    }
}

/// Mints access tokens with a lifetime fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessTokenFactory {
    lifetime: Duration,
}

impl Default for AccessTokenFactory {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS))
    }
}

impl AccessTokenFactory {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn create_new(
        &self,
        token: TokenValue,
        session_id: SessionId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, ValidationError> {
        let expires_at = ExpiresAt::after(now, self.lifetime)?;

        Ok(AccessToken::create(AccessTokenProps {
            id: CredentialId::new(),
            session_id,
            user_id,
            token,
            created_at: now,
            expires_at,
            revoked_at: RevokedAt::none(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value() -> TokenValue {
        TokenValue::parse("header.payload.signature").unwrap()
    }

    #[test]
    fn fresh_tokens_are_active_with_default_lifetimes() {
        let now = Utc::now();
        let refresh = RefreshTokenFactory::default()
            .create_new(value(), SessionId::new(), now)
            .unwrap();
        assert!(refresh.is_active_at(now));
        assert!(!refresh.is_expired_at(now));
        assert_eq!(refresh.expires_at().value(), now + Duration::days(7));

        let access = AccessTokenFactory::default()
            .create_new(value(), SessionId::new(), UserId::new(), now)
            .unwrap();
        assert!(access.is_active_at(now));
        assert_eq!(access.expires_at().value(), now + Duration::hours(1));
    }

    #[test]
    fn access_token_expires_after_an_hour() {
        let now = Utc::now();
        let access = AccessTokenFactory::default()
            .create_new(value(), SessionId::new(), UserId::new(), now)
            .unwrap();
        assert!(access.is_active_at(now + Duration::minutes(59)));
        assert!(access.is_expired_at(now + Duration::minutes(61)));
    }

    #[test]
    fn non_positive_lifetime_is_a_validation_failure() {
        let factory = RefreshTokenFactory::new(Duration::zero());
        let err = factory
            .create_new(value(), SessionId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::Model(_)));
    }
}
