use chrono::{DateTime, Utc};
use tollgate_model::{CredentialId, ExpiresAt, RevokedAt, SessionId, UserId};

use crate::auth::domain::value_objects::TokenValue;

/// Field set used to rehydrate a stored access token
#[derive(Debug, Clone)]
pub struct AccessTokenProps {
    pub id: CredentialId,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub token: TokenValue,
    pub created_at: DateTime<Utc>,
    pub expires_at: ExpiresAt,
    pub revoked_at: RevokedAt,
}

/// Short-lived credential handed to the caller on refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    id: CredentialId,
    session_id: SessionId,
    user_id: UserId,
    token: TokenValue,
    created_at: DateTime<Utc>,
    expires_at: ExpiresAt,
    revoked_at: RevokedAt,
}

impl AccessToken {
    pub fn create(props: AccessTokenProps) -> Self {
        Self {
            id: props.id,
            session_id: props.session_id,
            user_id: props.user_id,
            token: props.token,
            created_at: props.created_at,
            expires_at: props.expires_at,
            revoked_at: props.revoked_at,
        }
    }

    pub fn revoke(&mut self) -> bool {
        self.revoke_at(Utc::now())
    }

    pub fn revoke_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.revoked_at.is_revoked() {
            return false;
        }
        self.revoked_at = RevokedAt::at(now);
        true
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_revoked()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_expired_at(now)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }

    pub fn id(&self) -> CredentialId {
        self.id
    }
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn token(&self) -> &TokenValue {
        &self.token
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn expires_at(&self) -> ExpiresAt {
        self.expires_at
    }
    pub fn revoked_at(&self) -> RevokedAt {
        self.revoked_at
    }
}
