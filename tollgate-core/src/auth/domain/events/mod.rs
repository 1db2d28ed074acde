use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tollgate_model::{CredentialId, ExpiresAt, SessionId, UserId};

/// Domain events for the session lifecycle
///
/// Recorded on the [`Session`](super::aggregates::Session) aggregate as it
/// changes and drained by the service after a successful save, for audit
/// trails or integration with other bounded contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    /// A session was opened at login
    SessionCreated {
        session_id: SessionId,
        user_id: UserId,
        refresh_token_id: CredentialId,
        expires_at: ExpiresAt,
        timestamp: DateTime<Utc>,
    },

    /// The session's refresh token was replaced
    RefreshTokenRotated {
        session_id: SessionId,
        user_id: UserId,
        previous_token_id: CredentialId,
        refresh_token_id: CredentialId,
        expires_at: ExpiresAt,
        timestamp: DateTime<Utc>,
    },

    /// The session was revoked, explicitly or by a sweep
    SessionRevoked {
        session_id: SessionId,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionCreated { timestamp, .. } => *timestamp,
            Self::RefreshTokenRotated { timestamp, .. } => *timestamp,
            Self::SessionRevoked { timestamp, .. } => *timestamp,
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            Self::SessionCreated { session_id, .. } => *session_id,
            Self::RefreshTokenRotated { session_id, .. } => *session_id,
            Self::SessionRevoked { session_id, .. } => *session_id,
        }
    }

    /// Get the user ID associated with the event
    pub fn user_id(&self) -> UserId {
        match self {
            Self::SessionCreated { user_id, .. } => *user_id,
            Self::RefreshTokenRotated { user_id, .. } => *user_id,
            Self::SessionRevoked { user_id, .. } => *user_id,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "session_created",
            Self::RefreshTokenRotated { .. } => "refresh_token_rotated",
            Self::SessionRevoked { .. } => "session_revoked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = AuthEvent::SessionRevoked {
            session_id: SessionId::new(),
            user_id: UserId::new(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_revoked");
        assert_eq!(json["session_id"], event.session_id().to_string());
        assert_eq!(event.event_type(), "session_revoked");
    }
}
