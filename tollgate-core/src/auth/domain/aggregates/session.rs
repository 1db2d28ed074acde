use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tollgate_model::{ExpiresAt, RevokedAt, SessionId, UserId};

use crate::auth::domain::credentials::RefreshToken;
use crate::auth::domain::events::AuthEvent;
use crate::auth::domain::value_objects::{IpAddress, UserAgent};

/// Errors raised by session invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {session_id} cannot be created: {reason}")]
    EntityCreationRejected {
        session_id: SessionId,
        reason: CreationRejection,
    },

    #[error("cannot rotate refresh token of session {session_id}: {reason}")]
    RotationRejected {
        session_id: SessionId,
        reason: RotationRejection,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationRejection {
    /// The supplied refresh token is revoked or expired
    InactiveRefreshToken,
    /// The refresh token was minted for another session
    ForeignRefreshToken,
}

impl fmt::Display for CreationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InactiveRefreshToken => {
                f.write_str("refresh token is not active")
            }
            Self::ForeignRefreshToken => {
                f.write_str("refresh token belongs to another session")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationRejection {
    /// The session has already been revoked
    SessionRevoked,
    /// The replacement was minted for another session
    ForeignRefreshToken,
    /// The replacement is itself revoked or expired
    InactiveRefreshToken,
}

impl fmt::Display for RotationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionRevoked => f.write_str("session is revoked"),
            Self::ForeignRefreshToken => {
                f.write_str("replacement token belongs to another session")
            }
            Self::InactiveRefreshToken => {
                f.write_str("replacement token is not active")
            }
        }
    }
}

/// Field set for building or rehydrating a session
#[derive(Debug, Clone)]
pub struct SessionProps {
    pub id: SessionId,
    pub user_id: UserId,
    pub ip_address: IpAddress,
    pub user_agent: UserAgent,
    pub refresh_token: RefreshToken,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revoked_at: RevokedAt,
    pub version: u64,
}

/// Session aggregate root
///
/// A session is opened once at login and owns exactly one current refresh
/// token by value. It changes only through [`Session::rotate_refresh_token`]
/// and [`Session::revoke`]; revoked and expired sessions are kept as
/// tombstones, never deleted.
///
/// `version` is the persisted version the aggregate was loaded at.
/// Repositories compare it on save to detect lost updates.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    ip_address: IpAddress,
    user_agent: UserAgent,
    refresh_token: RefreshToken,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revoked_at: RevokedAt,
    version: u64,

    /// Domain events to be published
    events: Vec<AuthEvent>,
}

impl Session {
    /// Open a new session, checking the refresh token against the wall clock
    pub fn create(props: SessionProps) -> Result<Self, SessionError> {
        Self::create_at(props, Utc::now())
    }

    /// Open a new session. The refresh token must belong to this session and
    /// be active at `now`.
    pub fn create_at(
        props: SessionProps,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if props.refresh_token.session_id() != props.id {
            return Err(SessionError::EntityCreationRejected {
                session_id: props.id,
                reason: CreationRejection::ForeignRefreshToken,
            });
        }
        if !props.refresh_token.is_active_at(now) {
            return Err(SessionError::EntityCreationRejected {
                session_id: props.id,
                reason: CreationRejection::InactiveRefreshToken,
            });
        }

        let mut session = Self::restore(props);
        session.add_event(AuthEvent::SessionCreated {
            session_id: session.id,
            user_id: session.user_id,
            refresh_token_id: session.refresh_token.id(),
            expires_at: session.expires_at(),
            timestamp: now,
        });

        Ok(session)
    }

    /// Reassemble a stored session without re-checking creation invariants.
    ///
    /// Used by repositories, which legitimately hold revoked and expired
    /// sessions.
    pub fn restore(props: SessionProps) -> Self {
        Self {
            id: props.id,
            user_id: props.user_id,
            ip_address: props.ip_address,
            user_agent: props.user_agent,
            refresh_token: props.refresh_token,
            created_at: props.created_at,
            updated_at: props.updated_at,
            revoked_at: props.revoked_at,
            version: props.version,
            events: Vec::new(),
        }
    }

    pub fn revoke(&mut self) -> bool {
        self.revoke_at(Utc::now())
    }

    /// Revoke the session and its refresh token.
    ///
    /// Returns `false` without touching anything if already revoked.
    pub fn revoke_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.revoked_at.is_revoked() {
            return false;
        }

        self.refresh_token.revoke_at(now);
        self.revoked_at = RevokedAt::at(now);
        self.updated_at = now;

        self.add_event(AuthEvent::SessionRevoked {
            session_id: self.id,
            user_id: self.user_id,
            timestamp: now,
        });

        true
    }

    pub fn rotate_refresh_token(
        &mut self,
        new_token: RefreshToken,
    ) -> Result<RefreshToken, SessionError> {
        self.rotate_refresh_token_at(new_token, Utc::now())
    }

    /// Replace the current refresh token, returning the revoked previous one.
    ///
    /// All checks run before any mutation, so a rejected rotation leaves the
    /// session untouched.
    pub fn rotate_refresh_token_at(
        &mut self,
        new_token: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RefreshToken, SessionError> {
        let session_id = self.id;
        let reject = move |reason: RotationRejection| {
            SessionError::RotationRejected { session_id, reason }
        };

        if self.revoked_at.is_revoked() {
            return Err(reject(RotationRejection::SessionRevoked));
        }
        if new_token.session_id() != self.id {
            return Err(reject(RotationRejection::ForeignRefreshToken));
        }
        if !new_token.is_active_at(now) {
            return Err(reject(RotationRejection::InactiveRefreshToken));
        }

        let mut previous =
            std::mem::replace(&mut self.refresh_token, new_token);
        previous.revoke_at(now);
        self.updated_at = now;

        self.add_event(AuthEvent::RefreshTokenRotated {
            session_id: self.id,
            user_id: self.user_id,
            previous_token_id: previous.id(),
            refresh_token_id: self.refresh_token.id(),
            expires_at: self.refresh_token.expires_at(),
            timestamp: now,
        });

        Ok(previous)
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_revoked()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.refresh_token.is_expired_at(now)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && self.refresh_token.is_active_at(now)
    }

    /// Always the current refresh token's expiry
    pub fn expires_at(&self) -> ExpiresAt {
        self.refresh_token.expires_at()
    }

    /// Advance the version after the repository accepted a save
    pub fn mark_persisted(&mut self) {
        self.version += 1;
    }

    /// Add a domain event
    fn add_event(&mut self, event: AuthEvent) {
        self.events.push(event);
    }

    /// Take all pending events (for publishing)
    pub fn take_events(&mut self) -> Vec<AuthEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[AuthEvent] {
        &self.events
    }

    // Getters for read-only access
    pub fn id(&self) -> SessionId {
        self.id
    }
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn ip_address(&self) -> &IpAddress {
        &self.ip_address
    }
    pub fn user_agent(&self) -> &UserAgent {
        &self.user_agent
    }
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    pub fn revoked_at(&self) -> RevokedAt {
        self.revoked_at
    }
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::credentials::RefreshTokenFactory;
    use crate::auth::domain::value_objects::TokenValue;
    use chrono::Duration;

    fn token_value() -> TokenValue {
        TokenValue::parse("aaaa.bbbb.cccc").unwrap()
    }

    fn props(id: SessionId, token: RefreshToken, now: DateTime<Utc>) -> SessionProps {
        SessionProps {
            id,
            user_id: UserId::new(),
            ip_address: IpAddress::parse("192.0.2.10").unwrap(),
            user_agent: UserAgent::parse("tollgate-tests/1.0").unwrap(),
            refresh_token: token,
            created_at: now,
            updated_at: now,
            revoked_at: RevokedAt::none(),
            version: 0,
        }
    }

    fn open_session(now: DateTime<Utc>) -> Session {
        let id = SessionId::new();
        let token = RefreshTokenFactory::default()
            .create_new(token_value(), id, now)
            .unwrap();
        Session::create_at(props(id, token, now), now).unwrap()
    }

    #[test]
    fn create_records_event_and_mirrors_token_expiry() {
        let now = Utc::now();
        let mut session = open_session(now);

        assert!(session.is_active_at(now));
        assert_eq!(session.expires_at(), session.refresh_token().expires_at());
        assert_eq!(session.version(), 0);

        let events = session.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "session_created");
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn create_rejects_inactive_or_foreign_tokens() {
        let now = Utc::now();
        let id = SessionId::new();
        let factory = RefreshTokenFactory::default();

        let mut revoked = factory.create_new(token_value(), id, now).unwrap();
        revoked.revoke_at(now);
        let err = Session::create_at(props(id, revoked, now), now).unwrap_err();
        assert_eq!(
            err,
            SessionError::EntityCreationRejected {
                session_id: id,
                reason: CreationRejection::InactiveRefreshToken,
            }
        );

        let expired = factory.create_new(token_value(), id, now).unwrap();
        let later = now + Duration::days(8);
        assert!(Session::create_at(props(id, expired, now), later).is_err());

        let foreign = factory
            .create_new(token_value(), SessionId::new(), now)
            .unwrap();
        let err = Session::create_at(props(id, foreign, now), now).unwrap_err();
        assert!(matches!(
            err,
            SessionError::EntityCreationRejected {
                reason: CreationRejection::ForeignRefreshToken,
                ..
            }
        ));
    }

    #[test]
    fn revoke_cascades_and_is_idempotent() {
        let now = Utc::now();
        let mut session = open_session(now);
        session.take_events();

        let later = now + Duration::minutes(10);
        assert!(session.revoke_at(later));
        assert!(session.is_revoked());
        assert!(session.refresh_token().is_revoked());
        assert_eq!(session.updated_at(), later);
        assert_eq!(session.take_events().len(), 1);

        let much_later = later + Duration::minutes(10);
        assert!(!session.revoke_at(much_later));
        assert_eq!(session.updated_at(), later);
        assert_eq!(session.revoked_at().value(), Some(later));
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn rotation_revokes_previous_token() {
        let now = Utc::now();
        let mut session = open_session(now);
        let original_id = session.refresh_token().id();

        let later = now + Duration::hours(1);
        let replacement = RefreshTokenFactory::default()
            .create_new(token_value(), session.id(), later)
            .unwrap();
        let replacement_id = replacement.id();

        let previous = session.rotate_refresh_token_at(replacement, later).unwrap();

        assert_eq!(previous.id(), original_id);
        assert!(previous.is_revoked());
        assert_eq!(session.refresh_token().id(), replacement_id);
        assert!(session.refresh_token().is_active_at(later));
        assert_eq!(session.updated_at(), later);
        assert_eq!(session.expires_at(), session.refresh_token().expires_at());
    }

    #[test]
    fn rotation_on_revoked_session_changes_nothing() {
        let now = Utc::now();
        let mut session = open_session(now);
        session.revoke_at(now);
        session.take_events();

        let before_token = session.refresh_token().id();
        let before_updated = session.updated_at();

        let replacement = RefreshTokenFactory::default()
            .create_new(token_value(), session.id(), now)
            .unwrap();
        let err = session
            .rotate_refresh_token_at(replacement, now + Duration::minutes(1))
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::RotationRejected {
                session_id: session.id(),
                reason: RotationRejection::SessionRevoked,
            }
        );
        assert_eq!(session.refresh_token().id(), before_token);
        assert_eq!(session.updated_at(), before_updated);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn rotation_rejects_foreign_replacement() {
        let now = Utc::now();
        let mut session = open_session(now);
        let foreign = RefreshTokenFactory::default()
            .create_new(token_value(), SessionId::new(), now)
            .unwrap();

        let err = session.rotate_refresh_token_at(foreign, now).unwrap_err();
        assert!(matches!(
            err,
            SessionError::RotationRejected {
                reason: RotationRejection::ForeignRefreshToken,
                ..
            }
        ));
        assert!(session.refresh_token().is_active_at(now));
    }

    #[test]
    fn session_expires_with_its_refresh_token() {
        let now = Utc::now();
        let session = open_session(now);
        let later = now + Duration::days(8);

        assert!(session.is_expired_at(later));
        assert!(!session.is_active_at(later));
        assert!(!session.is_revoked());
    }

    #[test]
    fn mark_persisted_advances_version() {
        let mut session = open_session(Utc::now());
        session.mark_persisted();
        session.mark_persisted();
        assert_eq!(session.version(), 2);
    }
}
