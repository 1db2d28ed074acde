use std::fmt;
use std::sync::Arc;

use tollgate_model::{Clock, CredentialId, RevokedAt, SessionId, SystemClock, UserId};
use tracing::{debug, info, warn};

use super::error::{DomainServiceError, SessionLookupError};
use crate::auth::domain::aggregates::{Session, SessionProps};
use crate::auth::domain::collections::{CollectionError, SessionCollection};
use crate::auth::domain::credentials::{AccessToken, RefreshToken};
use crate::auth::domain::events::AuthEvent;
use crate::auth::domain::repositories::{AuthEventSink, AuthRepository};
use crate::auth::domain::value_objects::{IpAddress, TokenValue, UserAgent};
use crate::auth::policy::{MAX_SESSIONS_PER_USER, SessionPolicy};

/// Credentials handed back after a successful refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub session_id: SessionId,
    pub access_token: AccessToken,
    /// Snapshot of the session's new current refresh token
    pub refresh_token: RefreshToken,
}

/// Orchestrates the session lifecycle against an [`AuthRepository`].
///
/// Holds no mutable state between calls. Every change goes through the
/// entity methods, then the repository, then the optional event sink.
pub struct AuthService {
    repository: Arc<dyn AuthRepository>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    event_sink: Option<Arc<dyn AuthEventSink>>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("repository_refs", &Arc::strong_count(&self.repository))
            .field("clock", &self.clock)
            .field("policy", &self.policy)
            .field(
                "event_sink_refs",
                &self.event_sink.as_ref().map(Arc::strong_count),
            )
            .finish()
    }
}

impl AuthService {
    pub fn new(repository: Arc<dyn AuthRepository>, policy: SessionPolicy) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
            policy,
            event_sink: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn AuthEventSink>) -> Self {
        self.event_sink = Some(event_sink);
        self
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Open a session at login.
    ///
    /// If the user is at the session limit, their expired sessions are
    /// revoked first; the call fails only if the limit is still reached.
    /// The repository re-checks the limit when it stores the new session,
    /// so concurrent logins cannot overshoot it.
    pub async fn create_session(
        &self,
        user_agent: UserAgent,
        ip_address: IpAddress,
        user_id: UserId,
        token: TokenValue,
    ) -> Result<Session, DomainServiceError> {
        const OP: &str = "create_session";
        let now = self.clock.now();

        let mut existing = self
            .repository
            .find_all_sessions_for_user(user_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;
        self.ensure_capacity(OP, &mut existing).await?;

        let session_id = SessionId::new();
        let refresh_token = self
            .policy
            .refresh_token_factory()
            .create_new(token, session_id, now)
            .map_err(|e| DomainServiceError::validation(OP, e))?;

        let mut session = Session::create_at(
            SessionProps {
                id: session_id,
                user_id,
                ip_address,
                user_agent,
                refresh_token,
                created_at: now,
                updated_at: now,
                revoked_at: RevokedAt::none(),
                version: 0,
            },
            now,
        )
        .map_err(|e| DomainServiceError::invariant(OP, e))?;

        self.repository
            .save_session(&session)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;
        session.mark_persisted();

        info!(
            session_id = %session.id(),
            user_id = %user_id,
            expires_at = %session.expires_at(),
            "session created"
        );

        self.publish_events(session.take_events()).await?;
        Ok(session)
    }

    async fn ensure_capacity(
        &self,
        operation: &'static str,
        sessions: &mut SessionCollection,
    ) -> Result<(), DomainServiceError> {
        if sessions.len() < MAX_SESSIONS_PER_USER {
            return Ok(());
        }

        let reclaimed = sessions.revoke_expired_at(self.clock.now());
        if reclaimed > 0 {
            self.repository
                .save_sessions(sessions)
                .await
                .map_err(|e| DomainServiceError::repository(operation, e))?;
            sessions.mark_persisted();
            debug!(reclaimed, "revoked expired sessions to make room");
            self.publish_events(sessions.take_events()).await?;
        }

        if sessions.active_count() >= MAX_SESSIONS_PER_USER {
            return Err(DomainServiceError::collection(
                operation,
                CollectionError::CapacityExceeded {
                    capacity: MAX_SESSIONS_PER_USER,
                },
            ));
        }
        Ok(())
    }

    /// Revoke one session. `false` if it does not exist or is already revoked.
    pub async fn revoke_session(
        &self,
        session_id: SessionId,
    ) -> Result<bool, DomainServiceError> {
        const OP: &str = "revoke_session";

        let Some(mut session) = self
            .repository
            .find_session_by_id(session_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?
        else {
            debug!(session_id = %session_id, "revoke requested for unknown session");
            return Ok(false);
        };

        if !session.revoke_at(self.clock.now()) {
            return Ok(false);
        }

        self.repository
            .save_session(&session)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;
        session.mark_persisted();

        info!(session_id = %session_id, user_id = %session.user_id(), "session revoked");
        self.publish_events(session.take_events()).await?;
        Ok(true)
    }

    /// Revoke every active session of a user.
    ///
    /// Compares the repository's active count with the number it reports
    /// revoking. A mismatch means something changed underneath us; it is
    /// logged and reported as `false`, never as an error.
    pub async fn revoke_all_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<bool, DomainServiceError> {
        const OP: &str = "revoke_all_sessions_for_user";

        let expected = self
            .repository
            .count_active_sessions_for_user(user_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;
        let revoked = self
            .repository
            .revoke_all_sessions_for_user(user_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;

        if revoked != expected {
            warn!(
                user_id = %user_id,
                expected,
                revoked,
                "bulk revoke count does not match active session count"
            );
            return Ok(false);
        }

        info!(user_id = %user_id, revoked, "revoked all sessions for user");
        Ok(true)
    }

    /// Replace a session's refresh token with one minted from `token`
    pub async fn rotate_refresh_token(
        &self,
        token: TokenValue,
        session_id: SessionId,
    ) -> Result<Session, DomainServiceError> {
        const OP: &str = "rotate_refresh_token";

        let session = self
            .repository
            .find_session_by_id(session_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?
            .ok_or_else(|| {
                DomainServiceError::lookup(
                    OP,
                    SessionLookupError::MissingSession(session_id),
                )
            })?;

        self.rotate_loaded(OP, session, token).await
    }

    /// Rotate `session` as it was loaded. The save is checked against the
    /// version it was read at, so a concurrent change makes it fail.
    async fn rotate_loaded(
        &self,
        operation: &'static str,
        mut session: Session,
        token: TokenValue,
    ) -> Result<Session, DomainServiceError> {
        let session_id = session.id();
        let now = self.clock.now();
        let replacement = self
            .policy
            .refresh_token_factory()
            .create_new(token, session_id, now)
            .map_err(|e| DomainServiceError::validation(operation, e))?;

        let previous = session
            .rotate_refresh_token_at(replacement, now)
            .map_err(|e| DomainServiceError::invariant(operation, e))?;

        self.repository
            .save_session(&session)
            .await
            .map_err(|e| DomainServiceError::repository(operation, e))?;
        session.mark_persisted();

        debug!(
            session_id = %session_id,
            previous_token_id = %previous.id(),
            refresh_token_id = %session.refresh_token().id(),
            "refresh token rotated"
        );

        self.publish_events(session.take_events()).await?;
        Ok(session)
    }

    /// Exchange the session holding `refresh_token_id` for fresh credentials.
    ///
    /// `refresh_token` and `access_token` are the newly signed values for
    /// the rotated refresh token and the new access token.
    pub async fn refresh_session(
        &self,
        refresh_token_id: CredentialId,
        refresh_token: TokenValue,
        access_token: TokenValue,
    ) -> Result<TokenPair, DomainServiceError> {
        const OP: &str = "refresh_session";

        let session = self
            .repository
            .find_session_by_token(refresh_token_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?
            .ok_or_else(|| {
                DomainServiceError::lookup(
                    OP,
                    SessionLookupError::MissingToken(refresh_token_id),
                )
            })?;

        if session.refresh_token().id() != refresh_token_id {
            return Err(DomainServiceError::lookup(
                OP,
                SessionLookupError::MissingToken(refresh_token_id),
            ));
        }
        if !session.is_active_at(self.clock.now()) {
            return Err(DomainServiceError::lookup(
                OP,
                SessionLookupError::Inactive(session.id()),
            ));
        }

        // Rotate the copy found by token id so a concurrent refresh with the
        // same token loses the version check
        let rotated = self.rotate_loaded(OP, session, refresh_token).await?;

        let access_token = self
            .policy
            .access_token_factory()
            .create_new(
                access_token,
                rotated.id(),
                rotated.user_id(),
                self.clock.now(),
            )
            .map_err(|e| DomainServiceError::validation(OP, e))?;

        Ok(TokenPair {
            session_id: rotated.id(),
            access_token,
            refresh_token: rotated.refresh_token().clone(),
        })
    }

    /// Whether `presented` is the live refresh token `refresh_token_id`
    pub async fn validate_refresh_token(
        &self,
        refresh_token_id: CredentialId,
        presented: &str,
    ) -> Result<bool, DomainServiceError> {
        const OP: &str = "validate_refresh_token";

        let Some(session) = self
            .repository
            .find_session_by_token(refresh_token_id)
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?
        else {
            return Ok(false);
        };

        let current = session.refresh_token();
        Ok(session.is_active_at(self.clock.now())
            && current.id() == refresh_token_id
            && current.token().secure_compare(presented))
    }

    pub async fn get_session_by_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Session>, DomainServiceError> {
        self.repository
            .find_session_by_id(session_id)
            .await
            .map_err(|e| DomainServiceError::repository("get_session_by_id", e))
    }

    /// The user's unrevoked sessions, or `None` if there are none
    pub async fn get_all_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<SessionCollection>, DomainServiceError> {
        let sessions = self
            .repository
            .find_all_sessions_for_user(user_id)
            .await
            .map_err(|e| {
                DomainServiceError::repository("get_all_sessions_for_user", e)
            })?;

        Ok((!sessions.is_empty()).then_some(sessions))
    }

    /// Sweep one batch of expired sessions into the revoked state.
    ///
    /// A batch holds at most the policy's sweep batch size, so one call may
    /// leave matches behind. Repeat until it returns 0 to drain them all.
    pub async fn revoke_expired_sessions(&self) -> Result<usize, DomainServiceError> {
        const OP: &str = "revoke_expired_sessions";

        let mut batch = self
            .repository
            .find_expired_sessions()
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;
        let revoked = batch.revoke_expired_at(self.clock.now());

        self.persist_sweep(OP, batch, revoked).await
    }

    /// Sweep one batch of inactive sessions into the revoked state.
    ///
    /// A batch holds at most the policy's sweep batch size, so one call may
    /// leave matches behind. Repeat until it returns 0 to drain them all.
    pub async fn revoke_inactive_sessions(&self) -> Result<usize, DomainServiceError> {
        const OP: &str = "revoke_inactive_sessions";

        let mut batch = self
            .repository
            .find_inactive_sessions()
            .await
            .map_err(|e| DomainServiceError::repository(OP, e))?;
        let revoked = batch.revoke_inactive_at(self.clock.now());

        self.persist_sweep(OP, batch, revoked).await
    }

    async fn persist_sweep(
        &self,
        operation: &'static str,
        mut batch: SessionCollection,
        revoked: usize,
    ) -> Result<usize, DomainServiceError> {
        if revoked == 0 {
            debug!(operation, "sweep found nothing to revoke");
            return Ok(0);
        }

        self.repository
            .save_sessions(&batch)
            .await
            .map_err(|e| DomainServiceError::repository(operation, e))?;
        batch.mark_persisted();

        info!(operation, revoked, batch = batch.len(), "sweep revoked sessions");
        self.publish_events(batch.take_events()).await?;
        Ok(revoked)
    }

    async fn publish_events(&self, events: Vec<AuthEvent>) -> Result<(), DomainServiceError> {
        if events.is_empty() {
            return Ok(());
        }

        for event in &events {
            debug!(
                event = event.event_type(),
                session_id = %event.session_id(),
                user_id = %event.user_id(),
                "auth domain event"
            );
        }

        if let Some(sink) = &self.event_sink {
            sink.record(events)
                .await
                .map_err(|e| DomainServiceError::event_sink("publish_events", e))?;
        }
        Ok(())
    }
}
