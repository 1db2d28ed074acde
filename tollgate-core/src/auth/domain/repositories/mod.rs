use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tollgate_model::{CredentialId, SessionId, UserId};

use crate::auth::domain::aggregates::Session;
use crate::auth::domain::collections::SessionCollection;
use crate::auth::domain::events::AuthEvent;

/// Persistence port for sessions and their refresh tokens.
///
/// Saves are compare-and-swap on [`Session::version`]: a write is accepted
/// only if the stored version equals the aggregate's (or the session is new
/// and its version is 0), after which the stored version is one higher.
/// Rejected writes fail with [`StaleSessionVersion`]. Batch saves check
/// every member before applying any of them.
///
/// Inserting a new unrevoked session for a user who already holds
/// [`MAX_SESSIONS_PER_USER`](crate::auth::policy::MAX_SESSIONS_PER_USER)
/// unrevoked sessions fails with [`SessionLimitExceeded`]. The count and
/// the insert must be one atomic step.
///
/// The expired/inactive finders evaluate their predicate against the
/// repository's own clock and return at most one sweep batch.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn save_session(&self, session: &Session) -> Result<()>;
    async fn save_sessions(&self, sessions: &SessionCollection) -> Result<()>;
    async fn revoke_session(&self, session_id: SessionId) -> Result<()>;
    /// Revoke every active session of the user, returning how many changed
    async fn revoke_all_sessions_for_user(&self, user_id: UserId) -> Result<u64>;
    async fn count_active_sessions_for_user(&self, user_id: UserId) -> Result<u64>;
    /// Look up a session by the id of its current refresh token
    async fn find_session_by_token(
        &self,
        refresh_token_id: CredentialId,
    ) -> Result<Option<Session>>;
    async fn find_session_by_id(&self, session_id: SessionId) -> Result<Option<Session>>;
    /// The user's unrevoked sessions. Revoked tombstones are not included.
    async fn find_all_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<SessionCollection>;
    async fn find_expired_sessions(&self) -> Result<SessionCollection>;
    async fn find_inactive_sessions(&self) -> Result<SessionCollection>;
}

/// Receiver for domain events drained after successful saves
#[async_trait]
pub trait AuthEventSink: Send + Sync {
    async fn record(&self, events: Vec<AuthEvent>) -> Result<()>;
}

/// A save carried a version that no longer matches storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "session {session_id} was modified concurrently (write at version {attempted}, stored {stored:?})"
)]
pub struct StaleSessionVersion {
    pub session_id: SessionId,
    pub attempted: u64,
    /// `None` when the session does not exist in storage
    pub stored: Option<u64>,
}

/// A new session would take the user past the per-user session limit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user {user_id} already holds {limit} unrevoked sessions")]
pub struct SessionLimitExceeded {
    pub user_id: UserId,
    pub limit: usize,
}
