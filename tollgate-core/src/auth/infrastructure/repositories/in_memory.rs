//! Process-local [`AuthRepository`] for tests and embedding.
//!
//! Sessions live in a map behind a `tokio` [`RwLock`]. Saves are
//! compare-and-swap on the session version and enforce the per-user
//! session limit; batch saves validate every member under the write lock
//! before applying any of them.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tollgate_model::{Clock, CredentialId, SessionId, SystemClock, UserId};
use tracing::{debug, warn};

use crate::auth::domain::aggregates::Session;
use crate::auth::domain::collections::SessionCollection;
use crate::auth::domain::repositories::{
    AuthRepository, SessionLimitExceeded, StaleSessionVersion,
};
use crate::auth::policy::{
    DEFAULT_SWEEP_BATCH_SIZE, MAX_SESSIONS_PER_USER, SessionPolicy,
};

#[derive(Debug)]
pub struct InMemoryAuthRepository {
    sessions: RwLock<HashMap<SessionId, Session>>,
    clock: Arc<dyn Clock>,
    sweep_batch_size: usize,
}

impl Default for InMemoryAuthRepository {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryAuthRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }

    /// Size sweep batches from the policy the service runs with
    pub fn for_policy(policy: &SessionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock).with_sweep_batch_size(policy.sweep_batch_size())
    }

    pub fn with_sweep_batch_size(mut self, sweep_batch_size: usize) -> Self {
        self.sweep_batch_size = sweep_batch_size.max(1);
        self
    }

    /// Number of stored sessions, tombstones included
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Stored sessions matching `filter`, oldest first
    async fn select<F>(&self, filter: F) -> Vec<Session>
    where
        F: Fn(&Session) -> bool,
    {
        let sessions = self.sessions.read().await;
        let mut selected: Vec<Session> =
            sessions.values().filter(|s| filter(s)).cloned().collect();
        selected.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        selected
    }

    async fn sweep<F>(&self, filter: F) -> Result<SessionCollection>
    where
        F: Fn(&Session) -> bool,
    {
        let mut selected = self.select(filter).await;
        selected.truncate(self.sweep_batch_size);
        Ok(SessionCollection::from_sweep(self.sweep_batch_size, selected)?)
    }
}

fn check_version(
    stored: &HashMap<SessionId, Session>,
    session: &Session,
) -> Result<(), StaleSessionVersion> {
    let current = stored.get(&session.id()).map(Session::version);
    let accepted = match current {
        Some(version) => version == session.version(),
        None => session.version() == 0,
    };

    if accepted {
        Ok(())
    } else {
        warn!(
            session_id = %session.id(),
            attempted = session.version(),
            stored = ?current,
            "rejected stale session write"
        );
        Err(StaleSessionVersion {
            session_id: session.id(),
            attempted: session.version(),
            stored: current,
        })
    }
}

/// Reject a new unrevoked session for a user already at the limit.
///
/// `pending` counts new sessions for the same user admitted earlier in the
/// same batch.
fn check_capacity(
    stored: &HashMap<SessionId, Session>,
    session: &Session,
    pending: usize,
) -> Result<(), SessionLimitExceeded> {
    if stored.contains_key(&session.id()) || session.is_revoked() {
        return Ok(());
    }

    let user_id = session.user_id();
    let held = stored
        .values()
        .filter(|s| s.user_id() == user_id && !s.is_revoked())
        .count()
        + pending;
    if held < MAX_SESSIONS_PER_USER {
        return Ok(());
    }

    warn!(
        session_id = %session.id(),
        user_id = %user_id,
        held,
        "rejected session past the per-user limit"
    );
    Err(SessionLimitExceeded {
        user_id,
        limit: MAX_SESSIONS_PER_USER,
    })
}

/// Copy kept in storage: no pending events, version advanced
fn persisted_copy(session: &Session) -> Session {
    let mut stored = session.clone();
    stored.take_events();
    stored.mark_persisted();
    stored
}

/// Mutate a stored session in place and advance its version so holders of
/// older copies are rejected on their next save.
fn revoke_stored(session: &mut Session, now: chrono::DateTime<chrono::Utc>) -> bool {
    if !session.revoke_at(now) {
        return false;
    }
    session.take_events();
    session.mark_persisted();
    true
}

#[async_trait]
impl AuthRepository for InMemoryAuthRepository {
    async fn save_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        check_version(&sessions, session)?;
        check_capacity(&sessions, session, 0)?;
        sessions.insert(session.id(), persisted_copy(session));
        debug!(session_id = %session.id(), version = session.version() + 1, "session stored");
        Ok(())
    }

    async fn save_sessions(&self, batch: &SessionCollection) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let mut admitted: HashMap<UserId, usize> = HashMap::new();
        for session in batch {
            check_version(&sessions, session)?;
            let pending = admitted.get(&session.user_id()).copied().unwrap_or(0);
            check_capacity(&sessions, session, pending)?;
            if !sessions.contains_key(&session.id()) && !session.is_revoked() {
                *admitted.entry(session.user_id()).or_default() += 1;
            }
        }
        for session in batch {
            sessions.insert(session.id(), persisted_copy(session));
        }
        debug!(count = batch.len(), "session batch stored");
        Ok(())
    }

    async fn revoke_session(&self, session_id: SessionId) -> Result<()> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(session) => {
                revoke_stored(session, now);
            }
            None => debug!(session_id = %session_id, "revoke for unknown session ignored"),
        }
        Ok(())
    }

    async fn revoke_all_sessions_for_user(&self, user_id: UserId) -> Result<u64> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        let mut revoked = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.user_id() == user_id && s.is_active_at(now))
        {
            if revoke_stored(session, now) {
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn count_active_sessions_for_user(&self, user_id: UserId) -> Result<u64> {
        let now = self.clock.now();
        let sessions = self.sessions.read().await;
        let count = sessions
            .values()
            .filter(|s| s.user_id() == user_id && s.is_active_at(now))
            .count();
        Ok(count as u64)
    }

    async fn find_session_by_token(
        &self,
        refresh_token_id: CredentialId,
    ) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.refresh_token().id() == refresh_token_id)
            .cloned())
    }

    async fn find_session_by_id(&self, session_id: SessionId) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn find_all_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<SessionCollection> {
        let selected = self
            .select(|s| s.user_id() == user_id && !s.is_revoked())
            .await;
        Ok(SessionCollection::from_user_sessions(user_id, selected)?)
    }

    async fn find_expired_sessions(&self) -> Result<SessionCollection> {
        let now = self.clock.now();
        self.sweep(|s| !s.is_revoked() && s.is_expired_at(now)).await
    }

    async fn find_inactive_sessions(&self) -> Result<SessionCollection> {
        let now = self.clock.now();
        self.sweep(|s| !s.is_revoked() && !s.is_active_at(now)).await
    }
}
