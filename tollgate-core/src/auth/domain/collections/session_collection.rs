//! Bounded, linearly scanned set of sessions.
//!
//! A user-scoped collection holds at most [`MAX_SESSIONS_PER_USER`]
//! sessions for a single user. Sweep-scoped collections carry expired or
//! inactive sessions across users in batches sized by the session policy.
//! Neither kind ever evicts: a full collection rejects further inserts.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tollgate_model::{SessionId, UserId};

use crate::auth::domain::aggregates::Session;
use crate::auth::domain::events::AuthEvent;
use crate::auth::domain::value_objects::{IpAddress, UserAgent};
use crate::auth::policy::MAX_SESSIONS_PER_USER;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("session collection is full ({capacity} sessions)")]
    CapacityExceeded { capacity: usize },

    #[error("session {0} is already in the collection")]
    DuplicateSession(SessionId),

    #[error("session {session_id} belongs to user {found}, not {expected}")]
    ScopeMismatch {
        session_id: SessionId,
        expected: UserId,
        found: UserId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionScope {
    /// Sessions of one user
    User(UserId),
    /// Cross-user batch for expiry sweeps
    Sweep,
}

#[derive(Debug, Clone)]
pub struct SessionCollection {
    scope: CollectionScope,
    capacity: usize,
    sessions: Vec<Session>,
}

impl SessionCollection {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            scope: CollectionScope::User(user_id),
            capacity: MAX_SESSIONS_PER_USER,
            sessions: Vec::with_capacity(MAX_SESSIONS_PER_USER),
        }
    }

    pub fn sweep_batch(capacity: usize) -> Self {
        Self {
            scope: CollectionScope::Sweep,
            capacity,
            sessions: Vec::new(),
        }
    }

    /// Rebuild a user collection from stored sessions.
    ///
    /// Duplicate and scope checks still apply. Storage that already holds
    /// more than [`MAX_SESSIONS_PER_USER`] sessions is loaded in full; the
    /// collection is then at capacity and [`Self::add`] rejects more.
    pub fn from_user_sessions<I>(
        user_id: UserId,
        sessions: I,
    ) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = Session>,
    {
        let sessions: Vec<Session> = sessions.into_iter().collect();
        let mut collection = Self::for_user(user_id);
        collection.capacity = collection.capacity.max(sessions.len());
        collection.extend(sessions)?;
        Ok(collection)
    }

    pub fn from_sweep<I>(
        capacity: usize,
        sessions: I,
    ) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = Session>,
    {
        let mut collection = Self::sweep_batch(capacity);
        collection.extend(sessions)?;
        Ok(collection)
    }

    pub fn add(&mut self, session: Session) -> Result<(), CollectionError> {
        if self.sessions.len() >= self.capacity {
            return Err(CollectionError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.contains(session.id()) {
            return Err(CollectionError::DuplicateSession(session.id()));
        }
        if let CollectionScope::User(expected) = self.scope
            && session.user_id() != expected
        {
            return Err(CollectionError::ScopeMismatch {
                session_id: session.id(),
                expected,
                found: session.user_id(),
            });
        }

        self.sessions.push(session);
        Ok(())
    }

    fn extend<I>(&mut self, sessions: I) -> Result<(), CollectionError>
    where
        I: IntoIterator<Item = Session>,
    {
        for session in sessions {
            self.add(session)?;
        }
        Ok(())
    }

    pub fn revoke_expired(&mut self) -> usize {
        self.revoke_expired_at(Utc::now())
    }

    /// Revoke every unrevoked member whose refresh token has expired
    pub fn revoke_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        self.revoke_where(now, |session| session.is_expired_at(now))
    }

    pub fn revoke_inactive(&mut self) -> usize {
        self.revoke_inactive_at(Utc::now())
    }

    /// Revoke every unrevoked member that is no longer active
    pub fn revoke_inactive_at(&mut self, now: DateTime<Utc>) -> usize {
        self.revoke_where(now, |session| !session.is_active_at(now))
    }

    fn revoke_where<F>(&mut self, now: DateTime<Utc>, predicate: F) -> usize
    where
        F: Fn(&Session) -> bool,
    {
        let mut revoked = 0;
        for session in &mut self.sessions {
            if !session.is_revoked() && predicate(session) && session.revoke_at(now)
            {
                revoked += 1;
            }
        }
        revoked
    }

    pub fn get(&self, session_id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id() == session_id)
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.get(session_id).is_some()
    }

    /// Latest by creation time; ties go to the first one held
    pub fn most_recent(&self) -> Option<&Session> {
        self.sessions.iter().fold(None, |best: Option<&Session>, s| match best {
            Some(b) if s.created_at() <= b.created_at() => Some(b),
            _ => Some(s),
        })
    }

    /// Newest first
    pub fn sorted_by_recent(&self) -> Vec<&Session> {
        let mut sorted: Vec<&Session> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        sorted
    }

    /// Sessions that have not been revoked. Expired but unrevoked sessions
    /// are included; use [`Session::is_active`] for the stricter check.
    pub fn active(&self) -> Vec<&Session> {
        self.sessions.iter().filter(|s| !s.is_revoked()).collect()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.iter().filter(|s| !s.is_revoked()).count()
    }

    pub fn by_ip(&self, ip_address: &IpAddress) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.ip_address() == ip_address)
            .collect()
    }

    pub fn by_user_agent(&self, user_agent: &UserAgent) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|s| s.user_agent() == user_agent)
            .collect()
    }

    /// Drain pending events from every member
    pub fn take_events(&mut self) -> Vec<AuthEvent> {
        self.sessions
            .iter_mut()
            .flat_map(|s| s.take_events())
            .collect()
    }

    /// Advance every member's version after a successful batch save
    pub fn mark_persisted(&mut self) {
        for session in &mut self.sessions {
            session.mark_persisted();
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn scope(&self) -> CollectionScope {
        self.scope
    }

    pub fn into_sessions(self) -> Vec<Session> {
        self.sessions
    }
}

impl<'a> IntoIterator for &'a SessionCollection {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::aggregates::SessionProps;
    use crate::auth::domain::credentials::RefreshTokenFactory;
    use crate::auth::domain::value_objects::TokenValue;
    use chrono::Duration;
    use tollgate_model::RevokedAt;

    fn session_for(
        user_id: UserId,
        created_at: DateTime<Utc>,
        ip: &str,
        agent: &str,
    ) -> Session {
        let id = SessionId::new();
        let token = RefreshTokenFactory::default()
            .create_new(TokenValue::parse("a.b.c").unwrap(), id, created_at)
            .unwrap();
        Session::create_at(
            SessionProps {
                id,
                user_id,
                ip_address: IpAddress::parse(ip).unwrap(),
                user_agent: UserAgent::parse(agent).unwrap(),
                refresh_token: token,
                created_at,
                updated_at: created_at,
                revoked_at: RevokedAt::none(),
                version: 0,
            },
            created_at,
        )
        .unwrap()
    }

    fn simple(user_id: UserId, created_at: DateTime<Utc>) -> Session {
        session_for(user_id, created_at, "10.0.0.1", "agent/1")
    }

    #[test]
    fn sixth_session_is_rejected_without_eviction() {
        let user = UserId::new();
        let now = Utc::now();
        let mut collection = SessionCollection::for_user(user);
        let mut ids = Vec::new();

        for i in 0..MAX_SESSIONS_PER_USER {
            let session = simple(user, now + Duration::seconds(i as i64));
            ids.push(session.id());
            collection.add(session).unwrap();
        }

        let err = collection.add(simple(user, now)).unwrap_err();
        assert_eq!(err, CollectionError::CapacityExceeded { capacity: 5 });
        assert_eq!(collection.len(), 5);
        for id in ids {
            assert!(collection.contains(id));
        }
    }

    #[test]
    fn overfull_storage_loads_in_full_but_accepts_no_more() {
        let user = UserId::new();
        let now = Utc::now();
        let stored: Vec<Session> = (0..MAX_SESSIONS_PER_USER + 2)
            .map(|i| simple(user, now + Duration::seconds(i as i64)))
            .collect();

        let mut collection =
            SessionCollection::from_user_sessions(user, stored).unwrap();
        assert_eq!(collection.len(), 7);
        assert_eq!(collection.capacity(), 7);

        let err = collection.add(simple(user, now)).unwrap_err();
        assert_eq!(err, CollectionError::CapacityExceeded { capacity: 7 });
    }

    #[test]
    fn rejects_duplicates_and_other_users() {
        let user = UserId::new();
        let now = Utc::now();
        let mut collection = SessionCollection::for_user(user);
        let session = simple(user, now);
        collection.add(session.clone()).unwrap();

        assert_eq!(
            collection.add(session.clone()),
            Err(CollectionError::DuplicateSession(session.id()))
        );
        assert!(matches!(
            collection.add(simple(UserId::new(), now)),
            Err(CollectionError::ScopeMismatch { .. })
        ));
    }

    #[test]
    fn sweep_batches_mix_users_up_to_capacity() {
        let now = Utc::now();
        let mut batch = SessionCollection::sweep_batch(2);
        batch.add(simple(UserId::new(), now)).unwrap();
        batch.add(simple(UserId::new(), now)).unwrap();
        assert!(matches!(
            batch.add(simple(UserId::new(), now)),
            Err(CollectionError::CapacityExceeded { capacity: 2 })
        ));
    }

    #[test]
    fn revoke_expired_touches_only_expired_members() {
        let user = UserId::new();
        let now = Utc::now();
        let old = now - Duration::days(10);
        let mut collection = SessionCollection::from_user_sessions(
            user,
            vec![
                simple(user, old),
                simple(user, old + Duration::hours(1)),
                simple(user, now),
                simple(user, now),
                simple(user, now),
            ],
        )
        .unwrap();
        collection.take_events();

        assert_eq!(collection.revoke_expired_at(now), 2);
        assert_eq!(collection.active_count(), 3);
        for session in collection.iter().filter(|s| s.created_at() == now) {
            assert!(session.is_active_at(now));
        }
        assert_eq!(collection.take_events().len(), 2);

        assert_eq!(collection.revoke_expired_at(now), 0);
    }

    #[test]
    fn revoke_inactive_skips_already_revoked() {
        let user = UserId::new();
        let now = Utc::now();
        let mut revoked = simple(user, now);
        revoked.revoke_at(now);

        let mut collection = SessionCollection::from_user_sessions(
            user,
            vec![revoked, simple(user, now - Duration::days(8)), simple(user, now)],
        )
        .unwrap();

        assert_eq!(collection.revoke_inactive_at(now), 1);
        assert_eq!(collection.active_count(), 1);
    }

    #[test]
    fn active_view_keeps_expired_but_unrevoked_sessions() {
        let user = UserId::new();
        let now = Utc::now();
        let collection = SessionCollection::from_user_sessions(
            user,
            vec![simple(user, now - Duration::days(8)), simple(user, now)],
        )
        .unwrap();

        assert_eq!(collection.active().len(), 2);
        assert_eq!(
            collection.iter().filter(|s| s.is_active_at(now)).count(),
            1
        );
    }

    #[test]
    fn most_recent_prefers_first_on_ties() {
        let user = UserId::new();
        let now = Utc::now();
        let first = simple(user, now);
        let tied = simple(user, now);
        let first_id = first.id();
        let collection = SessionCollection::from_user_sessions(
            user,
            vec![simple(user, now - Duration::hours(1)), first, tied],
        )
        .unwrap();

        assert_eq!(collection.most_recent().map(Session::id), Some(first_id));
        assert!(SessionCollection::for_user(user).most_recent().is_none());

        let sorted = collection.sorted_by_recent();
        assert_eq!(sorted.last().map(|s| s.created_at()), Some(now - Duration::hours(1)));
    }

    #[test]
    fn filters_by_ip_and_user_agent() {
        let user = UserId::new();
        let now = Utc::now();
        let collection = SessionCollection::from_user_sessions(
            user,
            vec![
                session_for(user, now, "10.0.0.1", "firefox"),
                session_for(user, now, "10.0.0.2", "firefox"),
                session_for(user, now, "10.0.0.1", "curl"),
            ],
        )
        .unwrap();

        let ip = IpAddress::parse("10.0.0.1").unwrap();
        assert_eq!(collection.by_ip(&ip).len(), 2);
        let agent = UserAgent::parse("firefox").unwrap();
        assert_eq!(collection.by_user_agent(&agent).len(), 2);
        let missing = UserAgent::parse("wget").unwrap();
        assert!(collection.by_user_agent(&missing).is_empty());
    }
}
