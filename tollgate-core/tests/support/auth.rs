use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Duration;
use tokio::sync::Mutex;

use tollgate_core::auth::domain::repositories::{AuthEventSink, AuthRepository};
use tollgate_core::auth::infrastructure::InMemoryAuthRepository;
use tollgate_core::auth::{
    AuthEvent, AuthService, IpAddress, Session, SessionCollection,
    SessionPolicy, TokenValue, UserAgent,
};
use tollgate_core::{CredentialId, ManualClock, SessionId, UserId};

/// Event sink that keeps everything it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AuthEvent>>,
}

impl RecordingSink {
    pub async fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .await
            .iter()
            .map(AuthEvent::event_type)
            .collect()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl AuthEventSink for RecordingSink {
    async fn record(&self, events: Vec<AuthEvent>) -> Result<()> {
        self.events.lock().await.extend(events);
        Ok(())
    }
}

/// In-memory repository that yields to the scheduler after every read.
///
/// Lets `tokio::join!`ed service calls all finish their reads before any of
/// them writes.
#[derive(Debug)]
pub struct YieldingRepository {
    inner: Arc<InMemoryAuthRepository>,
}

impl YieldingRepository {
    pub fn new(inner: Arc<InMemoryAuthRepository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AuthRepository for YieldingRepository {
    async fn save_session(&self, session: &Session) -> Result<()> {
        self.inner.save_session(session).await
    }

    async fn save_sessions(&self, sessions: &SessionCollection) -> Result<()> {
        self.inner.save_sessions(sessions).await
    }

    async fn revoke_session(&self, session_id: SessionId) -> Result<()> {
        self.inner.revoke_session(session_id).await
    }

    async fn revoke_all_sessions_for_user(&self, user_id: UserId) -> Result<u64> {
        self.inner.revoke_all_sessions_for_user(user_id).await
    }

    async fn count_active_sessions_for_user(&self, user_id: UserId) -> Result<u64> {
        let count = self.inner.count_active_sessions_for_user(user_id).await;
        tokio::task::yield_now().await;
        count
    }

    async fn find_session_by_token(
        &self,
        refresh_token_id: CredentialId,
    ) -> Result<Option<Session>> {
        let found = self.inner.find_session_by_token(refresh_token_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_session_by_id(&self, session_id: SessionId) -> Result<Option<Session>> {
        let found = self.inner.find_session_by_id(session_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_all_sessions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<SessionCollection> {
        let found = self.inner.find_all_sessions_for_user(user_id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_expired_sessions(&self) -> Result<SessionCollection> {
        let found = self.inner.find_expired_sessions().await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_inactive_sessions(&self) -> Result<SessionCollection> {
        let found = self.inner.find_inactive_sessions().await;
        tokio::task::yield_now().await;
        found
    }
}

/// Service wired to the in-memory repository and a manual clock.
pub struct TestAuthHarness {
    clock: ManualClock,
    repository: Arc<InMemoryAuthRepository>,
    events: Arc<RecordingSink>,
    service: AuthService,
}

impl TestAuthHarness {
    pub fn new() -> Self {
        Self::with_policy(SessionPolicy::default())
    }

    pub fn with_policy(policy: SessionPolicy) -> Self {
        Self::build(policy, false)
    }

    /// Harness whose service reads through a [`YieldingRepository`]
    pub fn interleaving() -> Self {
        Self::build(SessionPolicy::default(), true)
    }

    fn build(policy: SessionPolicy, yielding: bool) -> Self {
        let clock = ManualClock::new();
        let repository = Arc::new(InMemoryAuthRepository::for_policy(
            &policy,
            Arc::new(clock.clone()),
        ));
        let backing: Arc<dyn AuthRepository> = if yielding {
            Arc::new(YieldingRepository::new(repository.clone()))
        } else {
            repository.clone()
        };
        let events = Arc::new(RecordingSink::default());
        let service = AuthService::new(backing, policy)
            .with_clock(Arc::new(clock.clone()))
            .with_event_sink(events.clone());

        Self {
            clock,
            repository,
            events,
            service,
        }
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    pub fn repository(&self) -> &InMemoryAuthRepository {
        self.repository.as_ref()
    }

    pub fn events(&self) -> &RecordingSink {
        self.events.as_ref()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Log a user in from a fixed address and agent
    pub async fn login(&self, user_id: UserId) -> Result<Session> {
        self.login_from(user_id, "203.0.113.9", "Mozilla/5.0 (X11; Linux x86_64)")
            .await
    }

    pub async fn login_from(
        &self,
        user_id: UserId,
        ip: &str,
        user_agent: &str,
    ) -> Result<Session> {
        let session = self
            .service
            .create_session(
                UserAgent::parse(user_agent)?,
                IpAddress::parse(ip)?,
                user_id,
                signed_token(),
            )
            .await?;
        Ok(session)
    }
}

/// A random compact token shaped like a signed JWT
pub fn signed_token() -> TokenValue {
    let segment = || URL_SAFE_NO_PAD.encode(rand::random::<[u8; 24]>());
    let raw = format!("{}.{}.{}", segment(), segment(), segment());
    TokenValue::parse(&raw).expect("generated token has compact shape")
}
