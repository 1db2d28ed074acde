//! Tollgate core: session and credential lifecycle.
//!
//! The [`auth`] module owns sessions, refresh and access tokens, the
//! bounded per-user [`SessionCollection`](auth::SessionCollection) and the
//! [`AuthService`](auth::AuthService) that orchestrates them against an
//! [`AuthRepository`](auth::AuthRepository).
#![allow(missing_docs)]

pub mod auth;

pub use tollgate_model::chrono;

pub use tollgate_model::{
    Clock, CredentialId, ExpiresAt, ManualClock, ModelError, RevokedAt,
    SessionId, SystemClock, UserId,
};

pub use auth::{
    AuthService, DomainServiceError, MAX_SESSIONS_PER_USER, ServiceErrorKind,
    Session, SessionCollection, SessionPolicy,
};
