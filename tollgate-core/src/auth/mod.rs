//! Session and credential lifecycle
//!
//! Sessions are opened at login, paired with a refresh token that shares
//! the session id, and change only by rotating that token or by being
//! revoked. The [`domain`] module holds the entities and the service;
//! [`infrastructure`] ships an in-memory repository and a tracing event
//! sink.

pub mod domain;
pub mod infrastructure;
pub mod policy;

pub use domain::{
    AccessToken, AuthEvent, AuthEventSink, AuthRepository, AuthService,
    CollectionError, DomainServiceError, IpAddress, RefreshToken,
    ServiceErrorKind, Session, SessionCollection, SessionError,
    SessionLimitExceeded, StaleSessionVersion, TokenPair, TokenValue,
    UserAgent, ValidationError,
};
pub use policy::{MAX_SESSIONS_PER_USER, SessionPolicy, SessionPolicyError};
