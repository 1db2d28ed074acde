use std::fmt;

use thiserror::Error;
use tollgate_model::{CredentialId, SessionId};

use crate::auth::domain::aggregates::SessionError;
use crate::auth::domain::collections::CollectionError;
use crate::auth::domain::repositories::{SessionLimitExceeded, StaleSessionVersion};
use crate::auth::domain::value_objects::ValidationError;

/// Broad category of a service failure, for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    /// The repository or event sink failed
    Repository,
    /// An entity invariant rejected the change
    Invariant,
    /// Input could not become a valid value object
    Validation,
    /// A concurrent writer got there first
    Conflict,
    SessionNotFound,
    SessionInactive,
    /// The user already holds the maximum number of sessions
    SessionLimitReached,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Repository => "repository",
            Self::Invariant => "invariant",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::SessionNotFound => "session_not_found",
            Self::SessionInactive => "session_inactive",
            Self::SessionLimitReached => "session_limit_reached",
        };
        f.write_str(label)
    }
}

/// Lookup failures surfaced as typed causes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionLookupError {
    #[error("no session with id {0}")]
    MissingSession(SessionId),
    #[error("no session holds refresh token {0}")]
    MissingToken(CredentialId),
    #[error("session {0} is revoked or expired")]
    Inactive(SessionId),
}

/// The single error type returned by [`AuthService`](super::AuthService).
///
/// Always carries the underlying cause, reachable through
/// [`std::error::Error::source`] or [`DomainServiceError::cause`].
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct DomainServiceError {
    operation: &'static str,
    kind: ServiceErrorKind,
    message: String,
    #[source]
    source: anyhow::Error,
}

impl DomainServiceError {
    pub fn new(
        operation: &'static str,
        kind: ServiceErrorKind,
        message: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            source,
        }
    }

    /// Wrap a repository failure. Version conflicts and the per-user limit
    /// are recognised and reported as [`ServiceErrorKind::Conflict`] and
    /// [`ServiceErrorKind::SessionLimitReached`].
    pub(crate) fn repository(operation: &'static str, source: anyhow::Error) -> Self {
        if let Some(stale) = source.downcast_ref::<StaleSessionVersion>() {
            let message = format!(
                "session {} was modified concurrently",
                stale.session_id
            );
            return Self::new(operation, ServiceErrorKind::Conflict, message, source);
        }
        if let Some(limit) = source.downcast_ref::<SessionLimitExceeded>() {
            let message = limit.to_string();
            return Self::new(
                operation,
                ServiceErrorKind::SessionLimitReached,
                message,
                source,
            );
        }
        Self::new(
            operation,
            ServiceErrorKind::Repository,
            "repository request failed",
            source,
        )
    }

    pub(crate) fn event_sink(operation: &'static str, source: anyhow::Error) -> Self {
        Self::new(
            operation,
            ServiceErrorKind::Repository,
            "event sink rejected domain events",
            source,
        )
    }

    pub(crate) fn invariant(operation: &'static str, err: SessionError) -> Self {
        let message = err.to_string();
        Self::new(operation, ServiceErrorKind::Invariant, message, err.into())
    }

    pub(crate) fn validation(operation: &'static str, err: ValidationError) -> Self {
        let message = err.to_string();
        Self::new(operation, ServiceErrorKind::Validation, message, err.into())
    }

    pub(crate) fn collection(operation: &'static str, err: CollectionError) -> Self {
        let kind = match err {
            CollectionError::CapacityExceeded { .. } => {
                ServiceErrorKind::SessionLimitReached
            }
            _ => ServiceErrorKind::Invariant,
        };
        let message = err.to_string();
        Self::new(operation, kind, message, err.into())
    }

    pub(crate) fn lookup(operation: &'static str, err: SessionLookupError) -> Self {
        let kind = match err {
            SessionLookupError::Inactive(_) => ServiceErrorKind::SessionInactive,
            _ => ServiceErrorKind::SessionNotFound,
        };
        let message = err.to_string();
        Self::new(operation, kind, message, err.into())
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.source
    }
}
