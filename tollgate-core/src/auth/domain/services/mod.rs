mod auth_service;
mod error;

pub use auth_service::{AuthService, TokenPair};
pub use error::{DomainServiceError, ServiceErrorKind, SessionLookupError};
