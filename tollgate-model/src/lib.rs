//! Core data model definitions shared across Tollgate crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod clock;
pub mod error;
pub mod ids;
pub mod time;

// Intentionally curated re-exports for downstream consumers.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{CredentialId, SessionId, UserId};
pub use time::{ExpiresAt, RevokedAt};
