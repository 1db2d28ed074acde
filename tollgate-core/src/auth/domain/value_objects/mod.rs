mod ip_address;
mod token_value;
mod user_agent;

pub use ip_address::IpAddress;
pub use token_value::TokenValue;
pub use user_agent::{MAX_USER_AGENT_LENGTH, UserAgent};

use thiserror::Error;
use tollgate_model::ModelError;

/// Malformed input handed to a value-object constructor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid {field} format")]
    InvalidFormat { field: &'static str },

    #[error(transparent)]
    Model(#[from] ModelError),
}
