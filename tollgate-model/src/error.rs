use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidIdentifier(String),
    InvalidTimestamp(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidIdentifier(msg) => {
                write!(f, "invalid identifier: {msg}")
            }
            ModelError::InvalidTimestamp(msg) => {
                write!(f, "invalid timestamp: {msg}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl From<uuid::Error> for ModelError {
    fn from(err: uuid::Error) -> Self {
        ModelError::InvalidIdentifier(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
