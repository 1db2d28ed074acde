use std::str::FromStr;

use uuid::Uuid;

use crate::error::ModelError;

/// Strongly typed ID for authenticated sessions.
///
/// Opaque random 128-bit value; a session and the refresh token minted
/// alongside it share the same `SessionId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SessionId(pub Uuid);

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        SessionId(id)
    }

    pub fn parse_str(id: &str) -> Result<Self, ModelError> {
        if id.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier(
                "Session ID cannot be empty".to_string(),
            ));
        }
        Ok(SessionId(Uuid::parse_str(id.trim())?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for SessionId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for issued credentials (refresh and access tokens)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CredentialId(pub Uuid);

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialId {
    pub fn new() -> Self {
        CredentialId(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        CredentialId(id)
    }

    pub fn parse_str(id: &str) -> Result<Self, ModelError> {
        if id.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier(
                "Credential ID cannot be empty".to_string(),
            ));
        }
        Ok(CredentialId(Uuid::parse_str(id.trim())?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for CredentialId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for CredentialId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for users. Owned by the user management domain; the
/// auth context only carries it around.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub Uuid);

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        UserId(id)
    }

    pub fn parse_str(id: &str) -> Result<Self, ModelError> {
        if id.trim().is_empty() {
            return Err(ModelError::InvalidIdentifier(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(UserId(Uuid::parse_str(id.trim())?))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for UserId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
