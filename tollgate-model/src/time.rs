//! Time value objects for credential lifetimes.
//!
//! Expiry is always derived at read time by comparing against a supplied
//! instant. Nothing here caches an "expired" flag.

use chrono::{DateTime, Duration, Utc};

use crate::error::ModelError;

/// Absolute instant after which a credential is no longer usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ExpiresAt(DateTime<Utc>);

impl ExpiresAt {
    /// Mint a fresh expiry `lifetime` after `now`.
    ///
    /// Fails unless the resulting instant lies strictly in the future, so a
    /// zero or negative lifetime can never produce a credential.
    pub fn after(
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, ModelError> {
        let value = now.checked_add_signed(lifetime).ok_or_else(|| {
            ModelError::InvalidTimestamp(
                "expiry overflows the supported range".to_string(),
            )
        })?;
        Self::in_future(value, now)
    }

    /// Validate an explicit instant against `now`.
    pub fn in_future(
        value: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if value <= now {
            return Err(ModelError::InvalidTimestamp(
                "ExpiresAt must be in the future".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Rehydrate a stored expiry without the future check.
    pub fn from_stored(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.0
    }

    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<ExpiresAt> for DateTime<Utc> {
    fn from(value: ExpiresAt) -> Self {
        value.0
    }
}

impl std::fmt::Display for ExpiresAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Optional revocation instant. Once set it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RevokedAt(Option<DateTime<Utc>>);

impl RevokedAt {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(value: DateTime<Utc>) -> Self {
        Self(Some(value))
    }

    pub fn is_revoked(&self) -> bool {
        self.0.is_some()
    }

    pub fn value(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

impl From<Option<DateTime<Utc>>> for RevokedAt {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_derived_from_the_supplied_instant() {
        let now = Utc::now();
        let expires = ExpiresAt::after(now, Duration::days(7)).unwrap();

        assert!(!expires.is_expired_at(now));
        assert!(!expires.is_expired_at(now + Duration::days(6)));
        assert!(expires.is_expired_at(now + Duration::days(7)));
        assert!(expires.is_expired_at(now + Duration::days(8)));
    }

    #[test]
    fn rejects_non_positive_lifetimes() {
        let now = Utc::now();
        assert!(ExpiresAt::after(now, Duration::zero()).is_err());
        assert!(ExpiresAt::after(now, Duration::seconds(-5)).is_err());
    }

    #[test]
    fn revoked_at_defaults_to_none() {
        let revoked = RevokedAt::default();
        assert!(!revoked.is_revoked());
        assert!(revoked.value().is_none());

        let now = Utc::now();
        let revoked = RevokedAt::at(now);
        assert!(revoked.is_revoked());
        assert_eq!(revoked.value(), Some(now));
    }
}
