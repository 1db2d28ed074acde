use std::fmt;

use super::ValidationError;

pub const MAX_USER_AGENT_LENGTH: usize = 500;

/// Client user agent string reported at login
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserAgent(String);

impl UserAgent {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "user agent",
            });
        }
        if raw.chars().count() > MAX_USER_AGENT_LENGTH {
            return Err(ValidationError::TooLong {
                field: "user agent",
                max: MAX_USER_AGENT_LENGTH,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for UserAgent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_up_to_limit() {
        let at_limit = "a".repeat(MAX_USER_AGENT_LENGTH);
        assert!(UserAgent::parse(&at_limit).is_ok());
        assert_eq!(
            UserAgent::parse("Mozilla/5.0").unwrap().as_str(),
            "Mozilla/5.0"
        );
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(matches!(
            UserAgent::parse(" "),
            Err(ValidationError::Empty { .. })
        ));
        let too_long = "a".repeat(MAX_USER_AGENT_LENGTH + 1);
        assert!(matches!(
            UserAgent::parse(&too_long),
            Err(ValidationError::TooLong { max: 500, .. })
        ));
    }
}
