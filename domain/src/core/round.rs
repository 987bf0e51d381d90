//! Round count value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Number of discussion rounds requested by a start/continue call.
///
/// Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RoundCount(u32);

impl RoundCount {
    pub const ONE: RoundCount = RoundCount(1);

    pub fn new(rounds: u32) -> Result<Self, DomainError> {
        if rounds == 0 {
            return Err(DomainError::InvalidRoundCount);
        }
        Ok(Self(rounds))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for RoundCount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for RoundCount {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoundCount> for u32 {
    fn from(value: RoundCount) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoundCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rounds_rejected() {
        assert_eq!(RoundCount::new(0), Err(DomainError::InvalidRoundCount));
    }

    #[test]
    fn test_default_is_one_round() {
        assert_eq!(RoundCount::default().get(), 1);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<RoundCount>("0").is_err());
        assert_eq!(serde_json::from_str::<RoundCount>("3").unwrap().get(), 3);
    }
}
