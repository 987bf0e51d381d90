//! Topic value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A topic posed to the council (Value Object)
///
/// Also used for user contributions: both are free text that must contain
/// something other than whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Create a topic, rejecting empty or whitespace-only content.
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyText);
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_creation() {
        let topic = Topic::try_new("Should cities ban cars?").unwrap();
        assert_eq!(topic.content(), "Should cities ban cars?");
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_eq!(Topic::try_new(""), Err(DomainError::EmptyText));
        assert_eq!(Topic::try_new("  \n\t"), Err(DomainError::EmptyText));
    }
}
