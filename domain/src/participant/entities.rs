//! Participant entities and identifiers

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;

/// Stable identifier of a participant (e.g. `"Claude"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an id, rejecting empty or whitespace-only values.
    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyParticipantId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participant as reported by backend discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredParticipant {
    pub id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl DiscoveredParticipant {
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Instruction text per participant as held by the backend prompt store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionSet {
    /// Current (possibly user-edited) instructions
    pub current: HashMap<ParticipantId, String>,
    /// Backend defaults, used when resetting an edited participant
    pub defaults: HashMap<ParticipantId, String>,
}

/// A participant known to the council (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Human label, defaults to the id
    pub display_name: String,
    /// Guidance sent to the backend when this participant responds
    pub instructions: String,
    /// Backend default for `instructions`
    #[serde(default)]
    pub default_instructions: String,
    /// Only active participants are included in discussion requests
    pub active: bool,
    /// Display and round-robin tie-break
    pub order: u32,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, order: u32) -> Self {
        let id = id.into();
        Self {
            display_name: id.to_string(),
            id,
            instructions: String::new(),
            default_instructions: String::new(),
            active: true,
            order,
        }
    }

    /// Returns `true` if the instructions differ from the backend default.
    pub fn has_custom_instructions(&self) -> bool {
        self.instructions != self.default_instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id_rejected() {
        assert_eq!(
            ParticipantId::try_new("   "),
            Err(DomainError::EmptyParticipantId)
        );
        assert!(ParticipantId::try_new("Gemini").is_ok());
    }

    #[test]
    fn test_new_participant_defaults() {
        let p = Participant::new("Grok", 4);
        assert_eq!(p.display_name, "Grok");
        assert!(p.active);
        assert_eq!(p.order, 4);
        assert!(!p.has_custom_instructions());
    }

    #[test]
    fn test_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(ParticipantId::new("Llama"), 1);
        assert_eq!(map.get("Llama"), Some(&1));
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = ParticipantId::new("ChatGPT");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ChatGPT\"");
    }
}
