//! Locally persisted participant overrides

use super::entities::ParticipantId;
use serde::{Deserialize, Serialize};

/// The persisted `{id, active, order}` record for one participant.
///
/// Older snapshots may lack fields: a missing `active` means active, a
/// missing `order` means the participant is placed as if newly discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantOverride {
    pub id: ParticipantId,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

fn default_active() -> bool {
    true
}

impl ParticipantOverride {
    pub fn new(id: impl Into<ParticipantId>, active: bool, order: u32) -> Self {
        Self {
            id: id.into(),
            active,
            order: Some(order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let record: ParticipantOverride = serde_json::from_str(r#"{"id": "Claude"}"#).unwrap();
        assert_eq!(record.id.as_str(), "Claude");
        assert!(record.active);
        assert_eq!(record.order, None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let record: ParticipantOverride = serde_json::from_str(
            r#"{"id": "Gemini", "active": false, "order": 2, "sprite": "gemini.png"}"#,
        )
        .unwrap();
        assert_eq!(record, ParticipantOverride::new("Gemini", false, 2));
    }
}
