//! Streaming events for a council discussion operation.
//!
//! [`StreamEvent`] is a closed set: one variant per named event the backend
//! emits. On the wire the variant name is the `event` tag and the payload is
//! carried in `data`:
//!
//! ```json
//! {"event": "participant_chunk", "data": {"participant": "Claude", "text": "He"}}
//! ```
//!
//! Unknown tags fail to deserialize instead of being guessed at.

use crate::participant::entities::ParticipantId;
use serde::{Deserialize, Serialize};

/// Opaque identifier the backend assigns to a discussion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscussionId(String);

impl DiscussionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiscussionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for DiscussionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event in a streaming discussion operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The backend accepted the request. Carries the discussion id on start.
    OperationStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discussion_id: Option<DiscussionId>,
    },
    /// A participant began producing a response.
    ParticipantStart {
        #[serde(alias = "id")]
        participant: ParticipantId,
    },
    /// A text chunk from a participant.
    ParticipantChunk {
        #[serde(alias = "id")]
        participant: ParticipantId,
        text: String,
    },
    /// A participant finished. `final_text`, when present, is authoritative.
    ParticipantComplete {
        #[serde(alias = "id")]
        participant: ParticipantId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        final_text: Option<String>,
    },
    /// The operation failed on the backend.
    OperationError { message: String },
    /// The operation finished.
    OperationComplete {
        rounds_completed: u32,
        rounds_requested: u32,
    },
}

impl StreamEvent {
    /// The wire tag of this event.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::OperationStart { .. } => "operation_start",
            StreamEvent::ParticipantStart { .. } => "participant_start",
            StreamEvent::ParticipantChunk { .. } => "participant_chunk",
            StreamEvent::ParticipantComplete { .. } => "participant_complete",
            StreamEvent::OperationError { .. } => "operation_error",
            StreamEvent::OperationComplete { .. } => "operation_complete",
        }
    }

    /// Returns true if this event ends the operation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::OperationError { .. } | StreamEvent::OperationComplete { .. }
        )
    }

    pub fn start(participant: impl Into<ParticipantId>) -> Self {
        StreamEvent::ParticipantStart {
            participant: participant.into(),
        }
    }

    pub fn chunk(participant: impl Into<ParticipantId>, text: impl Into<String>) -> Self {
        StreamEvent::ParticipantChunk {
            participant: participant.into(),
            text: text.into(),
        }
    }

    pub fn complete(participant: impl Into<ParticipantId>, final_text: Option<&str>) -> Self {
        StreamEvent::ParticipantComplete {
            participant: participant.into(),
            final_text: final_text.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_deserializes_from_tagged_json() {
        let event: StreamEvent = serde_json::from_value(json!({
            "event": "participant_chunk",
            "data": {"participant": "Claude", "text": "He"}
        }))
        .unwrap();
        assert_eq!(event, StreamEvent::chunk("Claude", "He"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn id_alias_is_accepted() {
        let event: StreamEvent = serde_json::from_value(json!({
            "event": "participant_start",
            "data": {"id": "Grok"}
        }))
        .unwrap();
        assert_eq!(event, StreamEvent::start("Grok"));
    }

    #[test]
    fn optional_fields_default() {
        let start: StreamEvent =
            serde_json::from_value(json!({"event": "operation_start", "data": {}})).unwrap();
        assert_eq!(start, StreamEvent::OperationStart { discussion_id: None });

        let complete: StreamEvent = serde_json::from_value(json!({
            "event": "participant_complete",
            "data": {"participant": "Llama"}
        }))
        .unwrap();
        assert_eq!(complete, StreamEvent::complete("Llama", None));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let result = serde_json::from_value::<StreamEvent>(json!({
            "event": "round_results",
            "data": {"results": []}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn terminal_events() {
        assert!(StreamEvent::OperationError { message: "x".into() }.is_terminal());
        assert!(
            StreamEvent::OperationComplete {
                rounds_completed: 1,
                rounds_requested: 1
            }
            .is_terminal()
        );
        assert_eq!(StreamEvent::start("a").name(), "participant_start");
    }
}
