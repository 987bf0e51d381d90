//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording discussion events
//! (topics, contributions, finalized participant messages, operation results)
//! to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! discussion in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The UTC timestamp is added by the logger.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "discussion_started", "participant_message").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    /// Create a new conversation event. The logger stamps it when written.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and non-fallible; logging failures are ignored.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_keeps_type_and_payload() {
        let event = ConversationEvent::new("contribution", json!({"text": "hi"}));
        assert_eq!(event.event_type, "contribution");
        assert_eq!(event.payload["text"], "hi");
        NoConversationLogger.log(event);
    }
}
