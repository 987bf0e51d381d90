//! Application layer for ai-council
//!
//! This crate contains the participant registry, the discussion session
//! use case and the port definitions they depend on.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    directory::{DirectoryError, ParticipantDirectory},
    participant_store::{InMemoryParticipantStore, ParticipantStore, StoreError},
    progress::{DiscussionProgress, NoProgress},
    transport::{
        ContinueRequest, DiscussionTransport, EventSender, EventStream, ParticipantBrief,
        StartRequest, TransportError, TransportItem,
    },
};
pub use use_cases::participant_registry::ParticipantRegistry;
pub use use_cases::run_discussion::{
    DiscussionSession, OperationKind, SessionError, SessionUpdate,
};
