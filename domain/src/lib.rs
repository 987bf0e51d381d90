//! Domain layer for ai-council
//!
//! This crate contains the core rules of a council discussion. It performs
//! no I/O and has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Participants
//!
//! A participant is one addressable response source (usually one AI model).
//! The [`Roster`] merges what the backend reports with locally persisted
//! [`ParticipantOverride`] records and keeps the display order stable.
//!
//! ## Discussion streams
//!
//! Every start/continue request produces a sequence of [`StreamEvent`]s in
//! which several participants are interleaved. The [`StreamReconciler`]
//! turns that sequence into one ordered buffer per participant, and the
//! [`Transcript`] records the finalized messages in completion order.

pub mod core;
pub mod discussion;
pub mod participant;
pub mod util;

// Re-export commonly used types
pub use core::{error::DomainError, round::RoundCount, topic::Topic};
pub use discussion::{
    event::{DiscussionId, StreamEvent},
    reconciler::{
        BufferStatus, OperationState, ParticipantBuffer, ReconcileOutcome, ReconcileStep,
        RoundCompletion, StreamAnomaly, StreamReconciler,
    },
    transcript::{MessageKind, Transcript, TranscriptEntry},
};
pub use participant::{
    entities::{DiscoveredParticipant, InstructionSet, Participant, ParticipantId},
    overrides::ParticipantOverride,
    roster::{InstructionsUpdate, Roster},
};
