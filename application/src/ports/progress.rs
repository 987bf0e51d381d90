//! Progress notification port
//!
//! Defines the interface for reporting progress while a discussion
//! operation streams.

use council_domain::{ParticipantId, RoundCompletion, StreamAnomaly};

/// Callback for progress updates during a discussion operation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain lines, etc.)
pub trait DiscussionProgress: Send + Sync {
    /// Called when a start/continue request has been accepted.
    fn on_operation_start(&self, participants: &[ParticipantId], rounds: u32);

    /// Called when the operation ends, successfully or not.
    fn on_operation_end(&self, success: bool);

    // ==================== Participant Stream Callbacks ====================

    /// Called when a participant starts streaming a turn.
    fn on_participant_start(&self, _participant: &ParticipantId, _turn: u32) {}

    /// Called for each text chunk from a participant.
    fn on_participant_chunk(&self, _participant: &ParticipantId, _chunk: &str) {}

    /// Called when a participant's message has been finalized.
    fn on_participant_complete(&self, _participant: &ParticipantId, _text: &str) {}

    /// Called when the backend reports the rounds it completed.
    fn on_rounds_complete(&self, _completion: &RoundCompletion) {}

    /// Called for protocol irregularities absorbed by the session.
    fn on_anomaly(&self, _anomaly: &StreamAnomaly) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionProgress for NoProgress {
    fn on_operation_start(&self, _participants: &[ParticipantId], _rounds: u32) {}
    fn on_operation_end(&self, _success: bool) {}
}
