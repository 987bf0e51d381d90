//! Updates produced while a discussion operation streams

use super::error::SessionError;
use council_domain::{DiscussionId, ParticipantId, RoundCompletion};

/// Which request opened the in-flight operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Start,
    Continue,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Start => "start",
            OperationKind::Continue => "continue",
        }
    }
}

/// What one processed event meant for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The backend accepted the operation
    OperationStarted {
        discussion_id: Option<DiscussionId>,
    },
    ParticipantStarted {
        participant: ParticipantId,
        turn: u32,
    },
    /// Incremental text for a participant
    Chunk {
        participant: ParticipantId,
        text: String,
    },
    /// A participant message was finalized and appended to the transcript
    ParticipantCompleted {
        participant: ParticipantId,
        text: String,
        round: u32,
    },
    /// The operation finished; the round counter has been updated
    RoundsCompleted(RoundCompletion),
    /// The operation failed; completed entries were kept
    OperationFailed {
        error: SessionError,
        aborted: Vec<ParticipantId>,
    },
    /// The event changed nothing (see the session's anomalies)
    Ignored,
}

impl SessionUpdate {
    /// `true` if no further updates follow for this operation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionUpdate::RoundsCompleted(_) | SessionUpdate::OperationFailed { .. }
        )
    }
}
