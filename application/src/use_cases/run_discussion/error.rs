//! Discussion session errors

use crate::ports::transport::TransportError;
use council_domain::{DomainError, StreamAnomaly};
use thiserror::Error;

/// Errors returned by [`DiscussionSession`](super::DiscussionSession)
///
/// Precondition failures leave the session untouched. Transport and backend
/// failures during an operation are also recorded as one system entry in
/// the transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No active participants")]
    NoActiveParticipants,

    #[error("A discussion has already been started in this session")]
    DiscussionAlreadyStarted,

    #[error("No active discussion")]
    NoActiveDiscussion,

    #[error("Another operation is still in progress")]
    OperationInProgress,

    #[error("Input cannot be empty")]
    EmptyInput,

    #[error("Round count must be at least 1")]
    InvalidRoundCount,

    #[error("Transport failure: {0}")]
    TransportFailure(TransportError),

    #[error("Stream protocol error: {0}")]
    StreamProtocolError(String),

    #[error("Backend operation failed: {0}")]
    BackendOperationError(String),
}

impl SessionError {
    /// `true` for errors raised before anything was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SessionError::NoActiveParticipants
                | SessionError::DiscussionAlreadyStarted
                | SessionError::NoActiveDiscussion
                | SessionError::OperationInProgress
                | SessionError::EmptyInput
                | SessionError::InvalidRoundCount
        )
    }
}

impl From<TransportError> for SessionError {
    fn from(e: TransportError) -> Self {
        SessionError::TransportFailure(e)
    }
}

/// Absorbed per-event anomalies; never returned from an operation.
impl From<&StreamAnomaly> for SessionError {
    fn from(anomaly: &StreamAnomaly) -> Self {
        SessionError::StreamProtocolError(anomaly.to_string())
    }
}

impl From<DomainError> for SessionError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidRoundCount => SessionError::InvalidRoundCount,
            DomainError::EmptyText | DomainError::EmptyParticipantId => SessionError::EmptyInput,
        }
    }
}
