//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Participant id cannot be empty")]
    EmptyParticipantId,

    #[error("Round count must be at least 1")]
    InvalidRoundCount,

    #[error("Text cannot be empty")]
    EmptyText,
}
