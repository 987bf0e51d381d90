//! Participant directory port
//!
//! The backend side of the registry: which participants exist and which
//! instructions the backend holds for them.

use async_trait::async_trait;
use council_domain::{DiscoveredParticipant, InstructionSet, ParticipantId};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while reading or updating the directory
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Backend rejected the update: {0}")]
    Rejected(String),
}

/// Source of participants and their instructions
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// List the participants the backend can currently serve.
    async fn discover(&self) -> Result<Vec<DiscoveredParticipant>, DirectoryError>;

    /// Fetch current and default instructions.
    async fn instructions(&self) -> Result<InstructionSet, DirectoryError>;

    /// Replace the backend's instructions for the given participants.
    async fn publish_instructions(
        &self,
        instructions: &HashMap<ParticipantId, String>,
    ) -> Result<(), DirectoryError>;
}
