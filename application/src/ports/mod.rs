//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod directory;
pub mod participant_store;
pub mod progress;
pub mod transport;
