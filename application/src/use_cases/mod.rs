//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod participant_registry;
pub mod run_discussion;
