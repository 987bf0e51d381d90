//! Core domain concepts shared across all subdomains.
//!
//! - [`topic::Topic`] — a validated topic to pose to the council
//! - [`round::RoundCount`] — how many discussion rounds to request
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod round;
pub mod topic;
