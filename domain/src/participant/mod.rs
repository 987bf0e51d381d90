//! Participant domain.
//!
//! - [`entities::Participant`] — one response source known to the council
//! - [`overrides::ParticipantOverride`] — the locally persisted `{id, active, order}` record
//! - [`roster::Roster`] — merge, activation and ordering rules

pub mod entities;
pub mod overrides;
pub mod roster;
