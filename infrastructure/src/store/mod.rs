//! Participant override persistence

mod json_file;

pub use json_file::JsonFileParticipantStore;
