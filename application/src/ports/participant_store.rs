//! Participant store port
//!
//! Persists the registry's `{id, active, order}` records between runs.

use council_domain::ParticipantOverride;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while loading or saving overrides
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored data: {0}")]
    Format(String),
}

/// Storage for participant overrides
///
/// Calls are synchronous: the snapshot is small and written on every
/// registry mutation.
pub trait ParticipantStore: Send + Sync {
    /// Load all records. A store that was never written returns an empty list.
    fn load(&self) -> Result<Vec<ParticipantOverride>, StoreError>;

    /// Replace all records with `records`.
    fn save(&self, records: &[ParticipantOverride]) -> Result<(), StoreError>;
}

/// In-memory store for tests and when persistence is disabled.
#[derive(Debug, Default)]
pub struct InMemoryParticipantStore {
    records: Mutex<Vec<ParticipantOverride>>,
}

impl InMemoryParticipantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ParticipantOverride>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of the stored records.
    pub fn records(&self) -> Vec<ParticipantOverride> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl ParticipantStore for InMemoryParticipantStore {
    fn load(&self) -> Result<Vec<ParticipantOverride>, StoreError> {
        Ok(self.records())
    }

    fn save(&self, records: &[ParticipantOverride]) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Format("store lock poisoned".to_string()))?;
        *guard = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryParticipantStore::new();
        assert!(store.load().unwrap().is_empty());

        store
            .save(&[ParticipantOverride::new("Claude", false, 3)])
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].active);
        assert_eq!(loaded[0].order, Some(3));
    }
}
