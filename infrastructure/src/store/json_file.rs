//! JSON file participant store
//!
//! Keeps the registry snapshot as a JSON array of `{id, active, order}`
//! records. Writes go to a sibling temp file which is then renamed over the
//! target, so a crash never leaves a half-written snapshot behind.

use council_application::{ParticipantStore, StoreError};
use council_domain::ParticipantOverride;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the snapshot inside the data directory
const FILE_NAME: &str = "participants.json";

/// [`ParticipantStore`] backed by one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileParticipantStore {
    path: PathBuf,
}

impl JsonFileParticipantStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/ai-council/participants.json`, if a data dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("ai-council").join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParticipantStore for JsonFileParticipantStore {
    fn load(&self) -> Result<Vec<ParticipantOverride>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<Value> =
            serde_json::from_str(&content).map_err(|e| StoreError::Format(e.to_string()))?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<ParticipantOverride>(entry) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable participant record: {}", e),
            }
        }
        debug!("Loaded {} participant records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn save(&self, records: &[ParticipantOverride]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json =
            serde_json::to_string_pretty(records).map_err(|e| StoreError::Format(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileParticipantStore::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = JsonFileParticipantStore::new(dir.path().join("nested/participants.json"));
        let records = vec![
            ParticipantOverride::new("Claude", true, 0),
            ParticipantOverride::new("Grok", false, 1),
        ];

        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
        assert!(!dir.path().join("nested/participants.json.tmp").exists());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("participants.json");
        fs::write(
            &path,
            r#"[{"id": "Claude", "active": false}, {"active": true}, 42, {"id": "Grok", "order": 3}]"#,
        )
        .unwrap();

        let records = JsonFileParticipantStore::new(&path).load().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "Claude");
        assert!(!records[0].active);
        assert_eq!(records[1].order, Some(3));
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("participants.json");
        fs::write(&path, "{not json").unwrap();

        let result = JsonFileParticipantStore::new(&path).load();

        assert!(matches!(result, Err(StoreError::Format(_))));
    }
}
