//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Diagnostic log file (tracing output); stderr only when unset
    pub file: Option<PathBuf>,
    /// JSONL conversation log; disabled when unset
    pub conversation_log: Option<PathBuf>,
}
