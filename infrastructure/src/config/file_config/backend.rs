//! Backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How discussion operations reach the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// `text/event-stream` endpoints
    #[default]
    Streaming,
    /// Single JSON request/response per operation
    Bulk,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Streaming => "streaming",
            TransportMode::Bulk => "bulk",
        }
    }
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "streaming" | "stream" => Ok(TransportMode::Streaming),
            "bulk" => Ok(TransportMode::Bulk),
            other => Err(format!(
                "unknown transport '{}', expected 'streaming' or 'bulk'",
                other
            )),
        }
    }
}

/// Raw backend configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the discussion backend
    pub base_url: String,
    /// Per-request timeout for non-streaming calls
    pub timeout_seconds: u64,
    pub transport: TransportMode,
}

impl FileBackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_seconds: 120,
            transport: TransportMode::Streaming,
        }
    }
}
