//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; missing keys take their defaults.

mod backend;
mod discussion;
mod logging;
mod output;
mod registry;

pub use backend::{FileBackendConfig, TransportMode};
pub use discussion::FileDiscussionConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use registry::FileRegistryConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("discussion.default_rounds must be at least 1")]
    InvalidDefaultRounds,

    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Discussion backend connection
    pub backend: FileBackendConfig,
    /// Discussion defaults
    pub discussion: FileDiscussionConfig,
    /// Participant registry persistence
    pub registry: FileRegistryConfig,
    /// Diagnostic and conversation logs
    pub logging: FileLoggingConfig,
    /// Terminal output
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.backend.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if self.discussion.default_rounds == 0 {
            return Err(ConfigValidationError::InvalidDefaultRounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[backend]
base_url = "http://council.local:8080"
timeout_seconds = 60
transport = "bulk"

[discussion]
default_rounds = 2

[registry]
state_file = "/tmp/council/participants.json"

[logging]
file = "/tmp/council/debug.log"
conversation_log = "/tmp/council/conversation.jsonl"

[output]
color = false
show_progress = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "http://council.local:8080");
        assert_eq!(config.backend.timeout_seconds, 60);
        assert_eq!(config.backend.transport, TransportMode::Bulk);
        assert_eq!(config.discussion.default_rounds, 2);
        assert_eq!(
            config.registry.state_file,
            Some(PathBuf::from("/tmp/council/participants.json"))
        );
        assert!(config.logging.file.is_some());
        assert!(config.logging.conversation_log.is_some());
        assert!(!config.output.color);
        assert!(!config.output.show_progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[backend]
timeout_seconds = 10
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.timeout_seconds, 10);
        assert_eq!(config.backend.transport, TransportMode::Streaming);
        assert_eq!(config.discussion.default_rounds, 1);
        assert!(config.registry.state_file.is_none());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config: FileConfig = toml::from_str("[backend]\ntimeout_seconds = 0\n").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_zero_rounds() {
        let config: FileConfig = toml::from_str("[discussion]\ndefault_rounds = 0\n").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidDefaultRounds)
        );
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config: FileConfig = toml::from_str("[backend]\nbase_url = \"  \"\n").unwrap();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyBaseUrl));
    }
}
