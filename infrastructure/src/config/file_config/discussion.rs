//! Discussion configuration from TOML (`[discussion]` section)

use serde::{Deserialize, Serialize};

/// Raw discussion configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Rounds used when the command line does not give a count
    pub default_rounds: u32,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self { default_rounds: 1 }
    }
}
