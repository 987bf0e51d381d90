//! Registry configuration from TOML (`[registry]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw registry configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRegistryConfig {
    /// Where participant overrides are stored; the platform data dir when unset
    pub state_file: Option<PathBuf>,
}
