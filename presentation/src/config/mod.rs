//! Presentation-level configuration
//!
//! Settings for the chat REPL, resolved by the binary from config files
//! and command-line flags.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Show spinners while participants respond
    pub show_progress: bool,
    /// Rounds used by plain input and `/continue` without a count
    pub default_rounds: u32,
    /// Path to history file; the platform data dir when unset
    pub history_file: Option<PathBuf>,
}

impl ReplConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("ai-council").join("history.txt")))
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            default_rounds: 1,
            history_file: None,
        }
    }
}
