//! Presentation layer for ai-council
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod runner;

// Re-export commonly used types
pub use chat::{ChatCommand, ChatRepl};
pub use cli::commands::{Cli, OutputFormat, TransportArg};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use runner::{DriveOutcome, drive};
