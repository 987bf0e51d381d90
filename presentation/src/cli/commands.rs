//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for one-shot discussions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable transcript
    Transcript,
    /// Transcript entries as JSON
    Json,
}

/// Transport override
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// Server-sent events, messages arrive as they are written
    Streaming,
    /// One request per operation, messages arrive together
    Bulk,
}

/// CLI arguments for ai-council
#[derive(Parser, Debug)]
#[command(name = "ai-council")]
#[command(author, version, about = "AI Council - several AI models discuss a topic")]
#[command(long_about = r#"
AI Council puts a topic in front of several AI participants and shows their
discussion as it is written.

Each round, every active participant responds once. In chat mode the
discussion can be continued for more rounds and you can add your own
messages between rounds.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_BACKEND__BASE_URL)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/ai-council/config.toml   Global config

Example:
  ai-council "Is a hot dog a sandwich?"
  ai-council -r 3 --output json "Tabs or spaces?"
  ai-council --chat
"#)]
pub struct Cli {
    /// Topic to discuss (not required in chat mode)
    pub topic: Option<String>,

    /// Number of rounds (defaults to discussion.default_rounds)
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<u32>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "transcript")]
    pub output: OutputFormat,

    /// List known participants and exit
    #[arg(long)]
    pub list_participants: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Override backend.transport
    #[arg(long, value_enum, value_name = "MODE")]
    pub transport: Option<TransportArg>,

    /// Override backend.base_url
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_arguments() {
        let cli = Cli::parse_from(["ai-council", "-r", "2", "--output", "json", "Tabs?"]);
        assert_eq!(cli.topic.as_deref(), Some("Tabs?"));
        assert_eq!(cli.rounds, Some(2));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(!cli.chat);
    }

    #[test]
    fn test_chat_with_overrides() {
        let cli = Cli::parse_from([
            "ai-council",
            "--chat",
            "--transport",
            "bulk",
            "--base-url",
            "http://localhost:5000",
            "-vv",
        ]);
        assert!(cli.chat);
        assert_eq!(cli.transport, Some(TransportArg::Bulk));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.topic.is_none());
    }
}
