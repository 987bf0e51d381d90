//! CLI entrypoint for AI Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use council_application::{
    ConversationLogger, DiscussionProgress, DiscussionSession, DiscussionTransport,
    InMemoryParticipantStore, NoConversationLogger, NoProgress, ParticipantRegistry,
    ParticipantStore,
};
use council_infrastructure::{
    ConfigLoader, FileConfig, HttpBackend, HttpBulkTransport, HttpParticipantDirectory,
    HttpStreamingTransport, JsonFileParticipantStore, JsonlConversationLogger, TransportMode,
};
use council_presentation::{
    ChatRepl, Cli, ConsoleFormatter, DriveOutcome, OutputFormat, ProgressReporter, ReplConfig,
    SimpleProgress, TransportArg, drive,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    apply_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    let _log_guard = init_logging(cli.verbose, &config)?;
    info!("Starting AI Council");

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let backend = HttpBackend::new(&config.backend.base_url, config.backend.timeout())?;
    let directory = Arc::new(HttpParticipantDirectory::new(backend.clone()));
    let transport: Arc<dyn DiscussionTransport> = match config.backend.transport {
        TransportMode::Streaming => Arc::new(HttpStreamingTransport::new(backend)),
        TransportMode::Bulk => Arc::new(HttpBulkTransport::new(backend)),
    };
    info!("Using {} transport", transport.name());

    let mut registry = ParticipantRegistry::new(participant_store(&config));
    registry.load(directory.as_ref()).await;
    if registry.is_degraded() {
        warn!("Could not reach {}; no participants loaded", config.backend.base_url);
    }

    if cli.list_participants {
        print!("{}", ConsoleFormatter::format_participants(registry.participants()));
        return Ok(());
    }

    let session = DiscussionSession::new(transport, conversation_logger(&config));
    let show_progress = !cli.quiet && config.output.show_progress;

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(session, registry, directory).with_config(ReplConfig {
            show_progress,
            default_rounds: config.discussion.default_rounds,
            history_file: None,
        });
        repl.run().await?;
        return Ok(());
    }

    // One-shot mode - topic is required
    let Some(topic) = cli.topic.as_deref() else {
        bail!("A topic is required. Use --chat for interactive mode.");
    };
    let rounds = cli.rounds.unwrap_or(config.discussion.default_rounds);
    run_once(session, &registry, topic, rounds, &cli, show_progress).await
}

async fn run_once(
    mut session: DiscussionSession,
    registry: &ParticipantRegistry,
    topic: &str,
    rounds: u32,
    cli: &Cli,
    show_progress: bool,
) -> Result<()> {
    if let Err(e) = session.start(registry, topic, rounds).await {
        if registry.is_degraded() {
            bail!("{} (participant discovery failed)", e);
        }
        bail!(e);
    }

    let progress: Box<dyn DiscussionProgress> = match (cli.quiet, show_progress) {
        (true, _) => Box::new(NoProgress),
        (false, true) => Box::new(ProgressReporter::new()),
        (false, false) => Box::new(SimpleProgress),
    };
    let outcome = drive(&mut session, progress.as_ref()).await;
    drop(progress);

    let output = match cli.output {
        OutputFormat::Transcript => {
            ConsoleFormatter::format_transcript(session.transcript(), registry.participants())
        }
        OutputFormat::Json => ConsoleFormatter::format_json(&session),
    };
    println!("{}", output);

    match outcome {
        DriveOutcome::Completed(Some(completion)) => {
            if cli.output == OutputFormat::Transcript && !cli.quiet {
                println!("{}", ConsoleFormatter::format_completion(&completion));
            }
            Ok(())
        }
        DriveOutcome::Completed(None) => Ok(()),
        DriveOutcome::Cancelled => bail!("Discussion cancelled"),
        DriveOutcome::Failed(e) => Err(e.into()),
    }
}

fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(url) = &cli.base_url {
        config.backend.base_url = url.clone();
    }
    if let Some(mode) = cli.transport {
        config.backend.transport = match mode {
            TransportArg::Streaming => TransportMode::Streaming,
            TransportArg::Bulk => TransportMode::Bulk,
        };
    }
}

/// Stderr logging by verbosity (`RUST_LOG` wins when set), plus an optional
/// non-blocking file writer from `logging.file`.
fn init_logging(verbose: u8, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match &config.logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| ".".into());
            let name = path
                .file_name()
                .with_context(|| format!("logging.file has no file name: {}", path.display()))?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, name));
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn participant_store(config: &FileConfig) -> Arc<dyn ParticipantStore> {
    match config
        .registry
        .state_file
        .clone()
        .or_else(JsonFileParticipantStore::default_path)
    {
        Some(path) => Arc::new(JsonFileParticipantStore::new(path)),
        None => Arc::new(InMemoryParticipantStore::new()),
    }
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    config
        .logging
        .conversation_log
        .as_ref()
        .and_then(JsonlConversationLogger::new)
        .map(|logger| Arc::new(logger) as Arc<dyn ConversationLogger>)
        .unwrap_or_else(|| Arc::new(NoConversationLogger))
}
