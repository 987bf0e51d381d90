//! REPL (Read-Eval-Print Loop) for interactive discussions

use super::command::ChatCommand;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use crate::runner::{DriveOutcome, drive};
use colored::Colorize;
use council_application::{
    DiscussionProgress, DiscussionSession, ParticipantDirectory, ParticipantRegistry,
    SessionError,
};
use council_domain::InstructionsUpdate;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;
use tracing::warn;

/// Number of history entries kept on disk
const HISTORY_CAPACITY: usize = 1000;

/// Whether the loop should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    session: DiscussionSession,
    registry: ParticipantRegistry,
    directory: Arc<dyn ParticipantDirectory>,
    config: ReplConfig,
    /// Transcript entries already printed
    printed: usize,
}

impl ChatRepl {
    pub fn new(
        session: DiscussionSession,
        registry: ParticipantRegistry,
        directory: Arc<dyn ParticipantDirectory>,
    ) -> Self {
        Self {
            session,
            registry,
            directory,
            config: ReplConfig::default(),
            printed: 0,
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &DiscussionSession {
        &self.session
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = self.config.history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("Chat history disabled: {}", e),
            }
        }
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("council".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if self.execute(ChatCommand::parse(line)).await == Flow::Quit {
                        break;
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Execute one parsed command.
    pub async fn execute(&mut self, command: ChatCommand) -> Flow {
        match command {
            ChatCommand::Quit => {
                println!("Bye!");
                return Flow::Quit;
            }
            ChatCommand::Help => self.print_help(),
            ChatCommand::Message(text) => {
                if self.session.discussion_id().is_some() {
                    self.contribute(&text).await;
                } else {
                    self.start(&text).await;
                }
            }
            ChatCommand::Say(text) => self.contribute(&text).await,
            ChatCommand::Continue(rounds) => {
                let rounds = rounds.unwrap_or(self.config.default_rounds);
                let result = self
                    .session
                    .continue_discussion(&self.registry, rounds)
                    .await;
                self.after_request(result).await;
            }
            ChatCommand::New => {
                self.session.reset();
                self.printed = 0;
                println!("{}", "Started a fresh session.".dimmed());
            }
            ChatCommand::Participants => {
                if self.registry.is_degraded() {
                    println!(
                        "{}",
                        "Participant discovery failed; the list may be incomplete.".yellow()
                    );
                }
                print!("{}", ConsoleFormatter::format_participants(self.registry.participants()));
            }
            ChatCommand::Toggle(id) => match self.registry.get(&id).map(|p| p.active) {
                Some(active) => {
                    self.registry.set_active(&id, !active);
                    let state = if active { "inactive" } else { "active" };
                    println!("{} is now {}", id, state);
                }
                None => println!("Unknown participant: {}", id),
            },
            ChatCommand::Edit { id, text } => {
                match self.registry.set_instructions(&id, text) {
                    Some(update) => Self::report_instructions(&id, update),
                    None => println!("Unknown participant: {}", id),
                }
            }
            ChatCommand::Reset(id) => match self.registry.reset_instructions(&id) {
                Some(update) => Self::report_instructions(&id, update),
                None => println!("Unknown participant: {}", id),
            },
            ChatCommand::Publish => {
                match self
                    .registry
                    .publish_instructions(self.directory.as_ref())
                    .await
                {
                    Ok(count) => println!("Published instructions for {} participants", count),
                    Err(e) => println!("{} {}", "Error:".red().bold(), e),
                }
            }
            ChatCommand::Transcript => {
                print!(
                    "{}",
                    ConsoleFormatter::format_transcript(
                        self.session.transcript(),
                        self.registry.participants()
                    )
                );
            }
            ChatCommand::Invalid(hint) => println!("{}", hint),
        }
        Flow::Continue
    }

    async fn start(&mut self, topic: &str) {
        let result = self
            .session
            .start(&self.registry, topic, self.config.default_rounds)
            .await;
        self.after_request(result).await;
    }

    async fn contribute(&mut self, text: &str) {
        if let Err(e) = self.session.contribute(text).await {
            self.print_new_entries();
            println!("{}", ConsoleFormatter::format_error(&e));
        }
        // the contribution itself is already on screen
        self.printed = self.session.transcript().len();
    }

    async fn after_request(&mut self, result: Result<(), SessionError>) {
        if let Err(e) = result {
            self.print_new_entries();
            println!("{}", ConsoleFormatter::format_error(&e));
            return;
        }
        // the topic line was typed by the user
        self.printed = self.session.transcript().len();

        let progress: Box<dyn DiscussionProgress> = if self.config.show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        let outcome = drive(&mut self.session, progress.as_ref()).await;
        drop(progress);

        self.print_new_entries();
        match outcome {
            DriveOutcome::Completed(Some(completion)) => {
                println!("{}", ConsoleFormatter::format_completion(&completion));
                if self.session.may_continue() {
                    println!("{}", "Type /continue for another round.".dimmed());
                }
            }
            DriveOutcome::Completed(None) | DriveOutcome::Cancelled => {}
            DriveOutcome::Failed(e) => println!("{}", ConsoleFormatter::format_error(&e)),
        }
        println!();
    }

    fn print_new_entries(&mut self) {
        let entries = self.session.transcript().entries();
        for entry in entries.iter().skip(self.printed) {
            print!(
                "{}",
                ConsoleFormatter::format_entry(entry, self.registry.participants())
            );
        }
        self.printed = entries.len();
    }

    fn report_instructions(id: &str, update: InstructionsUpdate) {
        match update {
            InstructionsUpdate::Unchanged => println!("{}: instructions unchanged", id),
            InstructionsUpdate::Updated => println!("{}: instructions updated", id),
            InstructionsUpdate::Reactivated => {
                println!("{}: instructions updated and participant reactivated", id)
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           AI Council - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        let active: Vec<String> = self
            .registry
            .active_ids()
            .iter()
            .map(|id| id.to_string())
            .collect();
        if active.is_empty() {
            println!("{}", "No active participants. Use /participants.".yellow());
        } else {
            println!("Participants: {}", active.join(", "));
        }
        println!();
        println!("Type a topic to start a discussion, /help for commands.");
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  <text>              - Start a discussion, or add to the current one");
        println!("  /say <text>         - Add a message to the current discussion");
        println!("  /continue [n], /c   - Run n more rounds (default {})", self.config.default_rounds);
        println!("  /new                - Forget the current discussion");
        println!("  /participants, /p   - List participants");
        println!("  /toggle <id>        - Activate or deactivate a participant");
        println!("  /edit <id> <text>   - Replace a participant's instructions");
        println!("  /reset <id>         - Restore default instructions");
        println!("  /publish            - Send instructions to the backend");
        println!("  /transcript, /t     - Show the full transcript");
        println!("  /help, /h, /?       - Show this help");
        println!("  /quit, /exit, /q    - Exit chat");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use council_application::{
        ContinueRequest, DirectoryError, DiscussionTransport, EventStream,
        InMemoryParticipantStore, NoConversationLogger, StartRequest, TransportError,
    };
    use council_domain::{
        DiscoveredParticipant, DiscussionId, InstructionSet, MessageKind, ParticipantId,
        StreamEvent,
    };
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedTransport {
        streams: Mutex<VecDeque<Vec<StreamEvent>>>,
        contributions: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DiscussionTransport for ScriptedTransport {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn start(&self, _request: StartRequest) -> Result<EventStream, TransportError> {
            self.next()
        }

        async fn continue_discussion(
            &self,
            _request: ContinueRequest,
        ) -> Result<EventStream, TransportError> {
            self.next()
        }

        async fn contribute(&self, _id: &DiscussionId, text: &str) -> Result<(), TransportError> {
            self.contributions.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    impl ScriptedTransport {
        fn next(&self) -> Result<EventStream, TransportError> {
            let events = self
                .streams
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(TransportError::StreamClosed)?;
            Ok(EventStream::from_events(events))
        }
    }

    struct StaticDirectory;

    #[async_trait]
    impl ParticipantDirectory for StaticDirectory {
        async fn discover(&self) -> Result<Vec<DiscoveredParticipant>, DirectoryError> {
            Ok(vec![DiscoveredParticipant::new("Claude")])
        }

        async fn instructions(&self) -> Result<InstructionSet, DirectoryError> {
            Ok(InstructionSet::default())
        }

        async fn publish_instructions(
            &self,
            _instructions: &HashMap<ParticipantId, String>,
        ) -> Result<(), DirectoryError> {
            Ok(())
        }
    }

    fn one_round(id: &str, text: &str) -> Vec<StreamEvent> {
        vec![
            StreamEvent::OperationStart {
                discussion_id: Some(DiscussionId::new("d-1")),
            },
            StreamEvent::start(id),
            StreamEvent::chunk(id, text),
            StreamEvent::complete(id, None),
            StreamEvent::OperationComplete {
                rounds_completed: 1,
                rounds_requested: 1,
            },
        ]
    }

    fn repl(transport: Arc<ScriptedTransport>) -> ChatRepl {
        let mut registry = ParticipantRegistry::new(Arc::new(InMemoryParticipantStore::new()));
        registry.load_from(
            &[
                DiscoveredParticipant::new("Claude"),
                DiscoveredParticipant::new("Grok"),
            ],
            &[],
        );
        let session = DiscussionSession::new(transport, Arc::new(NoConversationLogger));
        ChatRepl::new(session, registry, Arc::new(StaticDirectory)).with_config(ReplConfig {
            show_progress: false,
            default_rounds: 1,
            history_file: None,
        })
    }

    #[tokio::test]
    async fn test_first_message_starts_then_contributes() {
        let transport = Arc::new(ScriptedTransport::default());
        transport
            .streams
            .lock()
            .unwrap()
            .push_back(one_round("Claude", "Spaces."));
        let mut repl = repl(transport.clone());

        repl.execute(ChatCommand::parse("Tabs or spaces?")).await;
        repl.execute(ChatCommand::parse("What about YAML?")).await;

        let kinds: Vec<MessageKind> = repl
            .session()
            .transcript()
            .entries()
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![MessageKind::User, MessageKind::Participant, MessageKind::User]
        );
        assert_eq!(
            *transport.contributions.lock().unwrap(),
            vec!["What about YAML?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_continue_without_discussion_leaves_transcript_empty() {
        let mut repl = repl(Arc::new(ScriptedTransport::default()));

        let flow = repl.execute(ChatCommand::Continue(None)).await;

        assert_eq!(flow, Flow::Continue);
        assert!(repl.session().transcript().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_flips_activation() {
        let mut repl = repl(Arc::new(ScriptedTransport::default()));

        repl.execute(ChatCommand::Toggle("Grok".into())).await;
        assert!(!repl.registry().get("Grok").unwrap().active);

        repl.execute(ChatCommand::Toggle("Grok".into())).await;
        assert!(repl.registry().get("Grok").unwrap().active);
    }

    #[tokio::test]
    async fn test_new_allows_another_start() {
        let transport = Arc::new(ScriptedTransport::default());
        {
            let mut streams = transport.streams.lock().unwrap();
            streams.push_back(one_round("Claude", "First."));
            streams.push_back(one_round("Claude", "Second."));
        }
        let mut repl = repl(transport);

        repl.execute(ChatCommand::parse("first topic")).await;
        repl.execute(ChatCommand::New).await;
        repl.execute(ChatCommand::parse("second topic")).await;

        let texts: Vec<&str> = repl
            .session()
            .transcript()
            .entries()
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["second topic", "Second."]);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut repl = repl(Arc::new(ScriptedTransport::default()));
        assert_eq!(repl.execute(ChatCommand::Quit).await, Flow::Quit);
    }
}
