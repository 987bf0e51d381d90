//! Console output formatter for discussions

use colored::Colorize;
use council_application::{DiscussionSession, SessionError};
use council_domain::{MessageKind, Participant, RoundCompletion, Transcript, TranscriptEntry};
use serde_json::json;

/// Formats discussion state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the whole transcript, grouped under round headings.
    pub fn format_transcript(transcript: &Transcript, participants: &[Participant]) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("AI Council Discussion"));
        output.push('\n');

        let mut current_round = None;
        for entry in transcript.entries() {
            if entry.kind == MessageKind::Participant && entry.round != current_round {
                current_round = entry.round;
                if let Some(round) = current_round {
                    output.push_str(&Self::section_header(&format!("Round {}", round)));
                }
            }
            output.push_str(&Self::format_entry(entry, participants));
            output.push('\n');
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format one transcript entry.
    pub fn format_entry(entry: &TranscriptEntry, participants: &[Participant]) -> String {
        match entry.kind {
            MessageKind::User => format!("\n{} {}\n", "You:".cyan().bold(), entry.text),
            MessageKind::System => format!("\n{}\n", format!("[{}]", entry.text).dimmed()),
            MessageKind::Participant => {
                let name = entry
                    .author
                    .as_ref()
                    .map(|id| Self::display_name(id.as_str(), participants))
                    .unwrap_or("?");
                format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", name).yellow().bold(),
                    entry.text
                )
            }
        }
    }

    /// Format the session as JSON
    pub fn format_json(session: &DiscussionSession) -> String {
        let value = json!({
            "discussion_id": session.discussion_id().map(|id| id.as_str()),
            "topic": session.topic().map(|t| t.content()),
            "rounds_requested": session.requested_round_count(),
            "rounds_completed": session.completed_round_count(),
            "entries": session.transcript().entries(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the participant list with active markers
    pub fn format_participants(participants: &[Participant]) -> String {
        if participants.is_empty() {
            return format!("{}\n", "No participants available.".dimmed());
        }

        let mut output = format!("{}\n", "Participants:".cyan().bold());
        for p in participants {
            let marker = if p.active { "[x]".green() } else { "[ ]".dimmed() };
            let name = if p.display_name != p.id.as_str() {
                format!("{} ({})", p.id, p.display_name)
            } else {
                p.id.to_string()
            };
            let edited = if p.has_custom_instructions() {
                format!(" {}", "*edited".yellow())
            } else {
                String::new()
            };
            output.push_str(&format!("  {} {}{}\n", marker, name, edited));
        }
        output
    }

    /// Summary line for a finished operation
    pub fn format_completion(completion: &RoundCompletion) -> String {
        let mut line = format!(
            "{} {}/{} round(s) completed",
            "v".green(),
            completion.rounds_completed,
            completion.rounds_requested
        );
        if !completion.unanswered.is_empty() {
            let names: Vec<&str> = completion.unanswered.iter().map(|id| id.as_str()).collect();
            line.push_str(&format!(" ({} did not answer)", names.join(", ")).yellow().to_string());
        }
        line
    }

    pub fn format_error(error: &SessionError) -> String {
        format!("{} {}", "Error:".red().bold(), error)
    }

    fn display_name<'a>(id: &'a str, participants: &'a [Participant]) -> &'a str {
        participants
            .iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| p.display_name.as_str())
            .unwrap_or(id)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::ParticipantId;

    fn roster() -> Vec<Participant> {
        let mut claude = Participant::new("Claude", 0);
        claude.display_name = "Claude Sonnet".into();
        let mut grok = Participant::new("Grok", 1);
        grok.active = false;
        vec![claude, grok]
    }

    #[test]
    fn test_transcript_groups_rounds_and_uses_display_names() {
        let mut transcript = Transcript::new();
        transcript.append_user("Tabs or spaces?", Some(1));
        transcript.append_participant("Claude".into(), "Spaces.", 1);
        transcript.append_participant("Claude".into(), "Still spaces.", 2);

        let output = ConsoleFormatter::format_transcript(&transcript, &roster());

        assert!(output.contains("Tabs or spaces?"));
        assert!(output.contains("Claude Sonnet"));
        let first = output.find("Round 1").unwrap();
        let second = output.find("Round 2").unwrap();
        assert!(first < output.find("Spaces.").unwrap());
        assert!(second < output.find("Still spaces.").unwrap());
    }

    #[test]
    fn test_unknown_author_falls_back_to_id() {
        let mut transcript = Transcript::new();
        let entry = transcript
            .append_participant(ParticipantId::new("Mistral"), "Bonjour", 1)
            .clone();

        let output = ConsoleFormatter::format_entry(&entry, &roster());

        assert!(output.contains("Mistral"));
    }

    #[test]
    fn test_participants_show_active_state() {
        let output = ConsoleFormatter::format_participants(&roster());
        assert!(output.contains("Claude (Claude Sonnet)"));
        assert!(output.contains("Grok"));
        assert!(output.contains("[ ]"));
        assert!(output.contains("[x]"));
    }

    #[test]
    fn test_completion_lists_unanswered() {
        let completion = RoundCompletion {
            rounds_completed: 1,
            rounds_requested: 2,
            unanswered: vec![ParticipantId::new("Grok")],
        };
        let line = ConsoleFormatter::format_completion(&completion);
        assert!(line.contains("1/2"));
        assert!(line.contains("Grok did not answer"));
    }
}
