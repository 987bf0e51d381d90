//! Progress reporting for streaming discussion operations

use colored::Colorize;
use council_application::DiscussionProgress;
use council_domain::{ParticipantId, RoundCompletion, StreamAnomaly};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Characters of streamed text shown next to a spinner
const PREVIEW_CHARS: usize = 48;

struct ParticipantLine {
    bar: ProgressBar,
    chars: usize,
    tail: String,
}

/// One spinner per participant, updated as their text streams in
pub struct ProgressReporter {
    multi: MultiProgress,
    lines: Mutex<HashMap<ParticipantId, ParticipantLine>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Reporter drawing to `target` (hidden in tests)
    pub fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            lines: Mutex::new(HashMap::new()),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn preview(tail: &str, chars: usize) -> String {
        let flat: String = tail.chars().map(|c| if c.is_whitespace() { ' ' } else { c }).collect();
        format!("{} chars  {}", chars, flat.dimmed())
    }

    fn finish(&self, participant: &ParticipantId, message: String) {
        if let Ok(mut lines) = self.lines.lock()
            && let Some(line) = lines.remove(participant)
        {
            line.bar.finish_with_message(message);
        }
    }

    #[cfg(test)]
    fn streamed_chars(&self, participant: &str) -> Option<usize> {
        let lines = self.lines.lock().ok()?;
        lines.get(participant).map(|l| l.chars)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscussionProgress for ProgressReporter {
    fn on_operation_start(&self, participants: &[ParticipantId], rounds: u32) {
        debug!(
            "Waiting for {} participants, {} round(s)",
            participants.len(),
            rounds
        );
    }

    fn on_operation_end(&self, _success: bool) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        for (_, line) in lines.drain() {
            line.bar.abandon_with_message(format!("{}", "no answer".red()));
        }
    }

    fn on_participant_start(&self, participant: &ParticipantId, turn: u32) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_prefix(format!("{} (round {})", participant, turn));
        bar.set_message("thinking...");
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut lines) = self.lines.lock()
            && let Some(previous) = lines.insert(
                participant.clone(),
                ParticipantLine {
                    bar,
                    chars: 0,
                    tail: String::new(),
                },
            )
        {
            previous.bar.finish_and_clear();
        }
    }

    fn on_participant_chunk(&self, participant: &ParticipantId, chunk: &str) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        let Some(line) = lines.get_mut(participant) else {
            return;
        };
        line.chars += chunk.chars().count();
        line.tail.push_str(chunk);
        let excess = line.tail.chars().count().saturating_sub(PREVIEW_CHARS);
        if excess > 0 {
            line.tail = line.tail.chars().skip(excess).collect();
        }
        line.bar.set_message(Self::preview(&line.tail, line.chars));
    }

    fn on_participant_complete(&self, participant: &ParticipantId, text: &str) {
        self.finish(
            participant,
            format!("{} {} chars", "v".green(), text.chars().count()),
        );
    }

    fn on_rounds_complete(&self, completion: &RoundCompletion) {
        for id in &completion.unanswered {
            self.finish(id, format!("{}", "x no answer".red()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl DiscussionProgress for SimpleProgress {
    fn on_operation_start(&self, participants: &[ParticipantId], rounds: u32) {
        let names: Vec<&str> = participants.iter().map(|p| p.as_str()).collect();
        println!(
            "{} {} ({} round(s))",
            "->".cyan(),
            names.join(", ").bold(),
            rounds
        );
    }

    fn on_operation_end(&self, success: bool) {
        if !success {
            println!("  {} operation failed", "x".red());
        }
    }

    fn on_participant_complete(&self, participant: &ParticipantId, _text: &str) {
        println!("  {} {}", "v".green(), participant);
    }

    fn on_anomaly(&self, anomaly: &StreamAnomaly) {
        println!("  {} {}", "!".yellow(), anomaly);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden() -> ProgressReporter {
        ProgressReporter::with_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn test_chunks_accumulate_per_participant() {
        let reporter = hidden();
        let claude = ParticipantId::new("Claude");
        let grok = ParticipantId::new("Grok");

        reporter.on_participant_start(&claude, 1);
        reporter.on_participant_start(&grok, 1);
        reporter.on_participant_chunk(&claude, "He");
        reporter.on_participant_chunk(&grok, "Yo");
        reporter.on_participant_chunk(&claude, "llo");

        assert_eq!(reporter.streamed_chars("Claude"), Some(5));
        assert_eq!(reporter.streamed_chars("Grok"), Some(2));
    }

    #[test]
    fn test_completed_participant_is_released() {
        let reporter = hidden();
        let claude = ParticipantId::new("Claude");

        reporter.on_participant_start(&claude, 1);
        reporter.on_participant_complete(&claude, "Hello!");

        assert_eq!(reporter.streamed_chars("Claude"), None);
    }

    #[test]
    fn test_chunk_for_unknown_participant_is_ignored() {
        let reporter = hidden();
        reporter.on_participant_chunk(&ParticipantId::new("Ghost"), "boo");
        assert_eq!(reporter.streamed_chars("Ghost"), None);
    }

    #[test]
    fn test_operation_end_clears_remaining_lines() {
        let reporter = hidden();
        let grok = ParticipantId::new("Grok");

        reporter.on_participant_start(&grok, 1);
        reporter.on_operation_end(false);

        assert_eq!(reporter.streamed_chars("Grok"), None);
    }
}
