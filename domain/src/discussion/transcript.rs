//! Append-only discussion transcript.

use crate::participant::entities::ParticipantId;
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Participant,
    System,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::Participant => "participant",
            MessageKind::System => "system",
        }
    }
}

/// One finalized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub kind: MessageKind,
    /// Set only for participant entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ParticipantId>,
    pub text: String,
    /// Strictly increasing, starting at 1
    pub sequence: u64,
    /// Discussion round the entry belongs to, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

/// Ordered log of finalized messages.
///
/// Entries are only ever appended. Participant messages land in completion
/// order, not the order their streams started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn append_user(&mut self, text: impl Into<String>, round: Option<u32>) -> &TranscriptEntry {
        self.push(MessageKind::User, None, text.into(), round)
    }

    pub fn append_participant(
        &mut self,
        author: ParticipantId,
        text: impl Into<String>,
        round: u32,
    ) -> &TranscriptEntry {
        self.push(MessageKind::Participant, Some(author), text.into(), Some(round))
    }

    pub fn append_system(&mut self, text: impl Into<String>) -> &TranscriptEntry {
        self.push(MessageKind::System, None, text.into(), None)
    }

    /// Entries authored by `participant`.
    pub fn by_participant<'a>(
        &'a self,
        participant: &'a str,
    ) -> impl Iterator<Item = &'a TranscriptEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.author.as_ref().is_some_and(|a| a.as_str() == participant))
    }

    fn push(
        &mut self,
        kind: MessageKind,
        author: Option<ParticipantId>,
        text: String,
        round: Option<u32>,
    ) -> &TranscriptEntry {
        let sequence = self.entries.last().map_or(1, |e| e.sequence + 1);
        self.entries.push(TranscriptEntry {
            kind,
            author,
            text,
            sequence,
            round,
        });
        &self.entries[self.entries.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_at_one_and_increases() {
        let mut t = Transcript::new();
        t.append_user("What is 2+2?", Some(1));
        t.append_participant("Claude".into(), "4", 1);
        t.append_system("note");

        let seqs: Vec<u64> = t.entries().iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn participant_entries_carry_author() {
        let mut t = Transcript::new();
        let entry = t.append_participant("Grok".into(), "hi", 2);
        assert_eq!(entry.kind, MessageKind::Participant);
        assert_eq!(entry.author.as_ref().map(|a| a.as_str()), Some("Grok"));
        assert_eq!(entry.round, Some(2));

        let system = t.append_system("x");
        assert!(system.author.is_none());
    }

    #[test]
    fn filters_by_participant() {
        let mut t = Transcript::new();
        t.append_user("topic", Some(1));
        t.append_participant("A".into(), "a1", 1);
        t.append_participant("B".into(), "b1", 1);
        t.append_participant("A".into(), "a2", 2);

        let texts: Vec<&str> = t.by_participant("A").map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["a1", "a2"]);
    }
}
