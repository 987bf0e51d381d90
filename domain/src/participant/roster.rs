//! Roster: the ordered set of participants and its merge rules.
//!
//! The roster is always kept sorted: active participants first, then by
//! `order`, with the id as the final tie-break so equal orders still sort
//! deterministically.

use super::entities::{DiscoveredParticipant, InstructionSet, Participant, ParticipantId};
use super::overrides::ParticipantOverride;
use std::collections::{HashMap, HashSet};

/// Result of [`Roster::set_instructions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionsUpdate {
    /// The text was identical; nothing changed
    Unchanged,
    /// The text changed on an already active participant
    Updated,
    /// The text changed on an inactive participant, which was reactivated
    Reactivated,
}

/// Ordered collection of participants (Entity)
#[derive(Debug, Clone, Default)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Merge backend discovery with persisted overrides.
    ///
    /// - ids missing from `discovered` are dropped, whatever was persisted
    /// - persisted `{active, order}` values win for known ids
    /// - new ids are active and receive the next unused order value, in
    ///   discovery order (so with nothing persisted, order == discovery index)
    /// - duplicate discovered ids keep their first occurrence
    pub fn merge(discovered: &[DiscoveredParticipant], overrides: &[ParticipantOverride]) -> Self {
        let persisted: HashMap<&str, &ParticipantOverride> = overrides
            .iter()
            .map(|record| (record.id.as_str(), record))
            .collect();

        let mut seen = HashSet::new();
        let unique: Vec<&DiscoveredParticipant> = discovered
            .iter()
            .filter(|d| seen.insert(d.id.as_str()))
            .collect();

        let mut next_order = unique
            .iter()
            .filter_map(|d| persisted.get(d.id.as_str()).and_then(|r| r.order))
            .max()
            .map_or(0, |max| max.saturating_add(1));

        let participants = unique
            .into_iter()
            .map(|d| {
                let record = persisted.get(d.id.as_str());
                let order = match record.and_then(|r| r.order) {
                    Some(order) => order,
                    None => {
                        let order = next_order;
                        next_order = next_order.saturating_add(1);
                        order
                    }
                };
                let mut participant = Participant::new(d.id.clone(), order);
                if let Some(name) = &d.display_name {
                    participant.display_name = name.clone();
                }
                participant.active = record.is_none_or(|r| r.active);
                participant
            })
            .collect();

        let mut roster = Self { participants };
        roster.sort();
        roster
    }

    /// Fill in instruction text from the backend prompt store.
    ///
    /// Participants without a current value fall back to their default.
    /// This is a load-time operation and never changes activation.
    pub fn apply_instructions(&mut self, set: &InstructionSet) {
        for participant in &mut self.participants {
            if let Some(default) = set.defaults.get(participant.id.as_str()) {
                participant.default_instructions = default.clone();
            }
            participant.instructions = set
                .current
                .get(participant.id.as_str())
                .cloned()
                .unwrap_or_else(|| participant.default_instructions.clone());
        }
    }

    /// Participants in display order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id.as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Set the activation flag of one participant.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown.
    pub fn set_active(&mut self, id: &str, value: bool) -> bool {
        let Some(participant) = self.participants.iter_mut().find(|p| p.id.as_str() == id) else {
            return false;
        };
        participant.active = value;
        self.sort();
        true
    }

    /// Replace the instructions of one participant.
    ///
    /// Editing the instructions of an inactive participant reactivates it.
    /// Returns `None` if the id is unknown.
    pub fn set_instructions(&mut self, id: &str, text: impl Into<String>) -> Option<InstructionsUpdate> {
        let text = text.into();
        let participant = self.participants.iter_mut().find(|p| p.id.as_str() == id)?;

        if participant.instructions == text {
            return Some(InstructionsUpdate::Unchanged);
        }
        participant.instructions = text;

        if participant.active {
            return Some(InstructionsUpdate::Updated);
        }
        participant.active = true;
        self.sort();
        Some(InstructionsUpdate::Reactivated)
    }

    /// Restore the backend default instructions of one participant.
    pub fn reset_instructions(&mut self, id: &str) -> Option<InstructionsUpdate> {
        let default = self.get(id)?.default_instructions.clone();
        self.set_instructions(id, default)
    }

    /// Ids of active participants, in display order.
    pub fn active_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| p.active)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Active participants, in display order.
    pub fn active(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.active)
    }

    /// The full snapshot to persist.
    pub fn snapshot(&self) -> Vec<ParticipantOverride> {
        self.participants
            .iter()
            .map(|p| ParticipantOverride::new(p.id.clone(), p.active, p.order))
            .collect()
    }

    fn sort(&mut self) {
        self.participants
            .sort_by(|a, b| (!a.active, a.order, &a.id).cmp(&(!b.active, b.order, &b.id)));
    }
}
