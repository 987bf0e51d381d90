//! Participant registry
//!
//! Owns the [`Roster`] for one client and keeps it in sync with the backend
//! directory and the local override store.

use crate::ports::directory::{DirectoryError, ParticipantDirectory};
use crate::ports::participant_store::ParticipantStore;
use crate::ports::transport::ParticipantBrief;
use council_domain::{
    DiscoveredParticipant, InstructionsUpdate, Participant, ParticipantId, ParticipantOverride,
    Roster,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The set of known participants and their activation state.
///
/// Every mutation persists the full `{id, active, order}` snapshot. A
/// persistence failure is logged and never fails the mutation.
pub struct ParticipantRegistry {
    roster: Roster,
    store: Arc<dyn ParticipantStore>,
    degraded: bool,
}

impl ParticipantRegistry {
    /// Create an empty registry backed by `store`.
    pub fn new(store: Arc<dyn ParticipantStore>) -> Self {
        Self {
            roster: Roster::default(),
            store,
            degraded: false,
        }
    }

    /// Merge `discovered` with `overrides` and persist the result.
    pub fn load_from(
        &mut self,
        discovered: &[DiscoveredParticipant],
        overrides: &[ParticipantOverride],
    ) -> &[Participant] {
        self.roster = Roster::merge(discovered, overrides);
        self.degraded = false;
        debug!(
            "Merged {} discovered participants with {} stored overrides",
            discovered.len(),
            overrides.len()
        );
        self.persist();
        self.roster.participants()
    }

    /// Discover participants from `directory` and merge them with the store.
    ///
    /// If discovery fails the registry is left empty and [`is_degraded`]
    /// reports `true`; nothing is persisted so stored state survives the
    /// outage. A failure to fetch instructions only leaves them empty.
    ///
    /// [`is_degraded`]: ParticipantRegistry::is_degraded
    pub async fn load(&mut self, directory: &dyn ParticipantDirectory) -> &[Participant] {
        let discovered = match directory.discover().await {
            Ok(discovered) => discovered,
            Err(e) => {
                warn!("Participant discovery failed: {}", e);
                self.roster = Roster::default();
                self.degraded = true;
                return self.roster.participants();
            }
        };

        let overrides = self.store.load().unwrap_or_else(|e| {
            warn!("Failed to read stored participant state: {}", e);
            Vec::new()
        });

        self.load_from(&discovered, &overrides);

        match directory.instructions().await {
            Ok(set) => self.roster.apply_instructions(&set),
            Err(e) => warn!("Failed to fetch participant instructions: {}", e),
        }

        info!(
            "Loaded {} participants ({} active)",
            self.roster.len(),
            self.roster.active().count()
        );
        self.roster.participants()
    }

    /// Toggle one participant. Returns `false` if the id is unknown.
    pub fn set_active(&mut self, id: &str, value: bool) -> bool {
        if !self.roster.set_active(id, value) {
            debug!("set_active ignored for unknown participant '{}'", id);
            return false;
        }
        self.persist();
        true
    }

    /// Replace the instructions of one participant.
    ///
    /// Changing the instructions of an inactive participant reactivates it.
    pub fn set_instructions(
        &mut self,
        id: &str,
        text: impl Into<String>,
    ) -> Option<InstructionsUpdate> {
        let update = self.roster.set_instructions(id, text)?;
        if update != InstructionsUpdate::Unchanged {
            self.persist();
        }
        Some(update)
    }

    /// Restore the backend default instructions of one participant.
    pub fn reset_instructions(&mut self, id: &str) -> Option<InstructionsUpdate> {
        let update = self.roster.reset_instructions(id)?;
        if update != InstructionsUpdate::Unchanged {
            self.persist();
        }
        Some(update)
    }

    /// Push the current instructions of every participant to the backend.
    ///
    /// Returns the number of participants published.
    pub async fn publish_instructions(
        &self,
        directory: &dyn ParticipantDirectory,
    ) -> Result<usize, DirectoryError> {
        let instructions: HashMap<ParticipantId, String> = self
            .roster
            .participants()
            .iter()
            .map(|p| (p.id.clone(), p.instructions.clone()))
            .collect();

        directory.publish_instructions(&instructions).await?;
        info!("Published instructions for {} participants", instructions.len());
        Ok(instructions.len())
    }

    /// Ids of active participants in display order. Empty is valid.
    pub fn active_ids(&self) -> Vec<ParticipantId> {
        self.roster.active_ids()
    }

    /// Active participants with their instructions, as sent to the backend.
    pub fn active_briefs(&self) -> Vec<ParticipantBrief> {
        self.roster
            .active()
            .map(|p| ParticipantBrief {
                id: p.id.clone(),
                instructions: p.instructions.clone(),
            })
            .collect()
    }

    pub fn participants(&self) -> &[Participant] {
        self.roster.participants()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.roster.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// `true` when the last discovery failed.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.roster.snapshot()) {
            warn!("Failed to persist participant state: {}", e);
        }
    }
}
