//! Discussion session use case
//!
//! [`DiscussionSession`] drives one discussion from the first topic through
//! any number of continue/contribute turns:
//!
//! ```text
//! start ──▶ stream ──▶ rounds complete ──▶ continue ──▶ stream ──▶ ...
//!                                     └──▶ contribute
//! ```
//!
//! Each start/continue call opens one streaming operation. The caller then
//! pulls updates with [`DiscussionSession::next_update`] (one event per call)
//! or drains the operation with [`DiscussionSession::run_to_completion`].
//! Only one operation may be in flight at a time.

mod error;
mod update;

pub use error::SessionError;
pub use update::{OperationKind, SessionUpdate};

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::DiscussionProgress;
use crate::ports::transport::{
    ContinueRequest, DiscussionTransport, EventStream, StartRequest, TransportError, TransportItem,
};
use crate::use_cases::participant_registry::ParticipantRegistry;
use council_domain::{
    DiscussionId, ParticipantId, ReconcileOutcome, RoundCompletion, RoundCount, StreamAnomaly,
    StreamReconciler, Topic, Transcript,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The operation currently streaming.
struct InFlight {
    kind: OperationKind,
    stream: EventStream,
    reconciler: StreamReconciler,
    /// Rounds completed before this operation; entries are numbered after it
    base_round: u32,
}

/// State machine for one discussion.
pub struct DiscussionSession {
    transport: Arc<dyn DiscussionTransport>,
    logger: Arc<dyn ConversationLogger>,
    discussion_id: Option<DiscussionId>,
    topic: Option<Topic>,
    requested_round_count: u32,
    completed_round_count: u32,
    transcript: Transcript,
    operation: Option<InFlight>,
    last_completion: Option<RoundCompletion>,
    anomalies: Vec<StreamAnomaly>,
}

impl DiscussionSession {
    pub fn new(transport: Arc<dyn DiscussionTransport>, logger: Arc<dyn ConversationLogger>) -> Self {
        Self {
            transport,
            logger,
            discussion_id: None,
            topic: None,
            requested_round_count: 0,
            completed_round_count: 0,
            transcript: Transcript::new(),
            operation: None,
            last_completion: None,
            anomalies: Vec::new(),
        }
    }

    // ==================== Accessors ====================

    /// Backend id of the discussion, once the first start was accepted.
    pub fn discussion_id(&self) -> Option<&DiscussionId> {
        self.discussion_id.as_ref()
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Rounds requested by the most recent start/continue.
    pub fn requested_round_count(&self) -> u32 {
        self.requested_round_count
    }

    /// Total rounds the backend reported as completed.
    pub fn completed_round_count(&self) -> u32 {
        self.completed_round_count
    }

    pub fn operation_in_progress(&self) -> bool {
        self.operation.is_some()
    }

    /// `true` when a discussion exists and nothing is in flight.
    pub fn may_continue(&self) -> bool {
        self.discussion_id.is_some() && self.operation.is_none()
    }

    /// `true` when the last operation completed fewer rounds than requested.
    pub fn continuation_expected(&self) -> bool {
        self.last_completion
            .as_ref()
            .is_some_and(|c| !c.fully_done())
    }

    /// Protocol anomalies absorbed during the current or last operation.
    pub fn anomalies(&self) -> &[StreamAnomaly] {
        &self.anomalies
    }

    // ==================== Operations ====================

    /// Open a new discussion on `topic` with the registry's active participants.
    pub async fn start(
        &mut self,
        registry: &ParticipantRegistry,
        topic: &str,
        rounds: u32,
    ) -> Result<(), SessionError> {
        if self.operation.is_some() {
            return Err(SessionError::OperationInProgress);
        }
        if self.discussion_id.is_some() {
            return Err(SessionError::DiscussionAlreadyStarted);
        }
        let topic = Topic::try_new(topic)?;
        let rounds = RoundCount::new(rounds)?;
        let participants = registry.active_briefs();
        if participants.is_empty() {
            return Err(SessionError::NoActiveParticipants);
        }

        let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
        info!(
            "Starting discussion with {} participants for {} round(s) via {} transport",
            ids.len(),
            rounds,
            self.transport.name()
        );

        self.transcript
            .append_user(topic.content(), Some(self.completed_round_count + 1));
        self.logger.log(ConversationEvent::new(
            "discussion_started",
            json!({
                "topic": topic.content(),
                "rounds": rounds.get(),
                "participants": ids,
            }),
        ));
        self.topic = Some(topic.clone());

        let request = StartRequest {
            topic: topic.into_content(),
            rounds,
            participants,
        };
        match self.transport.start(request).await {
            Ok(stream) => {
                self.open(OperationKind::Start, stream, ids, rounds);
                Ok(())
            }
            Err(e) => Err(self.request_failed(OperationKind::Start, e)),
        }
    }

    /// Run more rounds of the current discussion with the active participants.
    pub async fn continue_discussion(
        &mut self,
        registry: &ParticipantRegistry,
        rounds: u32,
    ) -> Result<(), SessionError> {
        if self.operation.is_some() {
            return Err(SessionError::OperationInProgress);
        }
        let Some(discussion_id) = self.discussion_id.clone() else {
            return Err(SessionError::NoActiveDiscussion);
        };
        let rounds = RoundCount::new(rounds)?;
        let participants = registry.active_briefs();
        if participants.is_empty() {
            return Err(SessionError::NoActiveParticipants);
        }

        let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
        info!(
            "Continuing discussion {} with {} participants for {} round(s)",
            discussion_id,
            ids.len(),
            rounds
        );
        self.logger.log(ConversationEvent::new(
            "discussion_continued",
            json!({
                "discussion_id": discussion_id.as_str(),
                "rounds": rounds.get(),
                "participants": ids,
            }),
        ));

        let request = ContinueRequest {
            discussion_id,
            rounds,
            participants,
        };
        match self.transport.continue_discussion(request).await {
            Ok(stream) => {
                self.open(OperationKind::Continue, stream, ids, rounds);
                Ok(())
            }
            Err(e) => Err(self.request_failed(OperationKind::Continue, e)),
        }
    }

    /// Add a user message to the discussion. Does not start a round.
    pub async fn contribute(&mut self, text: &str) -> Result<(), SessionError> {
        let Some(discussion_id) = self.discussion_id.clone() else {
            return Err(SessionError::NoActiveDiscussion);
        };
        if self.operation.is_some() {
            return Err(SessionError::OperationInProgress);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.transcript.append_user(text, None);
        self.logger.log(ConversationEvent::new(
            "contribution",
            json!({ "discussion_id": discussion_id.as_str(), "text": text }),
        ));

        if let Err(e) = self.transport.contribute(&discussion_id, text).await {
            warn!("Contribution to {} failed: {}", discussion_id, e);
            self.transcript
                .append_system(format!("Failed to send contribution: {}", e));
            return Err(e.into());
        }
        debug!("Contribution sent to {}", discussion_id);
        Ok(())
    }

    /// Process exactly one event of the in-flight operation.
    ///
    /// Returns `None` when no operation is in flight.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let op = self.operation.as_mut()?;
        let item = op.stream.next().await;

        let update = match item {
            Some(TransportItem::Event(event)) => {
                let step = op.reconciler.apply(event);
                for anomaly in &step.anomalies {
                    warn!("{}", SessionError::from(anomaly));
                }
                self.anomalies.extend(step.anomalies);
                self.handle_outcome(step.outcome)
            }
            Some(TransportItem::Malformed(reason)) => {
                let anomaly = StreamAnomaly::Malformed(reason);
                warn!("{}", SessionError::from(&anomaly));
                op.reconciler.record(anomaly.clone());
                self.anomalies.push(anomaly);
                SessionUpdate::Ignored
            }
            Some(TransportItem::Failed(e)) => self.stream_failed(e),
            None => self.stream_failed(TransportError::StreamClosed),
        };
        Some(update)
    }

    /// Drain the in-flight operation, reporting progress along the way.
    ///
    /// Returns the backend's completion signal, or `Ok(None)` when nothing
    /// was in flight.
    pub async fn run_to_completion(
        &mut self,
        progress: &dyn DiscussionProgress,
    ) -> Result<Option<RoundCompletion>, SessionError> {
        let Some(op) = self.operation.as_ref() else {
            return Ok(None);
        };
        progress.on_operation_start(
            op.reconciler.pending_participants(),
            op.reconciler.rounds_requested(),
        );

        let mut reported = self.anomalies.len();
        while let Some(update) = self.next_update().await {
            for anomaly in &self.anomalies[reported..] {
                progress.on_anomaly(anomaly);
            }
            reported = self.anomalies.len();

            match update {
                SessionUpdate::ParticipantStarted { participant, turn } => {
                    progress.on_participant_start(&participant, turn);
                }
                SessionUpdate::Chunk { participant, text } => {
                    progress.on_participant_chunk(&participant, &text);
                }
                SessionUpdate::ParticipantCompleted {
                    participant, text, ..
                } => {
                    progress.on_participant_complete(&participant, &text);
                }
                SessionUpdate::RoundsCompleted(completion) => {
                    progress.on_rounds_complete(&completion);
                    progress.on_operation_end(true);
                    return Ok(Some(completion));
                }
                SessionUpdate::OperationFailed { error, .. } => {
                    progress.on_operation_end(false);
                    return Err(error);
                }
                SessionUpdate::OperationStarted { .. } | SessionUpdate::Ignored => {}
            }
        }
        Ok(None)
    }

    /// Abandon the in-flight operation and release its stream.
    ///
    /// Completed entries are kept. Returns `false` when nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        let Some(mut op) = self.operation.take() else {
            return false;
        };
        op.stream.cancel();
        let aborted = op.reconciler.abort("cancelled");
        info!(
            "Cancelled {} operation ({} participants unfinished)",
            op.kind.as_str(),
            aborted.len()
        );
        self.transcript.append_system("Operation cancelled.");
        true
    }

    /// Forget the current discussion so a new one can be started.
    ///
    /// Any in-flight operation is cancelled first.
    pub fn reset(&mut self) {
        if let Some(mut op) = self.operation.take() {
            op.stream.cancel();
        }
        self.discussion_id = None;
        self.topic = None;
        self.requested_round_count = 0;
        self.completed_round_count = 0;
        self.transcript = Transcript::new();
        self.last_completion = None;
        self.anomalies.clear();
        debug!("Discussion session reset");
    }

    // ==================== Internals ====================

    fn open(
        &mut self,
        kind: OperationKind,
        stream: EventStream,
        participants: Vec<ParticipantId>,
        rounds: RoundCount,
    ) {
        self.requested_round_count = rounds.get();
        self.last_completion = None;
        self.anomalies.clear();
        self.operation = Some(InFlight {
            kind,
            stream,
            reconciler: StreamReconciler::new(participants, rounds.get()),
            base_round: self.completed_round_count,
        });
    }

    fn request_failed(&mut self, kind: OperationKind, e: TransportError) -> SessionError {
        warn!("{} request failed: {}", kind.as_str(), e);
        self.transcript
            .append_system(format!("Failed to {} the discussion: {}", kind.as_str(), e));
        self.logger.log(ConversationEvent::new(
            "operation_error",
            json!({ "operation": kind.as_str(), "message": e.to_string() }),
        ));
        e.into()
    }

    fn handle_outcome(&mut self, outcome: ReconcileOutcome) -> SessionUpdate {
        match outcome {
            ReconcileOutcome::OperationStarted { discussion_id } => {
                self.assign_discussion_id(discussion_id.clone());
                SessionUpdate::OperationStarted { discussion_id }
            }
            ReconcileOutcome::ParticipantStarted { participant, turn } => {
                debug!("{} started turn {}", participant, turn);
                SessionUpdate::ParticipantStarted { participant, turn }
            }
            ReconcileOutcome::Chunk { participant, text } => {
                SessionUpdate::Chunk { participant, text }
            }
            ReconcileOutcome::ParticipantCompleted {
                participant,
                text,
                turn,
            } => {
                let base = self.operation.as_ref().map_or(0, |op| op.base_round);
                let round = base + turn;
                self.transcript
                    .append_participant(participant.clone(), text.clone(), round);
                self.logger.log(ConversationEvent::new(
                    "participant_message",
                    json!({
                        "participant": participant.as_str(),
                        "round": round,
                        "text": text,
                    }),
                ));
                SessionUpdate::ParticipantCompleted {
                    participant,
                    text,
                    round,
                }
            }
            ReconcileOutcome::OperationFailed { message, aborted } => {
                warn!("Backend reported operation error: {}", message);
                self.operation = None;
                self.transcript
                    .append_system(format!("Discussion error: {}", message));
                self.logger.log(ConversationEvent::new(
                    "operation_error",
                    json!({ "message": message, "aborted": aborted }),
                ));
                SessionUpdate::OperationFailed {
                    error: SessionError::BackendOperationError(message),
                    aborted,
                }
            }
            ReconcileOutcome::OperationCompleted(completion) => {
                let requested = self
                    .operation
                    .take()
                    .map_or(0, |op| op.reconciler.rounds_requested());
                let grown = completion.rounds_completed.min(requested);
                self.completed_round_count += grown;
                if !completion.unanswered.is_empty() {
                    let names: Vec<&str> =
                        completion.unanswered.iter().map(|id| id.as_str()).collect();
                    warn!("Operation completed without a response from: {:?}", names);
                    self.transcript
                        .append_system(format!("No response from: {}", names.join(", ")));
                }
                info!(
                    "Completed {} of {} requested round(s); {} in total",
                    completion.rounds_completed,
                    completion.rounds_requested,
                    self.completed_round_count
                );
                self.logger.log(ConversationEvent::new(
                    "operation_complete",
                    json!({
                        "rounds_completed": completion.rounds_completed,
                        "rounds_requested": completion.rounds_requested,
                        "total_rounds": self.completed_round_count,
                    }),
                ));
                self.last_completion = Some(completion.clone());
                SessionUpdate::RoundsCompleted(completion)
            }
            ReconcileOutcome::Ignored => SessionUpdate::Ignored,
        }
    }

    fn assign_discussion_id(&mut self, id: Option<DiscussionId>) {
        let kind = self.operation.as_ref().map(|op| op.kind);
        match (id, &self.discussion_id) {
            (Some(id), None) if kind == Some(OperationKind::Start) => {
                info!("Discussion id assigned: {}", id);
                self.discussion_id = Some(id);
            }
            (Some(id), Some(current)) if &id != current => {
                warn!(
                    "Backend reported discussion id {} but session holds {}; keeping {}",
                    id, current, current
                );
            }
            (None, None) if kind == Some(OperationKind::Start) => {
                warn!("Backend accepted the discussion without an id; it cannot be continued");
            }
            _ => {}
        }
    }

    fn stream_failed(&mut self, e: TransportError) -> SessionUpdate {
        let aborted = match self.operation.take() {
            Some(mut op) => op.reconciler.abort(&e.to_string()),
            None => Vec::new(),
        };
        warn!("Discussion stream failed: {}", e);
        self.transcript
            .append_system(format!("Connection to the discussion was lost: {}", e));
        self.logger.log(ConversationEvent::new(
            "operation_error",
            json!({ "message": e.to_string(), "aborted": aborted }),
        ));
        SessionUpdate::OperationFailed {
            error: e.into(),
            aborted,
        }
    }
}
