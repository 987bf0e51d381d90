//! Stream reconciler: per-participant buffers for one streaming operation.
//!
//! The backend multiplexes several participants into one event sequence.
//! [`StreamReconciler`] demultiplexes it into one [`ParticipantBuffer`] per
//! expected participant and reports what each event changed.
//!
//! Per participant: `Pending → Streaming → {Complete, Errored}`.
//! Per operation: `Idle → Active → {Complete, Error}`.
//!
//! Out-of-order or unexpected events never abort the operation. They are
//! repaired where possible (a chunk before `participant_start` opens the
//! buffer) or ignored, and recorded as [`StreamAnomaly`] values.

use super::event::{DiscussionId, StreamEvent};
use crate::participant::entities::ParticipantId;
use std::collections::HashMap;

/// Status of one participant's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStatus {
    Pending,
    Streaming,
    Complete,
    Errored,
}

impl BufferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BufferStatus::Complete | BufferStatus::Errored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BufferStatus::Pending => "pending",
            BufferStatus::Streaming => "streaming",
            BufferStatus::Complete => "complete",
            BufferStatus::Errored => "errored",
        }
    }
}

/// Accumulated text and status for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantBuffer {
    status: BufferStatus,
    text: String,
    turn: u32,
    error: Option<String>,
}

impl ParticipantBuffer {
    fn new() -> Self {
        Self {
            status: BufferStatus::Pending,
            text: String::new(),
            turn: 0,
            error: None,
        }
    }

    pub fn status(&self) -> BufferStatus {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based turn within the operation; 0 while pending.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn open_turn(&mut self) {
        self.turn += 1;
        self.text.clear();
        self.status = BufferStatus::Streaming;
    }
}

/// State of the operation as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    Active,
    Complete,
    Error,
}

/// A protocol irregularity absorbed by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAnomaly {
    /// A participant event arrived before `operation_start`
    MissingOperationStart,
    DuplicateOperationStart,
    /// Event for an id that was not part of the request
    UnexpectedParticipant {
        participant: ParticipantId,
        event: &'static str,
    },
    ChunkBeforeStart(ParticipantId),
    CompleteBeforeStart(ParticipantId),
    DuplicateStart(ParticipantId),
    /// More turns than rounds requested
    TurnLimitExceeded(ParticipantId),
    /// Event for a participant whose buffer is already final
    AfterParticipantFinished {
        participant: ParticipantId,
        event: &'static str,
    },
    /// Event after `operation_complete` / `operation_error`
    AfterOperationEnded { event: &'static str },
    /// A frame the transport could not parse into an event
    Malformed(String),
}

impl std::fmt::Display for StreamAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamAnomaly::MissingOperationStart => {
                write!(f, "participant event before operation_start")
            }
            StreamAnomaly::DuplicateOperationStart => write!(f, "duplicate operation_start"),
            StreamAnomaly::UnexpectedParticipant { participant, event } => {
                write!(f, "{event} for unexpected participant '{participant}'")
            }
            StreamAnomaly::ChunkBeforeStart(p) => {
                write!(f, "participant_chunk for '{p}' before participant_start")
            }
            StreamAnomaly::CompleteBeforeStart(p) => {
                write!(f, "participant_complete for '{p}' before participant_start")
            }
            StreamAnomaly::DuplicateStart(p) => write!(f, "duplicate participant_start for '{p}'"),
            StreamAnomaly::TurnLimitExceeded(p) => {
                write!(f, "'{p}' started more turns than rounds requested")
            }
            StreamAnomaly::AfterParticipantFinished { participant, event } => {
                write!(f, "{event} for '{participant}' after it finished")
            }
            StreamAnomaly::AfterOperationEnded { event } => {
                write!(f, "{event} after the operation ended")
            }
            StreamAnomaly::Malformed(reason) => write!(f, "malformed event: {reason}"),
        }
    }
}

/// The completion signal of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCompletion {
    pub rounds_completed: u32,
    pub rounds_requested: u32,
    /// Participants still pending or streaming when the operation completed
    pub unanswered: Vec<ParticipantId>,
}

impl RoundCompletion {
    /// `true` when every requested round ran; otherwise the caller may continue.
    pub fn fully_done(&self) -> bool {
        self.rounds_completed >= self.rounds_requested
    }
}

/// What a single event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    OperationStarted {
        discussion_id: Option<DiscussionId>,
    },
    ParticipantStarted {
        participant: ParticipantId,
        turn: u32,
    },
    Chunk {
        participant: ParticipantId,
        text: String,
    },
    /// The buffer was frozen; `text` is its final content.
    ParticipantCompleted {
        participant: ParticipantId,
        text: String,
        turn: u32,
    },
    OperationFailed {
        message: String,
        aborted: Vec<ParticipantId>,
    },
    OperationCompleted(RoundCompletion),
    /// Nothing changed
    Ignored,
}

/// Result of [`StreamReconciler::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileStep {
    pub outcome: ReconcileOutcome,
    pub anomalies: Vec<StreamAnomaly>,
}

impl ReconcileStep {
    fn clean(outcome: ReconcileOutcome) -> Self {
        Self {
            outcome,
            anomalies: Vec::new(),
        }
    }

    fn ignored(anomaly: StreamAnomaly) -> Self {
        Self {
            outcome: ReconcileOutcome::Ignored,
            anomalies: vec![anomaly],
        }
    }
}

/// Reconciles the events of one streaming operation.
#[derive(Debug, Clone)]
pub struct StreamReconciler {
    order: Vec<ParticipantId>,
    buffers: HashMap<ParticipantId, ParticipantBuffer>,
    rounds_requested: u32,
    state: OperationState,
    /// Set by the first `operation_start`, even when it arrives late
    start_seen: bool,
    anomalies: Vec<StreamAnomaly>,
}

impl StreamReconciler {
    /// Create a reconciler expecting output from `participants`.
    pub fn new(participants: impl IntoIterator<Item = ParticipantId>, rounds_requested: u32) -> Self {
        let mut order = Vec::new();
        let mut buffers = HashMap::new();
        for id in participants {
            if !buffers.contains_key(&id) {
                buffers.insert(id.clone(), ParticipantBuffer::new());
                order.push(id);
            }
        }
        Self {
            order,
            buffers,
            rounds_requested: rounds_requested.max(1),
            state: OperationState::Idle,
            start_seen: false,
            anomalies: Vec::new(),
        }
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, OperationState::Complete | OperationState::Error)
    }

    pub fn rounds_requested(&self) -> u32 {
        self.rounds_requested
    }

    /// Participants expected to produce output, in request order.
    pub fn pending_participants(&self) -> &[ParticipantId] {
        &self.order
    }

    pub fn buffer(&self, id: &str) -> Option<&ParticipantBuffer> {
        self.buffers.get(id)
    }

    /// Every anomaly recorded so far, in arrival order.
    pub fn anomalies(&self) -> &[StreamAnomaly] {
        &self.anomalies
    }

    /// Record an anomaly detected outside the reconciler (e.g. an unparseable frame).
    pub fn record(&mut self, anomaly: StreamAnomaly) {
        self.anomalies.push(anomaly);
    }

    /// Apply one event in arrival order.
    pub fn apply(&mut self, event: StreamEvent) -> ReconcileStep {
        if self.is_finished() {
            return self.keep(ReconcileStep::ignored(StreamAnomaly::AfterOperationEnded {
                event: event.name(),
            }));
        }

        let mut leading = Vec::new();
        match (&event, self.state) {
            (StreamEvent::OperationStart { .. }, _) if self.start_seen => {
                return self.keep(ReconcileStep::ignored(StreamAnomaly::DuplicateOperationStart));
            }
            (StreamEvent::OperationStart { .. }, _) => self.start_seen = true,
            (_, OperationState::Idle) => leading.push(StreamAnomaly::MissingOperationStart),
            _ => {}
        }
        self.state = OperationState::Active;

        let mut step = match event {
            StreamEvent::OperationStart { discussion_id } => {
                ReconcileStep::clean(ReconcileOutcome::OperationStarted { discussion_id })
            }
            StreamEvent::ParticipantStart { participant } => self.on_start(participant),
            StreamEvent::ParticipantChunk { participant, text } => self.on_chunk(participant, text),
            StreamEvent::ParticipantComplete {
                participant,
                final_text,
            } => self.on_complete(participant, final_text),
            StreamEvent::OperationError { message } => {
                let aborted = self.abort(&message);
                ReconcileStep::clean(ReconcileOutcome::OperationFailed { message, aborted })
            }
            StreamEvent::OperationComplete {
                rounds_completed,
                rounds_requested,
            } => ReconcileStep::clean(ReconcileOutcome::OperationCompleted(
                self.complete(rounds_completed, rounds_requested),
            )),
        };

        leading.append(&mut step.anomalies);
        step.anomalies = leading;
        self.keep(step)
    }

    /// Move every pending/streaming buffer to `Errored` and end the operation.
    ///
    /// Completed buffers are preserved. Returns the aborted participants.
    pub fn abort(&mut self, message: &str) -> Vec<ParticipantId> {
        if self.is_finished() {
            return Vec::new();
        }
        self.state = OperationState::Error;

        let mut aborted = Vec::new();
        for id in &self.order {
            if let Some(buffer) = self.buffers.get_mut(id)
                && !buffer.status.is_terminal()
            {
                buffer.status = BufferStatus::Errored;
                buffer.error = Some(message.to_string());
                aborted.push(id.clone());
            }
        }
        aborted
    }

    fn complete(&mut self, rounds_completed: u32, rounds_requested: u32) -> RoundCompletion {
        self.state = OperationState::Complete;

        let mut unanswered = Vec::new();
        for id in &self.order {
            if let Some(buffer) = self.buffers.get_mut(id)
                && !buffer.status.is_terminal()
            {
                buffer.status = BufferStatus::Errored;
                buffer.error = Some("no response before the operation completed".to_string());
                unanswered.push(id.clone());
            }
        }

        RoundCompletion {
            rounds_completed,
            rounds_requested,
            unanswered,
        }
    }

    fn on_start(&mut self, participant: ParticipantId) -> ReconcileStep {
        let rounds_requested = self.rounds_requested;
        let Some(buffer) = self.buffers.get_mut(&participant) else {
            return ReconcileStep::ignored(StreamAnomaly::UnexpectedParticipant {
                participant,
                event: "participant_start",
            });
        };

        match buffer.status {
            BufferStatus::Pending => {}
            BufferStatus::Complete if buffer.turn < rounds_requested => {}
            BufferStatus::Complete => {
                return ReconcileStep::ignored(StreamAnomaly::TurnLimitExceeded(participant));
            }
            BufferStatus::Streaming => {
                return ReconcileStep::ignored(StreamAnomaly::DuplicateStart(participant));
            }
            BufferStatus::Errored => {
                return ReconcileStep::ignored(StreamAnomaly::AfterParticipantFinished {
                    participant,
                    event: "participant_start",
                });
            }
        }

        buffer.open_turn();
        let turn = buffer.turn;
        ReconcileStep::clean(ReconcileOutcome::ParticipantStarted { participant, turn })
    }

    fn on_chunk(&mut self, participant: ParticipantId, text: String) -> ReconcileStep {
        let rounds_requested = self.rounds_requested;
        let Some(buffer) = self.buffers.get_mut(&participant) else {
            return ReconcileStep::ignored(StreamAnomaly::UnexpectedParticipant {
                participant,
                event: "participant_chunk",
            });
        };

        let mut anomalies = Vec::new();
        match buffer.status {
            BufferStatus::Streaming => {}
            BufferStatus::Pending => {
                buffer.open_turn();
                anomalies.push(StreamAnomaly::ChunkBeforeStart(participant.clone()));
            }
            BufferStatus::Complete if buffer.turn < rounds_requested => {
                buffer.open_turn();
                anomalies.push(StreamAnomaly::ChunkBeforeStart(participant.clone()));
            }
            BufferStatus::Complete | BufferStatus::Errored => {
                return ReconcileStep::ignored(StreamAnomaly::AfterParticipantFinished {
                    participant,
                    event: "participant_chunk",
                });
            }
        }

        buffer.text.push_str(&text);
        ReconcileStep {
            outcome: ReconcileOutcome::Chunk { participant, text },
            anomalies,
        }
    }

    fn on_complete(&mut self, participant: ParticipantId, final_text: Option<String>) -> ReconcileStep {
        let rounds_requested = self.rounds_requested;
        let Some(buffer) = self.buffers.get_mut(&participant) else {
            return ReconcileStep::ignored(StreamAnomaly::UnexpectedParticipant {
                participant,
                event: "participant_complete",
            });
        };

        let mut anomalies = Vec::new();
        match buffer.status {
            BufferStatus::Streaming => {}
            BufferStatus::Pending => {
                buffer.open_turn();
                anomalies.push(StreamAnomaly::CompleteBeforeStart(participant.clone()));
            }
            BufferStatus::Complete if buffer.turn < rounds_requested => {
                buffer.open_turn();
                anomalies.push(StreamAnomaly::CompleteBeforeStart(participant.clone()));
            }
            BufferStatus::Complete | BufferStatus::Errored => {
                return ReconcileStep::ignored(StreamAnomaly::AfterParticipantFinished {
                    participant,
                    event: "participant_complete",
                });
            }
        }

        if let Some(text) = final_text {
            buffer.text = text;
        }
        buffer.status = BufferStatus::Complete;

        ReconcileStep {
            outcome: ReconcileOutcome::ParticipantCompleted {
                text: buffer.text.clone(),
                turn: buffer.turn,
                participant,
            },
            anomalies,
        }
    }

    fn keep(&mut self, step: ReconcileStep) -> ReconcileStep {
        self.anomalies.extend(step.anomalies.iter().cloned());
        step
    }
}
