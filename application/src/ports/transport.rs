//! Discussion transport port
//!
//! Defines how the session talks to the discussion backend. Implementations
//! (streaming and bulk) live in the infrastructure layer; one of them is
//! selected at construction time.

use async_trait::async_trait;
use council_domain::{DiscussionId, ParticipantId, RoundCount, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors raised while talking to the discussion backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Timeout")]
    Timeout,

    #[error("Stream closed before the operation finished")]
    StreamClosed,
}

/// A participant as sent to the backend: its id and current instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantBrief {
    pub id: ParticipantId,
    pub instructions: String,
}

/// Request to open a new discussion.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub topic: String,
    pub rounds: RoundCount,
    pub participants: Vec<ParticipantBrief>,
}

/// Request to run more rounds of an existing discussion.
#[derive(Debug, Clone)]
pub struct ContinueRequest {
    pub discussion_id: DiscussionId,
    pub rounds: RoundCount,
    pub participants: Vec<ParticipantBrief>,
}

/// One item delivered by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportItem {
    /// A decoded event
    Event(StreamEvent),
    /// A frame that could not be decoded; the stream continues
    Malformed(String),
    /// The transport failed; nothing follows
    Failed(TransportError),
}

/// Producer half of an [`EventStream`], held by the transport reader task.
pub struct EventSender {
    sender: mpsc::Sender<TransportItem>,
    cancel: CancellationToken,
}

impl EventSender {
    /// Deliver one item. Returns `false` once the consumer is gone.
    pub async fn send(&self, item: TransportItem) -> bool {
        self.sender.send(item).await.is_ok()
    }

    pub async fn send_event(&self, event: StreamEvent) -> bool {
        self.send(TransportItem::Event(event)).await
    }

    /// Token cancelled when the consumer drops or cancels the stream.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Handle for receiving the events of one operation.
///
/// Dropping the handle cancels the producer, which releases the underlying
/// connection.
pub struct EventStream {
    receiver: mpsc::Receiver<TransportItem>,
    cancel: CancellationToken,
}

impl EventStream {
    /// Create a connected sender/stream pair.
    pub fn channel(capacity: usize) -> (EventSender, EventStream) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        (
            EventSender {
                sender,
                cancel: cancel.clone(),
            },
            EventStream { receiver, cancel },
        )
    }

    /// A stream that yields `items` and then ends.
    pub fn from_items(items: Vec<TransportItem>) -> EventStream {
        let (sender, stream) = Self::channel(items.len());
        for item in items {
            // capacity covers every item
            let _ = sender.sender.try_send(item);
        }
        stream
    }

    /// A stream that yields `events` and then ends.
    pub fn from_events(events: Vec<StreamEvent>) -> EventStream {
        Self::from_items(events.into_iter().map(TransportItem::Event).collect())
    }

    /// Next item, or `None` when the producer finished.
    pub async fn next(&mut self) -> Option<TransportItem> {
        self.receiver.recv().await
    }

    /// Stop the producer. Items already buffered are discarded.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Transport for discussion operations
#[async_trait]
pub trait DiscussionTransport: Send + Sync {
    /// Short name used in logs (e.g. "streaming", "bulk")
    fn name(&self) -> &'static str;

    /// Open a discussion and stream its first rounds.
    async fn start(&self, request: StartRequest) -> Result<EventStream, TransportError>;

    /// Stream further rounds of an existing discussion.
    async fn continue_discussion(
        &self,
        request: ContinueRequest,
    ) -> Result<EventStream, TransportError>;

    /// Add a user contribution to an existing discussion.
    async fn contribute(
        &self,
        discussion_id: &DiscussionId,
        text: &str,
    ) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_events_yields_in_order_then_ends() {
        let mut stream = EventStream::from_events(vec![
            StreamEvent::start("A"),
            StreamEvent::chunk("A", "x"),
        ]);
        assert_eq!(
            stream.next().await,
            Some(TransportItem::Event(StreamEvent::start("A")))
        );
        assert_eq!(
            stream.next().await,
            Some(TransportItem::Event(StreamEvent::chunk("A", "x")))
        );
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn dropping_stream_cancels_producer() {
        let (sender, stream) = EventStream::channel(4);
        let token = sender.cancellation();
        assert!(!sender.is_cancelled());

        drop(stream);

        assert!(token.is_cancelled());
        assert!(!sender.send_event(StreamEvent::start("A")).await);
    }

    #[tokio::test]
    async fn cancel_stops_delivery() {
        let (sender, mut stream) = EventStream::channel(4);
        assert!(sender.send_event(StreamEvent::start("A")).await);
        stream.cancel();
        assert!(sender.is_cancelled());
        assert_eq!(stream.next().await, None);
    }
}
