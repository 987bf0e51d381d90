//! Streaming transport: one `text/event-stream` response per operation.
//!
//! The response body is read by a spawned task that decodes SSE frames and
//! forwards them through an [`EventStream`]. Dropping the stream cancels the
//! task, which drops the response and closes the connection.

use super::client::HttpBackend;
use super::sse::{MAX_PENDING_BYTES, SseDecoder, SseFrame};
use super::wire::{
    ContributionBody, StatusResponse, StreamContinueBody, StreamStartBody, decode_frame,
    discussion_path, wire_participants,
};
use async_trait::async_trait;
use council_application::{
    ContinueRequest, DiscussionTransport, EventSender, EventStream, StartRequest, TransportError,
    TransportItem,
};
use council_domain::DiscussionId;
use serde::Serialize;
use tracing::{debug, warn};

/// Events buffered between the reader task and the session
const STREAM_CAPACITY: usize = 64;

/// [`DiscussionTransport`] over the backend's streaming endpoints
pub struct HttpStreamingTransport {
    backend: HttpBackend,
}

impl HttpStreamingTransport {
    pub fn new(backend: HttpBackend) -> Self {
        Self { backend }
    }

    async fn open<B: Serialize>(&self, path: &str, body: &B) -> Result<EventStream, TransportError> {
        let response = self.backend.post_stream(path, body).await?;
        let (sender, stream) = EventStream::channel(STREAM_CAPACITY);
        tokio::spawn(pump(self.backend.url(path), response, sender));
        Ok(stream)
    }
}

#[async_trait]
impl DiscussionTransport for HttpStreamingTransport {
    fn name(&self) -> &'static str {
        "streaming"
    }

    async fn start(&self, request: StartRequest) -> Result<EventStream, TransportError> {
        let body = StreamStartBody {
            topic: &request.topic,
            rounds: request.rounds.get(),
            participants: wire_participants(&request.participants),
        };
        self.open("/api/discussions/stream", &body).await
    }

    async fn continue_discussion(
        &self,
        request: ContinueRequest,
    ) -> Result<EventStream, TransportError> {
        let body = StreamContinueBody {
            rounds: request.rounds.get(),
            participants: wire_participants(&request.participants),
        };
        let path = discussion_path(&request.discussion_id, "/continue/stream");
        self.open(&path, &body).await
    }

    async fn contribute(
        &self,
        discussion_id: &DiscussionId,
        text: &str,
    ) -> Result<(), TransportError> {
        post_contribution(&self.backend, discussion_id, text).await
    }
}

/// `POST /api/discussions/{id}/contributions`, shared by both transports.
pub(crate) async fn post_contribution(
    backend: &HttpBackend,
    discussion_id: &DiscussionId,
    text: &str,
) -> Result<(), TransportError> {
    let path = discussion_path(discussion_id, "/contributions");
    let reply: StatusResponse = backend.post_json(&path, &ContributionBody { text }).await?;
    if reply.is_error() {
        return Err(TransportError::Rejected(
            reply.message.unwrap_or_else(|| "contribution rejected".to_string()),
        ));
    }
    Ok(())
}

/// Read the response body until it ends, fails, or the consumer goes away.
async fn pump(url: String, mut response: reqwest::Response, sender: EventSender) {
    let cancel = sender.cancellation();
    let mut decoder = SseDecoder::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Event stream from {} cancelled", url);
                return;
            }
            chunk = response.chunk() => chunk,
        };

        match chunk {
            Ok(Some(bytes)) => {
                let frames = decoder.push(&bytes);
                if decoder.take_overflow() {
                    warn!(
                        "Dropped an event from {} larger than {} bytes",
                        url, MAX_PENDING_BYTES
                    );
                    let reason = format!("event exceeded {} bytes", MAX_PENDING_BYTES);
                    if !sender.send(TransportItem::Malformed(reason)).await {
                        return;
                    }
                }
                for frame in frames {
                    if !forward(&sender, &frame).await {
                        return;
                    }
                }
            }
            Ok(None) => {
                if let Some(frame) = decoder.finish() {
                    forward(&sender, &frame).await;
                }
                debug!("Event stream from {} ended", url);
                return;
            }
            Err(e) => {
                warn!("Event stream from {} failed: {}", url, e);
                let error = if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connection(e.to_string())
                };
                sender.send(TransportItem::Failed(error)).await;
                return;
            }
        }
    }
}

/// Forward one frame. Returns `false` when reading should stop.
async fn forward(sender: &EventSender, frame: &SseFrame) -> bool {
    match decode_frame(frame) {
        Ok(event) => {
            let terminal = event.is_terminal();
            sender.send_event(event).await && !terminal
        }
        Err(reason) => {
            debug!("Undecodable frame: {}", reason);
            sender.send(TransportItem::Malformed(reason)).await
        }
    }
}
