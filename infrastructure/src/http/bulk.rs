//! Bulk fallback transport for backends without streaming endpoints.
//!
//! Each operation is one JSON request/response. The reply is normalized and
//! replayed as the event sequence a streaming backend would have produced,
//! so the session handles both transports the same way.

use super::client::HttpBackend;
use super::streaming::post_contribution;
use super::wire::{BulkRequestBody, BulkResponse, discussion_path, synthesize_events};
use async_trait::async_trait;
use council_application::{
    ContinueRequest, DiscussionTransport, EventStream, ParticipantBrief, StartRequest,
    TransportError,
};
use council_domain::{DiscussionId, ParticipantId};
use tracing::{debug, info};
use uuid::Uuid;

/// [`DiscussionTransport`] over the backend's request/response endpoints
pub struct HttpBulkTransport {
    backend: HttpBackend,
}

impl HttpBulkTransport {
    pub fn new(backend: HttpBackend) -> Self {
        Self { backend }
    }

    async fn exchange(
        &self,
        path: &str,
        body: &BulkRequestBody<'_>,
        participants: &[ParticipantBrief],
        rounds_requested: u32,
        fallback_id: DiscussionId,
    ) -> Result<EventStream, TransportError> {
        let (status, reply): (u16, BulkResponse) =
            self.backend.post_json_any_status(path, body).await?;
        debug!("Bulk reply from {} with HTTP {}", path, status);

        let requested: Vec<ParticipantId> = participants.iter().map(|p| p.id.clone()).collect();
        let items = synthesize_events(reply, &requested, rounds_requested, Some(fallback_id));
        Ok(EventStream::from_items(items))
    }
}

#[async_trait]
impl DiscussionTransport for HttpBulkTransport {
    fn name(&self) -> &'static str {
        "bulk"
    }

    async fn start(&self, request: StartRequest) -> Result<EventStream, TransportError> {
        let body = BulkRequestBody::new(
            Some(&request.topic),
            request.rounds.get(),
            &request.participants,
        );
        let local_id = DiscussionId::new(Uuid::new_v4().to_string());
        info!("Starting bulk discussion (local id {})", local_id);
        self.exchange(
            "/api/discuss",
            &body,
            &request.participants,
            request.rounds.get(),
            local_id,
        )
        .await
    }

    async fn continue_discussion(
        &self,
        request: ContinueRequest,
    ) -> Result<EventStream, TransportError> {
        let body = BulkRequestBody::new(None, request.rounds.get(), &request.participants);
        let path = discussion_path(&request.discussion_id, "/continue");
        self.exchange(
            &path,
            &body,
            &request.participants,
            request.rounds.get(),
            request.discussion_id.clone(),
        )
        .await
    }

    async fn contribute(
        &self,
        discussion_id: &DiscussionId,
        text: &str,
    ) -> Result<(), TransportError> {
        post_contribution(&self.backend, discussion_id, text).await
    }
}
