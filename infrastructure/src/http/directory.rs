//! HTTP participant directory: `/api/models` and `/api/prompts`.

use super::client::HttpBackend;
use super::wire::StatusResponse;
use async_trait::async_trait;
use council_application::{DirectoryError, ParticipantDirectory};
use council_domain::{DiscoveredParticipant, InstructionSet, ParticipantId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A discovery entry: a bare id or `{id, name}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelEntry {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct PromptsResponse {
    #[serde(default)]
    prompts: HashMap<String, String>,
    #[serde(default)]
    defaults: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    prompts: HashMap<&'a str, &'a str>,
}

/// [`ParticipantDirectory`] backed by the discussion backend
pub struct HttpParticipantDirectory {
    backend: HttpBackend,
}

impl HttpParticipantDirectory {
    pub fn new(backend: HttpBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ParticipantDirectory for HttpParticipantDirectory {
    async fn discover(&self) -> Result<Vec<DiscoveredParticipant>, DirectoryError> {
        let reply: ModelsResponse = self.backend.get_json("/api/models").await?;
        if reply.status.as_deref() == Some("error") {
            return Err(DirectoryError::Rejected(
                reply.message.unwrap_or_else(|| "model listing failed".to_string()),
            ));
        }

        let mut discovered = Vec::with_capacity(reply.models.len());
        for entry in reply.models {
            let (id, name) = match entry {
                ModelEntry::Id(id) => (id, None),
                ModelEntry::Detailed { id, name } => (id, name),
            };
            let Ok(id) = ParticipantId::try_new(id) else {
                warn!("Skipping discovered participant with an empty id");
                continue;
            };
            let participant = DiscoveredParticipant::new(id);
            discovered.push(match name {
                Some(name) => participant.with_display_name(name),
                None => participant,
            });
        }
        debug!("Discovered {} participants", discovered.len());
        Ok(discovered)
    }

    /// Backends without a `defaults` map report their current prompts as
    /// the defaults.
    async fn instructions(&self) -> Result<InstructionSet, DirectoryError> {
        let reply: PromptsResponse = self.backend.get_json("/api/prompts").await?;
        let to_ids = |map: HashMap<String, String>| -> HashMap<ParticipantId, String> {
            map.into_iter()
                .map(|(id, text)| (ParticipantId::new(id), text))
                .collect()
        };

        let defaults = reply.defaults.unwrap_or_else(|| reply.prompts.clone());
        Ok(InstructionSet {
            current: to_ids(reply.prompts),
            defaults: to_ids(defaults),
        })
    }

    async fn publish_instructions(
        &self,
        instructions: &HashMap<ParticipantId, String>,
    ) -> Result<(), DirectoryError> {
        if instructions.is_empty() {
            return Ok(());
        }
        let body = PublishBody {
            prompts: instructions
                .iter()
                .map(|(id, text)| (id.as_str(), text.as_str()))
                .collect(),
        };
        let reply: StatusResponse = self.backend.post_json("/api/prompts", &body).await?;
        if reply.is_error() {
            return Err(DirectoryError::Rejected(
                reply.message.unwrap_or_else(|| "prompt update failed".to_string()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_server::{json_response, serve_once};
    use std::time::Duration;

    fn directory(base_url: &str) -> HttpParticipantDirectory {
        HttpParticipantDirectory::new(HttpBackend::new(base_url, Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_discover_accepts_strings_and_objects() {
        let (url, _request) = serve_once(json_response(
            200,
            r#"{"status":"success","models":["Claude",{"id":"Grok","name":"Grok 3"},""]}"#,
        ))
        .await;

        let discovered = directory(&url).discover().await.unwrap();

        assert_eq!(
            discovered,
            vec![
                DiscoveredParticipant::new("Claude"),
                DiscoveredParticipant::new("Grok").with_display_name("Grok 3"),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_http_error() {
        let (url, _request) = serve_once(json_response(503, "")).await;

        let err = directory(&url).discover().await.unwrap_err();

        assert!(matches!(err, DirectoryError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_instructions_fall_back_to_current_as_defaults() {
        let (url, _request) = serve_once(json_response(
            200,
            r#"{"status":"success","prompts":{"Claude":"Be concise."}}"#,
        ))
        .await;

        let set = directory(&url).instructions().await.unwrap();

        assert_eq!(set.current.get("Claude").map(String::as_str), Some("Be concise."));
        assert_eq!(set.defaults.get("Claude").map(String::as_str), Some("Be concise."));
    }

    #[tokio::test]
    async fn test_publish_posts_prompts() {
        let (url, request) = serve_once(json_response(
            200,
            r#"{"status":"success","message":"Prompts updated successfully"}"#,
        ))
        .await;
        let mut instructions = HashMap::new();
        instructions.insert(ParticipantId::new("Claude"), "Cite sources.".to_string());

        directory(&url)
            .publish_instructions(&instructions)
            .await
            .unwrap();

        let recorded = request.await.unwrap();
        let body: serde_json::Value = serde_json::from_str(&recorded.body).unwrap();
        assert_eq!(body["prompts"]["Claude"], "Cite sources.");
    }

    #[tokio::test]
    async fn test_publish_nothing_skips_request() {
        let result = directory("http://127.0.0.1:9")
            .publish_instructions(&HashMap::new())
            .await;
        assert!(result.is_ok());
    }
}
