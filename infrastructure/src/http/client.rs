//! Shared HTTP client for the discussion backend

use super::error::HttpError;
use council_domain::util::preview;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Longest error body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// Thin wrapper around `reqwest::Client` bound to one backend base URL.
///
/// Plain requests are bounded by `request_timeout`; streaming requests only
/// by the connect timeout, since a discussion may stream for minutes.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, HttpError> {
        let base_url = if base_url.starts_with("http") {
            base_url.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", base_url.trim_end_matches('/'))
        };

        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(HttpError::Client)?;

        Ok(Self {
            base_url,
            client,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode a JSON body. Non-2xx statuses are errors.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&url, e))?;
        Self::decode(&url, response, false).await.map(|(_, body)| body)
    }

    /// POST a JSON body and decode a JSON reply. Non-2xx statuses are errors.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        self.post(path, body, false).await.map(|(_, body)| body)
    }

    /// POST a JSON body and decode the reply whatever the status, as long as
    /// the body parses. Returns the status alongside the body.
    pub async fn post_json_any_status<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(u16, T), HttpError> {
        self.post(path, body, true).await
    }

    /// POST a JSON body and return the open `text/event-stream` response.
    pub async fn post_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, HttpError> {
        let url = self.url(path);
        debug!("POST {} (stream)", url);
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(response)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        any_status: bool,
    ) -> Result<(u16, T), HttpError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&url, e))?;
        Self::decode(&url, response, any_status).await
    }

    async fn decode<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
        any_status: bool,
    ) -> Result<(u16, T), HttpError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::from_reqwest(url, e))?;

        match serde_json::from_str::<T>(&text) {
            Ok(body) if status.is_success() || any_status => Ok((status.as_u16(), body)),
            Ok(_) => Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            }),
            Err(_) if !status.is_success() => Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            }),
            Err(e) => Err(HttpError::Decode(format!("{}: {}", url, e))),
        }
    }
}

/// Best human-readable message from an error body.
///
/// Prefers a JSON `message` or `error` field, otherwise a preview of the body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        return "empty response".to_string();
    }
    preview(body.trim(), MAX_ERROR_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let backend = HttpBackend::new("127.0.0.1:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
        assert_eq!(backend.url("/api/models"), "http://127.0.0.1:5000/api/models");

        let backend = HttpBackend::new("https://council.example", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.url("/api/prompts"), "https://council.example/api/prompts");
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(
            error_message(r#"{"status":"error","message":"No topic provided"}"#),
            "No topic provided"
        );
        assert_eq!(error_message(r#"{"error":"boom"}"#), "boom");
        assert_eq!(error_message(""), "empty response");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
