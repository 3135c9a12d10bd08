use stride_core::config::AssistantConfig;

use crate::error::AssistantError;
use crate::stream::DeltaStream;
use crate::types::ChatRequest;
use crate::Result;

// ─── AssistantClient ──────────────────────────────────────────────────────

/// HTTP client for the assistant endpoint.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl AssistantClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Endpoint from config, bearer token from the configured env var.
    pub fn from_config(cfg: &AssistantConfig) -> Self {
        let api_key = std::env::var(&cfg.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::debug!(var = %cfg.api_key_env, "no assistant token in environment");
        }
        Self::new(cfg.endpoint.clone(), api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `request` and return the decoded fragment stream. Status codes
    /// are checked before any fragment is read.
    pub async fn stream(&self, request: &ChatRequest) -> Result<DeltaStream> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "assistant request failed");
            return Err(AssistantError::from_status(status.as_u16(), body));
        }
        if response.content_length() == Some(0) {
            return Err(AssistantError::MissingBody);
        }

        Ok(DeltaStream::spawn(response.bytes_stream()))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use futures::StreamExt;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user("hello")],
            current_week_data: None,
        }
    }

    #[tokio::test]
    async fn streams_fragments_from_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                    data: [DONE]\n\n";
        let mock = server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"messages":[{"role":"user","content":"hello"}]}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let client = AssistantClient::new(format!("{}/chat", server.url()), Some("secret".into()));
        let stream = client.stream(&request()).await.unwrap();
        let text: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(text.concat(), "Hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_rate_limit_and_quota() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/limited")
            .with_status(429)
            .create_async()
            .await;
        server
            .mock("POST", "/broke")
            .with_status(402)
            .create_async()
            .await;

        let limited = AssistantClient::new(format!("{}/limited", server.url()), None);
        assert!(matches!(
            limited.stream(&request()).await,
            Err(AssistantError::RateLimited)
        ));
        let broke = AssistantClient::new(format!("{}/broke", server.url()), None);
        assert!(matches!(
            broke.stream(&request()).await,
            Err(AssistantError::QuotaExhausted)
        ));
    }

    #[tokio::test]
    async fn other_failures_carry_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("{\"error\":\"AI service error\"}")
            .create_async()
            .await;
        let client = AssistantClient::new(server.url(), None);
        match client.stream(&request()).await {
            Err(AssistantError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("AI service error"));
            }
            Err(other) => panic!("unexpected {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[tokio::test]
    async fn empty_success_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .create_async()
            .await;
        let client = AssistantClient::new(server.url(), None);
        assert!(matches!(
            client.stream(&request()).await,
            Err(AssistantError::MissingBody)
        ));
    }
}
