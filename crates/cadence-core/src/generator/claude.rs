//! Claude (Anthropic) implementation of the [`Generator`] trait.
//!
//! Speaks the messages API: the system prompt goes in the dedicated
//! `system` field, the user prompt as a single user message. The base URL
//! is injectable so tests can point the client at a local mock server.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::trait_def::{GenerateError, GenerationRequest, Generator};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

/// HTTP client for an Anthropic-messages-shaped API.
#[derive(Debug, Clone)]
pub struct ClaudeGenerator {
    model: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl ClaudeGenerator {
    /// Create a client with an explicit API key and model.
    pub fn new(api_key: String, model: Option<String>) -> Result<Self, GenerateError> {
        if api_key.trim().is_empty() {
            return Err(GenerateError::MissingApiKey);
        }
        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        })
    }

    /// Override the API base URL (mock servers in tests, proxies in prod).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Generator for ClaudeGenerator {
    fn name(&self) -> &str {
        "claude"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let url = format!("{}/messages", self.base_url);
        debug!(
            model = %self.model,
            system_len = request.system_prompt.len(),
            user_len = request.user_prompt.len(),
            "sending generation request"
        );

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: &request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.user_prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerateError::Http(format!(
                "API returned {status}: {detail}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Http(format!("unreadable response body: {e}")))?;

        let text: String = parsed
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect();
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "system".into(),
            user_prompt: "user".into(),
        }
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            ClaudeGenerator::new("  ".into(), None),
            Err(GenerateError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn returns_concatenated_content_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_body(r#"{"content": [{"type": "text", "text": "hello "}, {"type": "text", "text": "world"}]}"#)
            .create_async()
            .await;

        let generator = ClaudeGenerator::new("test-key".into(), None)
            .unwrap()
            .with_base_url(server.url());
        let text = generator.generate(&request()).await.unwrap();
        assert_eq!(text, "hello world");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let generator = ClaudeGenerator::new("test-key".into(), None)
            .unwrap()
            .with_base_url(server.url());
        let err = generator.generate(&request()).await.unwrap_err();
        match err {
            GenerateError::Http(detail) => assert!(detail.contains("429")),
            other => panic!("expected Http, got: {other}"),
        }
    }

    #[tokio::test]
    async fn blank_content_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(r#"{"content": [{"type": "text", "text": "  "}]}"#)
            .create_async()
            .await;

        let generator = ClaudeGenerator::new("test-key".into(), None)
            .unwrap()
            .with_base_url(server.url());
        assert!(matches!(
            generator.generate(&request()).await,
            Err(GenerateError::EmptyResponse)
        ));
    }
}
