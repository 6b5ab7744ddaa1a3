//! Anthropic Messages API backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wordbank_core::error::OracleError;

use crate::chat::{
    build_http_client, error_for_status, map_send_error, ChatModel, ChatRequest, ChatResponse,
    DEFAULT_TIMEOUT_SECS,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API client.
pub struct AnthropicChat {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl AnthropicChat {
    pub fn new(api_key: &str, base_url: Option<String>) -> Result<Self, OracleError> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Result<Self, OracleError> {
        self.client = build_http_client(timeout_secs)?;
        self.timeout_secs = timeout_secs;
        Ok(self)
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    model: String,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<AnthropicError>(body)
        .ok()
        .map(|e| e.error.message)
}

#[async_trait]
impl ChatModel for AnthropicChat {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, OracleError> {
        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout_secs))?;

        let response = error_for_status(response, &request.model, error_message).await?;

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(format!("failed to parse response: {e}")))?;

        let content = api_response
            .content
            .iter()
            .filter(|c| c.kind.is_empty() || c.kind == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        Ok(ChatResponse {
            content,
            model: api_response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new("claude-3-5-haiku-20241022", "Grade this sentence")
    }

    #[tokio::test]
    async fn successful_completion() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"score\": 80}"},
                {"type": "tool_use", "id": "x", "name": "noop", "input": {}}
            ],
            "model": "claude-3-5-haiku-20241022",
            "usage": {"input_tokens": 50, "output_tokens": 20}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-haiku-20241022",
                "messages": [{"role": "user", "content": "Grade this sentence"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("test-key", Some(server.uri())).unwrap();
        let response = chat.complete(&request()).await.unwrap();
        assert_eq!(response.content, "{\"score\": 80}");
        assert_eq!(response.model, "claude-3-5-haiku-20241022");
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("bad-key", Some(server.uri())).unwrap();
        let err = chat.complete(&request()).await.unwrap_err();
        assert!(matches!(err, OracleError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("test-key", Some(server.uri())).unwrap();
        let err = chat.complete(&request()).await.unwrap_err();
        assert_eq!(err.retry_after_ms(), Some(5000));
    }

    #[tokio::test]
    async fn api_error_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("test-key", Some(server.uri())).unwrap();
        match chat.complete(&request()).await.unwrap_err() {
            OracleError::ApiError { status, message } => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_model_maps_to_model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("test-key", Some(server.uri())).unwrap();
        assert!(matches!(
            chat.complete(&request()).await,
            Err(OracleError::ModelNotFound(m)) if m == "claude-3-5-haiku-20241022"
        ));
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("test-key", Some(server.uri())).unwrap();
        assert!(matches!(
            chat.complete(&request()).await,
            Err(OracleError::MalformedResponse(_))
        ));
    }
}
