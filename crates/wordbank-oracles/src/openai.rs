//! OpenAI-compatible chat completions backend (OpenAI, OpenRouter, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wordbank_core::error::OracleError;

use crate::chat::{
    build_http_client, error_for_status, map_send_error, ChatModel, ChatRequest, ChatResponse,
    DEFAULT_TIMEOUT_SECS,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Base URL for OpenRouter's OpenAI-compatible API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";

/// OpenAI-compatible API client.
pub struct OpenAiChat {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    /// Sent as `HTTP-Referer`, used by OpenRouter for attribution.
    referer: Option<String>,
    /// Sent as `X-Title`.
    title: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        org_id: Option<String>,
    ) -> Result<Self, OracleError> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            org_id,
            referer: None,
            title: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Attribution headers for OpenRouter.
    pub fn with_app_headers(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Result<Self, OracleError> {
        self.client = build_http_client(timeout_secs)?;
        self.timeout_secs = timeout_secs;
        Ok(self)
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    model: Option<String>,
    /// OpenRouter may report upstream failures in a 200 body.
    #[serde(default)]
    error: Option<OpenAiErrorBody>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Deserialize)]
struct OpenAiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<OpenAiError>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, OracleError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(OpenAiMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(OpenAiMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = OpenAiRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages,
        };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }
        if let Some(referer) = &self.referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            req = req.header("X-Title", title);
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout_secs))?;

        let response = error_for_status(response, &request.model, error_message).await?;

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(format!("failed to parse response: {e}")))?;

        if let Some(error) = api_response.error {
            let status = error
                .code
                .as_ref()
                .and_then(|c| c.as_u64())
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(502);
            return Err(OracleError::ApiError {
                status,
                message: error.message,
            });
        }

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(ChatResponse {
            content,
            model: api_response.model.unwrap_or_else(|| request.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new("qwen/qwen-2.5-72b-instruct:free", "Translate: hello")
    }

    #[tokio::test]
    async fn successful_completion_with_openrouter_headers() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "choices": [{"message": {"content": " 你好 ", "role": "assistant"}, "index": 0}],
            "model": "qwen/qwen-2.5-72b-instruct:free",
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("HTTP-Referer", "http://localhost:5173"))
            .and(header("X-Title", "Vocab Manager"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "Translate: hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let chat = OpenAiChat::new("test-key", Some(server.uri()), None)
            .unwrap()
            .with_app_headers(
                Some("http://localhost:5173".into()),
                Some("Vocab Manager".into()),
            );
        let response = chat.complete(&request()).await.unwrap();
        assert_eq!(response.content, "你好");
    }

    #[tokio::test]
    async fn system_prompt_is_sent_first() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "Translate: hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let chat = OpenAiChat::new("k", Some(server.uri()), None).unwrap();
        let response = chat
            .complete(&request().with_system("be brief"))
            .await
            .unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(response.model, "qwen/qwen-2.5-72b-instruct:free");
    }

    #[tokio::test]
    async fn error_in_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"message": "Provider returned error", "code": 503}
            })))
            .mount(&server)
            .await;

        let chat = OpenAiChat::new("k", Some(server.uri()), None).unwrap();
        match chat.complete(&request()).await.unwrap_err() {
            OracleError::ApiError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Provider returned error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let chat = OpenAiChat::new("k", Some(server.uri()), None).unwrap();
        let err = chat.complete(&request()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_secs(3))
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let chat = OpenAiChat::new("k", Some(server.uri()), None)
            .unwrap()
            .with_timeout(1)
            .unwrap();
        assert!(matches!(
            chat.complete(&request()).await,
            Err(OracleError::Timeout(1))
        ));
    }
}
