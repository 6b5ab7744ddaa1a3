//! Chat-completion seam shared by the AI-backed oracles.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use wordbank_core::error::OracleError;

/// Default request timeout for chat providers.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A single-turn chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Provider-specific model id (e.g. `claude-3-5-haiku-20241022`).
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            max_tokens: 2000,
            temperature: 0.3,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Concatenated text content of the reply.
    pub content: String,
    /// Model that actually answered, as reported by the provider.
    pub model: String,
}

/// A chat-completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, OracleError>;
}

/// A model alias bound to a backend and a provider model id.
#[derive(Clone)]
pub struct ModelRoute {
    pub chat: Arc<dyn ChatModel>,
    pub model: String,
}

/// Resolves user-facing model aliases (`haiku`, `qwen`, ...) to backends.
#[derive(Clone, Default)]
pub struct ModelRouter {
    routes: HashMap<String, ModelRoute>,
    default_alias: String,
}

impl ModelRouter {
    pub fn new(default_alias: impl Into<String>) -> Self {
        Self {
            routes: HashMap::new(),
            default_alias: default_alias.into(),
        }
    }

    pub fn with_route(
        mut self,
        alias: impl Into<String>,
        chat: Arc<dyn ChatModel>,
        model: impl Into<String>,
    ) -> Self {
        self.insert(alias, chat, model);
        self
    }

    pub fn insert(
        &mut self,
        alias: impl Into<String>,
        chat: Arc<dyn ChatModel>,
        model: impl Into<String>,
    ) {
        self.routes.insert(
            alias.into(),
            ModelRoute {
                chat,
                model: model.into(),
            },
        );
    }

    pub fn default_alias(&self) -> &str {
        &self.default_alias
    }

    /// Sorted list of usable aliases.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    /// The route for `alias`; unknown or absent aliases use the default.
    pub fn resolve(&self, alias: Option<&str>) -> Result<&ModelRoute, OracleError> {
        if let Some(route) = alias.and_then(|a| self.routes.get(a)) {
            return Ok(route);
        }
        if let Some(alias) = alias {
            debug!(alias, fallback = %self.default_alias, "unknown model alias");
        }
        self.routes.get(&self.default_alias).ok_or_else(|| {
            OracleError::NotConfigured(format!(
                "model alias '{}' has no configured provider",
                self.default_alias
            ))
        })
    }
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, OracleError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| OracleError::NetworkError(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn map_send_error(error: reqwest::Error, timeout_secs: u64) -> OracleError {
    if error.is_timeout() {
        OracleError::Timeout(timeout_secs)
    } else {
        OracleError::NetworkError(error.to_string())
    }
}

/// Map a non-success HTTP status to an [`OracleError`].
///
/// `extract_message` pulls a readable message out of a provider-specific
/// error body.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
    model: &str,
    extract_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, OracleError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(OracleError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 {
        let body = response.text().await.unwrap_or_default();
        return Err(OracleError::AuthenticationFailed(body));
    }
    if status == 404 {
        return Err(OracleError::ModelNotFound(model.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);
    Err(OracleError::ApiError { status, message })
}
