//! llama-server backend
//!
//! Talks to an OpenAI-compatible `llama-server` (or `llama-swap`) through the
//! text completion endpoint, which applies no chat template, so the rendered
//! prompt reaches the model unchanged. The grammar travels in the `grammar`
//! field that llama-server adds to the request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use ggrama_core::{ConstrainedGenerator, ConstrainedRequest, ConstrainedResponse, LlmError, LlmResult};

const PROVIDER: &str = "llama-server";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response has no choices")]
    EmptyResponse,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ApiError> for LlmError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::EmptyResponse => LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                message: err.to_string(),
            },
            other => LlmError::ProviderError {
                provider: PROVIDER.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Text completion request (no chat template)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextCompletionRequest {
    pub model: String,
    pub prompt: String,
    /// Omitted for an unbounded budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<String>,
}

impl TextCompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: None,
            grammar: None,
        }
    }

    pub fn with_grammar(mut self, grammar: impl Into<String>) -> Self {
        self.grammar = Some(grammar.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: Option<u32>) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// Response from /v1/completions
#[derive(Debug, Clone, Deserialize)]
pub struct TextCompletionResponse {
    pub choices: Vec<TextChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextChoice {
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub completion_tokens: u32,
}

/// Client for llama-server / llama-swap
#[derive(Debug, Clone)]
pub struct LlamaClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl LlamaClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        })
    }

    /// Bound each request; by default requests wait as long as generation takes
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a text completion request (bypasses chat template)
    pub async fn complete_text(
        &self,
        request: &TextCompletionRequest,
    ) -> ApiResult<(TextCompletionResponse, Duration)> {
        let url = format!("{}/v1/completions", self.base_url);
        debug!("POST {} (model {})", url, request.model);
        let start = Instant::now();

        let mut builder = self.client.post(&url).json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let resp = builder.send().await?;

        let elapsed = start.elapsed();

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: TextCompletionResponse = resp.json().await?;
        Ok((response, elapsed))
    }
}

/// [`ConstrainedGenerator`] backed by a llama-server
#[derive(Debug, Clone)]
pub struct LlamaServerGenerator {
    client: LlamaClient,
    model: String,
}

impl LlamaServerGenerator {
    pub fn new(client: LlamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ConstrainedGenerator for LlamaServerGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: ConstrainedRequest) -> LlmResult<ConstrainedResponse> {
        let body = TextCompletionRequest::new(&self.model, request.prompt)
            .with_grammar(request.grammar.as_str())
            .with_max_tokens(request.max_tokens);

        let (response, elapsed) = self.client.complete_text(&body).await?;
        info!(
            "{} answered in {:.1}s",
            self.client.base_url(),
            elapsed.as_secs_f64()
        );

        let choice = response.choices.first().ok_or(ApiError::EmptyResponse)?;
        Ok(ConstrainedResponse {
            text: choice.text.clone(),
            tokens: response.usage.as_ref().map(|u| u.completion_tokens),
            truncated: choice.finish_reason.as_deref() == Some("length"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_request_omits_max_tokens() {
        let req = TextCompletionRequest::new("tiny", "Q: hi").with_grammar("root ::= \"x\"");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "tiny");
        assert_eq!(json["grammar"], "root ::= \"x\"");
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = LlamaClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn api_errors_map_to_provider_errors() {
        let err: LlmError = ApiError::Api {
            status: 503,
            body: "loading model".to_string(),
        }
        .into();
        assert_eq!(
            err,
            LlmError::ProviderError {
                provider: "llama-server".to_string(),
                message: "server returned 503: loading model".to_string(),
            }
        );

        let err: LlmError = ApiError::EmptyResponse.into();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }
}
