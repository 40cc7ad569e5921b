//! The model runtime seam
//!
//! A [`GeneratorFactory`] turns a resolved model into a [`ConstrainedGenerator`],
//! which runs a single grammar-constrained completion. Backends live in
//! `ggrama-llm`; tests use the mocks in `test_support`.

use async_trait::async_trait;
use thiserror::Error;

use crate::grammar::Grammar;
use crate::resources::ResolvedModel;

/// Model runtime failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("{provider}: {message}")]
    ProviderError { provider: String, message: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// One constrained completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstrainedRequest {
    /// Fully rendered prompt
    pub prompt: String,
    pub grammar: Grammar,
    /// Token budget; `None` generates until the grammar or the model stops
    pub max_tokens: Option<u32>,
}

impl ConstrainedRequest {
    /// Request with an unbounded token budget
    pub fn new(prompt: impl Into<String>, grammar: Grammar) -> Self {
        Self {
            prompt: prompt.into(),
            grammar,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstrainedResponse {
    pub text: String,
    /// Tokens generated, when the runtime reports it
    pub tokens: Option<u32>,
    /// Generation stopped at the token budget or context limit
    pub truncated: bool,
}

/// A loaded model that can generate under a grammar constraint
#[async_trait]
pub trait ConstrainedGenerator: Send + Sync {
    /// Name the runtime knows the model by
    fn model_name(&self) -> &str;

    async fn generate(&self, request: ConstrainedRequest) -> LlmResult<ConstrainedResponse>;
}

/// Opens generators for resolved models
pub trait GeneratorFactory: Send + Sync {
    fn open(&self, model: &ResolvedModel) -> LlmResult<Box<dyn ConstrainedGenerator>>;
}
