//! Mock model runtime for tests
//!
//! Enabled with the `test-utils` feature. The mocks record every call so tests
//! can check what the pipeline sent to the runtime.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::generator::{
    ConstrainedGenerator, ConstrainedRequest, ConstrainedResponse, GeneratorFactory, LlmError,
    LlmResult,
};
use crate::resources::ResolvedModel;

/// Record of one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub model: String,
    pub prompt: String,
    /// GBNF text of the grammar that was sent
    pub grammar: String,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
}

/// Generator that returns a canned reply
#[derive(Debug, Clone)]
pub struct MockGenerator {
    model_name: String,
    reply: MockReply,
    call_history: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerator {
    /// Always answer with `text`
    pub fn new(model_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            reply: MockReply::Text(text.into()),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails with a provider error carrying `message`
    pub fn failing(model_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Fail(message.into()),
            ..Self::new(model_name, String::new())
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.call_history).clone()
    }
}

#[async_trait]
impl ConstrainedGenerator for MockGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, request: ConstrainedRequest) -> LlmResult<ConstrainedResponse> {
        lock(&self.call_history).push(MockCall {
            model: self.model_name.clone(),
            prompt: request.prompt,
            grammar: request.grammar.as_str().to_string(),
            max_tokens: request.max_tokens,
        });

        match &self.reply {
            MockReply::Text(text) => Ok(ConstrainedResponse {
                text: text.clone(),
                tokens: None,
                truncated: false,
            }),
            MockReply::Fail(message) => Err(LlmError::ProviderError {
                provider: "mock".to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Factory handing out [`MockGenerator`]s that share one call history
#[derive(Debug, Clone)]
pub struct MockFactory {
    reply: MockReply,
    open_error: Option<String>,
    opened: Arc<Mutex<Vec<PathBuf>>>,
    call_history: Arc<Mutex<Vec<MockCall>>>,
}

impl MockFactory {
    /// Generators answer with `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Text(text.into()),
            open_error: None,
            opened: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Generators fail every call with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Fail(message.into()),
            ..Self::new(String::new())
        }
    }

    /// Opening a model fails with `message`
    pub fn unopenable(message: impl Into<String>) -> Self {
        Self {
            open_error: Some(message.into()),
            ..Self::new(String::new())
        }
    }

    /// Generation calls made through any generator this factory opened
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.call_history).clone()
    }

    /// Model paths passed to `open`, in order
    pub fn opened_models(&self) -> Vec<PathBuf> {
        lock(&self.opened).clone()
    }
}

impl GeneratorFactory for MockFactory {
    fn open(&self, model: &ResolvedModel) -> LlmResult<Box<dyn ConstrainedGenerator>> {
        lock(&self.opened).push(model.path.clone());

        if let Some(message) = &self.open_error {
            return Err(LlmError::ConfigError(message.clone()));
        }

        Ok(Box::new(MockGenerator {
            model_name: model.name.clone(),
            reply: self.reply.clone(),
            call_history: Arc::clone(&self.call_history),
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
