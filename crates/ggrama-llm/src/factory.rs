//! Backend selection

use std::time::Duration;
use tracing::{debug, info};

use ggrama_config::{BackendKind, Configuration};
use ggrama_core::{ConstrainedGenerator, GeneratorFactory, LlmError, LlmResult, ResolvedModel};

use crate::server::{LlamaClient, LlamaServerGenerator};

/// Opens generators for the backend named in the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BackendFactory {
    backend: BackendKind,
    endpoint: String,
    timeout: Option<Duration>,
}

impl BackendFactory {
    pub fn new(backend: BackendKind, endpoint: impl Into<String>) -> Self {
        Self {
            backend,
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(config.backend(), config.endpoint())
    }

    /// Bound llama-server requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}

impl GeneratorFactory for BackendFactory {
    fn open(&self, model: &ResolvedModel) -> LlmResult<Box<dyn ConstrainedGenerator>> {
        debug!("Opening {} with the {} backend", model.path.display(), self.backend);

        match self.backend {
            BackendKind::LlamaServer => {
                info!(
                    "llama-server at {} will be asked for model '{}'; the file itself is not sent",
                    self.endpoint, model.name
                );
                let mut client = LlamaClient::new(&self.endpoint)?;
                if let Some(timeout) = self.timeout {
                    client = client.with_timeout(timeout);
                }
                Ok(Box::new(LlamaServerGenerator::new(client, &model.name)))
            }
            BackendKind::LlamaCpp => open_llama_cpp(model),
        }
    }
}

#[cfg(feature = "llama-cpp")]
fn open_llama_cpp(model: &ResolvedModel) -> LlmResult<Box<dyn ConstrainedGenerator>> {
    Ok(Box::new(crate::llama_cpp::LlamaCppGenerator::load(model)?))
}

#[cfg(not(feature = "llama-cpp"))]
fn open_llama_cpp(_model: &ResolvedModel) -> LlmResult<Box<dyn ConstrainedGenerator>> {
    Err(LlmError::Unsupported(
        "the llama-cpp backend is not compiled in; rebuild with `--features llama-cpp`".to_string(),
    ))
}
