//! In-process llama.cpp backend
//!
//! Loads the resolved GGUF file with `llama-cpp-2` and samples greedily through a
//! grammar sampler until the model emits end-of-sequence, the token budget is
//! spent, or the context window is full.

use async_trait::async_trait;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;

use ggrama_core::{
    ConstrainedGenerator, ConstrainedRequest, ConstrainedResponse, LlmError, LlmResult,
    ResolvedModel,
};

const PROVIDER: &str = "llama.cpp";

/// Context window used for generation
const DEFAULT_CONTEXT_SIZE: u32 = 4096;

fn provider_error(message: impl Into<String>) -> LlmError {
    LlmError::ProviderError {
        provider: PROVIDER.to_string(),
        message: message.into(),
    }
}

struct Loaded {
    backend: LlamaBackend,
    model: LlamaModel,
}

/// [`ConstrainedGenerator`] running a GGUF model in this process
pub struct LlamaCppGenerator {
    loaded: Arc<Loaded>,
    model_name: String,
    context_size: u32,
    n_threads: i32,
}

impl std::fmt::Debug for LlamaCppGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlamaCppGenerator")
            .field("model_name", &self.model_name)
            .field("context_size", &self.context_size)
            .finish()
    }
}

impl LlamaCppGenerator {
    /// Load the model, offloading every layer the GPU backend accepts.
    pub fn load(model: &ResolvedModel) -> LlmResult<Self> {
        let loaded = load_model(&model.path)?;
        let n_threads = (num_cpus::get_physical().saturating_sub(1)).max(1) as i32;

        Ok(Self {
            loaded: Arc::new(loaded),
            model_name: model.name.clone(),
            context_size: DEFAULT_CONTEXT_SIZE,
            n_threads,
        })
    }
}

fn load_model(path: &Path) -> LlmResult<Loaded> {
    info!("Loading GGUF model from {}", path.display());

    let backend = LlamaBackend::init()
        .map_err(|e| provider_error(format!("Failed to initialize llama.cpp: {}", e)))?;
    let params = LlamaModelParams::default().with_n_gpu_layers(999);
    let model = LlamaModel::load_from_file(&backend, path, &params)
        .map_err(|e| provider_error(format!("Failed to load {}: {}", path.display(), e)))?;

    Ok(Loaded { backend, model })
}

#[async_trait]
impl ConstrainedGenerator for LlamaCppGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, request: ConstrainedRequest) -> LlmResult<ConstrainedResponse> {
        let loaded = Arc::clone(&self.loaded);
        let context_size = self.context_size;
        let n_threads = self.n_threads;

        tokio::task::spawn_blocking(move || {
            generate_blocking(&loaded, &request, context_size, n_threads)
        })
        .await
        .map_err(|e| provider_error(format!("Generation task failed: {}", e)))?
    }
}

fn generate_blocking(
    loaded: &Loaded,
    request: &ConstrainedRequest,
    context_size: u32,
    n_threads: i32,
) -> LlmResult<ConstrainedResponse> {
    let model = &loaded.model;

    let ctx_params = LlamaContextParams::default()
        .with_n_ctx(NonZeroU32::new(context_size))
        .with_n_threads(n_threads)
        .with_n_threads_batch(n_threads);
    let mut ctx = model
        .new_context(&loaded.backend, ctx_params)
        .map_err(|e| provider_error(format!("Failed to create context: {}", e)))?;

    let tokens = model
        .str_to_token(&request.prompt, AddBos::Always)
        .map_err(|e| provider_error(format!("Tokenization failed: {}", e)))?;
    if tokens.len() >= context_size as usize {
        return Err(provider_error(format!(
            "Prompt is {} tokens, context holds {}",
            tokens.len(),
            context_size
        )));
    }

    let mut batch = LlamaBatch::new(tokens.len(), 1);
    for (pos, token) in tokens.iter().enumerate() {
        let is_last = pos == tokens.len() - 1;
        batch
            .add(*token, pos as i32, &[0], is_last)
            .map_err(|e| provider_error(format!("Failed to add token to batch: {}", e)))?;
    }
    ctx.decode(&mut batch)
        .map_err(|e| provider_error(format!("Decode failed: {}", e)))?;

    let grammar = LlamaSampler::grammar(model, request.grammar.as_str(), "root")
        .map_err(|e| provider_error(format!("Failed to create grammar sampler: {:?}", e)))?;
    let mut sampler = LlamaSampler::chain_simple([grammar, LlamaSampler::greedy()]);

    // Unbounded requests stop at end-of-sequence or when the context is full.
    let room = context_size.saturating_sub(tokens.len() as u32);
    let budget = request.max_tokens.map_or(room, |max| max.min(room));

    let eos_token = model.token_eos();
    let mut current_pos = tokens.len() as i32;

    // `sample` also accepts the token into the grammar state.
    let (output_tokens, finished) = sample_tokens(budget, eos_token, |previous| {
        if let Some(token) = previous {
            batch.clear();
            batch
                .add(token, current_pos, &[0], true)
                .map_err(|e| provider_error(format!("Failed to add token: {}", e)))?;
            ctx.decode(&mut batch)
                .map_err(|e| provider_error(format!("Decode failed: {}", e)))?;
            current_pos += 1;
        }
        Ok(sampler.sample(&ctx, -1))
    })?;

    let text = model
        .tokens_to_str(&output_tokens, Special::Plaintext)
        .map_err(|e| provider_error(format!("Failed to decode tokens: {}", e)))?;
    debug!("Generated {} tokens", output_tokens.len());

    Ok(ConstrainedResponse {
        text,
        tokens: Some(output_tokens.len() as u32),
        truncated: !finished,
    })
}

/// Draw tokens until `eos` or until `budget` tokens have been produced.
///
/// `next` receives the previously drawn token, which must be fed to the model
/// before the next one is sampled. Returns the tokens and whether `eos` was seen.
fn sample_tokens<T: Copy + PartialEq>(
    budget: u32,
    eos: T,
    mut next: impl FnMut(Option<T>) -> LlmResult<T>,
) -> LlmResult<(Vec<T>, bool)> {
    let mut drawn = Vec::new();
    let mut previous = None;

    while (drawn.len() as u32) < budget {
        let token = next(previous)?;
        if token == eos {
            return Ok((drawn, true));
        }
        drawn.push(token);
        previous = Some(token);
    }

    Ok((drawn, false))
}
