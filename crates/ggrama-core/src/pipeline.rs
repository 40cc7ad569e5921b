//! The generation pipeline
//!
//! Resolves the prompt template, model and schema, compiles the schema into a
//! grammar, renders the prompt, runs one constrained generation and parses the
//! result as JSON. Nothing is retried and nothing is cached between runs.

use ggrama_config::Configuration;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::generator::{ConstrainedRequest, GeneratorFactory};
use crate::grammar::Grammar;
use crate::resources::{ResolutionError, ResolvedArtifacts};

/// User input for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Auxiliary input text, empty when none was given
    pub input_data: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, input_data: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            input_data: input_data.into(),
        }
    }
}

/// Runs constrained generation against an immutable configuration
#[derive(Debug)]
pub struct GenerationPipeline<F> {
    config: Configuration,
    factory: F,
}

impl<F: GeneratorFactory> GenerationPipeline<F> {
    pub fn new(config: Configuration, factory: F) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Resolve the prompt template, model and schema, in that order.
    pub fn resolve(&self) -> Result<ResolvedArtifacts, ResolutionError> {
        ResolvedArtifacts::resolve(&self.config)
    }

    /// Resolve everything, generate once and parse the output.
    pub async fn run(&self, request: &GenerationRequest) -> PipelineResult<Value> {
        let artifacts = self.resolve()?;
        self.generate(&artifacts, request).await
    }

    /// Generate from already resolved artifacts.
    pub async fn generate(
        &self,
        artifacts: &ResolvedArtifacts,
        request: &GenerationRequest,
    ) -> PipelineResult<Value> {
        let grammar = Grammar::compile(&artifacts.schema).map_err(|source| {
            PipelineError::GrammarCompile {
                path: artifacts.schema.path().to_path_buf(),
                source,
            }
        })?;

        let prompt = artifacts
            .prompt_template
            .template
            .render(&request.prompt, &request.input_data);
        debug!("Rendered prompt:\n{}", prompt);

        let generator = self.factory.open(&artifacts.model)?;
        info!(
            "Generating with {} ({} grammar rules)",
            generator.model_name(),
            grammar.rule_names().len()
        );

        let response = generator
            .generate(ConstrainedRequest::new(prompt, grammar))
            .await?;
        debug!("Model output: {}", response.text);

        serde_json::from_str(&response.text).map_err(|source| PipelineError::MalformedOutput {
            output: response.text,
            source,
        })
    }
}
