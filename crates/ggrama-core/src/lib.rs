//! # ggrama core
//!
//! Turns a resolved [`Configuration`](ggrama_config::Configuration) into
//! schema-constrained structured output:
//!
//! - [`locator`]: ordered search-path lookup with a suffix fallback
//! - [`resources`]: resolving model, schema and prompt template names
//! - [`template`]: literal `{prompt}` / `{input_data}` substitution
//! - [`grammar`]: GBNF validation and JSON Schema conversion
//! - [`generator`]: the model runtime seam
//! - [`pipeline`]: the end-to-end run

#![warn(clippy::all)]

pub mod error;
pub mod generator;
pub mod grammar;
pub mod locator;
pub mod pipeline;
pub mod resources;
pub mod template;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use error::{PipelineError, PipelineResult};
pub use generator::{
    ConstrainedGenerator, ConstrainedRequest, ConstrainedResponse, GeneratorFactory, LlmError,
    LlmResult,
};
pub use grammar::{Grammar, GrammarError};
pub use locator::{locate, locate_content, LocateError, Located, NotFoundError};
pub use pipeline::{GenerationPipeline, GenerationRequest};
pub use resources::{
    resolve_model, resolve_prompt_template, resolve_schema, ResolutionError, ResolvedArtifacts,
    ResolvedModel, ResolvedPromptTemplate, ResolvedSchema, ResourceKind,
};
pub use template::PromptTemplate;
