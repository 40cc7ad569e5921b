//! Pipeline errors

use std::path::PathBuf;
use thiserror::Error;

use crate::generator::LlmError;
use crate::grammar::GrammarError;
use crate::resources::ResolutionError;

/// A generation run failed
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("failed to compile grammar from {}", path.display())]
    GrammarCompile {
        path: PathBuf,
        #[source]
        source: GrammarError,
    },

    #[error("generation failed")]
    Generation(#[from] LlmError),

    /// The model produced text that is not JSON despite the grammar
    #[error("model output is not valid JSON")]
    MalformedOutput {
        output: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
