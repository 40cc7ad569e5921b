//! Prompt and input-data assembly
//!
//! The prompt is the positional words joined by single spaces. With no words
//! and no `--input` file the prompt is read from standard input, unless stdin is
//! a terminal. A run needs a non-blank prompt or non-blank input data.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use ggrama_core::GenerationRequest;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("no prompt given: pass prompt words, --input FILE, or pipe text on stdin")]
    EmptyPrompt,

    #[error("failed to read input file {path}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read the prompt from stdin")]
    ReadStdin(#[source] std::io::Error),
}

/// Build the request from the command line, reading stdin if needed.
pub fn assemble(words: &[String], input: Option<&Path>) -> Result<GenerationRequest, InputError> {
    let stdin = std::io::stdin();
    let piped = if words.is_empty() && input.is_none() && !stdin.is_terminal() {
        Some(stdin.lock())
    } else {
        None
    };
    assemble_from(words, input, piped)
}

/// Like [`assemble`] with an explicit prompt source used when no words and no
/// input file were given.
pub fn assemble_from<R: Read>(
    words: &[String],
    input: Option<&Path>,
    fallback: Option<R>,
) -> Result<GenerationRequest, InputError> {
    let input_data = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| InputError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?,
        None => String::new(),
    };

    let prompt = match fallback {
        Some(mut reader) if words.is_empty() && input.is_none() => {
            debug!("Reading prompt from stdin");
            let mut text = String::new();
            reader
                .read_to_string(&mut text)
                .map_err(InputError::ReadStdin)?;
            text.trim_end_matches(['\r', '\n']).to_string()
        }
        _ => words.join(" "),
    };

    if prompt.trim().is_empty() && input_data.trim().is_empty() {
        return Err(InputError::EmptyPrompt);
    }

    Ok(GenerationRequest::new(prompt, input_data))
}
