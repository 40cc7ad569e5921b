use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ggrama_config::{BackendKind, ConfigOverrides};

/// Model runtime selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// OpenAI-compatible llama-server over HTTP
    LlamaServer,
    /// In-process llama.cpp (needs the `llama-cpp` feature)
    LlamaCpp,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::LlamaServer => BackendKind::LlamaServer,
            BackendArg::LlamaCpp => BackendKind::LlamaCpp,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ggrama")]
#[command(about = "Schema-constrained structured output from a local language model")]
#[command(version)]
pub struct Cli {
    /// Load a configuration file (repeatable, applied in order)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_files: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// File supplying auxiliary input text
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the result here instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Model file name to look up in the model search paths
    #[arg(short = 'm', long)]
    pub model_name: Option<String>,

    /// Model file, or the only directory to search for it.
    /// llama-server only receives the file stem as the model name and answers with
    /// whichever model it has loaded under that name.
    #[arg(short = 'M', long)]
    pub model_path: Option<PathBuf>,

    /// Schema name to look up in the schema search paths
    #[arg(short = 's', long)]
    pub schema_name: Option<String>,

    /// Schema file, or the only directory to search for it
    #[arg(short = 'S', long)]
    pub schema_path: Option<PathBuf>,

    /// Prompt template name (default: instruct)
    #[arg(short = 't', long = "prompt-template", value_name = "NAME")]
    pub prompt_template: Option<String>,

    /// Prompt template file, or the only directory to search for it
    #[arg(short = 'T', long)]
    pub prompt_template_path: Option<PathBuf>,

    /// Model runtime
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// llama-server URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Give up on llama-server after this many seconds (default: wait)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Prompt words; read from standard input when empty and no --input is given
    pub prompt: Vec<String>,
}

impl Cli {
    /// The command-line layer of the configuration
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model_name: self.model_name.clone(),
            model_path: self.model_path.clone(),
            schema_name: self.schema_name.clone(),
            schema_path: self.schema_path.clone(),
            prompt_template_name: self.prompt_template.clone(),
            prompt_template_path: self.prompt_template_path.clone(),
            backend: self.backend.map(Into::into),
            endpoint: self.endpoint.clone(),
        }
    }
}
