//! The resolved configuration record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::file::ConfigFile;
use crate::overrides::ConfigOverrides;

/// Template name used when no layer names one.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "instruct";

/// Default llama-server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Which model runtime drives generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// OpenAI-compatible llama-server (or llama-swap) over HTTP
    #[default]
    LlamaServer,
    /// In-process llama.cpp loading the resolved GGUF file
    LlamaCpp,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LlamaServer => write!(f, "llama-server"),
            Self::LlamaCpp => write!(f, "llama-cpp"),
        }
    }
}

/// Fully layered configuration.
///
/// Scalar `*_name` fields are resolved through the matching search-path list.
/// A `*_path` field is a direct override and bypasses the search paths.
/// Search-path order is priority order: earlier directories win.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Configuration {
    pub model_name: Option<String>,
    pub model_path: Option<PathBuf>,
    pub schema_name: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub prompt_template_name: Option<String>,
    pub prompt_template_path: Option<PathBuf>,

    pub model_search_paths: Vec<PathBuf>,
    pub schema_search_paths: Vec<PathBuf>,
    pub prompt_template_search_paths: Vec<PathBuf>,

    pub backend: Option<BackendKind>,
    pub endpoint: Option<String>,
}

impl Configuration {
    /// Merge one configuration file into this configuration.
    ///
    /// Every key present in the file replaces the current value. List keys are
    /// replaced wholesale, never concatenated.
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        let ConfigFile {
            model_name,
            model_path,
            schema_name,
            schema_path,
            prompt_template_file,
            prompt_template_name,
            prompt_template_path,
            model_paths,
            schema_paths,
            prompt_template_paths,
            backend,
            endpoint,
            ..
        } = file;

        replace(&mut self.model_name, model_name);
        replace(&mut self.model_path, model_path);
        replace(&mut self.schema_name, schema_name);
        replace(&mut self.schema_path, schema_path);
        replace(
            &mut self.prompt_template_name,
            prompt_template_file.or(prompt_template_name),
        );
        replace(&mut self.prompt_template_path, prompt_template_path);
        replace(&mut self.backend, backend);
        replace(&mut self.endpoint, endpoint);

        if let Some(paths) = model_paths {
            self.model_search_paths = paths;
        }
        if let Some(paths) = schema_paths {
            self.schema_search_paths = paths;
        }
        if let Some(paths) = prompt_template_paths {
            self.prompt_template_search_paths = paths;
        }

        self
    }

    /// Apply command-line overrides. Only explicitly supplied values win.
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        replace(&mut self.model_name, overrides.model_name.clone());
        replace(&mut self.model_path, overrides.model_path.clone());
        replace(&mut self.schema_name, overrides.schema_name.clone());
        replace(&mut self.schema_path, overrides.schema_path.clone());
        replace(
            &mut self.prompt_template_name,
            overrides.prompt_template_name.clone(),
        );
        replace(
            &mut self.prompt_template_path,
            overrides.prompt_template_path.clone(),
        );
        replace(&mut self.backend, overrides.backend);
        replace(&mut self.endpoint, overrides.endpoint.clone());
        self
    }

    /// Backend to use, falling back to the default.
    pub fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }

    /// Endpoint to use, falling back to the default.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }
}

fn replace<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
