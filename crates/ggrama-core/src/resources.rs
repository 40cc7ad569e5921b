//! Resolving configured names to concrete artifacts
//!
//! Each resource kind is resolved the same way:
//!
//! 1. A direct `*_path` override naming an existing file is used as is.
//! 2. A direct override naming a directory replaces the configured search paths.
//! 3. Otherwise the configured search paths are searched for the name, then for
//!    the name with the kind's alternate suffix.

use ggrama_config::Configuration;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::locator::{locate, locate_content, read_text, LocateError, Located, NotFoundError};
use crate::template::PromptTemplate;

/// Suffix that marks a schema file as GBNF grammar text
pub const GBNF_SUFFIX: &str = ".gbnf";

/// The three resources a generation run needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Model,
    Schema,
    PromptTemplate,
}

impl ResourceKind {
    /// Suffix tried after the bare name is exhausted everywhere
    pub fn alt_suffix(self) -> &'static str {
        match self {
            Self::Model => ".gguf",
            Self::Schema => GBNF_SUFFIX,
            Self::PromptTemplate => ".txt",
        }
    }

    fn not_found(self, err: NotFoundError) -> ResolutionError {
        match self {
            Self::Model => ResolutionError::ModelNotFound(err),
            Self::Schema => ResolutionError::SchemaNotFound(err),
            Self::PromptTemplate => ResolutionError::TemplateNotFound(err),
        }
    }

    fn locate_failed(self, err: LocateError) -> ResolutionError {
        match err {
            LocateError::NotFound(err) => self.not_found(err),
            LocateError::Read { path, source } => ResolutionError::Read {
                kind: self,
                path,
                source,
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Schema => write!(f, "schema"),
            Self::PromptTemplate => write!(f, "prompt template"),
        }
    }
}

/// A resource could not be resolved
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("model {0}")]
    ModelNotFound(NotFoundError),

    #[error("schema {0}")]
    SchemaNotFound(NotFoundError),

    #[error("prompt template {0}")]
    TemplateNotFound(NotFoundError),

    #[error("no {0} name configured")]
    Unnamed(ResourceKind),

    #[error("{kind} path {} does not exist", path.display())]
    MissingOverride { kind: ResourceKind, path: PathBuf },

    #[error("failed to read {kind} {}", path.display())]
    Read {
        kind: ResourceKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema {} is not valid JSON", path.display())]
    InvalidSchema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ResolutionError {
    /// The kind of resource that failed to resolve
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::ModelNotFound(_) => ResourceKind::Model,
            Self::SchemaNotFound(_) | Self::InvalidSchema { .. } => ResourceKind::Schema,
            Self::TemplateNotFound(_) => ResourceKind::PromptTemplate,
            Self::Unnamed(kind) | Self::MissingOverride { kind, .. } | Self::Read { kind, .. } => {
                *kind
            }
        }
    }
}

/// Location of the model data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub path: PathBuf,
    /// File stem of `path`, used to name the model to remote runtimes
    pub name: String,
}

impl ResolvedModel {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

/// A schema in the form that was found on disk
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSchema {
    /// A JSON Schema document
    JsonSchema { path: PathBuf, schema: Value },
    /// GBNF grammar text
    Gbnf { path: PathBuf, text: String },
}

impl ResolvedSchema {
    pub fn path(&self) -> &Path {
        match self {
            Self::JsonSchema { path, .. } | Self::Gbnf { path, .. } => path,
        }
    }

    /// Interpret file contents by the name that matched: `.gbnf` is grammar
    /// text, anything else must be JSON.
    pub fn from_file(path: PathBuf, content: String) -> Result<Self, ResolutionError> {
        if path.to_string_lossy().ends_with(GBNF_SUFFIX) {
            return Ok(Self::Gbnf {
                path,
                text: content,
            });
        }
        match serde_json::from_str(&content) {
            Ok(schema) => Ok(Self::JsonSchema { path, schema }),
            Err(source) => Err(ResolutionError::InvalidSchema { path, source }),
        }
    }
}

/// A prompt template and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPromptTemplate {
    pub path: PathBuf,
    pub template: PromptTemplate,
}

/// Everything a generation run needs, resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArtifacts {
    pub prompt_template: ResolvedPromptTemplate,
    pub model: ResolvedModel,
    pub schema: ResolvedSchema,
}

impl ResolvedArtifacts {
    /// Resolve the template, then the model, then the schema. The first failure wins.
    pub fn resolve(config: &Configuration) -> Result<Self, ResolutionError> {
        Ok(Self {
            prompt_template: resolve_prompt_template(config)?,
            model: resolve_model(config)?,
            schema: resolve_schema(config)?,
        })
    }
}

/// Resolve the prompt template and read its text.
pub fn resolve_prompt_template(
    config: &Configuration,
) -> Result<ResolvedPromptTemplate, ResolutionError> {
    let located = resolve_content(
        ResourceKind::PromptTemplate,
        config.prompt_template_name.as_deref(),
        config.prompt_template_path.as_deref(),
        &config.prompt_template_search_paths,
    )?;
    Ok(ResolvedPromptTemplate {
        path: located.path,
        template: PromptTemplate::new(located.content),
    })
}

/// Resolve the model location. The model data itself is not read.
pub fn resolve_model(config: &Configuration) -> Result<ResolvedModel, ResolutionError> {
    let kind = ResourceKind::Model;
    let path = match lookup(
        kind,
        config.model_name.as_deref(),
        config.model_path.as_deref(),
        &config.model_search_paths,
    )? {
        Lookup::File(path) => path,
        Lookup::Search { paths, name } => {
            let path = locate(&paths, name, Some(kind.alt_suffix())).map_err(|e| kind.not_found(e))?;
            debug!("Resolved {} '{}' to {}", kind, name, path.display());
            path
        }
    };
    Ok(ResolvedModel::new(path))
}

/// Resolve the schema and load it in the form its file name indicates.
pub fn resolve_schema(config: &Configuration) -> Result<ResolvedSchema, ResolutionError> {
    let located = resolve_content(
        ResourceKind::Schema,
        config.schema_name.as_deref(),
        config.schema_path.as_deref(),
        &config.schema_search_paths,
    )?;
    ResolvedSchema::from_file(located.path, located.content)
}

/// Where to find a resource once direct overrides are applied
enum Lookup<'a> {
    /// A direct override naming an existing file
    File(PathBuf),
    Search {
        paths: Cow<'a, [PathBuf]>,
        name: &'a str,
    },
}

fn lookup<'a>(
    kind: ResourceKind,
    name: Option<&'a str>,
    direct: Option<&Path>,
    search_paths: &'a [PathBuf],
) -> Result<Lookup<'a>, ResolutionError> {
    let paths = match direct {
        Some(path) if path.is_file() => {
            debug!("Using {} override {}", kind, path.display());
            return Ok(Lookup::File(path.to_path_buf()));
        }
        Some(path) if path.is_dir() => {
            debug!("Searching only {} for the {}", path.display(), kind);
            Cow::Owned(vec![path.to_path_buf()])
        }
        Some(path) => {
            return Err(ResolutionError::MissingOverride {
                kind,
                path: path.to_path_buf(),
            })
        }
        None => Cow::Borrowed(search_paths),
    };

    let name = name.ok_or(ResolutionError::Unnamed(kind))?;
    Ok(Lookup::Search { paths, name })
}

fn resolve_content(
    kind: ResourceKind,
    name: Option<&str>,
    direct: Option<&Path>,
    search_paths: &[PathBuf],
) -> Result<Located, ResolutionError> {
    let located = match lookup(kind, name, direct, search_paths)? {
        Lookup::File(path) => read_text(&path).map(|content| Located { path, content }),
        Lookup::Search { paths, name } => locate_content(&paths, name, Some(kind.alt_suffix())),
    }
    .map_err(|e| kind.locate_failed(e))?;

    debug!("Resolved {} to {}", kind, located.path.display());
    Ok(located)
}
