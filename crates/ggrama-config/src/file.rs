//! Configuration file loading
//!
//! A configuration file is a flat key-value document. The format follows the
//! extension: `.toml` is TOML, `.yaml`/`.yml` is YAML, anything else is JSON.
//!
//! ```json
//! {
//!     "model_name": "qwen2.5-3b-instruct-q4_k_m.gguf",
//!     "schema_name": "answer",
//!     "prompt_template_file": "instruct",
//!     "model_paths": ["~/models", "/srv/models"]
//! }
//! ```
//!
//! Path values expand `~` and are resolved relative to the directory that
//! holds the configuration file. Unknown keys are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::configuration::BackendKind;
use crate::error::ConfigError;

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from the file extension. JSON is the fallback.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Self::Toml,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    fn parse(self, contents: &str) -> Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(feature = "toml")]
            Self::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(not(feature = "toml"))]
            Self::Toml => Err("TOML support is not enabled".to_string()),
            #[cfg(feature = "yaml")]
            Self::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(not(feature = "yaml"))]
            Self::Yaml => Err("YAML support is not enabled".to_string()),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::Toml => write!(f, "TOML"),
            Self::Yaml => write!(f, "YAML"),
        }
    }
}

/// One configuration file layer. `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    /// Prompt template name
    #[serde(default)]
    pub prompt_template_file: Option<String>,
    /// Alternate spelling of `prompt_template_file`; the latter wins when both appear
    #[serde(default)]
    pub prompt_template_name: Option<String>,
    #[serde(default)]
    pub prompt_template_path: Option<PathBuf>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub model_paths: Option<Vec<PathBuf>>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub schema_paths: Option<Vec<PathBuf>>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub prompt_template_paths: Option<Vec<PathBuf>>,

    #[serde(default)]
    pub backend: Option<BackendKind>,
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Keys this version does not recognize
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl ConfigFile {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path);

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file = Self::parse(&contents, format).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file = file.rebase_paths(base_dir);

        for key in file.unknown.keys() {
            warn!("Ignoring unknown key '{}' in {}", key, path.display());
        }
        debug!("Loaded {} config file {}", format, path.display());

        Ok(file)
    }

    /// Parse configuration text. Paths are left exactly as written.
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self, String> {
        let value = format.parse(contents)?;
        if !value.is_object() {
            return Err("expected a mapping of configuration keys at the top level".to_string());
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Expand `~` and anchor relative paths at `base_dir`.
    pub fn rebase_paths(mut self, base_dir: &Path) -> Self {
        let rebase = |path: PathBuf| resolve_path(base_dir, &path);
        let rebase_all =
            |paths: Vec<PathBuf>| -> Vec<PathBuf> { paths.into_iter().map(rebase).collect() };

        self.model_path = self.model_path.map(rebase);
        self.schema_path = self.schema_path.map(rebase);
        self.prompt_template_path = self.prompt_template_path.map(rebase);
        self.model_paths = self.model_paths.map(rebase_all);
        self.schema_paths = self.schema_paths.map(rebase_all);
        self.prompt_template_paths = self.prompt_template_paths.map(rebase_all);
        self
    }
}

/// Expand a leading `~` and join relative paths onto `base_dir`.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<PathBuf>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(path)) => Some(vec![path]),
        Some(OneOrMany::Many(paths)) => Some(paths),
        None => None,
    })
}
