//! # ggrama configuration
//!
//! Builds the [`Configuration`] that drives a ggrama run by layering, in
//! increasing precedence:
//!
//! - resource directories discovered on disk ([`discover_default_search_paths`])
//! - configuration files (JSON, TOML or YAML), applied in order
//! - command-line overrides ([`ConfigOverrides`])
//!
//! ```rust,no_run
//! use ggrama_config::{resolve, ConfigOverrides};
//!
//! let overrides = ConfigOverrides {
//!     schema_name: Some("answer".to_string()),
//!     ..Default::default()
//! };
//! let config = resolve(&["ggrama.json"], &overrides, None)?;
//! println!("{:?}", config.schema_search_paths);
//! # Ok::<(), ggrama_config::ConfigError>(())
//! ```

#![warn(clippy::all)]

mod configuration;
mod discovery;
mod error;
mod file;
mod overrides;
mod resolver;

pub use configuration::{BackendKind, Configuration, DEFAULT_ENDPOINT, DEFAULT_PROMPT_TEMPLATE};
pub use discovery::{
    discover_default_search_paths, StandardDirs, APP_DIR, MODELS_DIR, PROMPT_TEMPLATES_DIR,
    SCHEMAS_DIR,
};
pub use error::{ConfigError, ConfigResult};
pub use file::{resolve_path, ConfigFile, ConfigFormat};
pub use overrides::ConfigOverrides;
pub use resolver::{resolve, ConfigResolver};
