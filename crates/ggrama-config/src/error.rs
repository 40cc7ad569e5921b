//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

use crate::file::ConfigFormat;

/// A configuration file could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} config file {}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: ConfigFormat,
        message: String,
    },
}

/// Result alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
