//! Configuration resolution
//!
//! Layers, lowest precedence first:
//! 1. Bundled and standard resource directories (see [`discover_default_search_paths`])
//! 2. Configuration files, in the order given
//! 3. Command-line overrides
//!
//! Every layer only replaces what it explicitly sets.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::configuration::Configuration;
use crate::discovery::{discover_default_search_paths, StandardDirs};
use crate::error::ConfigResult;
use crate::file::ConfigFile;
use crate::overrides::ConfigOverrides;

/// Applies configuration layers on top of a base configuration
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    base: Configuration,
}

impl ConfigResolver {
    /// Start from the directories discovered under `dirs`
    pub fn discover(dirs: &StandardDirs) -> Self {
        Self::with_base(discover_default_search_paths(dirs))
    }

    /// Start from an explicit base configuration
    pub fn with_base(base: Configuration) -> Self {
        Self { base }
    }

    /// The configuration before any file or override is applied
    pub fn base(&self) -> &Configuration {
        &self.base
    }

    /// Load each file in order, then apply the overrides.
    ///
    /// The first unreadable or malformed file aborts resolution.
    pub fn resolve<P: AsRef<Path>>(
        &self,
        config_files: &[P],
        overrides: &ConfigOverrides,
    ) -> ConfigResult<Configuration> {
        let mut config = self.base.clone();

        for path in config_files {
            let path = path.as_ref();
            debug!("Applying config file {}", path.display());
            config = config.merge_file(ConfigFile::load(path)?);
        }

        if !overrides.is_empty() {
            debug!("Applying command-line overrides: {:?}", overrides);
        }
        let config = config.apply_overrides(overrides);

        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

/// Resolve the configuration against the standard directories.
///
/// `bundled` is the resource directory shipped with the program, searched first.
pub fn resolve<P: AsRef<Path>>(
    config_files: &[P],
    overrides: &ConfigOverrides,
    bundled: Option<PathBuf>,
) -> ConfigResult<Configuration> {
    ConfigResolver::discover(&StandardDirs::system(bundled)).resolve(config_files, overrides)
}
