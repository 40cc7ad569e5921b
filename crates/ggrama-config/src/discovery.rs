//! Default search-path discovery
//!
//! Every candidate root may hold `models/`, `schemas/` and `prompt_templates/`
//! subdirectories. Roots are visited in priority order and each existing
//! subdirectory is appended to the matching search list. Missing roots and
//! subdirectories are skipped, so the resulting lists only name directories that
//! existed when discovery ran.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::configuration::{Configuration, DEFAULT_PROMPT_TEMPLATE};

/// Subdirectory holding model files
pub const MODELS_DIR: &str = "models";
/// Subdirectory holding schemas and grammars
pub const SCHEMAS_DIR: &str = "schemas";
/// Subdirectory holding prompt templates
pub const PROMPT_TEMPLATES_DIR: &str = "prompt_templates";

/// Application directory name under system and user locations
pub const APP_DIR: &str = "ggrama";

/// Ordered list of candidate resource roots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardDirs {
    roots: Vec<PathBuf>,
}

impl StandardDirs {
    /// Use an explicit list of roots
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// The bundled resources directory (if any), then system-wide, then user locations.
    pub fn system(bundled: Option<PathBuf>) -> Self {
        let mut roots: Vec<PathBuf> = bundled.into_iter().collect();
        roots.extend(
            ["/etc", "/usr/share", "/usr/local/share"]
                .iter()
                .map(|prefix| Path::new(prefix).join(APP_DIR)),
        );
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".local").join(APP_DIR));
        }
        if let Some(config_dir) = dirs::config_dir() {
            roots.push(config_dir.join(APP_DIR));
        }
        Self { roots }
    }

    /// Candidate roots in priority order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Build the base configuration from the resource directories that exist.
///
/// Reads only directory metadata; nothing is created or cached.
pub fn discover_default_search_paths(dirs: &StandardDirs) -> Configuration {
    let mut config = Configuration {
        prompt_template_name: Some(DEFAULT_PROMPT_TEMPLATE.to_string()),
        ..Default::default()
    };

    for root in dirs.roots() {
        if !root.is_dir() {
            continue;
        }
        debug!("Scanning resource root {}", root.display());

        let lists = [
            (MODELS_DIR, &mut config.model_search_paths),
            (SCHEMAS_DIR, &mut config.schema_search_paths),
            (PROMPT_TEMPLATES_DIR, &mut config.prompt_template_search_paths),
        ];
        for (subdir, list) in lists {
            let candidate = root.join(subdir);
            if candidate.is_dir() {
                debug!("Adding search path {}", candidate.display());
                list.push(candidate);
            }
        }
    }

    config
}
