//! Command-line override layer

use std::path::PathBuf;

use crate::configuration::BackendKind;

/// Values supplied explicitly on the command line.
///
/// Applied after every configuration file; `None` leaves the earlier layer intact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub model_name: Option<String>,
    pub model_path: Option<PathBuf>,
    pub schema_name: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub prompt_template_name: Option<String>,
    pub prompt_template_path: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub endpoint: Option<String>,
}

impl ConfigOverrides {
    /// True when no override was supplied
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
