//! Ordered search-path lookup
//!
//! A name is looked up in each directory in turn and the first hit wins. When an
//! alternate suffix is given, the bare name is tried in every directory before
//! `<name><suffix>` is tried in any of them.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// No directory contained the requested name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct NotFoundError {
    /// The name that was looked up, without any suffix
    pub name: String,
    /// Every configured directory, in search order
    pub searched: Vec<PathBuf>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' not found", self.name)?;
        if self.searched.is_empty() {
            return write!(f, " (no search paths configured)");
        }
        let searched: Vec<String> = self
            .searched
            .iter()
            .map(|dir| dir.display().to_string())
            .collect();
        write!(f, " in: {}", searched.join(", "))
    }
}

/// A located file and its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    pub content: String,
}

/// Failure while locating and reading a file
#[derive(Debug, Error)]
pub enum LocateError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Find the first `dir/name` that exists, falling back to `dir/<name><alt_suffix>`.
///
/// Only regular files (or symlinks to them) match; a directory carrying the
/// name is passed over. Search directories that do not exist are skipped.
pub fn locate(
    search_paths: &[PathBuf],
    name: &str,
    alt_suffix: Option<&str>,
) -> Result<PathBuf, NotFoundError> {
    let candidates = std::iter::once(name.to_string())
        .chain(alt_suffix.map(|suffix| format!("{name}{suffix}")));

    for candidate in candidates {
        if let Some(found) = first_match(search_paths, &candidate) {
            debug!("Located '{}' at {}", name, found.display());
            return Ok(found);
        }
    }

    Err(NotFoundError {
        name: name.to_string(),
        searched: search_paths.to_vec(),
    })
}

/// Like [`locate`], but also reads the matched file as UTF-8.
pub fn locate_content(
    search_paths: &[PathBuf],
    name: &str,
    alt_suffix: Option<&str>,
) -> Result<Located, LocateError> {
    let path = locate(search_paths, name, alt_suffix)?;
    let content = read_text(&path)?;
    Ok(Located { path, content })
}

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, LocateError> {
    std::fs::read_to_string(path).map_err(|source| LocateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn first_match(search_paths: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    search_paths
        .iter()
        .filter(|dir| dir.is_dir())
        .map(|dir| dir.join(file_name))
        .inspect(|candidate| debug!("Trying {}", candidate.display()))
        .find(|candidate| candidate.is_file())
}
