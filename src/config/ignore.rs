//! `.depgraphignore`: extra exclude globs kept next to the code.

use crate::errors::{DepgraphError, Result};
use std::path::{Path, PathBuf};

pub const IGNORE_FILE_NAME: &str = ".depgraphignore";

/// Exclude globs read from the nearest ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreFile {
    pub path: PathBuf,
    pub patterns: Vec<String>,
}

/// Closest `file_name` in `start` or one of its ancestors.
pub(crate) fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Load the nearest `.depgraphignore`, if any.
///
/// One glob per line; blank lines and `#` comments are skipped. An ignore
/// file that exists but cannot be read is a configuration error.
pub fn load_ignore_file(start: &Path) -> Result<Option<IgnoreFile>> {
    let Some(path) = find_upwards(start, IGNORE_FILE_NAME) else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(&path).map_err(|e| {
        DepgraphError::Config(format!("Could not read {}: {e}", path.display()))
    })?;
    let patterns = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    tracing::debug!("loaded ignore patterns from {}", path.display());
    Ok(Some(IgnoreFile { path, patterns }))
}
