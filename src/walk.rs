use crate::errors::{DepgraphError, Result};
use crate::parse::common::is_source_file;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where the analyzer gets its file list and file contents from.
///
/// The index and the pipeline never walk a filesystem themselves; they only
/// see what a `SourceTree` lists. Implementations must return absolute,
/// sorted paths of importable source files under `root`.
pub trait SourceTree: Sync {
    /// Validate an analysis root and return its canonical form.
    ///
    /// Fails with a path error when `root` is missing or not a directory.
    fn root_dir(&self, root: &Path) -> Result<PathBuf>;

    /// List source files under `root`.
    fn files(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Read one listed file as UTF-8 text.
    fn read(&self, path: &Path) -> std::io::Result<String>;
}

/// Targeting options for filesystem discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Only keep files matching at least one of these globs (if any)
    pub include: Vec<String>,
    /// Drop files matching any of these globs
    pub exclude: Vec<String>,
    /// Descend into hidden files and directories
    pub include_hidden: bool,
}

/// Source tree backed by the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsTree {
    options: DiscoveryOptions,
}

impl FsTree {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }
}

impl SourceTree for FsTree {
    fn root_dir(&self, root: &Path) -> Result<PathBuf> {
        if !root.exists() {
            return Err(DepgraphError::path(root, "path does not exist"));
        }
        if !root.is_dir() {
            return Err(DepgraphError::path(root, "path is not a directory"));
        }
        root.canonicalize()
            .map_err(|e| DepgraphError::path(root, e.to_string()))
    }

    /// Discover source files under `root`.
    ///
    /// - Respects `.gitignore`
    /// - Skips hidden entries unless `include_hidden` is set
    /// - Skips entries that cannot be read (permission errors)
    /// - Applies include/exclude glob patterns
    /// - Returns sorted paths for deterministic output
    fn files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let exclude_set = build_globset(&self.options.exclude)?;
        let include_set = if self.options.include.is_empty() {
            None
        } else {
            Some(build_globset(&self.options.include)?)
        };

        let walker = WalkBuilder::new(root)
            .hidden(!self.options.include_hidden)
            .git_ignore(true)
            .build();

        let mut files = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::trace!("skipping unreadable entry: {e}");
                    continue;
                }
            };

            let path = entry.path();

            if !path.is_file() || !is_source_file(path) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);

            if exclude_set.is_match(relative) || exclude_set.is_match(path) {
                continue;
            }
            if let Some(fname) = path.file_name() {
                if exclude_set.is_match(Path::new(fname)) {
                    continue;
                }
            }

            if let Some(ref include) = include_set {
                if !include.is_match(relative) && !include.is_match(path) {
                    continue;
                }
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        tracing::debug!("discovered {} source files under {}", files.len(), root.display());

        Ok(files)
    }

    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Synthetic source tree held in memory, keyed by absolute path.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous contents.
    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }

    /// Builder-style `insert`.
    pub fn with_file(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl SourceTree for MemoryTree {
    fn root_dir(&self, root: &Path) -> Result<PathBuf> {
        if self.files.contains_key(root) {
            return Err(DepgraphError::path(root, "path is not a directory"));
        }
        if !self.files.keys().any(|p| p.starts_with(root)) {
            return Err(DepgraphError::path(root, "path does not exist"));
        }
        Ok(root.to_path_buf())
    }

    fn files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|p| p.starts_with(root) && is_source_file(p))
            .cloned()
            .collect())
    }

    fn read(&self, path: &Path) -> std::io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not part of the tree", path.display()),
            )
        })
    }
}
