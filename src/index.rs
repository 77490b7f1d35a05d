//! Project module index: dotted name ↔ file path, classified once.
//!
//! Every downstream component consumes [`ModuleKind`] from here instead of
//! re-checking file names, so a package is always identified by its
//! `__init__.py` and never by the bare directory.

use crate::errors::Result;
use crate::parse::common::{is_package_marker, PACKAGE_MARKER};
use crate::walk::SourceTree;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Module,
    Package,
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleKind::Module => f.pad("module"),
            ModuleKind::Package => f.pad("package"),
        }
    }
}

/// Dense handle of an index entry. Handles follow path order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    /// Dotted name, e.g. `pkg.sub.mod`
    pub name: String,
    /// Absolute path of the module file or the package's marker file
    pub path: PathBuf,
    pub kind: ModuleKind,
}

impl ModuleEntry {
    /// Directory this entry is a direct child of.
    ///
    /// For `pkg/mod.py` and for `pkg/sub/__init__.py` alike this is `pkg`.
    pub fn container(&self) -> Option<&Path> {
        match self.kind {
            ModuleKind::Module => self.path.parent(),
            ModuleKind::Package => self.path.parent().and_then(Path::parent),
        }
    }

    /// The package directory, for package entries.
    pub fn package_dir(&self) -> Option<&Path> {
        match self.kind {
            ModuleKind::Package => self.path.parent(),
            ModuleKind::Module => None,
        }
    }
}

/// A topmost package: holds `__init__.py`, its parent does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRoot {
    pub dir: PathBuf,
    /// The package's own name, i.e. the directory name
    pub name: String,
}

/// Stable-ordered set of project roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectRoots(Vec<ProjectRoot>);

impl ProjectRoots {
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectRoot> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProjectRoots {
    type Item = &'a ProjectRoot;
    type IntoIter = std::slice::Iter<'a, ProjectRoot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Immutable map of every module and package under a project root.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    root: PathBuf,
    entries: Vec<ModuleEntry>,
    by_name: HashMap<String, ModuleId>,
    by_path: HashMap<PathBuf, ModuleId>,
    children: HashMap<PathBuf, Vec<ModuleId>>,
    shadowed: Vec<ShadowedFile>,
}

/// A file left out of the index because another file claims its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowedFile {
    pub path: PathBuf,
    pub name: String,
    /// The indexed file that owns `name`
    pub winner: PathBuf,
}

/// Validate `root`, list its source files and index them.
///
/// Fails with a path error when `root` is missing or not a directory. This
/// is the only fatal condition of an analysis run.
pub fn build_index(root: &Path, tree: &dyn SourceTree) -> Result<(ModuleIndex, ProjectRoots)> {
    let root = tree.root_dir(root)?;
    let files = tree.files(&root)?;
    let (index, roots) = ModuleIndex::from_files(&root, &files);
    tracing::info!(
        "indexed {} modules with {} project roots under {}",
        index.len(),
        roots.len(),
        root.display()
    );
    Ok((index, roots))
}

impl ModuleIndex {
    /// Classify an already-discovered file list. Touches no filesystem.
    ///
    /// `files` should be absolute paths under `root`; anything else is
    /// ignored. When `root` itself is a package, dotted names start with
    /// the root directory's own name.
    ///
    /// Two files can claim one dotted name (`a.py` and `a/__init__.py`, or
    /// `a.b.py` and `a/b.py`). A module file beats a package marker,
    /// otherwise the first in path order wins. Losers are not indexed and
    /// are reported by [`ModuleIndex::shadowed`].
    pub fn from_files(root: &Path, files: &[PathBuf]) -> (ModuleIndex, ProjectRoots) {
        let mut sorted: Vec<&PathBuf> = files.iter().filter(|f| f.starts_with(root)).collect();
        sorted.sort();
        sorted.dedup();

        let marker_dirs: HashSet<&Path> = sorted
            .iter()
            .filter(|f| is_package_marker(f))
            .filter_map(|f| f.parent())
            .collect();

        let base = if marker_dirs.contains(root) {
            root.parent().unwrap_or(root)
        } else {
            root
        };

        let mut index = ModuleIndex {
            root: root.to_path_buf(),
            ..Default::default()
        };

        let named: Vec<(&PathBuf, String, ModuleKind)> = sorted
            .into_iter()
            .filter_map(|path| match dotted_name(path, base) {
                Some((name, kind)) => Some((path, name, kind)),
                None => {
                    tracing::warn!("cannot derive a module name for {}", path.display());
                    None
                }
            })
            .collect();

        // `a/b.py` and `a/b/__init__.py` both claim `a.b`; the module file
        // wins, matching the resolver's module-file-first probe order.
        let mut winners: HashMap<&str, (usize, ModuleKind)> = HashMap::new();
        for (i, (_, name, kind)) in named.iter().enumerate() {
            match winners.get(name.as_str()) {
                Some(&(_, ModuleKind::Module)) => {}
                Some(_) if *kind == ModuleKind::Package => {}
                _ => {
                    winners.insert(name.as_str(), (i, *kind));
                }
            }
        }

        for (i, (path, name, kind)) in named.iter().enumerate() {
            let winner = winners.get(name.as_str()).map(|&(w, _)| w);
            if let Some(w) = winner.filter(|&w| w != i) {
                tracing::warn!("{} is shadowed as `{name}`; skipping it", path.display());
                index.shadowed.push(ShadowedFile {
                    path: (*path).clone(),
                    name: name.clone(),
                    winner: named[w].0.clone(),
                });
                continue;
            }

            let id = ModuleId(index.entries.len());
            let entry = ModuleEntry {
                name: name.clone(),
                path: (*path).clone(),
                kind: *kind,
            };
            if let Some(container) = entry.container() {
                index
                    .children
                    .entry(container.to_path_buf())
                    .or_default()
                    .push(id);
            }
            tracing::trace!("indexed {kind} `{name}` -> {}", path.display());
            index.by_name.insert(name.clone(), id);
            index.by_path.insert((*path).clone(), id);
            index.entries.push(entry);
        }

        let mut roots: Vec<ProjectRoot> = marker_dirs
            .iter()
            .filter(|dir| !matches!(dir.parent(), Some(parent) if marker_dirs.contains(parent)))
            .filter_map(|dir| {
                let name = dir.file_name()?.to_str()?.to_string();
                Some(ProjectRoot {
                    dir: dir.to_path_buf(),
                    name,
                })
            })
            .collect();
        roots.sort_by(|a, b| a.dir.cmp(&b.dir));

        (index, ProjectRoots(roots))
    }

    /// The directory this index was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: ModuleId) -> &ModuleEntry {
        &self.entries[id.0]
    }

    /// All entries with their handles, in path order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &ModuleEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (ModuleId(i), e))
    }

    pub fn lookup_path(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    pub fn lookup_name(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Files dropped because their dotted name was already taken, in path order.
    pub fn shadowed(&self) -> &[ShadowedFile] {
        &self.shadowed
    }

    /// Direct children (modules and immediate subpackages) of a directory.
    pub fn children_of(&self, dir: &Path) -> &[ModuleId] {
        self.children.get(dir).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Dotted name and kind of `path` relative to `base`.
fn dotted_name(path: &Path, base: &Path) -> Option<(String, ModuleKind)> {
    let relative = path.strip_prefix(base).ok()?;
    let mut segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;

    let last = segments.pop()?;
    let kind = if last == PACKAGE_MARKER {
        ModuleKind::Package
    } else {
        segments.push(Path::new(last).file_stem()?.to_str()?);
        ModuleKind::Module
    };

    if segments.is_empty() {
        return None;
    }
    Some((segments.join("."), kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::MemoryTree;
    use pretty_assertions::assert_eq;

    fn paths(root: &str, rel: &[&str]) -> Vec<PathBuf> {
        rel.iter().map(|r| Path::new(root).join(r)).collect()
    }

    #[test]
    fn classifies_modules_and_packages() {
        let files = paths(
            "/proj",
            &["pkgA/__init__.py", "pkgA/mod1.py", "pkgA/sub/__init__.py", "pkgA/sub/leaf.py"],
        );
        let (index, _) = ModuleIndex::from_files(Path::new("/proj"), &files);

        let names: Vec<(&str, ModuleKind)> =
            index.iter().map(|(_, e)| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("pkgA", ModuleKind::Package),
                ("pkgA.mod1", ModuleKind::Module),
                ("pkgA.sub", ModuleKind::Package),
                ("pkgA.sub.leaf", ModuleKind::Module),
            ]
        );

        let pkg = index.lookup_name("pkgA").unwrap();
        assert_eq!(index.entry(pkg).path, PathBuf::from("/proj/pkgA/__init__.py"));
        assert_eq!(
            index.lookup_path(Path::new("/proj/pkgA/sub/leaf.py")),
            index.lookup_name("pkgA.sub.leaf")
        );
    }

    #[test]
    fn detects_topmost_packages_only() {
        let files = paths(
            "/proj",
            &[
                "pkgA/__init__.py",
                "pkgA/sub/__init__.py",
                "src/pkgB/__init__.py",
                "src/pkgB/core.py",
                "scripts/run.py",
            ],
        );
        let (_, roots) = ModuleIndex::from_files(Path::new("/proj"), &files);
        let dirs: Vec<&Path> = roots.iter().map(|r| r.dir.as_path()).collect();
        assert_eq!(dirs, vec![Path::new("/proj/pkgA"), Path::new("/proj/src/pkgB")]);
        let names: Vec<&str> = roots.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["pkgA", "pkgB"]);
    }

    #[test]
    fn root_that_is_a_package_prefixes_names() {
        let files = paths("/work/app", &["__init__.py", "views.py", "db/__init__.py"]);
        let (index, roots) = ModuleIndex::from_files(Path::new("/work/app"), &files);

        assert!(index.lookup_name("app").is_some());
        assert!(index.lookup_name("app.views").is_some());
        assert!(index.lookup_name("app.db").is_some());
        assert_eq!(roots.len(), 1);
        assert_eq!(roots.iter().next().unwrap().name, "app");
    }

    #[test]
    fn module_file_shadows_same_named_package() {
        let files = paths("/proj", &["a.py", "a/__init__.py", "a/inner.py"]);
        let (index, _) = ModuleIndex::from_files(Path::new("/proj"), &files);
        assert_eq!(index.len(), 2);
        let a = index.lookup_name("a").unwrap();
        assert_eq!(index.entry(a).kind, ModuleKind::Module);
        assert_eq!(index.entry(a).path, PathBuf::from("/proj/a.py"));
        assert!(index.lookup_path(Path::new("/proj/a/__init__.py")).is_none());
        assert!(index.lookup_name("a.inner").is_some());
        assert_eq!(
            index.shadowed(),
            &[ShadowedFile {
                path: PathBuf::from("/proj/a/__init__.py"),
                name: "a".to_string(),
                winner: PathBuf::from("/proj/a.py"),
            }]
        );
    }

    #[test]
    fn dotted_stem_collision_is_reported() {
        let files = paths("/proj", &["pkg/__init__.py", "pkg/a/__init__.py", "pkg/a/b.py", "pkg/a.b.py"]);
        let (index, _) = ModuleIndex::from_files(Path::new("/proj"), &files);

        assert_eq!(index.len(), 3);
        let b = index.lookup_name("pkg.a.b").unwrap();
        assert_eq!(index.entry(b).path, PathBuf::from("/proj/pkg/a/b.py"));
        assert_eq!(index.shadowed().len(), 1);
        assert_eq!(index.shadowed()[0].path, PathBuf::from("/proj/pkg/a.b.py"));
        assert_eq!(index.shadowed()[0].winner, PathBuf::from("/proj/pkg/a/b.py"));
    }

    #[test]
    fn children_include_modules_and_subpackages() {
        let files = paths(
            "/proj",
            &["pkgA/__init__.py", "pkgA/mod1.py", "pkgA/mod2.py", "pkgA/sub/__init__.py", "pkgA/sub/deep.py"],
        );
        let (index, _) = ModuleIndex::from_files(Path::new("/proj"), &files);
        let children: Vec<&str> = index
            .children_of(Path::new("/proj/pkgA"))
            .iter()
            .map(|&id| index.entry(id).name.as_str())
            .collect();
        assert_eq!(children, vec!["pkgA.mod1", "pkgA.mod2", "pkgA.sub"]);
    }

    #[test]
    fn namespace_directories_still_name_modules() {
        let files = paths("/proj", &["tools/cli.py", "main.py"]);
        let (index, roots) = ModuleIndex::from_files(Path::new("/proj"), &files);
        assert!(index.lookup_name("tools.cli").is_some());
        assert!(index.lookup_name("main").is_some());
        assert!(roots.is_empty());
    }

    #[test]
    fn ignores_files_outside_root() {
        let files = vec![PathBuf::from("/elsewhere/x.py"), PathBuf::from("/proj/y.py")];
        let (index, _) = ModuleIndex::from_files(Path::new("/proj"), &files);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn build_index_rejects_missing_root() {
        let tree = MemoryTree::new().with_file("/proj/a.py", "");
        let err = build_index(Path::new("/nope"), &tree).unwrap_err();
        assert!(matches!(err, crate::errors::DepgraphError::Path { .. }));
    }

    #[test]
    fn build_index_rejects_file_root() {
        let tree = MemoryTree::new().with_file("/proj/a.py", "");
        let err = build_index(Path::new("/proj/a.py"), &tree).unwrap_err();
        assert!(matches!(err, crate::errors::DepgraphError::Path { .. }));
    }
}
