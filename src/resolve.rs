//! Mapping raw import records onto index entries.
//!
//! Probe order is part of the contract: for every candidate, the module
//! file (`a/b.py`) is tried before the package marker (`a/b/__init__.py`),
//! and the first hit ends the search.

use crate::index::{ModuleId, ModuleIndex, ProjectRoots};
use crate::parse::common::{RawImport, PACKAGE_MARKER, SOURCE_EXTENSION};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The import names a file of this project
    Resolved(ModuleId),
    /// Nothing in the project matches: stdlib, third-party or a typo
    External,
    /// A relative import climbs above the project root
    Escaped,
}

impl ResolveOutcome {
    pub fn target(self) -> Option<ModuleId> {
        match self {
            ResolveOutcome::Resolved(id) => Some(id),
            ResolveOutcome::External | ResolveOutcome::Escaped => None,
        }
    }
}

/// Resolve one record to the path of its in-project target, if any.
pub fn resolve<'i>(
    record: &RawImport,
    importer: &Path,
    index: &'i ModuleIndex,
    roots: &ProjectRoots,
) -> Option<&'i Path> {
    resolve_outcome(record, importer, index, roots)
        .target()
        .map(|id| index.entry(id).path.as_path())
}

/// Resolve one record and report why it did not resolve.
pub fn resolve_outcome(
    record: &RawImport,
    importer: &Path,
    index: &ModuleIndex,
    roots: &ProjectRoots,
) -> ResolveOutcome {
    let outcome = if record.is_relative() {
        resolve_relative(record, importer, index)
    } else {
        resolve_absolute(record, index, roots)
    };

    match outcome {
        ResolveOutcome::Resolved(id) => tracing::debug!(
            "resolved `{}` in {} -> {}",
            record.display_path(),
            importer.display(),
            index.entry(id).path.display()
        ),
        ResolveOutcome::External => tracing::trace!(
            "`{}` in {} is external",
            record.display_path(),
            importer.display()
        ),
        ResolveOutcome::Escaped => tracing::trace!(
            "`{}` in {} escapes the project root",
            record.display_path(),
            importer.display()
        ),
    }
    outcome
}

/// Absolute imports are searched under each project root in turn. A leading
/// segment equal to the root's own name is dropped, so `pkgA.mod2` and the
/// root-relative `mod2` land on the same file.
fn resolve_absolute(record: &RawImport, index: &ModuleIndex, roots: &ProjectRoots) -> ResolveOutcome {
    let candidates = candidates(record);
    for root in roots {
        for candidate in &candidates {
            let segments = match candidate.split_first() {
                Some((first, rest)) if *first == root.name => rest,
                _ => candidate.as_slice(),
            };
            if let Some(id) = probe(&root.dir, segments, index) {
                return ResolveOutcome::Resolved(id);
            }
        }
    }
    ResolveOutcome::External
}

/// Relative imports start at the importer's directory and climb
/// `level - 1` more parents.
fn resolve_relative(record: &RawImport, importer: &Path, index: &ModuleIndex) -> ResolveOutcome {
    let Some(mut base) = importer.parent() else {
        return ResolveOutcome::Escaped;
    };
    for _ in 1..record.level {
        match base.parent() {
            Some(parent) => base = parent,
            None => return ResolveOutcome::Escaped,
        }
    }
    if !base.starts_with(index.root()) {
        return ResolveOutcome::Escaped;
    }

    for candidate in candidates(record) {
        if let Some(id) = probe(base, &candidate, index) {
            return ResolveOutcome::Resolved(id);
        }
    }
    ResolveOutcome::External
}

/// Dotted segment lists to try, most specific first.
///
/// `from a.b import c` may name the submodule `a.b.c` or an attribute of
/// `a.b`, so both are tried in that order. Without a module the imported
/// name itself is the only candidate.
fn candidates(record: &RawImport) -> Vec<Vec<&str>> {
    let name: Vec<&str> = if record.is_wildcard() {
        Vec::new()
    } else {
        split_dotted(&record.name)
    };

    match &record.module {
        Some(module) => {
            let module = split_dotted(module);
            let mut out = Vec::with_capacity(2);
            if !name.is_empty() {
                out.push(module.iter().chain(name.iter()).copied().collect());
            }
            out.push(module);
            out
        }
        None => vec![name],
    }
}

fn split_dotted(dotted: &str) -> Vec<&str> {
    dotted.split('.').filter(|s| !s.is_empty()).collect()
}

/// Probe `base/<segments>.py`, then `base/<segments>/__init__.py`.
///
/// An empty segment list denotes `base` itself, which can only be a package.
fn probe(base: &Path, segments: &[&str], index: &ModuleIndex) -> Option<ModuleId> {
    let dir: PathBuf = segments.iter().fold(base.to_path_buf(), |p, s| p.join(s));

    if let Some((last, _)) = segments.split_last() {
        let module_file = dir.with_file_name(format!("{last}.{SOURCE_EXTENSION}"));
        if let Some(id) = index.lookup_path(&module_file) {
            return Some(id);
        }
    }

    index.lookup_path(&dir.join(PACKAGE_MARKER))
}

/// Deduplicated targets of one importing file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResolution {
    /// Resolved targets in first-seen order, without duplicates
    pub targets: Vec<ModuleId>,
    /// Records that resolved to nothing in the project
    pub external: usize,
    /// Relative records that climbed above the root
    pub escaped: usize,
}

impl FileResolution {
    pub fn unresolved(&self) -> usize {
        self.external + self.escaped
    }
}

/// Resolve every record of one file.
pub fn resolve_file(
    records: &[RawImport],
    importer: &Path,
    index: &ModuleIndex,
    roots: &ProjectRoots,
) -> FileResolution {
    let mut resolution = FileResolution::default();
    for record in records {
        match resolve_outcome(record, importer, index, roots) {
            ResolveOutcome::Resolved(id) => {
                if !resolution.targets.contains(&id) {
                    resolution.targets.push(id);
                }
            }
            ResolveOutcome::External => resolution.external += 1,
            ResolveOutcome::Escaped => resolution.escaped += 1,
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/proj";

    fn project(rel: &[&str]) -> (ModuleIndex, ProjectRoots) {
        let files: Vec<PathBuf> = rel.iter().map(|r| Path::new(ROOT).join(r)).collect();
        ModuleIndex::from_files(Path::new(ROOT), &files)
    }

    fn p(rel: &str) -> PathBuf {
        Path::new(ROOT).join(rel)
    }

    fn rec(module: Option<&str>, name: &str, level: usize) -> RawImport {
        RawImport {
            module: module.map(str::to_string),
            name: name.to_string(),
            asname: None,
            level,
            line: 1,
        }
    }

    fn pkg_a() -> (ModuleIndex, ProjectRoots) {
        project(&[
            "pkgA/__init__.py",
            "pkgA/mod1.py",
            "pkgA/mod2.py",
            "pkgA/sub/__init__.py",
            "pkgA/sub/leaf.py",
        ])
    }

    #[test]
    fn root_name_is_stripped_for_absolute_imports() {
        let (index, roots) = pkg_a();
        let importer = p("pkgA/mod1.py");

        // import pkgA.mod2
        let full = resolve(&rec(Some("pkgA"), "mod2", 0), &importer, &index, &roots);
        // import mod2 (root-relative)
        let short = resolve(&rec(None, "mod2", 0), &importer, &index, &roots);

        assert_eq!(full, Some(p("pkgA/mod2.py").as_path()));
        assert_eq!(full, short);
    }

    #[test]
    fn bare_root_import_resolves_to_its_marker() {
        let (index, roots) = pkg_a();
        let target = resolve(&rec(None, "pkgA", 0), &p("pkgA/sub/leaf.py"), &index, &roots);
        assert_eq!(target, Some(p("pkgA/__init__.py").as_path()));
    }

    #[test]
    fn from_import_of_attribute_falls_back_to_module() {
        let (index, roots) = pkg_a();
        // from pkgA.mod2 import helper
        let target = resolve(
            &rec(Some("pkgA.mod2"), "helper", 0),
            &p("pkgA/mod1.py"),
            &index,
            &roots,
        );
        assert_eq!(target, Some(p("pkgA/mod2.py").as_path()));
    }

    #[test]
    fn subpackage_resolves_to_marker() {
        let (index, roots) = pkg_a();
        let target = resolve(&rec(Some("pkgA"), "sub", 0), &p("pkgA/mod1.py"), &index, &roots);
        assert_eq!(target, Some(p("pkgA/sub/__init__.py").as_path()));
    }

    #[test]
    fn single_dot_is_own_package() {
        let (index, roots) = pkg_a();
        let target = resolve(&rec(None, "mod2", 1), &p("pkgA/mod1.py"), &index, &roots);
        assert_eq!(target, Some(p("pkgA/mod2.py").as_path()));
    }

    #[test]
    fn two_dots_climb_one_parent() {
        let (index, roots) = pkg_a();
        // from ..mod1 import thing, inside pkgA/sub/leaf.py
        let target = resolve(
            &rec(Some("mod1"), "thing", 2),
            &p("pkgA/sub/leaf.py"),
            &index,
            &roots,
        );
        assert_eq!(target, Some(p("pkgA/mod1.py").as_path()));
    }

    #[test]
    fn relative_wildcard_targets_the_package() {
        let (index, roots) = pkg_a();
        let target = resolve(&rec(None, "*", 1), &p("pkgA/sub/leaf.py"), &index, &roots);
        assert_eq!(target, Some(p("pkgA/sub/__init__.py").as_path()));
    }

    #[test]
    fn stdlib_import_is_external() {
        let (index, roots) = pkg_a();
        let outcome = resolve_outcome(&rec(Some("os"), "path", 0), &p("pkgA/mod1.py"), &index, &roots);
        assert_eq!(outcome, ResolveOutcome::External);
    }

    #[test]
    fn climbing_past_the_root_escapes() {
        let (index, roots) = pkg_a();
        // from ...missing import x, inside pkgA/mod1.py
        let outcome = resolve_outcome(&rec(Some("missing"), "x", 3), &p("pkgA/mod1.py"), &index, &roots);
        assert_eq!(outcome, ResolveOutcome::Escaped);

        let far = resolve_outcome(&rec(None, "x", 40), &p("pkgA/mod1.py"), &index, &roots);
        assert_eq!(far, ResolveOutcome::Escaped);
    }

    #[test]
    fn module_file_is_probed_before_marker() {
        let (index, roots) = project(&[
            "app/__init__.py",
            "app/core.py",
            "app/core/__init__.py",
            "app/core/util.py",
        ]);
        let target = resolve(&rec(Some("app"), "core", 0), &p("app/__init__.py"), &index, &roots);
        assert_eq!(target, Some(p("app/core.py").as_path()));
    }

    #[test]
    fn first_matching_root_wins() {
        let (index, roots) = project(&[
            "alpha/__init__.py",
            "alpha/shared.py",
            "beta/__init__.py",
            "beta/shared.py",
        ]);
        let target = resolve(&rec(None, "shared", 0), &p("beta/__init__.py"), &index, &roots);
        assert_eq!(target, Some(p("alpha/shared.py").as_path()));

        let explicit = resolve(&rec(Some("beta"), "shared", 0), &p("alpha/__init__.py"), &index, &roots);
        assert_eq!(explicit, Some(p("beta/shared.py").as_path()));
    }

    #[test]
    fn src_layout_root_is_found() {
        let (index, roots) = project(&["src/lib/__init__.py", "src/lib/api.py", "src/lib/db.py"]);
        let target = resolve(&rec(Some("lib.db"), "connect", 0), &p("src/lib/api.py"), &index, &roots);
        assert_eq!(target, Some(p("src/lib/db.py").as_path()));
    }

    #[test]
    fn resolve_file_deduplicates_and_counts() {
        let (index, roots) = pkg_a();
        let records = vec![
            rec(None, "mod2", 1),
            rec(Some("pkgA"), "mod2", 0),
            rec(Some("os"), "path", 0),
            rec(Some("missing"), "x", 3),
            rec(Some("pkgA"), "sub", 0),
        ];
        let resolution = resolve_file(&records, &p("pkgA/mod1.py"), &index, &roots);

        let targets: Vec<&Path> = resolution
            .targets
            .iter()
            .map(|&id| index.entry(id).path.as_path())
            .collect();
        assert_eq!(
            targets,
            vec![p("pkgA/mod2.py").as_path(), p("pkgA/sub/__init__.py").as_path()]
        );
        assert_eq!(resolution.external, 1);
        assert_eq!(resolution.escaped, 1);
        assert_eq!(resolution.unresolved(), 2);
    }
}
