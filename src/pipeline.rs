//! Whole-project run: index once, then extract and resolve every file in
//! parallel against the frozen index, then assemble the graph.

use crate::errors::Result;
use crate::graph::builder::build_graph;
use crate::graph::ir::DependencyGraph;
use crate::index::{build_index, ModuleId, ModuleIndex, ProjectRoots};
use crate::parse::python::extract_imports;
use crate::resolve::{resolve_file, FileResolution};
use crate::walk::SourceTree;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// The file is not valid Python
    Parse,
    /// The file could not be read or is not UTF-8
    Read,
    /// Another file claims the same dotted name, so this one is not a node
    Shadowed,
}

/// A file-local failure that was recorded instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiagnostic {
    pub file: PathBuf,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub imports_total: usize,
    pub imports_resolved: usize,
    pub imports_unresolved: usize,
    pub elapsed_ms: u64,
}

/// Best-effort graph plus everything that went wrong along the way.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub diagnostics: Vec<FileDiagnostic>,
    pub stats: AnalysisStats,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Process files one by one instead of on the rayon pool
    pub sequential: bool,
}

/// Result of one file's extraction + resolution.
enum FileOutcome {
    Done {
        importer: ModuleId,
        records: usize,
        resolution: FileResolution,
    },
    Failed(FileDiagnostic),
}

/// Extract and resolve every indexed file, then build the graph.
pub fn resolve_all(tree: &dyn SourceTree, index: &ModuleIndex, roots: &ProjectRoots) -> Analysis {
    resolve_all_with(tree, index, roots, &PipelineOptions::default(), |_| {})
}

/// [`resolve_all`] with options and a per-file progress callback.
pub fn resolve_all_with<F>(
    tree: &dyn SourceTree,
    index: &ModuleIndex,
    roots: &ProjectRoots,
    options: &PipelineOptions,
    on_file: F,
) -> Analysis
where
    F: Fn(&Path) + Sync,
{
    let start = Instant::now();
    let ids: Vec<ModuleId> = index.iter().map(|(id, _)| id).collect();

    let work = |&id: &ModuleId| {
        let outcome = process_file(tree, index, roots, id);
        on_file(&index.entry(id).path);
        outcome
    };

    // Collecting keeps index order, so the graph does not depend on
    // scheduling.
    let outcomes: Vec<FileOutcome> = if options.sequential {
        ids.iter().map(work).collect()
    } else {
        ids.par_iter().map(work).collect()
    };

    let mut stats = AnalysisStats::default();
    let mut diagnostics: Vec<FileDiagnostic> = index
        .shadowed()
        .iter()
        .map(|s| FileDiagnostic {
            file: s.path.clone(),
            kind: DiagnosticKind::Shadowed,
            message: format!("`{}` is already provided by {}", s.name, s.winner.display()),
        })
        .collect();
    let mut resolutions = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        match outcome {
            FileOutcome::Done {
                importer,
                records,
                resolution,
            } => {
                stats.files_parsed += 1;
                stats.imports_total += records;
                stats.imports_unresolved += resolution.unresolved();
                stats.imports_resolved += records - resolution.unresolved();
                resolutions.push((importer, resolution));
            }
            FileOutcome::Failed(diagnostic) => {
                stats.files_skipped += 1;
                diagnostics.push(diagnostic);
            }
        }
    }

    let graph = build_graph(index, &resolutions);
    stats.elapsed_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "parsed {} files ({} skipped), resolved {}/{} imports",
        stats.files_parsed,
        stats.files_skipped,
        stats.imports_resolved,
        stats.imports_total
    );

    Analysis {
        graph,
        diagnostics,
        stats,
    }
}

fn process_file(
    tree: &dyn SourceTree,
    index: &ModuleIndex,
    roots: &ProjectRoots,
    id: ModuleId,
) -> FileOutcome {
    let path = &index.entry(id).path;

    let source = match tree.read(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return FileOutcome::Failed(FileDiagnostic {
                file: path.clone(),
                kind: DiagnosticKind::Read,
                message: e.to_string(),
            });
        }
    };

    let records = match extract_imports(&source) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return FileOutcome::Failed(FileDiagnostic {
                file: path.clone(),
                kind: DiagnosticKind::Parse,
                message: e.to_string(),
            });
        }
    };

    let resolution = resolve_file(&records, path, index, roots);
    FileOutcome::Done {
        importer: id,
        records: records.len(),
        resolution,
    }
}

/// Index `root` and run the full pipeline over it.
pub fn analyze(root: &Path, tree: &dyn SourceTree, options: &PipelineOptions) -> Result<Analysis> {
    let (index, roots) = build_index(root, tree)?;
    Ok(resolve_all_with(tree, &index, &roots, options, |_| {}))
}
