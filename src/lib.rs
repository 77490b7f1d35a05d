//! Project-local import dependency graphs for Python source trees.
//!
//! A run indexes the tree once ([`build_index`]), extracts the raw imports
//! of every file ([`extract_imports`]), resolves each of them against the
//! index and assembles a [`DependencyGraph`] ([`resolve_all`]).
//!
//! ```no_run
//! use depgraph::{build_index, resolve_all, FsTree};
//! use std::path::Path;
//!
//! let tree = FsTree::default();
//! let (index, roots) = build_index(Path::new("my_project"), &tree)?;
//! let analysis = resolve_all(&tree, &index, &roots);
//! println!("{} modules, {} edges", analysis.graph.node_count(), analysis.graph.edge_count());
//! # Ok::<(), depgraph::DepgraphError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod index;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod resolve;
pub mod walk;

pub use errors::{DepgraphError, Result};
pub use graph::{DependencyGraph, Interchange};
pub use index::{build_index, ModuleIndex, ModuleKind, ProjectRoots};
pub use parse::{extract_imports, RawImport};
pub use pipeline::{analyze, resolve_all, Analysis, FileDiagnostic};
pub use walk::{FsTree, MemoryTree, SourceTree};
