pub mod config;
pub mod graph;
pub mod imports;
pub mod index;

use crate::errors::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "depgraph",
    version,
    about = "Project-local import dependency graphs for Python code"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the module dependency graph of a project
    Graph(graph::GraphArgs),
    /// List the indexed modules and project roots
    Index(index::IndexArgs),
    /// Print the raw import records of one file
    Imports(imports::ImportsArgs),
    /// Inspect resolved configuration
    Config(config::ConfigArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Graph(args) => graph::run(&args),
        Commands::Index(args) => index::run(&args),
        Commands::Imports(args) => imports::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}

/// Canonical form of `path` when it exists, otherwise the path as given.
///
/// Config lookup must not fail on a bad root; the root check reports it.
pub(crate) fn working_dir(path: &std::path::Path) -> std::path::PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
