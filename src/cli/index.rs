use crate::config::resolve::{resolve_config, CliOverrides};
use crate::errors::Result;
use crate::index::build_index;
use crate::walk::FsTree;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Project root to index
    pub path: PathBuf,

    /// Exclude glob patterns
    #[arg(long)]
    pub exclude: Vec<String>,
}

pub fn run(args: &IndexArgs) -> Result<()> {
    let cli = CliOverrides {
        exclude: args.exclude.clone(),
        ..Default::default()
    };
    let config = resolve_config(&super::working_dir(&args.path), &cli)?;
    let tree = FsTree::new(config.discovery_options());
    let (index, roots) = build_index(&args.path, &tree)?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "Root: {}", index.root().display())?;
    writeln!(out)?;

    writeln!(out, "Project roots ({}):", roots.len())?;
    for root in &roots {
        writeln!(out, "  {}  {}", root.name, root.dir.display())?;
    }
    writeln!(out)?;

    writeln!(out, "Modules ({}):", index.len())?;
    let width = index.iter().map(|(_, e)| e.name.len()).max().unwrap_or(0);
    for (_, entry) in index.iter() {
        writeln!(
            out,
            "  {:<width$}  {:<8}  {}",
            entry.name,
            entry.kind,
            entry.path.display()
        )?;
    }
    Ok(())
}
