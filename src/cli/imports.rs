use crate::errors::{DepgraphError, Result};
use crate::parse::python::extract_imports;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportsArgs {
    /// Python source file
    pub file: PathBuf,
}

pub fn run(args: &ImportsArgs) -> Result<()> {
    if !args.file.is_file() {
        return Err(DepgraphError::path(&args.file, "not a readable file"));
    }
    let source = std::fs::read_to_string(&args.file)?;
    let records = extract_imports(&source)?;

    let mut stdout = std::io::stdout().lock();
    crate::output::json::write_json(&mut stdout, &records)
}
