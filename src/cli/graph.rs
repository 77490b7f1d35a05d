use crate::config::resolve::{resolve_config, CliOverrides};
use crate::config::ResolvedConfig;
use crate::errors::Result;
use crate::index::build_index;
use crate::output::OutputFormat;
use crate::pipeline::{resolve_all_with, Analysis};
use crate::walk::FsTree;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Project root to analyze
    pub path: PathBuf,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Include glob patterns
    #[arg(long)]
    pub include: Vec<String>,

    /// Exclude glob patterns
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Descend into hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Process files on the calling thread only
    #[arg(long)]
    pub sequential: bool,

    /// Add per-file diagnostics and run statistics to JSON output
    #[arg(long)]
    pub diagnostics: bool,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

impl GraphArgs {
    fn to_cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            format: self.format,
            quiet: self.quiet,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            include_hidden: self.include_hidden,
            sequential: self.sequential,
        }
    }
}

pub fn run(args: &GraphArgs) -> Result<()> {
    let working_dir = super::working_dir(&args.path);
    let config = resolve_config(&working_dir, &args.to_cli_overrides())?;

    let analysis = run_analysis(&args.path, &config)?;

    let mut stdout = std::io::stdout().lock();
    match config.format {
        OutputFormat::Json => {
            crate::output::json::write_graph_json(&mut stdout, &analysis, args.diagnostics)?
        }
        OutputFormat::Dot => crate::output::dot::write_dot(&mut stdout, &analysis.graph)?,
        OutputFormat::Text => crate::output::text::write_graph_text(&mut stdout, &analysis)?,
    }

    Ok(())
}

fn run_analysis(path: &std::path::Path, config: &ResolvedConfig) -> Result<Analysis> {
    let tree = FsTree::new(config.discovery_options());
    let (index, roots) = build_index(path, &tree)?;

    let progress = if !config.quiet {
        let pb = indicatif::ProgressBar::new(index.len() as u64);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let analysis = resolve_all_with(&tree, &index, &roots, &config.pipeline_options(), |_| {
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if !config.quiet && !analysis.diagnostics.is_empty() {
        eprintln!(
            "warning: {} file(s) skipped; rerun with --diagnostics for details",
            analysis.diagnostics.len()
        );
    }

    Ok(analysis)
}
