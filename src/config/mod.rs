pub mod ignore;
pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use crate::output::OutputFormat;
use crate::pipeline::PipelineOptions;
use crate::walk::DiscoveryOptions;
use self::ignore::IgnoreFile;
use self::provenance::ProvenanceMap;
use std::path::PathBuf;

/// Fully resolved configuration with the source of every setting.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    // Operational
    pub format: OutputFormat,
    pub quiet: bool,

    // Targeting
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_hidden: bool,
    /// Nearest `.depgraphignore`; its patterns extend `exclude`
    pub ignore_file: Option<IgnoreFile>,

    // Analysis
    pub sequential: bool,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            quiet: false,
            include: Vec::new(),
            exclude: Vec::new(),
            include_hidden: false,
            ignore_file: None,
            sequential: false,
            provenance: ProvenanceMap::new(),
            loaded_files: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    /// Discovery options with `.depgraphignore` patterns folded into the excludes.
    pub fn discovery_options(&self) -> DiscoveryOptions {
        let mut exclude = self.exclude.clone();
        if let Some(ignore) = &self.ignore_file {
            exclude.extend(ignore.patterns.iter().cloned());
        }
        DiscoveryOptions {
            include: self.include.clone(),
            exclude,
            include_hidden: self.include_hidden,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            sequential: self.sequential,
        }
    }
}
