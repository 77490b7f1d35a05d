use crate::config::provenance::ConfigKey;
use crate::config::ResolvedConfig;
use std::io::Write;

/// Render `config show` output.
pub fn render_show<W: Write>(w: &mut W, config: &ResolvedConfig) -> std::io::Result<()> {
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    writeln!(w, "Resolved settings:")?;
    for (key, source) in config.provenance.entries() {
        writeln!(w, "  {}: {} <- {}", key.as_str(), value_of(config, key), source)?;
    }

    if let Some(ignore) = &config.ignore_file {
        writeln!(w)?;
        writeln!(w, "Ignore patterns ({}):", ignore.path.display())?;
        for pattern in &ignore.patterns {
            writeln!(w, "  {}", pattern)?;
        }
    }

    Ok(())
}

fn value_of(config: &ResolvedConfig, key: ConfigKey) -> String {
    match key {
        ConfigKey::Format => config.format.to_string(),
        ConfigKey::Quiet => config.quiet.to_string(),
        ConfigKey::Include => format!("[{}]", config.include.join(", ")),
        ConfigKey::Exclude => format!("[{}]", config.exclude.join(", ")),
        ConfigKey::IncludeHidden => config.include_hidden.to_string(),
        ConfigKey::Sequential => config.sequential.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ignore::IgnoreFile;
    use crate::config::provenance::{ProvenanceMap, Source};
    use crate::output::OutputFormat;
    use std::path::PathBuf;

    fn render(config: &ResolvedConfig) -> String {
        let mut out = Vec::new();
        render_show(&mut out, config).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_files_values_and_sources() {
        let mut provenance = ProvenanceMap::new();
        provenance.set(ConfigKey::Format, Source::CliFlag("--format"));
        let config = ResolvedConfig {
            format: OutputFormat::Dot,
            exclude: vec!["a/**".to_string(), "b/**".to_string()],
            provenance,
            loaded_files: vec![PathBuf::from("/proj/.depgraph.toml")],
            ..Default::default()
        };

        let text = render(&config);
        assert!(text.contains("  1. /proj/.depgraph.toml"));
        assert!(text.contains("defaults.format: dot <- CLI flag (--format)"));
        assert!(text.contains("targeting.exclude: [a/**, b/**] <- default"));
        assert!(text.contains("targeting.include: [] <- default"));
    }

    #[test]
    fn every_key_is_listed_once() {
        let text = render(&ResolvedConfig::default());
        assert!(text.starts_with("Loaded config files: (none)"));
        for key in ConfigKey::ALL {
            assert_eq!(text.matches(&format!("  {}: ", key.as_str())).count(), 1);
        }
    }

    #[test]
    fn ignore_file_section() {
        let config = ResolvedConfig {
            ignore_file: Some(IgnoreFile {
                path: PathBuf::from("/proj/.depgraphignore"),
                patterns: vec!["build/**".to_string()],
            }),
            ..Default::default()
        };
        let text = render(&config);
        assert!(text.contains("Ignore patterns (/proj/.depgraphignore):\n  build/**\n"));
    }
}
