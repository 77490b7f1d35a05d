use crate::config::ignore::{find_upwards, load_ignore_file};
use crate::config::provenance::{ConfigKey, ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::ResolvedConfig;
use crate::errors::{DepgraphError, Result};
use crate::output::OutputFormat;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_NAME: &str = ".depgraph.toml";

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub format: Option<OutputFormat>,
    pub quiet: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_hidden: bool,
    pub sequential: bool,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/depgraph/config.toml)
/// 3. Project config (nearest .depgraph.toml walking up from working_dir)
/// 4. Environment variables
/// 5. CLI overrides
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig::default();

    let user = find_user_config().filter(|path| path.is_file());
    let project = find_upwards(working_dir, PROJECT_CONFIG_NAME);

    for (path, source) in [
        user.map(|p| (p.clone(), Source::UserConfig(p))),
        project.map(|p| (p.clone(), Source::ProjectConfig(p))),
    ]
    .into_iter()
    .flatten()
    {
        let file_config = load_file_config(&path, &source)?;
        apply_file_config(&mut config, &file_config, source)?;
        config.loaded_files.push(path);
    }

    apply_env_vars(&mut config)?;
    apply_cli_overrides(&mut config, cli);

    config.ignore_file = load_ignore_file(working_dir)?;

    tracing::debug!(
        "resolved config from {} file(s): format={}, sequential={}",
        config.loaded_files.len(),
        config.format,
        config.sequential
    );

    Ok(config)
}

fn load_file_config(path: &Path, source: &Source) -> Result<FileConfig> {
    let layer = match source {
        Source::UserConfig(_) => "user",
        _ => "project",
    };
    let content = std::fs::read_to_string(path).map_err(|e| {
        DepgraphError::Config(format!(
            "Could not read {layer} config {}: {e}",
            path.display()
        ))
    })?;
    FileConfig::from_toml(&content)
        .map_err(|e| DepgraphError::Config(format!("Invalid {layer} config: {e}")))
}

fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("depgraph").join("config.toml"))
}

fn parse_format(value: &str, origin: &Source) -> Result<OutputFormat> {
    value
        .parse()
        .map_err(|e| DepgraphError::Config(format!("{origin}: {e}")))
}

fn apply_file_config(config: &mut ResolvedConfig, file: &FileConfig, source: Source) -> Result<()> {
    let prov: &mut ProvenanceMap = &mut config.provenance;

    if let Some(ref format) = file.defaults.format {
        config.format = parse_format(format, &source)?;
        prov.set(ConfigKey::Format, source.clone());
    }
    if let Some(quiet) = file.defaults.quiet {
        config.quiet = quiet;
        prov.set(ConfigKey::Quiet, source.clone());
    }
    if let Some(ref include) = file.targeting.include {
        config.include = include.clone();
        prov.set(ConfigKey::Include, source.clone());
    }
    if let Some(ref exclude) = file.targeting.exclude {
        config.exclude = exclude.clone();
        prov.set(ConfigKey::Exclude, source.clone());
    }
    if let Some(include_hidden) = file.targeting.include_hidden {
        config.include_hidden = include_hidden;
        prov.set(ConfigKey::IncludeHidden, source.clone());
    }
    if let Some(sequential) = file.analysis.sequential {
        config.sequential = sequential;
        prov.set(ConfigKey::Sequential, source);
    }
    Ok(())
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

fn env_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn apply_env_vars(config: &mut ResolvedConfig) -> Result<()> {
    for key in ConfigKey::ALL {
        let Ok(val) = std::env::var(key.env_var()) else {
            continue;
        };
        let source = Source::EnvVar(key.env_var());
        match key {
            ConfigKey::Format => config.format = parse_format(&val, &source)?,
            ConfigKey::Quiet => config.quiet = env_flag(&val),
            ConfigKey::Include => config.include = env_list(&val),
            ConfigKey::Exclude => config.exclude = env_list(&val),
            ConfigKey::IncludeHidden => config.include_hidden = env_flag(&val),
            ConfigKey::Sequential => config.sequential = env_flag(&val),
        }
        config.provenance.set(key, source);
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut ResolvedConfig, cli: &CliOverrides) {
    let mut set = Vec::new();
    if let Some(format) = cli.format {
        config.format = format;
        set.push(ConfigKey::Format);
    }
    if cli.quiet {
        config.quiet = true;
        set.push(ConfigKey::Quiet);
    }
    if !cli.include.is_empty() {
        config.include = cli.include.clone();
        set.push(ConfigKey::Include);
    }
    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude.clone();
        set.push(ConfigKey::Exclude);
    }
    if cli.include_hidden {
        config.include_hidden = true;
        set.push(ConfigKey::IncludeHidden);
    }
    if cli.sequential {
        config.sequential = true;
        set.push(ConfigKey::Sequential);
    }
    for key in set {
        config.provenance.set(key, Source::CliFlag(key.cli_flag()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults_only() {
        let dir = PathBuf::from("/nonexistent");
        let config = resolve_config(&dir, &CliOverrides::default()).unwrap();

        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.quiet);
        assert!(config.include.is_empty());
        assert!(!config.include_hidden);
        assert!(!config.sequential);
    }

    #[test]
    fn cli_override_takes_precedence() {
        let dir = PathBuf::from("/nonexistent");
        let cli = CliOverrides {
            format: Some(OutputFormat::Text),
            quiet: true,
            sequential: true,
            exclude: vec!["tests/**".to_string()],
            ..Default::default()
        };
        let config = resolve_config(&dir, &cli).unwrap();

        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.quiet);
        assert!(config.sequential);
        assert_eq!(config.exclude, vec!["tests/**".to_string()]);
        assert!(matches!(
            config.provenance.get(ConfigKey::Format),
            Source::CliFlag(_)
        ));
        assert!(matches!(
            config.provenance.get(ConfigKey::Sequential),
            Source::CliFlag(_)
        ));
    }

    #[test]
    fn project_config_applied() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".depgraph.toml"),
            r#"
[defaults]
format = "dot"
quiet = true

[targeting]
exclude = ["migrations/**"]

[analysis]
sequential = true
"#,
        )
        .unwrap();

        let config = resolve_config(tmp.path(), &CliOverrides::default()).unwrap();

        assert_eq!(config.format, OutputFormat::Dot);
        assert!(config.quiet);
        assert_eq!(config.exclude, vec!["migrations/**".to_string()]);
        assert!(config.sequential);
        assert_eq!(config.loaded_files.len(), 1);
        assert!(matches!(
            config.provenance.get(ConfigKey::Exclude),
            Source::ProjectConfig(_)
        ));
    }

    #[test]
    fn project_config_found_from_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".depgraph.toml"), "[defaults]\nformat = \"text\"\n").unwrap();
        let nested = tmp.path().join("pkg").join("sub");
        std::fs::create_dir_all(&nested).unwrap();

        let config = resolve_config(&nested, &CliOverrides::default()).unwrap();
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn cli_overrides_project_config() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".depgraph.toml"), "[defaults]\nformat = \"text\"\n").unwrap();

        let cli = CliOverrides {
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        let config = resolve_config(tmp.path(), &cli).unwrap();

        assert_eq!(config.format, OutputFormat::Json);
        assert!(matches!(
            config.provenance.get(ConfigKey::Format),
            Source::CliFlag(_)
        ));
    }

    #[test]
    fn unknown_format_in_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".depgraph.toml"), "[defaults]\nformat = \"svg\"\n").unwrap();

        let err = resolve_config(tmp.path(), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, DepgraphError::Config(_)));
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".depgraph.toml"), "[defaults\n").unwrap();

        let err = resolve_config(tmp.path(), &CliOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid project config"));
    }

    #[test]
    fn depgraphignore_is_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".depgraphignore"), "build/**\n").unwrap();

        let config = resolve_config(tmp.path(), &CliOverrides::default()).unwrap();
        let ignore = config.ignore_file.as_ref().unwrap();
        assert_eq!(ignore.patterns, vec!["build/**".to_string()]);
        assert!(config.discovery_options().exclude.contains(&"build/**".to_string()));
    }

    #[test]
    fn env_list_skips_blanks() {
        assert_eq!(env_list("a/**, b/** ,,"), vec!["a/**", "b/**"]);
        assert!(env_flag("TRUE"));
        assert!(env_flag("1"));
        assert!(!env_flag("no"));
    }
}
