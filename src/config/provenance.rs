use std::path::PathBuf;

/// Every configurable setting, ordered like its dotted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    Sequential,
    Format,
    Quiet,
    Exclude,
    Include,
    IncludeHidden,
}

impl ConfigKey {
    pub const COUNT: usize = 6;

    pub const ALL: [ConfigKey; Self::COUNT] = [
        ConfigKey::Sequential,
        ConfigKey::Format,
        ConfigKey::Quiet,
        ConfigKey::Exclude,
        ConfigKey::Include,
        ConfigKey::IncludeHidden,
    ];

    /// `section.field` as written in `.depgraph.toml`.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Sequential => "analysis.sequential",
            ConfigKey::Format => "defaults.format",
            ConfigKey::Quiet => "defaults.quiet",
            ConfigKey::Exclude => "targeting.exclude",
            ConfigKey::Include => "targeting.include",
            ConfigKey::IncludeHidden => "targeting.include_hidden",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::Sequential => "DEPGRAPH_SEQUENTIAL",
            ConfigKey::Format => "DEPGRAPH_FORMAT",
            ConfigKey::Quiet => "DEPGRAPH_QUIET",
            ConfigKey::Exclude => "DEPGRAPH_EXCLUDE",
            ConfigKey::Include => "DEPGRAPH_INCLUDE",
            ConfigKey::IncludeHidden => "DEPGRAPH_INCLUDE_HIDDEN",
        }
    }

    pub fn cli_flag(self) -> &'static str {
        match self {
            ConfigKey::Sequential => "--sequential",
            ConfigKey::Format => "--format",
            ConfigKey::Quiet => "--quiet",
            ConfigKey::Exclude => "--exclude",
            ConfigKey::Include => "--include",
            ConfigKey::IncludeHidden => "--include-hidden",
        }
    }
}

/// The layer a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    UserConfig(PathBuf),
    ProjectConfig(PathBuf),
    EnvVar(&'static str),
    CliFlag(&'static str),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::UserConfig(path) => write!(f, "user config ({})", path.display()),
            Source::ProjectConfig(path) => write!(f, "project config ({})", path.display()),
            Source::EnvVar(name) => write!(f, "env var ({name})"),
            Source::CliFlag(flag) => write!(f, "CLI flag ({flag})"),
        }
    }
}

/// Source of every setting. Starts with all keys at [`Source::Default`].
#[derive(Debug, Clone)]
pub struct ProvenanceMap {
    sources: [Source; ConfigKey::COUNT],
}

impl Default for ProvenanceMap {
    fn default() -> Self {
        Self {
            sources: std::array::from_fn(|_| Source::Default),
        }
    }
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: ConfigKey, source: Source) {
        self.sources[key as usize] = source;
    }

    pub fn get(&self, key: ConfigKey) -> &Source {
        &self.sources[key as usize]
    }

    /// Settings in dotted-key order.
    pub fn entries(&self) -> impl Iterator<Item = (ConfigKey, &Source)> {
        ConfigKey::ALL.into_iter().zip(self.sources.iter())
    }
}
