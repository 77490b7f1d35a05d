use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DepgraphError {
    #[error("Invalid project root {path}: {reason}")]
    #[diagnostic(code(depgraph::path))]
    Path { path: PathBuf, reason: String },

    #[error("Syntax error at {line}:{column}: {message}")]
    #[diagnostic(code(depgraph::parse_error))]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Could not load the Python grammar: {0}")]
    #[diagnostic(code(depgraph::grammar))]
    Grammar(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(depgraph::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(depgraph::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(depgraph::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(depgraph::glob))]
    Glob(#[from] globset::Error),
}

impl DepgraphError {
    pub(crate) fn path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DepgraphError::Path {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepgraphError>;
