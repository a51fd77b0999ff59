use thiserror::Error;

/// The main error type for Convoy operations
#[derive(Debug, Error)]
pub enum ConvoyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    /// No package is runnable while packages remain: a dependency cycle, or
    /// a dependency that was never going to complete.
    #[error("Dependency deadlock, no runnable package remains: {}", format_residual(.residual))]
    Deadlock {
        /// Stuck packages with their unresolved dependency sets, sorted by
        /// package name.
        residual: Vec<(String, Vec<String>)>,
    },
}

fn format_residual(residual: &[(String, Vec<String>)]) -> String {
    residual
        .iter()
        .map(|(name, deps)| format!("{} waits on [{}]", name, deps.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for Convoy operations
pub type ConvoyResult<T> = Result<T, ConvoyError>;
