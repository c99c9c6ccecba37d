//! Configuration errors
//!
//! Runtime game conditions (bad snapshots, illegal moves) never surface
//! here; they are handled as skips or no-op ticks.

/// Operator or programmer mistakes in configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown tournament config: {0}")]
    UnknownConfig(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
