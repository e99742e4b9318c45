//! Error type for logwise-core.

/// Errors raised when untrusted strings (CLI flags, command-bar input,
/// config files) are turned into core values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown time range {key:?} (expected one of: {expected})")]
    UnknownRange { key: String, expected: String },

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
