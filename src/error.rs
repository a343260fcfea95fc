use thiserror::Error;

/// Failure kinds of the configuration document pipeline.
///
/// Load, import and save routines branch on the kind: a parse or validation
/// failure of an existing file is recoverable (forensic backup, fall back to
/// defaults), while an I/O failure is reported and otherwise left alone.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    Validation(String),
}
