//! Marketplace errors.

/// Result alias for marketplace operations.
pub type Result<T> = std::result::Result<T, TurkError>;

/// Errors raised by marketplace support code.
#[derive(Debug, thiserror::Error)]
pub enum TurkError {
    /// Connection settings are unusable
    #[error("Invalid marketplace settings: {0}")]
    InvalidSettings(String),

    /// A required credential key is absent
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Reading a credentials file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A timestamp did not match the expected format
    #[error("Invalid timestamp '{value}': {source}")]
    Parse {
        /// The offending input
        value: String,
        /// Parser failure
        source: chrono::ParseError,
    },
}
