use thiserror::Error;

/// costlens error types
#[derive(Error, Debug)]
pub enum CostlensError {
    /// Failed to parse JSON/JSONL
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for costlens
pub type Result<T> = std::result::Result<T, CostlensError>;
