use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid station id: {0}")]
    InvalidStationId(String),

    #[error("invalid date key (expected YYYY-MM-DD): {0}")]
    InvalidDateKey(String),

    #[error("invalid period key (expected YYYY-MM): {0}")]
    InvalidPeriodKey(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("revision numbers start at 1")]
    ZeroRevision,
}
