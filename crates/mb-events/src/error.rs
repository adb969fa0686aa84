use std::io;

/// Errors produced by the notice stream infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// I/O error during archive file operations.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An archive append arrived out of sequence.
    #[error("archive sequence gap: expected seq {expected}, got {actual}")]
    SequenceGap { expected: u64, actual: u64 },
}

/// Convenience alias used throughout the events crate.
pub type Result<T> = std::result::Result<T, EventError>;
