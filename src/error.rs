use std::io;

/// Errors that can occur while loading, transforming or slicing a dataset
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File missing or unreadable
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed token, inconsistent token counts or index out of bounds
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Operation invoked before the data it needs exists
    #[error("invalid state: {0}")]
    State(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested row range exceeds the dataset
    #[error("row range {offset}..{offset}+{len} out of range for {size} rows")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Convenience Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
