use std::path::PathBuf;
use thiserror::Error;

/// Errors a front end can raise before a translation unit exists
#[derive(Error, Debug)]
pub enum FrontEndError {
    /// Failed to read the source file
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The compile flags were rejected
    #[error("Invalid arguments for {0}: {1}")]
    InvalidArguments(PathBuf, String),

    /// The front end failed internally and produced no unit
    #[error("Front end crashed while parsing {0}: {1}")]
    Crashed(PathBuf, String),

    /// The source cannot be handled by this front end
    #[error("Unsupported source {0}: {1}")]
    UnsupportedSource(PathBuf, String),
}

/// Result type for front-end operations
pub type FrontEndResult<T> = Result<T, FrontEndError>;
