use declgraph_frontend_api::{Diagnostic, FrontEndError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the extraction of a file or a run
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Failed to read a file or directory
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The input exists but is not a regular file
    #[error("'{0}' is not a regular file")]
    NotAFile(PathBuf),

    /// File too large
    #[error("File {0} exceeds maximum size ({1} bytes)")]
    FileTooLarge(PathBuf, usize),

    /// The front end could not produce a unit
    #[error(transparent)]
    FrontEnd(#[from] FrontEndError),

    /// The unit has error-severity diagnostics
    #[error("{path}: parsing failed with {} error(s)", diagnostics.len())]
    CompileErrors {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },

    /// `compile_commands.json` is missing or malformed
    #[error("Compilation database could not be loaded from '{0}': {1}")]
    CompileDatabase(PathBuf, String),

    /// Worker pool could not be created
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),

    /// At least one file of a run failed
    #[error("{} file(s) failed to extract", failed.len())]
    Failed { failed: Vec<(PathBuf, String)> },
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Local errors of the attribute parser. They are logged and degrade to an
/// empty or partial attribute list; they never abort a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("could not find end of attribute list")]
    Unterminated,

    #[error("expected attribute name, found '{0}'")]
    ExpectedName(String),

    #[error("unbalanced parentheses in arguments of '{0}'")]
    UnbalancedParens(String),

    #[error("unexpected token '{0}' in attribute list")]
    Unexpected(String),
}
