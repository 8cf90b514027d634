use crate::errors::{FrontEndError, FrontEndResult};
use crate::unit::TranslationUnit;
use log::debug;
use std::path::Path;

/// A compiler front end that turns source text into a [`TranslationUnit`].
///
/// Compile errors do not fail the call; they are reported as diagnostics on
/// the returned unit and the caller decides what is fatal. An `Err` means no
/// unit could be produced at all.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one front end is shared by every
/// file-level task of an extraction run.
pub trait FrontEnd: Send + Sync {
    /// Short identifier of the backend (e.g. "tree-sitter")
    fn name(&self) -> &str;

    /// Parse in-memory source. `path` is the logical path of the main file.
    fn parse_source(
        &self,
        source: &str,
        path: &Path,
        flags: &[String],
    ) -> FrontEndResult<TranslationUnit>;

    /// Read and parse a file.
    fn parse(&self, path: &Path, flags: &[String]) -> FrontEndResult<TranslationUnit> {
        debug!("{}: parsing {}", self.name(), path.display());
        let source =
            std::fs::read_to_string(path).map_err(|e| FrontEndError::Io(path.to_path_buf(), e))?;
        self.parse_source(&source, path, flags)
    }
}
