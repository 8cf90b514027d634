//! Entity extraction for C++ headers

use crate::frontend::TreeSitterFrontEnd;
use declgraph::EntityModel;
use declgraph_extract::{ExtractConfig, ExtractResult, ProjectExtraction, Session};
use log::info;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extracts [`EntityModel`]s from C++ files with the tree-sitter front end.
///
/// A thin wrapper over a [`Session`]: compile flags, diagnostics policy and
/// caching all come from the session and its [`ExtractConfig`].
pub struct CppExtractor {
    session: Session<TreeSitterFrontEnd>,
}

impl CppExtractor {
    pub fn new() -> Self {
        Self::with_config(ExtractConfig::default())
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self {
            session: Session::with_config(TreeSitterFrontEnd::new(), config),
        }
    }

    /// Take per-file flags from the `compile_commands.json` in `build_dir`.
    pub fn open_build_dir(self, build_dir: impl AsRef<Path>) -> ExtractResult<Self> {
        Ok(Self {
            session: self.session.open_build_dir(build_dir)?,
        })
    }

    pub fn session(&self) -> &Session<TreeSitterFrontEnd> {
        &self.session
    }

    pub fn extract(&self, path: &Path) -> ExtractResult<Arc<EntityModel>> {
        self.session.extract(path)
    }

    pub fn extract_source(&self, source: &str, path: &Path) -> ExtractResult<EntityModel> {
        self.session.extract_source(source, path)
    }

    pub fn extract_all(&self, paths: &[PathBuf]) -> ExtractResult<ProjectExtraction> {
        self.session.extract_all(paths)
    }

    /// Extract in-memory sources, in parallel when configured. Results are
    /// in input order.
    pub fn extract_sources(&self, sources: &[(PathBuf, String)]) -> Vec<ExtractResult<EntityModel>> {
        let run = |(path, source): &(PathBuf, String)| self.session.extract_source(source, path);
        let results: Vec<_> = if self.session.config().parallel {
            sources.par_iter().map(run).collect()
        } else {
            sources.iter().map(run).collect()
        };
        info!(
            "Extracted {}/{} sources",
            results.iter().filter(|r| r.is_ok()).count(),
            results.len()
        );
        results
    }
}

impl Default for CppExtractor {
    fn default() -> Self {
        Self::new()
    }
}
