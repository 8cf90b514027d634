//! The extraction driver.
//!
//! A [`Session`] owns the front end, the optional compile database and the
//! cache of extracted units. Files are independent: each is parsed into its
//! own unit and resolved into its own [`EntityModel`], so `extract_all` can
//! run them on a rayon pool with the front end and the database shared
//! read-only.

use crate::compile_db::CompileDatabase;
use crate::config::ExtractConfig;
use crate::errors::{ExtractError, ExtractResult};
use crate::flags::normalize_flags;
use crate::resolver::resolve;
use declgraph::EntityModel;
use declgraph_frontend_api::{Diagnostic, FrontEnd, Severity, TranslationUnit};
use log::{debug, info, log, warn, Level};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of extracting several files
#[derive(Debug, Default)]
pub struct ProjectExtraction {
    /// Successfully extracted files, in input order
    pub files: Vec<(PathBuf, Arc<EntityModel>)>,

    /// Files that failed (path, error message)
    pub failed_files: Vec<(PathBuf, String)>,
}

impl ProjectExtraction {
    /// Total number of files processed (success + failure)
    pub fn total_files(&self) -> usize {
        self.files.len() + self.failed_files.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed_files.is_empty()
    }

    /// Success rate (0.0 to 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_files() == 0 {
            0.0
        } else {
            self.files.len() as f64 / self.total_files() as f64
        }
    }

    /// Fail the whole run if any file failed.
    pub fn into_result(self) -> ExtractResult<Vec<(PathBuf, Arc<EntityModel>)>> {
        if self.failed_files.is_empty() {
            Ok(self.files)
        } else {
            Err(ExtractError::Failed {
                failed: self.failed_files,
            })
        }
    }
}

/// Front end, compile flags and extracted units of one run
pub struct Session<F: FrontEnd> {
    front_end: F,
    config: ExtractConfig,
    database: Option<CompileDatabase>,
    include_dirs: Vec<PathBuf>,
    units: Mutex<HashMap<PathBuf, Arc<EntityModel>>>,
}

impl<F: FrontEnd> Session<F> {
    pub fn new(front_end: F) -> Self {
        Self::with_config(front_end, ExtractConfig::default())
    }

    pub fn with_config(front_end: F, config: ExtractConfig) -> Self {
        Self {
            front_end,
            config,
            database: None,
            include_dirs: Vec::new(),
            units: Mutex::new(HashMap::new()),
        }
    }

    /// Take per-file flags and include directories from `database`.
    pub fn with_database(mut self, database: CompileDatabase) -> Self {
        self.include_dirs = database.all_include_dirs();
        self.database = Some(database);
        self
    }

    /// Load `compile_commands.json` from a build directory.
    pub fn open_build_dir(self, build_dir: impl AsRef<Path>) -> ExtractResult<Self> {
        let database = CompileDatabase::load(build_dir)?;
        Ok(self.with_database(database))
    }

    pub fn front_end(&self) -> &F {
        &self.front_end
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn database(&self) -> Option<&CompileDatabase> {
        self.database.as_ref()
    }

    /// Number of cached units.
    pub fn cached(&self) -> usize {
        self.lock_units().len()
    }

    /// Normalized front-end flags for `path`.
    pub fn flags_for(&self, path: &Path) -> Vec<String> {
        let file_flags = self
            .database
            .as_ref()
            .and_then(|db| db.file_options(path))
            .unwrap_or_default();
        normalize_flags(file_flags, &self.include_dirs, &self.config)
    }

    /// Extract one file, or return the cached model of an earlier call.
    pub fn extract(&self, path: &Path) -> ExtractResult<Arc<EntityModel>> {
        let path = path
            .canonicalize()
            .map_err(|e| ExtractError::Io(path.to_path_buf(), e))?;
        if let Some(model) = self.lock_units().get(&path) {
            debug!("{}: using cached unit", path.display());
            return Ok(Arc::clone(model));
        }

        let metadata = std::fs::metadata(&path).map_err(|e| ExtractError::Io(path.clone(), e))?;
        if !metadata.is_file() {
            return Err(ExtractError::NotAFile(path));
        }
        if metadata.len() > self.config.max_file_size as u64 {
            return Err(ExtractError::FileTooLarge(path, self.config.max_file_size));
        }

        info!("Extracting {}", path.display());
        let flags = self.flags_for(&path);
        let unit = self.front_end.parse(&path, &flags)?;
        let model = Arc::new(self.build_model(&unit)?);

        let mut units = self.lock_units();
        Ok(Arc::clone(units.entry(path).or_insert(model)))
    }

    /// Extract in-memory source as if it were the file `path`. The result
    /// is not cached.
    pub fn extract_source(&self, source: &str, path: &Path) -> ExtractResult<EntityModel> {
        if source.len() > self.config.max_file_size {
            return Err(ExtractError::FileTooLarge(
                path.to_path_buf(),
                self.config.max_file_size,
            ));
        }
        let flags = self.flags_for(path);
        let unit = self.front_end.parse_source(source, path, &flags)?;
        self.build_model(&unit)
    }

    /// Extract every file in `paths`, de-duplicated, in parallel when
    /// configured. Failing files are collected; they do not stop the others.
    ///
    /// # Errors
    ///
    /// Only when the worker pool cannot be created. Use
    /// [`ProjectExtraction::into_result`] to fail on any failed file.
    pub fn extract_all(&self, paths: &[PathBuf]) -> ExtractResult<ProjectExtraction> {
        let mut seen = HashSet::new();
        let unique: Vec<&PathBuf> = paths
            .iter()
            .filter(|p| seen.insert(p.canonicalize().unwrap_or_else(|_| p.to_path_buf())))
            .collect();

        let run = |path: &&PathBuf| ((*path).clone(), self.extract(path));
        let results: Vec<(PathBuf, ExtractResult<Arc<EntityModel>>)> = if self.config.parallel {
            let pool = match self.config.parallel_workers {
                Some(workers) => rayon::ThreadPoolBuilder::new().num_threads(workers).build(),
                None => rayon::ThreadPoolBuilder::new().build(),
            }
            .map_err(|e| ExtractError::ThreadPool(e.to_string()))?;
            pool.install(|| unique.par_iter().map(run).collect())
        } else {
            unique.iter().map(run).collect()
        };

        let mut project = ProjectExtraction::default();
        for (path, result) in results {
            match result {
                Ok(model) => project.files.push((path, model)),
                Err(err) => {
                    warn!("{}: extraction failed: {}", path.display(), err);
                    project.failed_files.push((path, err.to_string()));
                }
            }
        }

        info!(
            "Extracted {}/{} files",
            project.files.len(),
            project.total_files()
        );
        Ok(project)
    }

    /// Check the diagnostics of `unit` and resolve it.
    fn build_model(&self, unit: &TranslationUnit) -> ExtractResult<EntityModel> {
        let fatal_from = if self.config.strict_diagnostics {
            Severity::Warning
        } else {
            Severity::Error
        };

        let (fatal, other): (Vec<&Diagnostic>, Vec<&Diagnostic>) = unit
            .diagnostics()
            .iter()
            .partition(|d| d.severity >= fatal_from);
        for diag in &other {
            log!(log_level(diag, false), "{diag}");
        }
        if !fatal.is_empty() {
            for diag in &fatal {
                log!(log_level(diag, true), "{diag}");
            }
            return Err(ExtractError::CompileErrors {
                path: unit.path().to_path_buf(),
                diagnostics: fatal.into_iter().cloned().collect(),
            });
        }

        let model = resolve(unit);
        info!("Extracted {}", unit.path().display());
        Ok(model)
    }

    fn lock_units(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<EntityModel>>> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Log level of a diagnostic; anything that fails the unit logs as an error.
fn log_level(diag: &Diagnostic, fatal: bool) -> Level {
    match diag.severity {
        _ if fatal => Level::Error,
        Severity::Note => Level::Debug,
        _ => Level::Warn,
    }
}
