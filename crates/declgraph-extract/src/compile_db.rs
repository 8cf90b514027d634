//! Per-file compile flags from a `compile_commands.json` build database.

use crate::errors::{ExtractError, ExtractResult};
use log::{debug, trace};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the database inside a build directory
pub const COMPILE_COMMANDS: &str = "compile_commands.json";

/// One entry of the JSON array
#[derive(Debug, Clone, Deserialize)]
struct CompileCommand {
    directory: PathBuf,
    file: PathBuf,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    command: Option<String>,
}

/// Compile flags of every file of a build, keyed by absolute source path.
#[derive(Debug, Clone, Default)]
pub struct CompileDatabase {
    build_dir: PathBuf,
    files: HashMap<PathBuf, Vec<String>>,
}

impl CompileDatabase {
    /// Load `<build_dir>/compile_commands.json`.
    pub fn load(build_dir: impl AsRef<Path>) -> ExtractResult<Self> {
        let build_dir = build_dir.as_ref();
        let path = build_dir.join(COMPILE_COMMANDS);
        let json = std::fs::read_to_string(&path).map_err(|e| ExtractError::Io(path.clone(), e))?;
        Self::from_json(build_dir, &json)
            .map_err(|err| ExtractError::CompileDatabase(path, err.to_string()))
    }

    /// Parse database text. `build_dir` is only recorded for reporting.
    pub fn from_json(build_dir: impl Into<PathBuf>, json: &str) -> serde_json::Result<Self> {
        let commands: Vec<CompileCommand> = serde_json::from_str(json)?;

        let mut files = HashMap::with_capacity(commands.len());
        for cmd in commands {
            let file = normalize(&cmd.directory.join(&cmd.file));
            let argv = match (cmd.arguments, cmd.command) {
                (Some(args), _) => args,
                (None, Some(command)) => split_command(&command),
                (None, None) => Vec::new(),
            };
            let flags = file_flags(&argv, &cmd.directory, &cmd.file, &file);
            trace!("{}: {} flags", file.display(), flags.len());
            files.insert(file, flags);
        }

        let build_dir = build_dir.into();
        debug!(
            "Loaded compile database for {} files from {}",
            files.len(),
            build_dir.display()
        );
        Ok(Self { build_dir, files })
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Source files of the build, in no particular order.
    pub fn files(&self) -> impl Iterator<Item = &Path> + '_ {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Flags the build compiles `path` with, without the compiler, the
    /// output and the source file itself.
    pub fn file_options(&self, path: &Path) -> Option<&[String]> {
        self.files
            .get(path)
            .or_else(|| self.files.get(&normalize(path)))
            .map(Vec::as_slice)
    }

    /// Every `-I` directory used anywhere in the build, sorted and
    /// de-duplicated.
    pub fn all_include_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .files
            .values()
            .flat_map(|flags| include_dirs(flags))
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

/// Canonical form when the path exists, the path itself otherwise.
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Drop the compiler, `-c`, `-o <out>` and the source file, and make
/// relative include directories absolute.
fn file_flags(argv: &[String], directory: &Path, file: &Path, resolved: &Path) -> Vec<String> {
    let mut flags = Vec::new();
    let mut args = argv.iter().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" => {}
            "-o" => {
                args.next();
            }
            "-I" => {
                if let Some(dir) = args.next() {
                    flags.push(format!("-I{}", directory.join(dir).display()));
                }
            }
            a if a.starts_with("-o") => {}
            a if a.starts_with("-I") => {
                flags.push(format!("-I{}", directory.join(&a[2..]).display()));
            }
            a if !a.starts_with('-')
                && (Path::new(a) == file || normalize(&directory.join(a)) == resolved) => {}
            _ => flags.push(arg.clone()),
        }
    }
    flags
}

fn include_dirs(flags: &[String]) -> impl Iterator<Item = PathBuf> + '_ {
    flags
        .iter()
        .filter_map(|flag| flag.strip_prefix("-I"))
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

/// Split a shell command line on whitespace, honoring quotes and
/// backslash escapes.
fn split_command(command: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}
