//! Compile flags understood by the tree-sitter front end.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the flags passed to the front end
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("invalid value '{0}' in '-std={0}'")]
    UnknownStandard(String),

    #[error("argument to '{0}' is missing (expected 1 value)")]
    MissingValue(String),
}

/// C++ language standard selected with `-std=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LanguageStandard {
    Cxx98,
    Cxx11,
    Cxx14,
    Cxx17,
    Cxx20,
    Cxx23,
    Cxx26,
}

impl LanguageStandard {
    /// Parse the value of a `-std=` flag. GNU dialects map to the ISO
    /// standard they extend.
    pub fn parse(value: &str) -> Result<Self, FlagError> {
        let version = value
            .strip_prefix("c++")
            .or_else(|| value.strip_prefix("gnu++"))
            .ok_or_else(|| FlagError::UnknownStandard(value.to_string()))?;

        let standard = match version {
            "98" | "03" => Self::Cxx98,
            "11" | "0x" => Self::Cxx11,
            "14" | "1y" => Self::Cxx14,
            "17" | "1z" => Self::Cxx17,
            "20" | "2a" => Self::Cxx20,
            "23" | "2b" => Self::Cxx23,
            "26" | "2c" => Self::Cxx26,
            _ => return Err(FlagError::UnknownStandard(value.to_string())),
        };
        Ok(standard)
    }
}

impl Default for LanguageStandard {
    fn default() -> Self {
        Self::Cxx17
    }
}

/// What the front end takes from its flags. Everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub standard: LanguageStandard,
    /// `-D` macros, with their value when one was given
    pub defines: BTreeMap<String, Option<String>>,
    /// `-I` directories, in order
    pub include_dirs: Vec<PathBuf>,
}

impl ParseOptions {
    /// Read `-std=`, `-D`, `-U` and `-I`, in either the joined (`-DX`) or
    /// separate (`-D X`) form.
    pub fn from_flags(flags: &[String]) -> Result<Self, FlagError> {
        let mut options = Self::default();
        let mut args = flags.iter();

        while let Some(flag) = args.next() {
            if let Some(std) = flag.strip_prefix("-std=") {
                options.standard = LanguageStandard::parse(std)?;
                continue;
            }

            let (option, inline) = match flag.get(..2) {
                Some(opt @ ("-D" | "-U" | "-I")) => (opt, &flag[2..]),
                _ => continue,
            };
            let value = if inline.is_empty() {
                args.next()
                    .ok_or_else(|| FlagError::MissingValue(option.to_string()))?
                    .as_str()
            } else {
                inline
            };

            match option {
                "-D" => {
                    let (name, body) = match value.split_once('=') {
                        Some((name, body)) => (name, Some(body.to_string())),
                        None => (value, None),
                    };
                    options.defines.insert(name.to_string(), body);
                }
                "-U" => {
                    options.defines.remove(value);
                }
                _ => options.include_dirs.push(PathBuf::from(value)),
            }
        }
        Ok(options)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }
}
