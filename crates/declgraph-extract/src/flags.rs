//! Normalization of the flags a file is parsed with.

use crate::config::ExtractConfig;
use std::path::PathBuf;

/// Silences the front end about optimization flags it does not implement
pub const QUIET_OPTIMIZATION_FLAGS: &str = "-Wno-ignored-optimization-argument";

/// Build the front-end flags for one file.
///
/// Include directories and response files (`@file.rsp`) of the file's own
/// flags are replaced by every include directory of the build, so headers
/// resolve the same way for every file. The tool define and the configured
/// extra flags follow; the default standard is prepended when no `-std=`
/// flag is given.
pub fn normalize_flags(
    file_flags: &[String],
    include_dirs: &[PathBuf],
    config: &ExtractConfig,
) -> Vec<String> {
    let mut flags: Vec<String> = Vec::with_capacity(file_flags.len() + include_dirs.len() + 4);

    let mut args = file_flags.iter();
    while let Some(flag) = args.next() {
        if flag == "-I" {
            args.next();
        } else if !flag.starts_with("-I") && !flag.starts_with('@') {
            flags.push(flag.clone());
        }
    }

    flags.push(format!("-D{}", config.tool_define));
    flags.extend(config.extra_flags.iter().cloned());
    flags.extend(include_dirs.iter().map(|dir| format!("-I{}", dir.display())));

    if !flags.iter().any(|f| f.starts_with("-std=")) {
        flags.insert(0, format!("-std={}", config.default_std));
    }
    flags.push(QUIET_OPTIMIZATION_FLAGS.to_string());
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(flags: &[&str]) -> Vec<String> {
        flags.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_default_standard_is_prepended() {
        let flags = normalize_flags(
            &strings(&["-DFOO", "-Iold", "@args.rsp", "-I", "other"]),
            &[PathBuf::from("/inc/a"), PathBuf::from("/inc/b")],
            &ExtractConfig::default(),
        );
        assert_eq!(
            flags,
            strings(&[
                "-std=c++17",
                "-DFOO",
                "-DDECLGRAPH_TOOL_RUN",
                "-I/inc/a",
                "-I/inc/b",
                "-Wno-ignored-optimization-argument",
            ])
        );
    }

    #[test]
    fn test_given_standard_is_kept() {
        let config = ExtractConfig::default()
            .with_tool_define("MY_TOOL")
            .with_extra_flag("-DEXTRA");
        let flags = normalize_flags(&strings(&["-std=c++20", "-Wall"]), &[], &config);
        assert_eq!(
            flags,
            strings(&[
                "-std=c++20",
                "-Wall",
                "-DMY_TOOL",
                "-DEXTRA",
                "-Wno-ignored-optimization-argument",
            ])
        );
    }

    #[test]
    fn test_standard_from_extra_flags() {
        let config = ExtractConfig::default().with_extra_flag("-std=c++14");
        let flags = normalize_flags(&[], &[], &config);
        assert_eq!(flags[0], "-DDECLGRAPH_TOOL_RUN");
        assert!(flags.contains(&"-std=c++14".to_string()));
        assert!(!flags.contains(&"-std=c++17".to_string()));
    }
}
