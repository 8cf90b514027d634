use serde::{Deserialize, Serialize};

/// Configuration for an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Language standard injected as `-std=` when the flags name none
    pub default_std: String,

    /// Macro defined for every parsed file, so headers can tell a tool run
    /// apart from a real build
    pub tool_define: String,

    /// Flags appended after the normalized per-file flags
    pub extra_flags: Vec<String>,

    /// Extract files in parallel (for `extract_all`)
    pub parallel: bool,

    /// Number of parallel workers (None = rayon default)
    pub parallel_workers: Option<usize>,

    /// Maximum file size to extract (in bytes)
    pub max_file_size: usize,

    /// Treat warnings as fatal diagnostics
    pub strict_diagnostics: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            default_std: "c++17".to_string(),
            tool_define: "DECLGRAPH_TOOL_RUN".to_string(),
            extra_flags: Vec::new(),
            parallel: true,
            parallel_workers: None,
            max_file_size: 10 * 1024 * 1024, // 10 MB
            strict_diagnostics: false,
        }
    }
}

impl ExtractConfig {
    /// Config for single-threaded runs (deterministic logs, tests)
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    pub fn with_std(mut self, std: impl Into<String>) -> Self {
        self.default_std = std.into();
        self
    }

    pub fn with_tool_define(mut self, define: impl Into<String>) -> Self {
        self.tool_define = define.into();
        self
    }

    pub fn with_extra_flag(mut self, flag: impl Into<String>) -> Self {
        self.extra_flags.push(flag.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.parallel_workers = Some(workers);
        self
    }

    pub fn with_max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn with_strict_diagnostics(mut self, strict: bool) -> Self {
        self.strict_diagnostics = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.default_std, "c++17");
        assert_eq!(config.tool_define, "DECLGRAPH_TOOL_RUN");
        assert!(config.parallel);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = ExtractConfig::sequential()
            .with_std("c++20")
            .with_extra_flag("-DFOO")
            .with_strict_diagnostics(true);
        assert!(!config.parallel);
        assert_eq!(config.default_std, "c++20");
        assert_eq!(config.extra_flags, vec!["-DFOO"]);
        assert!(config.strict_diagnostics);
    }

    #[test]
    fn test_serialization() {
        let config = ExtractConfig::default().with_workers(4);
        let json = serde_json::to_string(&config).unwrap();
        let back: ExtractConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
