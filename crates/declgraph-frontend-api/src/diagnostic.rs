use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity of a front-end diagnostic, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        };
        f.write_str(s)
    }
}

/// A message reported while parsing a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            line,
            column,
        }
    }

    /// Error or fatal.
    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.file.display(),
            self.line,
            self.column,
            self.severity,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let diag = Diagnostic::new(Severity::Error, "expected ';'", "a.hpp", 3, 14);
        assert_eq!(diag.to_string(), "a.hpp:3:14: error: expected ';'");
        assert!(diag.is_error());
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Note < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert!(!Diagnostic::new(Severity::Warning, "w", "a.hpp", 1, 1).is_error());
    }

    #[test]
    fn test_serialization() {
        let diag = Diagnostic::new(Severity::Fatal, "file not found", "b.hpp", 1, 10);
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"Fatal\""));
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }
}
