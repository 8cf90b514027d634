use serde::{Deserialize, Serialize};

/// One entry of a `[[ ... ]]` attribute list.
///
/// `scope` is empty for unscoped attributes. Each argument holds the raw
/// token text of one comma-separated argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute namespace (`my` in `my::attrib`), empty when unscoped
    pub scope: String,

    /// Attribute name
    pub name: String,

    /// Raw argument texts in source order
    pub args: Vec<String>,
}

impl Attribute {
    /// Create an unscoped attribute without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scope: String::new(),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a scoped attribute without arguments.
    pub fn scoped(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Set the argument list.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Whether the attribute carries a scope.
    pub fn has_scope(&self) -> bool {
        !self.scope.is_empty()
    }

    /// Whether the attribute carries arguments.
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }
}

impl std::fmt::Display for Attribute {
    /// Renders the attribute as it would appear inside `[[ ]]`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_scope() {
            write!(f, "{}::", self.scope)?;
        }
        f.write_str(&self.name)?;
        if self.has_args() {
            write!(f, "({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scoped_with_args() {
        let attr = Attribute::scoped("my", "attrib").with_args(vec![
            "1".to_string(),
            "\"2\"".to_string(),
            "3.0".to_string(),
        ]);
        assert_eq!(attr.to_string(), "my::attrib(1, \"2\", 3.0)");
    }

    #[test]
    fn test_display_unscoped() {
        let attr = Attribute::new("nodiscard");
        assert!(!attr.has_scope());
        assert!(!attr.has_args());
        assert_eq!(attr.to_string(), "nodiscard");
    }
}
