use super::EntityKind;
use serde::{Deserialize, Serialize};

/// A `using Name = Type;` alias or a `typedef`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeAliasInfo {
    /// Fully qualified alias name
    pub name: String,

    /// Fully qualified aliased type text
    pub aliased: String,
}

impl TypeAliasInfo {
    pub fn new(name: impl Into<String>, aliased: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliased: aliased.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::TypeAlias
    }
}
