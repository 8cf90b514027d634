use super::EntityKind;
use crate::store::{AliasId, ClassId, EnumId, FunctionId, NamespaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A namespace with every fragment of it merged into one record.
///
/// The global namespace has an empty name. All map keys are fully
/// qualified names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Fully qualified name, empty for the global namespace
    pub name: String,

    /// Classes declared directly in this namespace
    pub classes: BTreeMap<String, ClassId>,

    /// Enumerations declared directly in this namespace
    pub enums: BTreeMap<String, EnumId>,

    /// Type aliases declared directly in this namespace
    pub aliases: BTreeMap<String, AliasId>,

    /// Free functions; each entry is the overload set in source order
    pub functions: BTreeMap<String, Vec<FunctionId>>,

    /// Child namespaces
    pub namespaces: BTreeMap<String, NamespaceId>,
}

impl NamespaceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_global(&self) -> bool {
        self.name.is_empty()
    }

    /// Qualify a child name with this namespace.
    pub fn qualify(&self, name: &str) -> String {
        if self.is_global() {
            name.to_string()
        } else {
            format!("{}::{}", self.name, name)
        }
    }

    /// Does this namespace directly declare anything?
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.enums.is_empty()
            && self.aliases.is_empty()
            && self.functions.is_empty()
            && self.namespaces.is_empty()
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Namespace
    }
}
