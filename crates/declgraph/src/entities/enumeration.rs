use super::{Attribute, EntityKind};
use serde::{Deserialize, Serialize};

/// One enumerator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    /// Value reinterpreted as unsigned 64-bit, as the front end reports it
    pub value: u64,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::EnumValue
    }
}

/// A scoped (`enum class`) or unscoped enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInfo {
    /// Fully qualified name
    pub name: String,
    pub is_scoped: bool,
    /// Enumerators in declaration order
    pub values: Vec<EnumValue>,
    pub attributes: Vec<Attribute>,
}

impl EnumInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn scoped(mut self) -> Self {
        self.is_scoped = true;
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: u64) -> Self {
        self.values.push(EnumValue::new(name, value));
        self
    }

    pub fn value_of(&self, name: &str) -> Option<u64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Enum
    }
}
