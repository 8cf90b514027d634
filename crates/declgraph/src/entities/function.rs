use super::{Attribute, EntityKind};
use serde::{Deserialize, Serialize};

/// A free (namespace-scope) function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Fully qualified name
    pub name: String,

    /// Result type as spelled by the front end
    pub result_type: String,

    /// Parameter names, positional with `param_types`
    pub param_names: Vec<String>,

    /// Parameter types, positional with `param_names`
    pub param_types: Vec<String>,

    /// Attributes written before the declaration
    pub attributes: Vec<Attribute>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, result_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result_type: result_type.into(),
            ..Default::default()
        }
    }

    /// Append a positional parameter.
    pub fn with_param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.param_names.push(name.into());
        self.param_types.push(ty.into());
        self
    }

    /// Same name and parameter types; the result type does not overload.
    pub fn same_signature(&self, other: &FunctionInfo) -> bool {
        self.name == other.name && self.param_types == other.param_types
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Function
    }
}
