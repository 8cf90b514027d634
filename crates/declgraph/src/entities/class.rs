use super::{Access, Attribute, EntityKind};
use crate::store::{ClassId, ConstructorId, DestructorId, MethodId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A template parameter of a class template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateParam {
    /// Parameter name (`T`)
    pub name: String,

    /// Declarator keyword as written: `typename`, `class`, or the type of a
    /// non-type parameter
    pub declarator: String,

    /// Is this a parameter pack (`typename... Ts`)?
    pub is_variadic: bool,
}

impl TemplateParam {
    pub fn new(name: impl Into<String>, declarator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarator: declarator.into(),
            is_variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::TemplateParam
    }
}

/// A base class reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassBase {
    /// Fully qualified base type, including template arguments
    pub type_name: String,

    /// Access of the inheritance
    pub access: Access,

    /// Does one of the base's template arguments expand a parameter pack of
    /// the derived class?
    pub is_variadic: bool,

    /// The class the base resolved to, when it was found in this unit
    pub class: Option<ClassId>,
}

impl ClassBase {
    pub fn new(type_name: impl Into<String>, access: Access) -> Self {
        Self {
            type_name: type_name.into(),
            access,
            is_variadic: false,
            class: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::ClassBase
    }
}

/// How a constructor can be used.
///
/// Exactly one kind is assigned per constructor, chosen in the order
/// move, copy, default, converting, generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructorKind {
    Move,
    Copy,
    Default,
    Converting,
    Generic,
}

impl std::fmt::Display for ConstructorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructorKind::Move => write!(f, "move"),
            ConstructorKind::Copy => write!(f, "copy"),
            ConstructorKind::Default => write!(f, "default"),
            ConstructorKind::Converting => write!(f, "converting"),
            ConstructorKind::Generic => write!(f, "generic"),
        }
    }
}

/// A public constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassConstructor {
    pub constructor_kind: ConstructorKind,
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
    pub is_noexcept: bool,
    pub attributes: Vec<Attribute>,
}

impl ClassConstructor {
    pub fn new(constructor_kind: ConstructorKind) -> Self {
        Self {
            constructor_kind,
            param_names: Vec::new(),
            param_types: Vec::new(),
            is_noexcept: false,
            attributes: Vec::new(),
        }
    }

    /// Append a positional parameter.
    pub fn with_param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.param_names.push(name.into());
        self.param_types.push(ty.into());
        self
    }

    pub fn num_params(&self) -> usize {
        self.param_types.len()
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::ClassConstructor
    }
}

/// A public destructor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDestructor {
    pub is_virtual: bool,
    pub is_noexcept: bool,
    pub attributes: Vec<Attribute>,
}

impl ClassDestructor {
    pub fn kind(&self) -> EntityKind {
        EntityKind::ClassDestructor
    }
}

/// A public member function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMethod {
    /// Unqualified method name
    pub name: String,

    pub is_static: bool,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_defaulted: bool,
    pub is_noexcept: bool,

    pub result_type: String,
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
    pub attributes: Vec<Attribute>,
}

impl ClassMethod {
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

    pub fn kind(&self) -> EntityKind {
        EntityKind::ClassMethod
    }
}

/// A public data member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassMember {
    /// Member name
    pub name: String,

    /// Fully qualified member type
    #[serde(rename = "type")]
    pub type_name: String,

    /// Attributes written before the member
    pub attributes: Vec<Attribute>,
}

impl ClassMember {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attrs: Vec<Attribute>) -> Self {
        self.attributes = attrs;
        self
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::ClassMember
    }
}

/// A class, struct, union or class template.
///
/// Only the publicly accessible parts of the class are recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Fully qualified name; specializations carry their argument list
    pub name: String,

    /// Does the class declare or inherit an unimplemented pure virtual method?
    pub is_abstract: bool,

    /// Is this a (primary or partially specialized) class template?
    pub is_template: bool,

    /// Is this a partial or explicit specialization?
    pub is_specialization: bool,

    /// Template parameters in declaration order
    pub template_params: Vec<TemplateParam>,

    /// Resolved specialization arguments (specializations only)
    pub template_args: Vec<String>,

    /// Public bases in declaration order
    pub bases: Vec<ClassBase>,

    /// Public constructors in declaration order
    pub ctors: Vec<ConstructorId>,

    /// Public destructor, if declared
    pub dtor: Option<DestructorId>,

    /// Public methods by name; each entry is the overload set in source order
    pub methods: BTreeMap<String, Vec<MethodId>>,

    /// Public data members in declaration order
    pub members: Vec<ClassMember>,

    /// Nested public classes by qualified name
    pub classes: BTreeMap<String, ClassId>,

    /// Attributes from the class head (`class [[attr]] Name`)
    pub attributes: Vec<Attribute>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn template(mut self, params: Vec<TemplateParam>) -> Self {
        self.is_template = true;
        self.template_params = params;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_bases(mut self, bases: Vec<ClassBase>) -> Self {
        self.bases = bases;
        self
    }

    pub fn with_members(mut self, members: Vec<ClassMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_attributes(mut self, attrs: Vec<Attribute>) -> Self {
        self.attributes = attrs;
        self
    }

    /// Unqualified name (last `::` component outside template brackets).
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn has_attribute(&self, scope: &str, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.scope == scope && a.name == name)
    }

    /// Total number of methods across all overload sets.
    pub fn method_count(&self) -> usize {
        self.methods.values().map(Vec::len).sum()
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::Class
    }
}

/// Last component of a qualified name, ignoring `::` inside `<...>`.
pub(crate) fn short_name(qualified: &str) -> &str {
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = qualified.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    &qualified[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(ClassInfo::new("a::b::Foo").short_name(), "Foo");
        assert_eq!(ClassInfo::new("Foo").short_name(), "Foo");
        assert_eq!(
            ClassInfo::new("ns::Box<std::string>").short_name(),
            "Box<std::string>"
        );
    }

    #[test]
    fn test_template_builder() {
        let class = ClassInfo::new("Box").template(vec![
            TemplateParam::new("T", "typename"),
            TemplateParam::new("Ts", "typename").variadic(),
        ]);
        assert!(class.is_template);
        assert_eq!(class.template_params.len(), 2);
        assert!(class.template_params[1].is_variadic);
    }

    #[test]
    fn test_constructor_params() {
        let ctor = ClassConstructor::new(ConstructorKind::Converting).with_param("x", "int");
        assert_eq!(ctor.num_params(), 1);
        assert_eq!(ctor.param_names, vec!["x"]);
        assert_eq!(ctor.constructor_kind.to_string(), "converting");
    }
}
