//! Record types stored in the entity arena.

mod alias;
mod attribute;
mod class;
mod enumeration;
mod function;
mod namespace;

pub use alias::TypeAliasInfo;
pub use attribute::Attribute;
pub use class::{
    ClassBase, ClassConstructor, ClassDestructor, ClassInfo, ClassMember, ClassMethod,
    ConstructorKind, TemplateParam,
};
pub use enumeration::{EnumInfo, EnumValue};
pub use function::FunctionInfo;
pub use namespace::NamespaceInfo;

use serde::{Deserialize, Serialize};

/// Tag identifying the kind of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Namespace (the global namespace included)
    Namespace,
    /// Class, struct, union or class template
    Class,
    /// Scoped or unscoped enumeration
    Enum,
    /// Free function
    Function,
    /// `using` alias or `typedef`
    TypeAlias,
    /// Constructor of a class
    ClassConstructor,
    /// Destructor of a class
    ClassDestructor,
    /// Data member of a class
    ClassMember,
    /// Member function of a class
    ClassMethod,
    /// Base class reference
    ClassBase,
    /// Template parameter of a class template
    TemplateParam,
    /// Enumerator of an enumeration
    EnumValue,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Namespace => "namespace",
            EntityKind::Class => "class",
            EntityKind::Enum => "enum",
            EntityKind::Function => "function",
            EntityKind::TypeAlias => "type alias",
            EntityKind::ClassConstructor => "constructor",
            EntityKind::ClassDestructor => "destructor",
            EntityKind::ClassMember => "member",
            EntityKind::ClassMethod => "method",
            EntityKind::ClassBase => "base",
            EntityKind::TemplateParam => "template parameter",
            EntityKind::EnumValue => "enum value",
        };
        f.write_str(name)
    }
}

/// Member access of a class element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Protected => write!(f, "protected"),
            Access::Private => write!(f, "private"),
        }
    }
}
