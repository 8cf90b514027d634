//! Type references answered by the front end.

use crate::cursor::CursorId;
use serde::{Deserialize, Serialize};

/// Coarse classification of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Fundamental type (`int`, `unsigned long`, `void`)
    Builtin,
    /// Class, struct or union, including template specializations
    Record,
    Enum,
    /// Name introduced by `typedef` or `using`
    Typedef,
    /// A template type parameter, still unresolved
    TemplateParam { depth: u32, index: u32 },
    Pointer,
    LValueReference,
    RValueReference,
    /// Anything the front end could not classify
    Unexposed,
}

/// A type as seen at one use site.
///
/// `template_args` is `None` when the type is not a template specialization,
/// which is distinct from a specialization with an empty argument list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub spelling: String,
    pub kind: TypeKind,
    /// Declaration of the named type, when it was found in the unit
    pub declaration: Option<CursorId>,
    pub template_args: Option<Vec<TypeRef>>,
}

impl TypeRef {
    pub fn new(spelling: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            spelling: spelling.into(),
            kind,
            declaration: None,
            template_args: None,
        }
    }

    pub fn builtin(spelling: impl Into<String>) -> Self {
        Self::new(spelling, TypeKind::Builtin)
    }

    pub fn unexposed(spelling: impl Into<String>) -> Self {
        Self::new(spelling, TypeKind::Unexposed)
    }

    /// An unresolved template parameter, spelled as its placeholder.
    pub fn template_param(depth: u32, index: u32) -> Self {
        Self::new(
            placeholder(depth, index),
            TypeKind::TemplateParam { depth, index },
        )
    }

    pub fn with_declaration(mut self, decl: CursorId) -> Self {
        self.declaration = Some(decl);
        self
    }

    pub fn with_template_args(mut self, args: Vec<TypeRef>) -> Self {
        self.template_args = Some(args);
        self
    }

    /// Number of template arguments, or -1 when this is not a specialization.
    pub fn num_template_arguments(&self) -> i32 {
        self.template_args.as_ref().map_or(-1, |args| args.len() as i32)
    }

    pub fn template_argument(&self, index: usize) -> Option<&TypeRef> {
        self.template_args.as_ref().and_then(|args| args.get(index))
    }

    pub fn is_typedef(&self) -> bool {
        self.kind == TypeKind::Typedef
    }

    pub fn is_template_param(&self) -> bool {
        matches!(self.kind, TypeKind::TemplateParam { .. })
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.spelling)
    }
}

/// Spelling of an unresolved template parameter: `type-parameter-<depth>-<index>`.
pub fn placeholder(depth: u32, index: u32) -> String {
    format!("type-parameter-{depth}-{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_argument_count() {
        let plain = TypeRef::builtin("int");
        assert_eq!(plain.num_template_arguments(), -1);

        let empty = TypeRef::new("Tag<>", TypeKind::Record).with_template_args(Vec::new());
        assert_eq!(empty.num_template_arguments(), 0);

        let boxed = TypeRef::new("Box<int>", TypeKind::Record)
            .with_template_args(vec![TypeRef::builtin("int")]);
        assert_eq!(boxed.num_template_arguments(), 1);
        assert_eq!(boxed.template_argument(0).unwrap().spelling, "int");
        assert!(boxed.template_argument(1).is_none());
    }

    #[test]
    fn test_placeholder_spelling() {
        let param = TypeRef::template_param(0, 2);
        assert_eq!(param.spelling, "type-parameter-0-2");
        assert!(param.is_template_param());
    }
}
