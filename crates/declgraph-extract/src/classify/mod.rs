//! Declaration classifiers.
//!
//! Each classifier inspects one cursor and either produces the record for
//! its kind or `None` ("not this kind", or filtered out by access). Free
//! functions and type aliases need nothing but the cursor; classes need the
//! [`Resolver`](crate::resolver::Resolver) because they allocate their
//! constructors, methods and nested classes in the model.

pub mod alias;
mod class;
pub mod enumeration;
pub mod function;
pub(crate) mod members;

use crate::attributes::parse_attributes;
use crate::text::{rewrite_self, SelfType};
use crate::tokens::TokenSpan;
use declgraph::Attribute;
use declgraph_frontend_api::{Access, Cursor, TypeRef};
use std::path::Path;

/// Members and bases are kept only when public.
pub(crate) fn is_public(c: Cursor<'_>) -> bool {
    c.access_specifier() == Access::Public
}

/// Top-level declarations have no access; nested ones must be public.
pub(crate) fn is_visible(c: Cursor<'_>) -> bool {
    matches!(c.access_specifier(), Access::Invalid | Access::Public)
}

/// A declaration whose definition is another cursor.
pub(crate) fn is_redeclaration(c: Cursor<'_>) -> bool {
    c.definition().is_some_and(|def| def != c)
}

/// Attributes at the start of a member or function declaration.
pub(crate) fn declaration_attributes(path: &Path, c: Cursor<'_>) -> Vec<Attribute> {
    parse_attributes(path, TokenSpan::declaration(c).skip_access_labels())
}

/// How parameter and result types are spelled.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TypeStyle<'a> {
    /// Prefix typedef-typed spellings with `typename `
    pub typename_typedefs: bool,
    /// Expand bare references to the enclosing class template
    pub self_type: Option<&'a SelfType>,
}

impl TypeStyle<'_> {
    pub(crate) fn spell(&self, ty: Option<&TypeRef>) -> String {
        let Some(ty) = ty else {
            return String::new();
        };
        let text = if self.typename_typedefs && ty.is_typedef() {
            format!("typename {}", ty.spelling)
        } else {
            ty.spelling.clone()
        };
        rewrite_self(self.self_type, &text)
    }
}

/// Parameter names and spelled types of a function-like cursor.
pub(crate) fn parameters(c: Cursor<'_>, style: TypeStyle<'_>) -> (Vec<String>, Vec<String>) {
    c.arguments()
        .map(|arg| (arg.spelling().to_string(), style.spell(arg.ty())))
        .unzip()
}
