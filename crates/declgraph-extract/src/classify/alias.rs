use super::is_visible;
use crate::qualify::{qualified_name, qualify_type};
use declgraph::TypeAliasInfo;
use declgraph_frontend_api::{Cursor, CursorKind};

/// Classify `using Name = Type;` or `typedef Type Name;`.
///
/// The aliased type is spelled with its declaration and template arguments
/// fully qualified.
pub fn classify_alias(c: Cursor<'_>) -> Option<TypeAliasInfo> {
    if !matches!(c.kind(), CursorKind::TypeAliasDecl | CursorKind::TypedefDecl) || !is_visible(c) {
        return None;
    }
    let aliased = c.ty()?;
    Some(TypeAliasInfo::new(qualified_name(c), qualify_type(c, aliased)))
}
