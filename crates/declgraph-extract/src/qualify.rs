//! Fully qualified names of declarations and types.

use declgraph_frontend_api::{Cursor, CursorKind, TypeRef};

/// Name of a declaration prefixed with every enclosing namespace and class,
/// joined with `::`. Anonymous scopes and linkage blocks add nothing.
pub fn qualified_name(cursor: Cursor<'_>) -> String {
    let mut parts = vec![cursor.spelling()];
    let mut parent = cursor.semantic_parent();
    while let Some(scope) = parent {
        if scope.kind().is_scope() && !scope.spelling().is_empty() {
            parts.push(scope.spelling());
        }
        parent = scope.semantic_parent();
    }
    parts.reverse();
    parts.retain(|p| !p.is_empty());
    parts.join("::")
}

/// Qualified name of the scope enclosing `cursor` (`""` at global scope).
pub fn scope_name(cursor: Cursor<'_>) -> String {
    match cursor.semantic_parent() {
        Some(parent) if parent.kind().is_scope() => qualified_name(parent),
        Some(parent) if parent.kind() == CursorKind::LinkageSpec => scope_name(parent),
        _ => String::new(),
    }
}

/// Spelling of a type with its declaration and template arguments fully
/// qualified. Types without a declaration (builtins, pointers, template
/// parameters) keep the front end's spelling.
pub fn qualify_type(cursor: Cursor<'_>, ty: &TypeRef) -> String {
    let decl = cursor
        .type_declaration(ty)
        .filter(|d| d.kind() != CursorKind::TemplateTypeParameter);

    let Some(decl) = decl else {
        return ty.spelling.clone();
    };

    let mut name = qualified_name(decl);
    if let Some(args) = ty.template_args.as_ref().filter(|a| !a.is_empty()) {
        let args: Vec<String> = args.iter().map(|a| qualify_type(cursor, a)).collect();
        name.push('<');
        name.push_str(&args.join(", "));
        name.push('>');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use declgraph_frontend_api::{CursorData, TranslationUnitBuilder, TypeKind};

    #[test]
    fn test_qualified_names() {
        let mut b = TranslationUnitBuilder::new("q.hpp");
        let root = b.root();
        let a = b.push(root, CursorData::new(CursorKind::Namespace, "a"));
        let anon = b.push(a, CursorData::new(CursorKind::Namespace, ""));
        let link = b.push(anon, CursorData::new(CursorKind::LinkageSpec, ""));
        let outer = b.push(link, CursorData::new(CursorKind::ClassDecl, "Outer"));
        let inner = b.push(outer, CursorData::new(CursorKind::StructDecl, "Inner"));
        let unit = b.build();

        let inner = unit.cursor(inner).unwrap();
        assert_eq!(qualified_name(inner), "a::Outer::Inner");
        assert_eq!(scope_name(inner), "a::Outer");
        assert_eq!(scope_name(unit.cursor(outer).unwrap()), "a");
    }

    #[test]
    fn test_qualify_type_with_arguments() {
        let mut b = TranslationUnitBuilder::new("q.hpp");
        let root = b.root();
        let ns = b.push(root, CursorData::new(CursorKind::Namespace, "lib"));
        let vec = b.push(ns, CursorData::new(CursorKind::ClassTemplate, "Vec"));
        let item = b.push(ns, CursorData::new(CursorKind::StructDecl, "Item"));
        let holder = b.push(root, CursorData::new(CursorKind::StructDecl, "Holder"));
        let ty = TypeRef::new("Vec<Item>", TypeKind::Record)
            .with_declaration(vec)
            .with_template_args(vec![
                TypeRef::new("Item", TypeKind::Record).with_declaration(item)
            ]);
        b.push(
            holder,
            CursorData::new(CursorKind::FieldDecl, "items").with_type(ty.clone()),
        );
        let unit = b.build();

        let field = unit.cursor(holder).unwrap().children().next().unwrap();
        assert_eq!(qualify_type(field, &ty), "lib::Vec<lib::Item>");
        assert_eq!(qualify_type(field, &TypeRef::builtin("int *")), "int *");
    }
}
