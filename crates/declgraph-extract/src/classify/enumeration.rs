use super::{is_redeclaration, is_visible};
use crate::attributes::parse_attributes;
use crate::qualify::{qualified_name, scope_name};
use crate::tokens::TokenSpan;
use declgraph::{Attribute, EnumInfo};
use declgraph_frontend_api::{Cursor, CursorKind};
use std::path::Path;

/// Classify an enumeration and its enumerators.
///
/// Values are reported as unsigned 64-bit; negative enumerators wrap. An
/// enumeration without a name is named after its position, the way the
/// front end spells unnamed types.
pub fn classify_enum(path: &Path, c: Cursor<'_>) -> Option<EnumInfo> {
    if c.kind() != CursorKind::EnumDecl || !is_visible(c) || is_redeclaration(c) {
        return None;
    }

    let name = if c.spelling().is_empty() {
        let loc = c.location();
        let unnamed = format!("(anonymous enum at {}:{})", loc.line, loc.column);
        match scope_name(c) {
            scope if scope.is_empty() => unnamed,
            scope => format!("{scope}::{unnamed}"),
        }
    } else {
        qualified_name(c)
    };

    let mut info = EnumInfo::new(name);
    info.is_scoped = c.traits().is_scoped;
    for value in c.children().filter(|v| v.kind() == CursorKind::EnumConstantDecl) {
        info = info.with_value(value.spelling(), value.enum_unsigned_value().unwrap_or(0));
    }
    info.attributes = enum_attributes(path, c);
    Some(info)
}

/// Attributes written between `enum [class]` and the name.
fn enum_attributes(path: &Path, c: Cursor<'_>) -> Vec<Attribute> {
    let Some(span) = TokenSpan::of(c).after_keyword(&["enum"]) else {
        return Vec::new();
    };
    let span = match span.first() {
        Some(t) if t.is("class") || t.is("struct") => span.skip(1),
        _ => span,
    };
    parse_attributes(path, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SourceUnit;
    use declgraph_frontend_api::{CursorData, DeclTraits};

    fn enumerator(name: &str, value: i64) -> CursorData {
        CursorData::new(CursorKind::EnumConstantDecl, name).with_value(value)
    }

    #[test]
    fn test_values_in_order() {
        let mut src = SourceUnit::new("enum Letters { x = 1, y = 2, z = 3 };");
        let e = src.push_root(CursorKind::EnumDecl, "Letters", "enum Letters { x = 1, y = 2, z = 3 }");
        for (name, value) in [("x", 1), ("y", 2), ("z", 3)] {
            src.push(e, enumerator(name, value), name, &format!("{name} = {value}"));
        }
        let unit = src.build();

        let info = classify_enum(Path::new("e.hpp"), unit.cursor(e).unwrap()).unwrap();
        assert_eq!(info.name, "Letters");
        assert!(!info.is_scoped);
        let values: Vec<(&str, u64)> = info.values.iter().map(|v| (v.name.as_str(), v.value)).collect();
        assert_eq!(values, vec![("x", 1), ("y", 2), ("z", 3)]);
    }

    #[test]
    fn test_scoped_enum_with_attributes() {
        let text = "enum class [[meta::flags]] Mode : unsigned { a = 69, b = 420, c = 1337 };";
        let mut src = SourceUnit::new(text);
        let root = src.builder().root();
        let traits = DeclTraits {
            is_scoped: true,
            ..Default::default()
        };
        let e = src.push(
            root,
            CursorData::new(CursorKind::EnumDecl, "Mode").with_traits(traits),
            "Mode",
            &text[..text.len() - 1],
        );
        for (name, value) in [("a", 69), ("b", 420), ("c", 1337)] {
            src.push(e, enumerator(name, value), name, &format!("{name} = {value}"));
        }
        let unit = src.build();

        let info = classify_enum(Path::new("e.hpp"), unit.cursor(e).unwrap()).unwrap();
        assert!(info.is_scoped);
        assert_eq!(info.value_of("c"), Some(1337));
        assert_eq!(info.attributes.len(), 1);
        assert_eq!(info.attributes[0].to_string(), "meta::flags");
    }

    #[test]
    fn test_negative_value_wraps() {
        let mut src = SourceUnit::new("enum E { neg = -1 };");
        let e = src.push_root(CursorKind::EnumDecl, "E", "enum E { neg = -1 }");
        src.push(e, enumerator("neg", -1), "neg", "neg = -1");
        let unit = src.build();

        let info = classify_enum(Path::new("e.hpp"), unit.cursor(e).unwrap()).unwrap();
        assert_eq!(info.value_of("neg"), Some(u64::MAX));
    }

    #[test]
    fn test_anonymous_enum_is_named_by_position() {
        let mut src = SourceUnit::new("namespace n {\nenum { k = 4 };\n}");
        let ns = src.push_root(CursorKind::Namespace, "n", "n {");
        let e = src.push(ns, CursorData::new(CursorKind::EnumDecl, ""), "enum", "enum { k = 4 }");
        src.push(e, enumerator("k", 4), "k", "k = 4");
        let unit = src.build();

        let info = classify_enum(Path::new("e.hpp"), unit.cursor(e).unwrap()).unwrap();
        assert_eq!(info.name, "n::(anonymous enum at 2:1)");
        assert_eq!(info.value_of("k"), Some(4));
    }
}
