//! Synthetic units for unit tests: real tokens from a source string, cursors
//! placed by searching the source for their text.

use declgraph_frontend_api::{
    Access, CursorData, CursorId, CursorKind, SourceLocation, SourceRange, Token,
    TranslationUnit, TranslationUnitBuilder, TypeRef,
};

const KEYWORDS: &[&str] = &[
    "class", "struct", "union", "enum", "namespace", "template", "typename", "public",
    "protected", "private", "virtual", "const", "static", "int", "long", "float", "double",
    "char", "bool", "void", "unsigned", "noexcept", "override", "using", "typedef",
];

const PUNCT3: &[&str] = &["..."];
const PUNCT2: &[&str] = &["::", "&&", "->", "<<", ">>", "==", "!="];

/// Split C++-ish source into tokens with byte offsets.
pub(crate) fn lex(src: &str) -> Vec<Token> {
    let bytes = src.as_bytes();
    let mut toks = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        let rest = &src[i..];
        if c.is_whitespace() {
            i += 1;
        } else if c == '"' {
            let end = rest[1..].find('"').map_or(bytes.len(), |p| i + 2 + p);
            toks.push(Token::literal(&src[i..end], i));
            i = end;
        } else if c.is_ascii_digit() {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '.'))
                .unwrap_or(rest.len());
            toks.push(Token::literal(&rest[..len], i));
            i += len;
        } else if c.is_ascii_alphabetic() || c == '_' {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..len];
            if KEYWORDS.contains(&word) {
                toks.push(Token::keyword(word, i));
            } else {
                toks.push(Token::ident(word, i));
            }
            i += len;
        } else if let Some(p) = PUNCT3.iter().chain(PUNCT2).find(|p| rest.starts_with(*p)) {
            toks.push(Token::punct(*p, i));
            i += p.len();
        } else {
            toks.push(Token::punct(c.to_string(), i));
            i += c.len_utf8();
        }
    }
    toks
}

/// A [`TranslationUnitBuilder`] over real source text.
///
/// Cursors are pushed in source order; every search for a cursor's text
/// starts at the extent of the previously pushed cursor, so repeated
/// snippets resolve to the right occurrence.
pub(crate) struct SourceUnit {
    src: String,
    builder: TranslationUnitBuilder,
    search_from: usize,
}

impl SourceUnit {
    pub(crate) fn new(src: &str) -> Self {
        let mut builder = TranslationUnitBuilder::new("test.hpp");
        builder.set_tokens(lex(src));
        Self {
            src: src.to_string(),
            builder,
            search_from: 0,
        }
    }

    fn locate(&mut self, name_at: &str, extent: &str) -> (SourceLocation, SourceRange) {
        let start = self.src[self.search_from..]
            .find(extent)
            .map(|p| p + self.search_from)
            .unwrap_or_else(|| panic!("extent {extent:?} not found"));
        let name = self.src[start..start + extent.len()]
            .find(name_at)
            .map_or(start, |p| p + start);
        self.search_from = start;

        let line = self.src[..name].matches('\n').count() as u32 + 1;
        let column = (name - self.src[..name].rfind('\n').map_or(0, |p| p + 1)) as u32 + 1;
        (
            SourceLocation::main(name, line, column),
            SourceRange::new(start, start + extent.len()),
        )
    }

    /// Push `data` under `parent`. The cursor is located at `name_at`
    /// inside the first occurrence of `extent`.
    pub(crate) fn push(
        &mut self,
        parent: CursorId,
        data: CursorData,
        name_at: &str,
        extent: &str,
    ) -> CursorId {
        let (loc, range) = self.locate(name_at, extent);
        self.builder.push(parent, data.at(loc).with_extent(range))
    }

    /// Push a cursor of `kind` named `spelling` directly under the root.
    pub(crate) fn push_root(&mut self, kind: CursorKind, spelling: &str, extent: &str) -> CursorId {
        let root = self.builder.root();
        self.push(root, CursorData::new(kind, spelling), spelling, extent)
    }

    /// Push a public member cursor.
    pub(crate) fn push_member(
        &mut self,
        parent: CursorId,
        data: CursorData,
        name_at: &str,
        extent: &str,
    ) -> CursorId {
        self.push(parent, data.with_access(Access::Public), name_at, extent)
    }

    pub(crate) fn push_argument(&mut self, function: CursorId, name: &str, ty: &str) -> CursorId {
        self.builder.push_argument(
            function,
            CursorData::new(CursorKind::ParmDecl, name).with_type(TypeRef::builtin(ty)),
        )
    }

    pub(crate) fn builder(&mut self) -> &mut TranslationUnitBuilder {
        &mut self.builder
    }

    pub(crate) fn build(self) -> TranslationUnit {
        self.builder.build()
    }
}
