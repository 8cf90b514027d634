//! Translation units and their builder.

use crate::cursor::{Cursor, CursorData, CursorId, CursorKind};
use crate::diagnostic::Diagnostic;
use crate::location::{FileId, SourceLocation, SourceRange};
use crate::token::Token;
use log::trace;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// One parsed source file plus everything it included.
///
/// The unit owns its cursors, the tokens of the main file (sorted by offset)
/// and the diagnostics produced while parsing. Cursors borrow the unit.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    files: Vec<PathBuf>,
    cursors: Vec<CursorData>,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    flags: Vec<String>,
}

impl TranslationUnit {
    /// Path of the main file.
    pub fn path(&self) -> &Path {
        &self.files[FileId::MAIN.0 as usize]
    }

    pub fn file_path(&self, file: FileId) -> Option<&Path> {
        self.files.get(file.0 as usize).map(PathBuf::as_path)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The `TranslationUnit` cursor.
    pub fn root(&self) -> Cursor<'_> {
        Cursor::new(self, CursorId(0))
    }

    pub fn cursor(&self, id: CursorId) -> Option<Cursor<'_>> {
        (id.index() < self.cursors.len()).then(|| Cursor::new(self, id))
    }

    pub(crate) fn data(&self, id: CursorId) -> &CursorData {
        &self.cursors[id.index()]
    }

    pub fn num_cursors(&self) -> usize {
        self.cursors.len()
    }

    /// All tokens of the main file, in source order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Indices of the tokens that start inside `extent`.
    pub fn token_range(&self, extent: SourceRange) -> Range<usize> {
        let start = self.tokens.partition_point(|t| t.offset < extent.start);
        let end = self.tokens.partition_point(|t| t.offset < extent.end);
        start..end.max(start)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Does any diagnostic have error severity or worse?
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Flags the unit was parsed with.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }
}

/// Incremental constructor for [`TranslationUnit`].
///
/// ```rust
/// use declgraph_frontend_api::{CursorData, CursorKind, TranslationUnitBuilder};
///
/// let mut builder = TranslationUnitBuilder::new("a.hpp");
/// let root = builder.root();
/// let ns = builder.push(root, CursorData::new(CursorKind::Namespace, "a"));
/// builder.push(ns, CursorData::new(CursorKind::ClassDecl, "Foo"));
///
/// let unit = builder.build();
/// assert_eq!(unit.root().children().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TranslationUnitBuilder {
    unit: TranslationUnit,
}

impl TranslationUnitBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = CursorData::new(CursorKind::TranslationUnit, path.display().to_string())
            .at(SourceLocation::main(0, 1, 1));
        Self {
            unit: TranslationUnit {
                files: vec![path],
                cursors: vec![root],
                tokens: Vec::new(),
                diagnostics: Vec::new(),
                flags: Vec::new(),
            },
        }
    }

    pub fn root(&self) -> CursorId {
        CursorId(0)
    }

    /// Register an included file, returning the existing id for a known path.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> FileId {
        let path = path.into();
        if let Some(pos) = self.unit.files.iter().position(|f| *f == path) {
            return FileId(pos as u32);
        }
        self.unit.files.push(path);
        FileId((self.unit.files.len() - 1) as u32)
    }

    /// Append a cursor as the last child of `parent`.
    pub fn push(&mut self, parent: CursorId, mut data: CursorData) -> CursorId {
        let id = CursorId(self.unit.cursors.len() as u32);
        trace!("cursor {:?} {:?} '{}'", id, data.kind, data.spelling);
        data.semantic_parent = Some(parent);
        self.unit.cursors.push(data);
        self.unit.cursors[parent.index()].children.push(id);
        id
    }

    /// Append a parameter to a function-like cursor; it becomes both a child
    /// and an argument.
    pub fn push_argument(&mut self, function: CursorId, data: CursorData) -> CursorId {
        let id = self.push(function, data);
        self.unit.cursors[function.index()].arguments.push(id);
        id
    }

    pub fn data(&self, id: CursorId) -> &CursorData {
        &self.unit.cursors[id.index()]
    }

    pub fn data_mut(&mut self, id: CursorId) -> &mut CursorData {
        &mut self.unit.cursors[id.index()]
    }

    pub fn set_tokens(&mut self, mut tokens: Vec<Token>) {
        tokens.sort_by_key(|t| t.offset);
        self.unit.tokens = tokens;
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.unit.diagnostics.push(diagnostic);
    }

    pub fn set_flags(&mut self, flags: Vec<String>) {
        self.unit.flags = flags;
    }

    pub fn build(self) -> TranslationUnit {
        self.unit
    }
}
