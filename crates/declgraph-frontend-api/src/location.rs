use serde::{Deserialize, Serialize};

/// Index into the file table of a translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl FileId {
    /// The file the unit was parsed from
    pub const MAIN: FileId = FileId(0);

    pub fn is_main(self) -> bool {
        self == Self::MAIN
    }
}

/// A position in one file of the unit. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: FileId,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Default for FileId {
    fn default() -> Self {
        FileId::MAIN
    }
}

impl SourceLocation {
    pub fn new(file: FileId, offset: usize, line: u32, column: u32) -> Self {
        Self {
            file,
            offset,
            line,
            column,
        }
    }

    /// A location in the main file.
    pub fn main(offset: usize, line: u32, column: u32) -> Self {
        Self::new(FileId::MAIN, offset, line, column)
    }
}

/// Half-open byte range `[start, end)` in the file of the owning cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}
