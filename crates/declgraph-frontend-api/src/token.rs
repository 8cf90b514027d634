use serde::{Deserialize, Serialize};

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Punctuation,
    Keyword,
    Identifier,
    Literal,
}

/// One token of the main file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
    /// Byte offset of the first character
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, spelling: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            offset,
        }
    }

    pub fn punct(spelling: impl Into<String>, offset: usize) -> Self {
        Self::new(TokenKind::Punctuation, spelling, offset)
    }

    pub fn ident(spelling: impl Into<String>, offset: usize) -> Self {
        Self::new(TokenKind::Identifier, spelling, offset)
    }

    pub fn keyword(spelling: impl Into<String>, offset: usize) -> Self {
        Self::new(TokenKind::Keyword, spelling, offset)
    }

    pub fn literal(spelling: impl Into<String>, offset: usize) -> Self {
        Self::new(TokenKind::Literal, spelling, offset)
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.spelling.len()
    }

    pub fn is(&self, spelling: &str) -> bool {
        self.spelling == spelling
    }

    /// Identifiers, keywords and literals; everything that needs a space
    /// between it and a neighbour of the same class when re-joined.
    pub fn is_word(&self) -> bool {
        !matches!(self.kind, TokenKind::Punctuation)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.spelling)
    }
}
