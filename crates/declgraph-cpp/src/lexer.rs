//! Tokens of the main file.
//!
//! The extractor reads declarations through the token vector of a unit, so
//! it has to look like a compiler's: comments and preprocessor directives are
//! dropped, literals are single tokens and `[[` is two `[` tokens. The
//! attribute blocks found here are blanked out of the text tree-sitter parses;
//! the extractor reads them back from the tokens.

use declgraph_frontend_api::{Token, TokenKind};
use std::ops::Range;

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "asm", "auto", "bool", "break", "case", "catch", "char", "char8_t",
    "char16_t", "char32_t", "class", "concept", "const", "consteval", "constexpr", "constinit",
    "const_cast", "continue", "co_await", "co_return", "co_yield", "decltype", "default",
    "delete", "do", "double", "dynamic_cast", "else", "enum", "explicit", "export", "extern",
    "false", "float", "for", "friend", "goto", "if", "inline", "int", "long", "mutable",
    "namespace", "new", "noexcept", "nullptr", "operator", "private", "protected", "public",
    "register", "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while",
];

const PUNCT3: &[&str] = &["<=>", "...", "<<=", ">>=", "->*"];
const PUNCT2: &[&str] = &[
    "::", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", ".*", "##",
];

/// Result of lexing one file
#[derive(Debug, Default)]
pub(crate) struct Lexed {
    pub tokens: Vec<Token>,
    /// Byte ranges of `[[ ... ]]` blocks, in source order
    pub attribute_blocks: Vec<Range<usize>>,
}

pub(crate) fn lex(source: &str) -> Lexed {
    let tokens = Lexer::new(source).run();
    let attribute_blocks = attribute_blocks(&tokens);
    Lexed {
        tokens,
        attribute_blocks,
    }
}

/// Copy of `source` with every attribute block replaced by spaces. Offsets
/// and line breaks are preserved.
pub(crate) fn mask_attributes(source: &str, blocks: &[Range<usize>]) -> String {
    let mut bytes = source.as_bytes().to_vec();
    for block in blocks {
        for b in &mut bytes[block.clone()] {
            if *b != b'\n' && *b != b'\r' {
                *b = b' ';
            }
        }
    }
    // Only ASCII bytes were written, so the text stays valid UTF-8
    String::from_utf8(bytes).unwrap_or_else(|_| source.to_string())
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Lexer<'s> {
    src: &'s str,
    bytes: &'s [u8],
    pos: usize,
    /// Only whitespace since the last line break
    line_start: bool,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line_start: true,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, ahead: usize) -> u8 {
        self.bytes.get(self.pos + ahead).copied().unwrap_or(0)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens
            .push(Token::new(kind, &self.src[start..self.pos], start));
        self.line_start = false;
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.bytes.len() {
            let b = self.peek(0);
            match b {
                b'\n' => {
                    self.pos += 1;
                    self.line_start = true;
                }
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'/' if self.peek(1) == b'/' => self.skip_line(false),
                b'/' if self.peek(1) == b'*' => self.skip_block_comment(),
                b'#' if self.line_start => self.skip_line(true),
                b'"' => self.string(self.pos, 0),
                b'\'' => self.char_literal(self.pos),
                b if b.is_ascii_digit() => self.number(),
                b'.' if self.peek(1).is_ascii_digit() => self.number(),
                b if is_ident_start(b) => self.word(),
                _ => self.punct(),
            }
        }
        self.tokens
    }

    /// Skip to the end of the line. Directives continue over escaped line
    /// breaks.
    fn skip_line(&mut self, directive: bool) {
        while self.pos < self.bytes.len() {
            match self.peek(0) {
                b'\\' if directive && self.peek(1) == b'\n' => self.pos += 2,
                b'\\' if directive && self.peek(1) == b'\r' && self.peek(2) == b'\n' => {
                    self.pos += 3
                }
                b'/' if directive && self.peek(1) == b'*' => self.skip_block_comment(),
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let rest = &self.src[self.pos + 2..];
        self.pos = match rest.find("*/") {
            Some(end) => self.pos + 2 + end + 2,
            None => self.bytes.len(),
        };
    }

    /// Identifier or keyword; `u8"..."`, `L'x'` and raw strings are
    /// literals with a prefix.
    fn word(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_char(self.peek(0)) {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];
        match (word, self.peek(0)) {
            ("R" | "u8R" | "uR" | "UR" | "LR", b'"') => return self.raw_string(start),
            ("u8" | "u" | "U" | "L", b'"') => return self.string(start, self.pos - start),
            ("u8" | "u" | "U" | "L", b'\'') => return self.char_literal(start),
            _ => {}
        }
        let kind = if KEYWORDS.contains(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, start);
    }

    /// `start` is the first byte of the prefix, `prefix` its length.
    fn string(&mut self, start: usize, prefix: usize) {
        self.pos = start + prefix + 1;
        self.quoted(b'"');
        self.push(TokenKind::Literal, start);
    }

    /// The current byte is the opening quote.
    fn char_literal(&mut self, start: usize) {
        self.pos += 1;
        self.quoted(b'\'');
        self.push(TokenKind::Literal, start);
    }

    /// Advance past the closing `quote`, honoring escapes. Stops at the end
    /// of the line for unterminated literals.
    fn quoted(&mut self, quote: u8) {
        while self.pos < self.bytes.len() {
            match self.peek(0) {
                b'\\' => self.pos += 2,
                b'\n' => return,
                b if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// `R"delim( ... )delim"`
    fn raw_string(&mut self, start: usize) {
        let open = self.pos + 1;
        let delim_end = self.src[open..]
            .find('(')
            .map_or(self.bytes.len(), |p| open + p);
        let closing = format!("){}\"", &self.src[open..delim_end]);
        self.pos = match self.src.get(delim_end..).and_then(|rest| rest.find(&closing)) {
            Some(p) => delim_end + p + closing.len(),
            None => self.bytes.len(),
        };
        self.push(TokenKind::Literal, start);
    }

    /// A preprocessing number: digits, letters, `.`, digit separators and
    /// signed exponents.
    fn number(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.peek(0);
            if matches!(b, b'e' | b'E' | b'p' | b'P') && matches!(self.peek(1), b'+' | b'-') {
                self.pos += 2;
            } else if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' {
                self.pos += 1;
            } else if b == b'\'' && self.peek(1).is_ascii_alphanumeric() {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Literal, start);
    }

    fn punct(&mut self) {
        let start = self.pos;
        let rest = &self.src[start..];
        let len = PUNCT3
            .iter()
            .chain(PUNCT2)
            .find(|p| rest.starts_with(**p))
            .map_or(1, |p| p.len());
        self.pos += len;
        self.push(TokenKind::Punctuation, start);
    }
}

/// `[[` opens an attribute block unless it follows something that can be
/// subscripted.
fn attribute_blocks(tokens: &[Token]) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i + 1 < tokens.len() {
        let opens = tokens[i].is("[")
            && tokens[i + 1].is("[")
            && !(i > 0 && subscriptable(&tokens[i - 1]));
        if !opens {
            i += 1;
            continue;
        }

        let mut depth = 0usize;
        let mut end = None;
        for (j, tok) in tokens.iter().enumerate().skip(i) {
            match tok.spelling.as_str() {
                "[" => depth += 1,
                "]" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        end = Some(j);
                        break;
                    }
                }
                _ => {}
            }
        }
        match end {
            Some(j) => {
                blocks.push(tokens[i].offset..tokens[j].end());
                i = j + 1;
            }
            None => break,
        }
    }
    blocks
}

fn subscriptable(tok: &Token) -> bool {
    tok.kind == TokenKind::Identifier
        || tok.kind == TokenKind::Literal
        || tok.is("]")
        || tok.is(")")
}
