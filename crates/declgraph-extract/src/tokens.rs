//! Token windows over the main file of a unit.
//!
//! Front ends report extents for field-like declarations that can start in
//! the middle of the declaration (after its attributes) or inside the
//! previous declaration. [`TokenSpan::declaration`] re-derives the start by
//! scanning backward from the declared name to the previous terminator.

use declgraph_frontend_api::{Cursor, CursorKind, Token};
use log::debug;

/// Tokens that end the previous declaration or open the enclosing scope.
const TERMINATORS: [&str; 3] = [";", "{", "}"];

const ACCESS_KEYWORDS: [&str; 3] = ["public", "protected", "private"];

/// A contiguous window `[start, end)` over the token vector of a unit.
///
/// The window keeps a reference to every token of the file, so it can be
/// widened backward or walked in both directions.
#[derive(Debug, Clone, Copy)]
pub struct TokenSpan<'tu> {
    all: &'tu [Token],
    start: usize,
    end: usize,
}

impl<'tu> TokenSpan<'tu> {
    pub fn new(all: &'tu [Token], start: usize, end: usize) -> Self {
        let end = end.min(all.len());
        Self {
            all,
            start: start.min(end),
            end,
        }
    }

    /// Tokens of the extent exactly as the front end reported it.
    pub fn of(cursor: Cursor<'tu>) -> Self {
        let unit = cursor.unit();
        if !cursor.is_from_main_file() {
            return Self::new(unit.tokens(), 0, 0);
        }
        let range = unit.token_range(cursor.extent());
        Self::new(unit.tokens(), range.start, range.end)
    }

    /// Tokens of the whole declaration.
    ///
    /// For fields, methods, constructors, destructors, variables and
    /// functions the start is re-derived by scanning backward from the
    /// declared name to the nearest `;`, `{` or `}` and starting one token
    /// past it. Without such a terminator the reported extent is kept.
    pub fn declaration(cursor: Cursor<'tu>) -> Self {
        let span = Self::of(cursor);
        if !needs_correction(cursor.kind()) || span.is_empty() {
            return span;
        }

        // Scan from the declared name; the reported start is not trusted.
        let name_offset = cursor.location().offset;
        let anchor = span
            .all
            .partition_point(|t| t.offset < name_offset)
            .min(span.end);

        let mut back = Self::new(span.all, 0, anchor).walker_at_end();
        while let Some(tok) = back.prev() {
            if TERMINATORS.contains(&tok.spelling.as_str()) {
                return Self::new(span.all, back.position() + 1, span.end);
            }
        }
        debug!(
            "no terminator before '{}' at line {}, keeping reported extent",
            cursor.spelling(),
            cursor.location().line
        );
        span
    }

    pub fn tokens(&self) -> &'tu [Token] {
        &self.all[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn first(&self) -> Option<&'tu Token> {
        self.tokens().first()
    }

    /// Drop the first `n` tokens.
    pub fn skip(self, n: usize) -> Self {
        Self::new(self.all, self.start + n, self.end)
    }

    /// Drop leading `public:` style labels.
    pub fn skip_access_labels(mut self) -> Self {
        loop {
            let toks = self.tokens();
            match (toks.first(), toks.get(1)) {
                (Some(kw), Some(colon))
                    if ACCESS_KEYWORDS.contains(&kw.spelling.as_str()) && colon.is(":") =>
                {
                    self = self.skip(2);
                }
                _ => return self,
            }
        }
    }

    /// The window after the first occurrence of one of `keywords` outside
    /// angle brackets, or `None` when none occurs.
    pub fn after_keyword(self, keywords: &[&str]) -> Option<Self> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens().iter().enumerate() {
            match tok.spelling.as_str() {
                "<" => depth += 1,
                ">" => depth = depth.saturating_sub(1),
                ">>" => depth = depth.saturating_sub(2),
                s if depth == 0 && keywords.contains(&s) => return Some(self.skip(i + 1)),
                _ => {}
            }
        }
        None
    }

    /// A walker positioned at the first token of the window.
    pub fn walker(&self) -> TokenWalker<'tu> {
        TokenWalker {
            span: *self,
            pos: self.start,
        }
    }

    /// A walker positioned past the last token of the window, for
    /// scanning backward with [`TokenWalker::prev`].
    pub fn walker_at_end(&self) -> TokenWalker<'tu> {
        TokenWalker {
            span: *self,
            pos: self.end,
        }
    }

    /// Source-like text of the window; see [`join_tokens`].
    pub fn text(&self) -> String {
        join_tokens(self.tokens())
    }
}

/// A bidirectional position inside a [`TokenSpan`].
#[derive(Debug, Clone, Copy)]
pub struct TokenWalker<'tu> {
    span: TokenSpan<'tu>,
    pos: usize,
}

impl<'tu> TokenWalker<'tu> {
    pub fn peek(&self) -> Option<&'tu Token> {
        self.peek_at(0)
    }

    pub fn peek_at(&self, ahead: usize) -> Option<&'tu Token> {
        let idx = self.pos + ahead;
        (idx < self.span.end).then(|| &self.span.all[idx])
    }

    pub fn prev(&mut self) -> Option<&'tu Token> {
        if self.pos == self.span.start {
            return None;
        }
        self.pos -= 1;
        Some(&self.span.all[self.pos])
    }

    /// Index of the next token in the token vector of the unit.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume the next token if it is spelled `spelling`.
    pub fn eat(&mut self, spelling: &str) -> bool {
        if self.peek().is_some_and(|t| t.is(spelling)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

impl<'tu> Iterator for TokenWalker<'tu> {
    type Item = &'tu Token;

    fn next(&mut self) -> Option<&'tu Token> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }
}

/// Re-join tokens, collapsing any whitespace between two tokens in the
/// source into one space.
pub fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for tok in tokens {
        if let Some(prev) = prev {
            let gap = tok.offset > prev.end();
            if gap || (prev.is_word() && tok.is_word()) {
                out.push(' ');
            }
        }
        out.push_str(&tok.spelling);
        prev = Some(tok);
    }
    out
}

fn needs_correction(kind: CursorKind) -> bool {
    matches!(
        kind,
        CursorKind::FieldDecl
            | CursorKind::VarDecl
            | CursorKind::CXXMethod
            | CursorKind::Constructor
            | CursorKind::Destructor
            | CursorKind::FunctionDecl
    )
}
