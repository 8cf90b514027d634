//! Parser for leading `[[ ... ]]` attribute lists.
//!
//! ```text
//! [[scope::name(arg, arg), other]] [[more]]
//! ```
//!
//! Each attribute is `[scope::]name[(args)]`. Arguments are split on commas
//! at parenthesis depth 1 and keep their nested parentheses; the text of an
//! argument is its tokens re-joined with whitespace collapsed.

use crate::errors::AttributeError;
use crate::tokens::{join_tokens, TokenSpan, TokenWalker};
use declgraph::Attribute;
use declgraph_frontend_api::Token;
use log::warn;
use std::path::Path;

/// Parse the attribute blocks at the start of `span`.
///
/// Returns an empty list when the span does not start with `[[`. Malformed
/// lists are reported as warnings and yield whatever was parsed before the
/// error.
pub fn parse_attributes(path: &Path, span: TokenSpan<'_>) -> Vec<Attribute> {
    let (attrs, error) = scan_attributes(span.tokens());
    if let Some(err) = error {
        warn!("{}: {}", path.display(), err);
    }
    attrs
}

/// Parse consecutive leading attribute blocks, returning the attributes
/// parsed so far together with the first error.
pub fn scan_attributes(tokens: &[Token]) -> (Vec<Attribute>, Option<AttributeError>) {
    let mut attrs = Vec::new();
    let mut walker = TokenSpan::new(tokens, 0, tokens.len()).walker();

    while opens_block(&walker) {
        walker.eat("[");
        walker.eat("[");
        let list_start = walker.position();
        let Some(list_end) = find_close(&mut walker) else {
            return (attrs, Some(AttributeError::Unterminated));
        };
        if let Err(err) = parse_list(&tokens[list_start..list_end], &mut attrs) {
            return (attrs, Some(err));
        }
    }

    (attrs, None)
}

fn opens_block(walker: &TokenWalker<'_>) -> bool {
    walker.peek().is_some_and(|t| t.is("[")) && walker.peek_at(1).is_some_and(|t| t.is("["))
}

/// Advance past the first `]]`, returning the index of its first `]`.
fn find_close(walker: &mut TokenWalker<'_>) -> Option<usize> {
    while let Some(tok) = walker.next() {
        if tok.is("]") && walker.eat("]") {
            return Some(TokenWalker::position(walker) - 2);
        }
    }
    None
}

fn parse_list(tokens: &[Token], out: &mut Vec<Attribute>) -> Result<(), AttributeError> {
    let mut i = 0;
    while i < tokens.len() {
        // Empty list entries are allowed: `[[a,,b]]`
        if tokens[i].is(",") {
            i += 1;
            continue;
        }

        let first = &tokens[i];
        if !first.is_word() {
            return Err(AttributeError::ExpectedName(first.spelling.clone()));
        }
        i += 1;

        let mut attr = Attribute::new(first.spelling.clone());
        if tokens.get(i).is_some_and(|t| t.is("::")) {
            let name = tokens
                .get(i + 1)
                .filter(|t| t.is_word())
                .ok_or_else(|| AttributeError::ExpectedName("::".to_string()))?;
            attr = Attribute::scoped(first.spelling.clone(), name.spelling.clone());
            i += 2;
        }

        if tokens.get(i).is_some_and(|t| t.is("(")) {
            let (args, next) = parse_args(&tokens[i + 1..])
                .ok_or_else(|| AttributeError::UnbalancedParens(attr.to_string()))?;
            attr.args = args;
            i += 1 + next;
        }

        // Pack expansion
        if tokens.get(i).is_some_and(|t| t.is("...")) {
            i += 1;
        }

        out.push(attr);

        match tokens.get(i) {
            None => {}
            Some(t) if t.is(",") => i += 1,
            Some(t) => return Err(AttributeError::Unexpected(t.spelling.clone())),
        }
    }
    Ok(())
}

/// Parse an argument list whose opening `(` was already consumed.
///
/// Returns the arguments and the number of tokens consumed including the
/// closing `)`, or `None` when the parentheses do not balance.
fn parse_args(tokens: &[Token]) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut depth = 1usize;
    let mut arg_start = 0;

    for (i, tok) in tokens.iter().enumerate() {
        match tok.spelling.as_str() {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    let last = &tokens[arg_start..i];
                    if !last.is_empty() || !args.is_empty() {
                        args.push(join_tokens(last));
                    }
                    return Some((args, i + 1));
                }
            }
            "," if depth == 1 => {
                args.push(join_tokens(&tokens[arg_start..i]));
                arg_start = i + 1;
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lex a small attribute snippet: punctuation, words, numbers and
    /// double-quoted strings, one byte of offset per source byte.
    fn lex(src: &str) -> Vec<Token> {
        let bytes = src.as_bytes();
        let mut toks = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i] as char;
            if c.is_whitespace() {
                i += 1;
            } else if c == '"' {
                let end = src[i + 1..].find('"').map_or(bytes.len(), |p| i + 2 + p);
                toks.push(Token::literal(&src[i..end], i));
                i = end;
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                let start = i;
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                let word = &src[start..i];
                if word == "..." {
                    toks.push(Token::punct(word, start));
                } else if word.starts_with(|c: char| c.is_ascii_digit()) {
                    toks.push(Token::literal(word, start));
                } else {
                    toks.push(Token::ident(word, start));
                }
            } else if src[i..].starts_with("::") {
                toks.push(Token::punct("::", i));
                i += 2;
            } else {
                toks.push(Token::punct(c.to_string(), i));
                i += 1;
            }
        }
        toks
    }

    #[test]
    fn test_scoped_attribute_with_args() {
        let toks = lex(r#"[[my::attrib(1, "2", 3.0)]] class"#);
        let (attrs, err) = scan_attributes(&toks);
        assert!(err.is_none());
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].scope, "my");
        assert_eq!(attrs[0].name, "attrib");
        assert_eq!(attrs[0].args, vec!["1", "\"2\"", "3.0"]);
    }

    #[test]
    fn test_nested_parens_are_preserved() {
        let toks = lex("[[ns::check(f(a, b), (c), d)]]");
        let (attrs, err) = scan_attributes(&toks);
        assert!(err.is_none());
        assert_eq!(attrs[0].args, vec!["f(a, b)", "(c)", "d"]);
    }

    #[test]
    fn test_multiple_attributes_and_blocks() {
        let toks = lex("[[nodiscard, deprecated(\"old\")]] [[my::tag]] int");
        let (attrs, err) = scan_attributes(&toks);
        assert!(err.is_none());
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["nodiscard", "deprecated", "tag"]);
        assert!(!attrs[0].has_scope());
        assert_eq!(attrs[1].args, vec!["\"old\""]);
        assert_eq!(attrs[2].scope, "my");
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let toks = lex("[[a::x(1), a::x(2)]]");
        let (attrs, _) = scan_attributes(&toks);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].args, vec!["1"]);
        assert_eq!(attrs[1].args, vec!["2"]);
    }

    #[test]
    fn test_no_attribute_block() {
        let (attrs, err) = scan_attributes(&lex("int x"));
        assert!(attrs.is_empty());
        assert!(err.is_none());

        let (attrs, err) = scan_attributes(&lex("[x]"));
        assert!(attrs.is_empty());
        assert!(err.is_none());
    }

    #[test]
    fn test_unterminated_list() {
        let (attrs, err) = scan_attributes(&lex("[[a, b] int x;"));
        assert!(attrs.is_empty());
        assert_eq!(err, Some(AttributeError::Unterminated));
    }

    #[test]
    fn test_unbalanced_parens_discard_remainder() {
        // The closing `]]` is found, but `(` inside never closes.
        let (attrs, err) = scan_attributes(&lex("[[ok, bad(1, (2), other]]"));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "ok");
        assert_eq!(err, Some(AttributeError::UnbalancedParens("bad".to_string())));
    }

    #[test]
    fn test_empty_argument_list() {
        let (attrs, err) = scan_attributes(&lex("[[x()]]"));
        assert!(err.is_none());
        assert!(attrs[0].args.is_empty());
    }
}
