//! Integer constant evaluation for enumerator initializers.

use std::collections::HashMap;
use tree_sitter::Node;

/// Evaluate an integral constant expression. `known` holds the
/// enumerators of the enclosing enum seen so far. Returns `None` for
/// anything that is not a foldable integer expression.
pub(crate) fn eval(node: Node<'_>, src: &str, known: &HashMap<String, i64>) -> Option<i64> {
    let text = node.utf8_text(src.as_bytes()).ok()?;
    match node.kind() {
        "number_literal" => parse_integer(text),
        "char_literal" => parse_char(text),
        "true" => Some(1),
        "false" => Some(0),
        "identifier" => known.get(text.trim()).copied(),
        "qualified_identifier" => {
            let last = text.rsplit("::").next()?.trim();
            known.get(last).copied()
        }
        "parenthesized_expression" => eval(node.named_child(0)?, src, known),
        "cast_expression" => eval(node.child_by_field_name("value")?, src, known),
        "unary_expression" => {
            let value = eval(node.child_by_field_name("argument")?, src, known)?;
            let op = node.child_by_field_name("operator")?.utf8_text(src.as_bytes()).ok()?;
            match op {
                "-" => Some(value.wrapping_neg()),
                "+" => Some(value),
                "~" => Some(!value),
                "!" => Some((value == 0) as i64),
                _ => None,
            }
        }
        "binary_expression" => {
            let lhs = eval(node.child_by_field_name("left")?, src, known)?;
            let rhs = eval(node.child_by_field_name("right")?, src, known)?;
            let op = node.child_by_field_name("operator")?.utf8_text(src.as_bytes()).ok()?;
            binary(op, lhs, rhs)
        }
        _ => None,
    }
}

fn binary(op: &str, lhs: i64, rhs: i64) -> Option<i64> {
    let value = match op {
        "+" => lhs.wrapping_add(rhs),
        "-" => lhs.wrapping_sub(rhs),
        "*" => lhs.wrapping_mul(rhs),
        "/" => lhs.checked_div(rhs)?,
        "%" => lhs.checked_rem(rhs)?,
        "<<" => lhs.wrapping_shl(u32::try_from(rhs).ok()?),
        ">>" => lhs.wrapping_shr(u32::try_from(rhs).ok()?),
        "|" => lhs | rhs,
        "&" => lhs & rhs,
        "^" => lhs ^ rhs,
        "==" => (lhs == rhs) as i64,
        "!=" => (lhs != rhs) as i64,
        "<" => (lhs < rhs) as i64,
        ">" => (lhs > rhs) as i64,
        "<=" => (lhs <= rhs) as i64,
        ">=" => (lhs >= rhs) as i64,
        "&&" => (lhs != 0 && rhs != 0) as i64,
        "||" => (lhs != 0 || rhs != 0) as i64,
        _ => return None,
    };
    Some(value)
}

/// Integer literal in any base, with digit separators and suffixes.
/// Values above `i64::MAX` wrap, as the unsigned view of an enumerator
/// recovers them.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text.strip_prefix('+').unwrap_or(text).trim_start()),
    };
    let digits: String = text.chars().filter(|c| *c != '\'').collect();
    let lower = digits.to_ascii_lowercase();
    let body = lower.trim_end_matches(['u', 'l', 'z']);

    let (radix, digits) = if let Some(hex) = body.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = body.strip_prefix("0b") {
        (2, bin)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };
    let value = u64::from_str_radix(digits, radix).ok()? as i64;
    Some(if negative { value.wrapping_neg() } else { value })
}

fn parse_char(text: &str) -> Option<i64> {
    let start = text.find('\'')?;
    let inner = text[start + 1..].strip_suffix('\'')?;
    let value = match inner {
        "\\n" => '\n' as i64,
        "\\t" => '\t' as i64,
        "\\r" => '\r' as i64,
        "\\0" => 0,
        "\\\\" => '\\' as i64,
        "\\'" => '\'' as i64,
        _ => {
            let mut chars = inner.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            c as i64
        }
    };
    Some(value)
}
