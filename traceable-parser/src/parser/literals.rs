// Literal parsing module
// Integer literals for array lengths and string literals for imports and tags

use super::{GoParser, Rule};
use crate::error::*;
use pest::iterators::Pair;

impl GoParser {
    /// Parse a `string_lit` pair into its unquoted value
    pub(crate) fn parse_string_lit(pair: Pair<Rule>) -> ParseResult<String> {
        let literal = pair.as_str();
        unquote(literal).ok_or_else(|| ParseError::InvalidStringLiteral {
            literal: literal.to_string(),
            span: Self::span_from_pair(&pair),
        })
    }
}

/// Parse a Go integer literal.
///
/// Accepts decimal, `0x`, `0o`, `0b` and legacy `0`-prefixed octal forms, with
/// `_` digit separators. Returns `None` for anything else, including values
/// that overflow `u64`.
pub fn parse_int_literal(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('_') || text.ends_with('_') {
        return None;
    }

    let (digits, radix) = if let Some(rest) = strip_prefix_ci(text, "0x") {
        (rest, 16)
    } else if let Some(rest) = strip_prefix_ci(text, "0o") {
        (rest, 8)
    } else if let Some(rest) = strip_prefix_ci(text, "0b") {
        (rest, 2)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(&digits, radix).ok()
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Remove the quotes from a Go string literal and process escapes
pub fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        // Carriage returns are discarded from raw strings
        return Some(raw.replace('\r', ""));
    }

    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let escape = chars.next()?;
        match escape {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            'x' => out.push(take_digits(&mut chars, 2, 16)? as u8),
            'u' => push_char(&mut out, take_digits(&mut chars, 4, 16)?)?,
            'U' => push_char(&mut out, take_digits(&mut chars, 8, 16)?)?,
            '0'..='7' => {
                let rest = take_digits(&mut chars, 2, 8)?;
                let value = (escape as u32 - '0' as u32) * 64 + rest;
                out.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }

    String::from_utf8(out).ok()
}

fn take_digits(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    count: usize,
    radix: u32,
) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars.next()?.to_digit(radix)?;
        value = value * radix + digit;
    }
    Some(value)
}

fn push_char(out: &mut Vec<u8>, code: u32) -> Option<()> {
    let c = char::from_u32(code)?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    Some(())
}
