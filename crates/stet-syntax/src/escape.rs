//! Escape handling for regular Rust string literals.

use crate::error::CodecError;

/// Resolves the escape sequences of a regular string literal body.
///
/// Supports the escapes Rust accepts in `"..."` literals: `\n`, `\r`, `\t`,
/// `\0`, `\\`, `\"`, `\'`, `\x7F`-bounded byte escapes, `\u{...}` and the
/// line continuation (`\` before a line break, which also swallows the
/// leading whitespace of the next line).
///
/// # Errors
///
/// Returns [`CodecError::InvalidEscape`] for any other sequence.
pub fn unescape(body: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some((_, kind)) = chars.next() else {
            return Err(CodecError::invalid_escape("\\", offset));
        };
        match kind {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
                let digits: String = (0..2).filter_map(|_| chars.next().map(|(_, c)| c)).collect();
                let value = u8::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|byte| *byte <= 0x7F)
                    .ok_or_else(|| CodecError::invalid_escape(format!("\\x{digits}"), offset))?;
                out.push(char::from(value));
            }
            'u' => out.push(unicode_escape(&mut chars, offset)?),
            '\n' | '\r' => {
                while chars
                    .peek()
                    .is_some_and(|(_, next)| matches!(next, ' ' | '\t' | '\n' | '\r'))
                {
                    chars.next();
                }
            }
            other => return Err(CodecError::invalid_escape(format!("\\{other}"), offset)),
        }
    }
    Ok(out)
}

fn unicode_escape(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    offset: usize,
) -> Result<char, CodecError> {
    let mut sequence = String::from("\\u");
    if chars.next().map(|(_, c)| c) != Some('{') {
        return Err(CodecError::invalid_escape(sequence, offset));
    }
    sequence.push('{');
    let mut digits = String::new();
    loop {
        match chars.next() {
            Some((_, '}')) => break,
            Some((_, '_')) => sequence.push('_'),
            Some((_, c)) if c.is_ascii_hexdigit() && digits.len() < 6 => {
                digits.push(c);
                sequence.push(c);
            }
            Some((_, c)) => {
                sequence.push(c);
                return Err(CodecError::invalid_escape(sequence, offset));
            }
            None => return Err(CodecError::invalid_escape(sequence, offset)),
        }
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| CodecError::invalid_escape(format!("{sequence}}}"), offset))
}

/// Escapes a value for the body of a regular block literal.
///
/// Line breaks stay literal; backslashes, quotes and bare carriage returns
/// are escaped.
#[must_use]
pub fn escape_block(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a value for the body of a single-line regular literal.
#[must_use]
pub fn escape_inline(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push_str(&escape_block(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}

/// Number of `#` a raw literal needs so that `value` cannot close it early.
///
/// Values without a `"` need none. Otherwise the delimiter needs one more `#`
/// than the longest run of `#` following any `"` in the value.
#[must_use]
pub fn raw_hashes_needed(value: &str) -> usize {
    value
        .match_indices('"')
        .map(|(idx, _)| {
            value
                .get(idx + 1..)
                .map_or(0, |rest| rest.chars().take_while(|c| *c == '#').count())
                + 1
        })
        .max()
        .unwrap_or(0)
}
