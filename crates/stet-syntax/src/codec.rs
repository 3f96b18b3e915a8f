//! Conversion between logical expected values and on-disk literals.
//!
//! A *block* literal opens with a line break right after its opening
//! delimiter and closes on a line of its own:
//!
//! ```text
//!     t.expect(r#"
//!         Ok
//!         Oops
//!         "#);
//! ```
//!
//! The dedent prefix is the indentation of the closing delimiter, so the value
//! above decodes to `"Ok\nOops"`. Anything else is an *inline* literal and
//! decodes verbatim.

use std::borrow::Cow;

use crate::error::{CodecError, IndentationError};
use crate::escape::{escape_block, escape_inline, raw_hashes_needed, unescape};

/// The delimiter style of a Rust string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `"..."` with escape sequences.
    Regular,
    /// `r"..."`, `r#"..."#`, ... with the given number of `#`.
    Raw {
        /// Number of `#` on each side.
        hashes: usize,
    },
}

impl Delimiter {
    /// Text that opens a literal of this style.
    #[must_use]
    pub fn opening(self) -> String {
        match self {
            Self::Regular => String::from("\""),
            Self::Raw { hashes } => format!("r{}\"", "#".repeat(hashes)),
        }
    }

    /// Text that closes a literal of this style.
    #[must_use]
    pub fn closing(self) -> String {
        match self {
            Self::Regular => String::from("\""),
            Self::Raw { hashes } => format!("\"{}", "#".repeat(hashes)),
        }
    }

    /// Returns the closest style able to hold `value`.
    ///
    /// Raw delimiters keep their `#` count unless the value needs more. Raw
    /// literals cannot hold a bare carriage return, so such values fall back
    /// to a regular literal.
    #[must_use]
    pub fn fit(self, value: &str) -> Self {
        match self {
            Self::Regular => Self::Regular,
            Self::Raw { .. } if value.contains('\r') => Self::Regular,
            Self::Raw { hashes } => Self::Raw {
                hashes: hashes.max(raw_hashes_needed(value)),
            },
        }
    }

    /// Returns `true` for raw delimiters.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Raw { .. })
    }
}

/// Line terminator used when rendering block literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Picks the terminator already used by `content`.
    #[must_use]
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            Self::CrLf
        } else {
            Self::Lf
        }
    }

    /// The terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Replaces every `\r\n` in `value` with `\n`.
#[must_use]
pub fn normalize_line_endings(value: &str) -> Cow<'_, str> {
    if value.contains("\r\n") {
        Cow::Owned(value.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Decodes the runtime value of an expected literal into its logical form.
///
/// Block values (leading line break, whitespace-only last line) lose their
/// sentinel lines and are dedented by the width of the last line. Any other
/// value is returned verbatim.
///
/// # Errors
///
/// Returns [`IndentationError`] when a non-blank line is indented less than
/// the closing delimiter.
pub fn decode_value(value: &str) -> Result<String, IndentationError> {
    let normalized = normalize_line_endings(value);
    let Some(body) = normalized.strip_prefix('\n') else {
        return Ok(normalized.into_owned());
    };
    let (content, closing) = match body.rsplit_once('\n') {
        Some((content, closing)) => (Some(content), closing),
        None => (None, body),
    };
    if !is_blank(closing) {
        return Ok(normalized.into_owned());
    }
    let indent = closing.chars().count();
    let Some(text) = content else {
        return Ok(String::new());
    };

    let lines = text
        .split('\n')
        .enumerate()
        .map(|(index, line)| dedent_line(line, indent, index + 1))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Decodes the on-disk text of a literal, delimiters included.
///
/// # Errors
///
/// Returns [`CodecError::MalformedLiteral`] when the delimiters do not match,
/// [`CodecError::InvalidEscape`] for bad escapes in regular literals, and
/// [`CodecError::Indentation`] for under-indented block lines.
pub fn decode(literal: &str) -> Result<String, CodecError> {
    let (delimiter, body) = split_delimiters(literal)?;
    let value = match delimiter {
        Delimiter::Regular => Cow::Owned(unescape(body)?),
        Delimiter::Raw { .. } => Cow::Borrowed(body),
    };
    Ok(decode_value(&value)?)
}

/// Splits a literal into its delimiter style and raw body text.
///
/// # Errors
///
/// Returns [`CodecError::MalformedLiteral`] if `literal` is not a complete
/// regular or raw string literal.
pub fn split_delimiters(literal: &str) -> Result<(Delimiter, &str), CodecError> {
    let delimiter = if literal.starts_with('"') {
        Delimiter::Regular
    } else if let Some(rest) = literal.strip_prefix('r') {
        let hashes = rest.chars().take_while(|c| *c == '#').count();
        Delimiter::Raw { hashes }
    } else {
        return Err(CodecError::malformed("expected `\"` or `r`"));
    };

    let opening = delimiter.opening();
    let closing = delimiter.closing();
    if literal.len() < opening.len() + closing.len() {
        return Err(CodecError::malformed("literal is too short"));
    }
    literal
        .strip_prefix(opening.as_str())
        .and_then(|rest| rest.strip_suffix(closing.as_str()))
        .map(|body| (delimiter, body))
        .ok_or_else(|| CodecError::malformed(format!("expected `{opening}...{closing}`")))
}

/// Renders `value` as a block literal whose closing delimiter sits at
/// column `indent` (zero-based).
///
/// Content lines carry `indent` spaces; empty lines carry none. The delimiter
/// is widened with [`Delimiter::fit`] when the value requires it.
#[must_use]
pub fn encode(value: &str, indent: usize, delimiter: Delimiter, line_ending: LineEnding) -> String {
    let fitted = delimiter.fit(value);
    let newline = line_ending.as_str();
    let prefix = " ".repeat(indent);

    let mut out = fitted.opening();
    out.push_str(newline);
    if !value.is_empty() {
        for line in value.split('\n') {
            if !line.is_empty() {
                out.push_str(&prefix);
                match fitted {
                    Delimiter::Regular => out.push_str(&escape_block(line)),
                    Delimiter::Raw { .. } => out.push_str(line),
                }
            }
            out.push_str(newline);
        }
    }
    out.push_str(&prefix);
    out.push_str(&fitted.closing());
    out
}

/// Renders `value` as a single-line literal.
///
/// Raw delimiters are kept when the value has no line break; otherwise the
/// value is escaped into a regular literal.
#[must_use]
pub fn encode_inline(value: &str, delimiter: Delimiter) -> String {
    let fitted = delimiter.fit(value);
    if fitted.is_raw() && !value.contains('\n') {
        return format!("{}{value}{}", fitted.opening(), fitted.closing());
    }
    format!("\"{}\"", escape_inline(value))
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

fn dedent_line(line: &str, indent: usize, number: usize) -> Result<String, IndentationError> {
    let found = line.chars().take_while(|c| *c == ' ' || *c == '\t').count();
    if found >= indent {
        let start = line.char_indices().nth(indent).map_or(line.len(), |(idx, _)| idx);
        return Ok(line.get(start..).unwrap_or_default().to_owned());
    }
    if is_blank(line) {
        return Ok(String::new());
    }
    Err(IndentationError::new(number, indent, found))
}
