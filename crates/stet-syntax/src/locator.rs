//! Locating the expected-value literal of an expectation call.
//!
//! The locator works on the current text of a source file and a call-site
//! position. It finds the method identifier on the call line, steps over
//! trivia to the first argument, and scans the string literal there. Every
//! outcome, including failure to find a literal, is a [`Located`] variant;
//! callers decide how to report them.

use std::ops::Range;

use crate::codec::Delimiter;
use crate::position::{Position, column_offset, line_range, position_at};

/// How a literal is laid out in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The body starts with a line break and the closing delimiter sits on a
    /// line of its own.
    Block,
    /// Any other literal.
    Inline,
}

/// Byte span of a string literal in a specific version of a file.
///
/// The span includes the delimiters. It is only meaningful for the content it
/// was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSpan {
    /// Offset of the first byte of the opening delimiter.
    pub start: usize,
    /// Offset just past the closing delimiter.
    pub end: usize,
    /// Number of characters before the closing delimiter on its line.
    pub indent_column: usize,
    /// Delimiter style of the literal.
    pub delimiter: Delimiter,
    /// Block or inline layout.
    pub layout: Layout,
}

impl LiteralSpan {
    /// The byte range of the literal.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The literal text within `content`.
    #[must_use]
    pub fn text<'a>(&self, content: &'a str) -> Option<&'a str> {
        content.get(self.range())
    }
}

/// Outcome of looking for an expected-value literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// The argument is a plain string literal.
    Literal(LiteralSpan),
    /// The argument exists but is not a plain string literal.
    NotALiteral,
    /// A literal opens but never closes.
    Unterminated,
    /// No call to the method starts on the given line.
    NoCall,
    /// Several calls share the line and the column matches none of them.
    Ambiguous,
}

impl Located {
    /// A short description of a non-literal outcome, for diagnostics.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Literal(_) => "string literal",
            Self::NotALiteral => "the expected value is not a plain string literal",
            Self::Unterminated => "the expected string literal is not terminated",
            Self::NoCall => "no expectation call was found on this line",
            Self::Ambiguous => "several expectation calls share this line",
        }
    }
}

/// Finds the literal passed to `method` at `site` within `content`.
///
/// `site` is the one-based position of the method identifier, as reported by
/// `#[track_caller]`. When the column no longer matches an identifier (for
/// example after an earlier edit on the same line), the single call on the
/// line is used instead.
#[must_use]
pub fn locate(content: &str, site: Position, method: &str) -> Located {
    let Some(line) = line_range(content, site.line) else {
        return Located::NoCall;
    };
    let Some(text) = content.get(line.clone()) else {
        return Located::NoCall;
    };

    let candidates: Vec<usize> = method_calls(content, line.start, text, method).collect();
    let exact = line.start + column_offset(text, site.column);
    let chosen = if candidates.contains(&exact) {
        exact
    } else {
        match candidates.as_slice() {
            [] => return Located::NoCall,
            [only] => *only,
            _ => return Located::Ambiguous,
        }
    };

    let mut cursor = Cursor::new(content, chosen + method.len());
    cursor.skip_trivia();
    if !cursor.eat('(') {
        return Located::NoCall;
    }
    cursor.skip_trivia();
    scan_argument(content, cursor)
}

/// Offsets of `method` identifiers on the line that are followed by `(`.
fn method_calls<'a>(
    content: &'a str,
    line_start: usize,
    text: &'a str,
    method: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(method)
        .filter(move |(idx, _)| is_whole_identifier(text, *idx, method.len()))
        .map(move |(idx, _)| line_start + idx)
        .filter(move |offset| {
            let mut cursor = Cursor::new(content, offset + method.len());
            cursor.skip_trivia();
            cursor.peek() == Some('(')
        })
}

fn is_whole_identifier(text: &str, idx: usize, len: usize) -> bool {
    let before = text.get(..idx).and_then(|s| s.chars().next_back());
    let after = text.get(idx + len..).and_then(|s| s.chars().next());
    !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn scan_argument(content: &str, mut cursor: Cursor<'_>) -> Located {
    let start = cursor.offset;
    let delimiter = match cursor.peek() {
        Some('"') => Delimiter::Regular,
        Some('r') => {
            let rest = cursor.rest();
            let hashes = rest.chars().skip(1).take_while(|c| *c == '#').count();
            if rest.chars().nth(hashes + 1) != Some('"') {
                return Located::NotALiteral;
            }
            Delimiter::Raw { hashes }
        }
        _ => return Located::NotALiteral,
    };
    cursor.offset += delimiter.opening().len();
    let body_start = cursor.offset;

    let closed = match delimiter {
        Delimiter::Regular => cursor.scan_regular_body(),
        Delimiter::Raw { .. } => cursor.scan_until(&delimiter.closing()),
    };
    if !closed {
        return Located::Unterminated;
    }
    let end = cursor.offset;
    let close_start = end - delimiter.closing().len();

    cursor.skip_trivia();
    if !matches!(cursor.peek(), Some(',' | ')')) {
        return Located::NotALiteral;
    }

    let close_column = position_at(content, close_start).column.saturating_sub(1);
    let indent_column = usize::try_from(close_column).unwrap_or(usize::MAX);
    let layout = layout_of(content, body_start, close_start);
    Located::Literal(LiteralSpan {
        start,
        end,
        indent_column,
        delimiter,
        layout,
    })
}

fn layout_of(content: &str, body_start: usize, close_start: usize) -> Layout {
    let body = content.get(body_start..close_start).unwrap_or_default();
    let opens_with_break = body.starts_with('\n') || body.starts_with("\r\n");
    let closing_line = body.rsplit_once('\n').map(|(_, tail)| tail);
    match closing_line {
        Some(tail) if opens_with_break && tail.chars().all(|c| c == ' ' || c == '\t') => {
            Layout::Block
        }
        _ => Layout::Inline,
    }
}

/// Forward-only scanner over source text.
struct Cursor<'a> {
    content: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    const fn new(content: &'a str, offset: usize) -> Self {
        Self { content, offset }
    }

    fn rest(&self) -> &'a str {
        self.content.get(self.offset..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.offset += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skips whitespace, line comments and (nested) block comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                self.offset += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                self.skip_block_comment();
            } else if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else {
                return;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let mut depth = 0usize;
        while !self.rest().is_empty() {
            let rest = self.rest();
            if rest.starts_with("/*") {
                depth += 1;
                self.offset += 2;
            } else if rest.starts_with("*/") {
                depth -= 1;
                self.offset += 2;
                if depth == 0 {
                    return;
                }
            } else {
                self.bump();
            }
        }
    }

    /// Advances past the closing `"` of a regular literal body.
    fn scan_regular_body(&mut self) -> bool {
        while let Some(ch) = self.bump() {
            match ch {
                '\\' => {
                    self.bump();
                }
                '"' => return true,
                _ => {}
            }
        }
        false
    }

    /// Advances past the first occurrence of `terminator`.
    fn scan_until(&mut self, terminator: &str) -> bool {
        match self.rest().find(terminator) {
            Some(idx) => {
                self.offset += idx + terminator.len();
                true
            }
            None => {
                self.offset = self.content.len();
                false
            }
        }
    }
}
