//! Source positions and offset conversion.
//!
//! Positions follow the convention of `std::panic::Location`: one-based lines
//! and one-based columns counted in characters. Tree-sitter points are
//! zero-based and are converted for display.

use std::fmt;
use std::ops::Range;

/// A one-based line and column within a source file.
///
/// Ordering is by line, then column, which is also source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (one-based).
    pub line: u32,
    /// Column number (one-based, in characters).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Returns the position of the byte `offset` within `content`.
///
/// Offsets past the end of the content resolve to the end of the content.
#[must_use]
pub fn position_at(content: &str, offset: usize) -> Position {
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count().saturating_add(1);
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before
        .get(line_start..)
        .map_or(0, |text| text.chars().count())
        .saturating_add(1);
    Position::new(to_u32(line), to_u32(column))
}

/// Returns the position just after `text` when it is inserted at `start`.
#[must_use]
pub fn position_after(start: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(idx) => {
            let breaks = to_u32(text.matches('\n').count());
            let tail = text.get(idx + 1..).map_or(0, |tail| tail.chars().count());
            Position::new(
                start.line.saturating_add(breaks),
                to_u32(tail.saturating_add(1)),
            )
        }
        None => Position::new(
            start.line,
            start.column.saturating_add(to_u32(text.chars().count())),
        ),
    }
}

/// Byte range of the one-based `line`, excluding its line terminator.
pub(crate) fn line_range(content: &str, line: u32) -> Option<Range<usize>> {
    if line == 0 {
        return None;
    }
    let mut start = 0;
    for _ in 1..line {
        let newline = content.get(start..)?.find('\n')?;
        start += newline + 1;
    }
    let rest = content.get(start..)?;
    let mut end = rest.find('\n').map_or(content.len(), |idx| start + idx);
    if end > start && content.as_bytes().get(end - 1) == Some(&b'\r') {
        end -= 1;
    }
    Some(start..end)
}

/// Byte offset of the one-based character `column` within `line`.
///
/// Columns past the end of the line clamp to the line length.
pub(crate) fn column_offset(line: &str, column: u32) -> usize {
    let index = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    line.char_indices()
        .nth(index)
        .map_or(line.len(), |(offset, _)| offset)
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
