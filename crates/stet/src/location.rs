//! Call-site locations of expectation checks.

use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};

use stet_syntax::Position;

/// Where an expectation call sits in the test source.
///
/// Paths come from `Location::caller()` and are relative to the directory
/// the compiler ran in, so they must be resolved before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: PathBuf,
    line: u32,
    column: u32,
}

impl SourceLocation {
    /// Creates a location from its parts. Lines and columns are one-based.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Captures the location of the caller of a `#[track_caller]` function.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }

    /// File as reported by the compiler.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// One-based line.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// One-based column.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Line and column as a [`Position`].
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}
