//! Error types for expectation checks and literal promotion.
//!
//! [`PromoteError`] covers the promotion engine. [`ExpectError`] is what a
//! test sees: comparison failures, with the promotion outcome attached, plus
//! the operational errors that prevent a check from completing.

use std::fmt;
use std::path::PathBuf;

use stet_syntax::{IndentationError, Position, SyntaxError, ValidationFailure};
use thiserror::Error;

use crate::location::SourceLocation;

/// Errors raised while rewriting an expected literal on disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PromoteError {
    /// The call-site path could not be mapped to a file on disk.
    #[error("cannot find source file {file}: {reason}")]
    SourceNotFound {
        /// Path as reported by the call site.
        file: PathBuf,
        /// Why resolution failed.
        reason: String,
    },

    /// No plain string literal could be found at the call site.
    #[error("cannot promote the expectation at {}:{site}: {reason}", .path.display())]
    Unresolvable {
        /// File that was searched.
        path: PathBuf,
        /// Corrected call-site position.
        site: Position,
        /// What the locator found instead.
        reason: String,
    },

    /// The rewritten file would not parse.
    #[error(
        "promoting into {} would introduce syntax errors: {}",
        .path.display(),
        summarise(.failures)
    )]
    SyntaxRejected {
        /// File that was being promoted.
        path: PathBuf,
        /// Errors found in the rewritten content.
        failures: Vec<ValidationFailure>,
    },

    /// An I/O error occurred while reading the source file.
    #[error("failed to read {}: {message}", .path.display())]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// An I/O error occurred while writing the source file.
    #[error("failed to write {}: {message}", .path.display())]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The syntactic check could not run.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A thread panicked while holding the edit state of a file.
    #[error("edit state for {} is poisoned", .path.display())]
    LockPoisoned {
        /// File whose state is poisoned.
        path: PathBuf,
    },
}

impl PromoteError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Returns `true` when the literal simply cannot be promoted, as opposed
    /// to an operational failure.
    #[must_use]
    pub const fn is_unpromotable(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. } | Self::Unresolvable { .. } | Self::SyntaxRejected { .. }
        )
    }
}

fn summarise(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// What happened to the literal of a failed expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
    /// Promotion was not requested.
    Disabled,
    /// The literal now holds the actual output.
    Promoted {
        /// File that was rewritten.
        path: PathBuf,
    },
    /// The literal on disk already renders the actual output, so nothing was
    /// written. The running binary predates an earlier promotion.
    Unchanged {
        /// File that already holds the value.
        path: PathBuf,
    },
    /// Promotion was requested but the literal could not be rewritten.
    Unpromotable {
        /// Why the literal could not be rewritten.
        reason: String,
    },
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "rerun with STET_PROMOTE=1 to accept the actual output"),
            Self::Promoted { path } => {
                write!(f, "promoted: {} now expects the actual output", path.display())
            }
            Self::Unchanged { path } => write!(
                f,
                "not rewritten: {} already expects the actual output; rebuild to pick it up",
                path.display()
            ),
            Self::Unpromotable { reason } => write!(f, "not promoted: {reason}"),
        }
    }
}

/// A single failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Decoded expected value.
    pub expected: String,
    /// Output accumulated since the previous check.
    pub actual: String,
    /// Call site of the check.
    pub location: SourceLocation,
    /// Promotion outcome for this mismatch.
    pub promotion: Promotion,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "expectation mismatch at {}", self.location)?;
        writeln!(f, "--- expected")?;
        writeln!(f, "{}", self.expected)?;
        writeln!(f, "--- actual")?;
        writeln!(f, "{}", self.actual)?;
        write!(f, "{}", self.promotion)
    }
}

/// Errors surfaced by an expectation test.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpectError {
    /// Output differs from the expected value.
    #[error("{0}")]
    Mismatch(Box<Mismatch>),

    /// The literal at a call site could not be located or rewritten.
    #[error("cannot promote the expectation at {location}: {reason}")]
    UnresolvableLiteral {
        /// Call site of the check.
        location: SourceLocation,
        /// What went wrong.
        reason: String,
    },

    /// The expected block literal is inconsistently indented.
    #[error("malformed expected value: {0}")]
    Indentation(#[from] IndentationError),

    /// Reading or writing the source file failed.
    #[error("I/O error on {}: {message}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The promotion engine failed for a reason unrelated to the file.
    #[error("promotion failed: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },

    /// The test ended with output that no check consumed.
    #[error("unconsumed output at the end of the test:\n{output}")]
    UnconsumedOutput {
        /// The leftover output.
        output: String,
    },

    /// The test was expected to end with unconsumed output but did not.
    #[error("the test was expected to end with unconsumed output, but the buffer is empty")]
    MissingUnconsumedOutput,

    /// Several failures from one test.
    #[error("{} expectation failures:\n\n{}", .failures.len(), join_failures(.failures))]
    Failed {
        /// Every failure, in the order it happened.
        failures: Vec<ExpectError>,
    },
}

impl ExpectError {
    /// Returns the mismatch details, when this is a mismatch.
    #[must_use]
    pub fn as_mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Mismatch(mismatch) => Some(mismatch),
            _ => None,
        }
    }

    /// Converts a promotion failure at `location` into a test error.
    #[must_use]
    pub fn from_promotion(location: &SourceLocation, error: PromoteError) -> Self {
        match error {
            unpromotable if unpromotable.is_unpromotable() => Self::UnresolvableLiteral {
                location: location.clone(),
                reason: unpromotable.to_string(),
            },
            PromoteError::FileRead { path, message } | PromoteError::FileWrite { path, message } => {
                Self::Io { path, message }
            }
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

fn join_failures(failures: &[ExpectError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
