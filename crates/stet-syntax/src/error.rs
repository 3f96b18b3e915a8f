//! Error types for literal decoding and source parsing.
//!
//! Locating a literal never fails with an error: the locator reports a
//! [`crate::Located`] outcome instead. The types here cover the operations
//! that can genuinely go wrong: decoding a malformed literal, and initialising
//! or running the Tree-sitter parser.

use thiserror::Error;

/// Errors from Tree-sitter parsing operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Rust grammar.
    #[error("failed to initialise the rust parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Failed to parse source code.
    #[error("failed to parse rust source: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },

    /// Internal error indicating a bug or system failure.
    #[error("internal error: {message}")]
    InternalError {
        /// Description of the internal error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// A block literal line carries less indentation than its closing delimiter.
///
/// Line numbers are one-based and count content lines only, so the first line
/// after the opening delimiter is line 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "line {line} of the expected block is indented by {found} characters, \
     but the closing delimiter sits at column {expected}"
)]
pub struct IndentationError {
    line: usize,
    expected: usize,
    found: usize,
}

impl IndentationError {
    pub(crate) const fn new(line: usize, expected: usize, found: usize) -> Self {
        Self {
            line,
            expected,
            found,
        }
    }

    /// Content line (one-based) with insufficient indentation.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Indentation required by the closing delimiter.
    #[must_use]
    pub const fn expected(&self) -> usize {
        self.expected
    }

    /// Indentation actually found on the line.
    #[must_use]
    pub const fn found(&self) -> usize {
        self.found
    }
}

/// Errors raised while decoding the on-disk text of a string literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The text does not start and end with matching string delimiters.
    #[error("malformed string literal: {message}")]
    MalformedLiteral {
        /// Description of what is wrong with the delimiters.
        message: String,
    },

    /// A regular string literal contains an escape sequence Rust rejects.
    #[error("invalid escape sequence `{sequence}` at byte {offset}")]
    InvalidEscape {
        /// The offending sequence, including its backslash.
        sequence: String,
        /// Byte offset of the backslash within the literal body.
        offset: usize,
    },

    /// The decoded value is a block whose indentation is inconsistent.
    #[error(transparent)]
    Indentation(#[from] IndentationError),
}

impl CodecError {
    /// Creates a malformed literal error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedLiteral {
            message: message.into(),
        }
    }

    /// Creates an invalid escape error.
    #[must_use]
    pub fn invalid_escape(sequence: impl Into<String>, offset: usize) -> Self {
        Self::InvalidEscape {
            sequence: sequence.into(),
            offset,
        }
    }
}
