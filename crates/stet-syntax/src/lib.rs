//! Source-level machinery for promoting expectation literals.
//!
//! This crate knows how expected values look inside Rust source files:
//!
//! - **Literal location** via [`locate`], which finds the string literal
//!   passed to an expectation call at a given call site
//! - **Indentation codec** via [`decode`], [`decode_value`], [`encode`] and
//!   [`encode_inline`], which convert between logical values and indented
//!   block literals
//! - **Syntactic validation** via [`SyntacticCheck`], which refuses edits that
//!   would leave a file unparsable
//!
//! # Example
//!
//! ```text
//! let content = "    t.expect(r#\"\n        Ok\n        \"#);\n";
//! let Located::Literal(span) = locate(content, Position::new(1, 7), "expect") else { .. };
//! let value = decode(span.text(content).unwrap_or_default())?;   // "Ok"
//! let literal = encode("Ok\nOops", span.indent_column, span.delimiter, LineEnding::Lf);
//! ```

mod codec;
mod error;
mod escape;
mod locator;
mod parser;
mod position;
mod validate;

pub use codec::{
    Delimiter, LineEnding, decode, decode_value, encode, encode_inline, normalize_line_endings,
    split_delimiters,
};
pub use error::{CodecError, IndentationError, SyntaxError};
pub use escape::{raw_hashes_needed, unescape};
pub use locator::{Layout, LiteralSpan, Located, locate};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::{Position, position_after, position_at};
pub use validate::{SyntacticCheck, ValidationFailure};

#[cfg(test)]
mod tests;
