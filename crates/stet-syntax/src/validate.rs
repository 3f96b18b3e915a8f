//! Syntactic check of a promoted file before it is written.
//!
//! A promotion only replaces one literal, but a bad rendering (or a locator
//! mistake) could still leave the file unparsable. [`SyntacticCheck`] parses
//! the file before and after the edit and reports the errors the edit would
//! introduce. Files that already had errors are compared by error count, so
//! pre-existing breakage does not block a promotion.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::SyntaxError;
use crate::parser::Parser;

/// Tree-sitter based syntactic validation of Rust files.
///
/// The parser is created lazily on first use and shared behind a mutex, so
/// one check can serve every thread of a test run.
pub struct SyntacticCheck {
    parser: Mutex<Option<Parser>>,
}

impl SyntacticCheck {
    /// Creates a check. No parser is built until the first validation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parser: Mutex::new(None),
        }
    }

    /// Returns `true` when `path` is a Rust source file.
    #[must_use]
    pub fn supports_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "rs")
    }

    /// Validates a single file's content.
    ///
    /// Returns the syntax errors found; an empty list means the content is
    /// valid. Files that are not Rust sources pass through unchecked.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser cannot be initialised or its lock is
    /// poisoned.
    pub fn validate(&self, path: &Path, content: &str) -> Result<Vec<ValidationFailure>, SyntaxError> {
        if !Self::supports_file(path) {
            return Ok(Vec::new());
        }

        let mut guard = self
            .parser
            .lock()
            .map_err(|_| SyntaxError::internal_error("parser lock poisoned"))?;
        if guard.is_none() {
            *guard = Some(Parser::new()?);
        }
        let parser = guard
            .as_mut()
            .ok_or_else(|| SyntaxError::internal_error("parser missing after initialisation"))?;

        let result = parser.parse(content)?;
        Ok(result
            .errors()
            .into_iter()
            .map(|e| ValidationFailure {
                path: path.to_path_buf(),
                line: e.line,
                column: e.column,
                message: e.message,
            })
            .collect())
    }

    /// Returns the errors of `after` when it has more than `before`.
    ///
    /// An empty list means the edit from `before` to `after` is acceptable.
    ///
    /// # Errors
    ///
    /// Propagates parser failures from [`Self::validate`].
    pub fn introduced_errors(
        &self,
        path: &Path,
        before: &str,
        after: &str,
    ) -> Result<Vec<ValidationFailure>, SyntaxError> {
        let after_failures = self.validate(path, after)?;
        if after_failures.is_empty() {
            return Ok(after_failures);
        }
        let before_failures = self.validate(path, before)?;
        if after_failures.len() > before_failures.len() {
            Ok(after_failures)
        } else {
            Ok(Vec::new())
        }
    }
}

impl Default for SyntacticCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyntacticCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntacticCheck").finish_non_exhaustive()
    }
}

/// A syntax error reported by [`SyntacticCheck`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Path to the affected file.
    pub path: PathBuf,
    /// Line number (one-based).
    pub line: u32,
    /// Column number (one-based).
    pub column: u32,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.message
        )
    }
}
