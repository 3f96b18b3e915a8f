//! The per-test handle: output buffer plus comparison against literals.

use std::fmt;

use stet_syntax::{decode_value, normalize_line_endings};
use tracing::{debug, info};

use crate::buffer::ExpectationBuffer;
use crate::error::{ExpectError, Mismatch, Promotion};
use crate::location::SourceLocation;
use crate::promote::PromotionOutcome;
use crate::suite::ExpectTests;

/// What the end of a test requires of output no check consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnconsumedOutput {
    /// Leftover output fails the test.
    #[default]
    Forbid,
    /// Leftover output is discarded.
    Allow,
    /// The test must end with leftover output, which is then discarded.
    Require,
}

/// Output buffer and expectation checks for one test.
///
/// Output is written with [`print`](Self::print) and friends (or `write!`),
/// then compared against an expected literal with [`expect`](Self::expect)
/// or [`check`](Self::check). Every comparison consumes the buffer.
///
/// `expect` records failures and lets the test continue, so one run can
/// check, and promote, every expectation in the test. The failures are
/// reported by [`finish`](Self::finish).
///
/// Dropping an unfinished test that recorded failures panics, unless the
/// thread is already panicking.
#[derive(Debug)]
pub struct ExpectTest<'s> {
    suite: &'s ExpectTests,
    promote: bool,
    unconsumed: UnconsumedOutput,
    buffer: ExpectationBuffer,
    failures: Vec<ExpectError>,
    finished: bool,
}

impl<'s> ExpectTest<'s> {
    pub(crate) const fn new(
        suite: &'s ExpectTests,
        promote: bool,
        unconsumed: UnconsumedOutput,
    ) -> Self {
        Self {
            suite,
            promote,
            unconsumed,
            buffer: ExpectationBuffer::new(),
            failures: Vec::new(),
            finished: false,
        }
    }

    /// Appends `value` to the output.
    pub fn print(&mut self, value: impl fmt::Display) {
        self.printf(format_args!("{value}"));
    }

    /// Appends `value` and a line break to the output.
    pub fn println(&mut self, value: impl fmt::Display) {
        self.printf(format_args!("{value}\n"));
    }

    /// Appends formatted text to the output.
    ///
    /// ```ignore
    /// t.printf(format_args!("{:>4}|{:<4}", 1, 2));
    /// ```
    pub fn printf(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.buffer.push_str(text),
            None => self.buffer.push_str(&fmt::format(args)),
        }
    }

    /// Appends a line break to the output.
    pub fn new_line(&mut self) {
        self.buffer.push_str("\n");
    }

    /// Returns `true` when mismatches rewrite their literals.
    #[must_use]
    pub const fn promotes(&self) -> bool {
        self.promote
    }

    /// Compares the output with `expected` and records any failure.
    ///
    /// The buffer is cleared either way. With promotion enabled a mismatch
    /// also rewrites the literal passed at this call site.
    #[track_caller]
    pub fn expect(&mut self, expected: &str) {
        let location = SourceLocation::caller();
        if let Err(error) = self.check_at(location, "expect", expected) {
            self.failures.push(error);
        }
    }

    /// Compares the output with `expected` and returns any failure
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Mismatch`] when the output differs, and the
    /// errors of [`check_at`](Self::check_at).
    #[track_caller]
    pub fn check(&mut self, expected: &str) -> Result<(), ExpectError> {
        let location = SourceLocation::caller();
        self.check_at(location, "check", expected)
    }

    /// Compares the output with `literal`, the literal passed to `method` at
    /// `location`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::Indentation`] when `expected` is a malformed
    /// block, [`ExpectError::Mismatch`] when the output differs, and
    /// [`ExpectError::Io`] when promotion could not read or write the file.
    pub fn check_at(
        &mut self,
        location: SourceLocation,
        method: &str,
        literal: &str,
    ) -> Result<(), ExpectError> {
        let output = self.buffer.take();
        let actual = normalize_line_endings(&output).into_owned();
        let expected = decode_value(literal)?;
        if expected == actual {
            debug!(target: "stet::expect", location = %location, "expectation matched");
            return Ok(());
        }

        let promotion = if self.promote {
            match self.suite.promote_literal(&location, method, &actual) {
                Ok(PromotionOutcome::Written { path, .. }) => Promotion::Promoted { path },
                Ok(PromotionOutcome::Unchanged { path }) => Promotion::Unchanged { path },
                Err(ExpectError::UnresolvableLiteral { reason, .. }) => {
                    Promotion::Unpromotable { reason }
                }
                Err(other) => return Err(other),
            }
        } else {
            Promotion::Disabled
        };
        info!(
            target: "stet::expect",
            location = %location,
            promotion = %promotion,
            "expectation mismatch"
        );
        Err(ExpectError::Mismatch(Box::new(Mismatch {
            expected,
            actual,
            location,
            promotion,
        })))
    }

    /// Returns `true` when output was written since the last check.
    #[must_use]
    pub fn has_unconsumed_output(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Output written since the last check.
    #[must_use]
    pub fn output(&self) -> &str {
        self.buffer.as_str()
    }

    /// Discards output written since the last check.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Failures recorded by [`expect`](Self::expect) so far.
    #[must_use]
    pub fn failures(&self) -> &[ExpectError] {
        &self.failures
    }

    /// Ends the test, applying the unconsumed-output rule and reporting
    /// recorded failures.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or [`ExpectError::Failed`] when there are
    /// several.
    pub fn finish(mut self) -> Result<(), ExpectError> {
        self.finished = true;
        match (self.unconsumed, self.buffer.is_empty()) {
            (UnconsumedOutput::Forbid, false) => {
                let output = self.buffer.take();
                self.failures.push(ExpectError::UnconsumedOutput { output });
            }
            (UnconsumedOutput::Require, true) => {
                self.failures.push(ExpectError::MissingUnconsumedOutput);
            }
            _ => self.buffer.clear(),
        }

        let mut failures = std::mem::take(&mut self.failures);
        if failures.len() > 1 {
            return Err(ExpectError::Failed { failures });
        }
        failures.pop().map_or(Ok(()), Err)
    }
}

impl fmt::Write for ExpectTest<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

impl Drop for ExpectTest<'_> {
    fn drop(&mut self) {
        if self.finished || self.failures.is_empty() || std::thread::panicking() {
            return;
        }
        let report = ExpectError::Failed {
            failures: std::mem::take(&mut self.failures),
        };
        panic!("expectation test dropped without finish():\n{report}");
    }
}
