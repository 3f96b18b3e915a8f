//! Output accumulated between two checks.

use std::fmt;

/// Append-only text buffer for the open expectation cycle.
///
/// Text is stored exactly as written: no separators, no trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectationBuffer {
    text: String,
}

impl ExpectationBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Appends `text`.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// The accumulated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` when nothing was written since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the accumulated text and resets the buffer.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    /// Discards the accumulated text.
    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl fmt::Write for ExpectationBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}
