//! Per-file record of promotions committed during the run.
//!
//! Call sites are captured when the test binary is compiled, so once a
//! promotion rewrites part of a file every later call site in that file is
//! stale. Each file keeps an ordered log of the edits applied to it; a stale
//! position is corrected by replaying the log over it. The log is replayed in
//! commit order, so promotions that happen out of source order (parallel
//! tests, or a loop that revisits an earlier call) still correct exactly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use stet_syntax::Position;

use crate::error::PromoteError;

/// One literal replacement, in the coordinates of the content it edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEdit {
    /// Corrected position of the call whose literal was replaced.
    pub site: Position,
    /// Position just past the replaced literal, before the write.
    pub old_end: Position,
    /// Position just past the new literal, after the write.
    pub new_end: Position,
}

impl AppliedEdit {
    /// Maps a position from the content before this edit to the content
    /// after it.
    ///
    /// Positions before the end of the replaced literal are unchanged.
    /// Positions after it move with the literal's end: by the line delta,
    /// and on the literal's last line also by the column delta.
    #[must_use]
    pub const fn map(&self, position: Position) -> Position {
        if position.line < self.old_end.line
            || (position.line == self.old_end.line && position.column < self.old_end.column)
        {
            return position;
        }
        let line = self
            .new_end
            .line
            .saturating_add(position.line - self.old_end.line);
        if position.line == self.old_end.line {
            let column = self
                .new_end
                .column
                .saturating_add(position.column - self.old_end.column);
            Position::new(line, column)
        } else {
            Position::new(line, position.column)
        }
    }

    fn line_delta(&self) -> i64 {
        i64::from(self.new_end.line) - i64::from(self.old_end.line)
    }
}

/// The cumulative effect of every promotion applied to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDelta {
    edits: Vec<AppliedEdit>,
    line_shift: i64,
    last_edited_line: Option<u32>,
    column_shift_on_last_edited_line: i64,
}

impl EditDelta {
    /// Maps a compile-time call-site position to the current content.
    #[must_use]
    pub fn correct(&self, position: Position) -> Position {
        self.edits
            .iter()
            .fold(position, |current, edit| edit.map(current))
    }

    /// Records a committed edit.
    ///
    /// Must be called exactly once per successful write, with positions
    /// taken from the content the edit applied to.
    pub fn record(&mut self, edit: AppliedEdit) {
        self.line_shift += edit.line_delta();
        self.last_edited_line = Some(edit.site.line);
        self.column_shift_on_last_edited_line =
            if edit.old_end.line == edit.site.line && edit.new_end.line == edit.site.line {
                i64::from(edit.new_end.column) - i64::from(edit.old_end.column)
            } else {
                0
            };
        self.edits.push(edit);
    }

    /// Net change in the file's line count.
    #[must_use]
    pub const fn line_shift(&self) -> i64 {
        self.line_shift
    }

    /// Line of the call whose literal was most recently rewritten.
    #[must_use]
    pub const fn last_edited_line(&self) -> Option<u32> {
        self.last_edited_line
    }

    /// Column change the most recent edit caused on its own call line.
    ///
    /// Zero when the edit changed the literal's line count.
    #[must_use]
    pub const fn column_shift_on_last_edited_line(&self) -> i64 {
        self.column_shift_on_last_edited_line
    }

    /// The committed edits, in commit order.
    #[must_use]
    pub fn edits(&self) -> &[AppliedEdit] {
        &self.edits
    }
}

/// Shared, lockable edit state of one file.
pub type FileDelta = Arc<Mutex<EditDelta>>;

/// Process-wide map from source file to its [`EditDelta`].
///
/// Entries are created lazily. The per-file mutex serialises promotions into
/// the same file while different files proceed independently.
#[derive(Debug, Default)]
pub struct EditRegistry {
    files: Mutex<HashMap<PathBuf, FileDelta>>,
}

impl EditRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the edit state for `path`, creating it on first use.
    ///
    /// Callers pass canonical paths so that one file never has two entries.
    ///
    /// # Errors
    ///
    /// Returns [`PromoteError::LockPoisoned`] if the registry lock is poisoned.
    pub fn file(&self, path: &Path) -> Result<FileDelta, PromoteError> {
        let mut files = self.files.lock().map_err(|_| PromoteError::LockPoisoned {
            path: path.to_path_buf(),
        })?;
        Ok(Arc::clone(files.entry(path.to_path_buf()).or_default()))
    }

    /// Returns a copy of the edit state for `path`, if any edit was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`PromoteError::LockPoisoned`] if a lock is poisoned.
    pub fn snapshot(&self, path: &Path) -> Result<Option<EditDelta>, PromoteError> {
        let poisoned = || PromoteError::LockPoisoned {
            path: path.to_path_buf(),
        };
        let files = self.files.lock().map_err(|_| poisoned())?;
        let Some(file) = files.get(path) else {
            return Ok(None);
        };
        let delta = file.lock().map_err(|_| poisoned())?;
        Ok(Some(delta.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn edit(site: (u32, u32), old_end: (u32, u32), new_end: (u32, u32)) -> AppliedEdit {
        AppliedEdit {
            site: Position::new(site.0, site.1),
            old_end: Position::new(old_end.0, old_end.1),
            new_end: Position::new(new_end.0, new_end.1),
        }
    }

    #[rstest]
    #[case((3, 7), (3, 7))]
    #[case((5, 11), (5, 11))]
    #[case((5, 12), (8, 11))]
    #[case((5, 30), (8, 29))]
    #[case((9, 7), (12, 7))]
    fn map_shifts_positions_after_the_literal(
        #[case] before: (u32, u32),
        #[case] after: (u32, u32),
    ) {
        // Literal ending at 5:12 grows into a block ending at 8:11.
        let edit = edit((4, 7), (5, 12), (8, 11));
        assert_eq!(
            edit.map(Position::new(before.0, before.1)),
            Position::new(after.0, after.1)
        );
    }

    #[test]
    fn sequential_edits_accumulate_line_shift() {
        let mut delta = EditDelta::default();
        // First 10-line expectation at line 5 grows by 3 lines.
        delta.record(edit((5, 7), (15, 11), (18, 11)));
        assert_eq!(delta.correct(Position::new(20, 7)), Position::new(23, 7));
        assert_eq!(delta.correct(Position::new(5, 7)), Position::new(5, 7));
        assert_eq!(delta.line_shift(), 3);
        assert_eq!(delta.last_edited_line(), Some(5));
        assert_eq!(delta.column_shift_on_last_edited_line(), 0);

        // Second expectation, now at line 23, shrinks by one line.
        delta.record(edit((23, 7), (33, 11), (32, 11)));
        assert_eq!(delta.correct(Position::new(40, 7)), Position::new(42, 7));
        assert_eq!(delta.line_shift(), 2);
        assert_eq!(delta.last_edited_line(), Some(23));
    }

    #[test]
    fn out_of_order_edits_only_shift_later_sites() {
        let mut delta = EditDelta::default();
        // The later expectation is promoted first.
        delta.record(edit((20, 7), (30, 11), (35, 11)));
        assert_eq!(delta.correct(Position::new(5, 7)), Position::new(5, 7));
        // Then the earlier one, which pushes everything below it down.
        delta.record(edit((5, 7), (15, 11), (17, 11)));
        assert_eq!(delta.correct(Position::new(20, 7)), Position::new(22, 7));
        assert_eq!(delta.correct(Position::new(40, 7)), Position::new(47, 7));
    }

    #[test]
    fn same_line_edits_shift_columns() {
        let mut delta = EditDelta::default();
        // `t.expect("a"); t.expect("b");` where "a" becomes "abc".
        delta.record(edit((1, 3), (1, 13), (1, 15)));
        assert_eq!(delta.correct(Position::new(1, 18)), Position::new(1, 20));
        assert_eq!(delta.column_shift_on_last_edited_line(), 2);
    }

    #[test]
    fn same_line_edits_replay_in_commit_order() {
        let mut delta = EditDelta::default();
        // Second call on the line turns into a block first...
        delta.record(edit((1, 18), (1, 28), (3, 11)));
        // ...then the first call's literal grows by two columns.
        delta.record(edit((1, 3), (1, 13), (1, 15)));
        assert_eq!(delta.correct(Position::new(1, 18)), Position::new(1, 20));
        assert_eq!(delta.correct(Position::new(1, 30)), Position::new(3, 13));
    }

    #[test]
    fn registry_shares_state_per_path() {
        let registry = EditRegistry::new();
        let path = Path::new("/src/tests/demo.rs");
        registry
            .file(path)
            .expect("file")
            .lock()
            .expect("lock")
            .record(edit((1, 1), (2, 1), (4, 1)));
        let snapshot = registry.snapshot(path).expect("snapshot").expect("recorded");
        assert_eq!(snapshot.line_shift(), 2);
        assert!(registry.snapshot(Path::new("/other.rs")).expect("snapshot").is_none());
    }
}
