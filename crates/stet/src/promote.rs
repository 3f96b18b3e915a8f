//! Rewriting expected literals on disk.
//!
//! A promotion runs entirely under the per-file lock of the
//! [`EditRegistry`]: correct the call site, re-read the file, locate the
//! literal, render the replacement, splice it in, check the result still
//! parses, write it atomically and record the edit. Nothing outside the
//! literal's bytes changes.

use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use stet_syntax::{
    Delimiter, Layout, LineEnding, LiteralSpan, Located, Position, SyntacticCheck, encode,
    encode_inline, locate, position_after, position_at,
};
use tracing::{debug, info};

use crate::error::PromoteError;
use crate::tracker::{AppliedEdit, EditRegistry};

/// Extra indentation given to a block created from an inline literal.
const BLOCK_INDENT: usize = 4;

/// A request to make the literal at a call site hold `value`.
#[derive(Debug, Clone, Copy)]
pub struct PromotionRequest<'a> {
    /// Resolved path of the source file.
    pub path: &'a Path,
    /// Call-site position captured at compile time.
    pub site: Position,
    /// Name of the expectation method called at the site.
    pub method: &'a str,
    /// The new logical value.
    pub value: &'a str,
}

/// Result of a successful promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The literal was rewritten.
    Written {
        /// Canonical path of the rewritten file.
        path: PathBuf,
        /// The edit, as recorded in the tracker.
        edit: AppliedEdit,
    },
    /// The literal already renders the value; nothing was written.
    Unchanged {
        /// Canonical path of the file.
        path: PathBuf,
    },
}

impl PromotionOutcome {
    /// Canonical path of the file the promotion targeted.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path, .. } | Self::Unchanged { path } => path,
        }
    }
}

/// Commits literal replacements and tracks their effect on later call sites.
#[derive(Debug, Default)]
pub struct Promoter {
    registry: EditRegistry,
    check: SyntacticCheck,
}

impl Promoter {
    /// Creates a promoter with an empty edit registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The edit registry shared by every promotion of this promoter.
    #[must_use]
    pub const fn registry(&self) -> &EditRegistry {
        &self.registry
    }

    /// Rewrites the literal at the request's call site.
    ///
    /// # Errors
    ///
    /// Returns [`PromoteError::Unresolvable`] when no plain literal sits at the
    /// call site, [`PromoteError::SyntaxRejected`] when the rewritten file
    /// would not parse, and I/O errors from reading or writing the file. The
    /// file is untouched whenever an error is returned.
    pub fn promote(&self, request: PromotionRequest<'_>) -> Result<PromotionOutcome, PromoteError> {
        let path = fs::canonicalize(request.path)
            .map_err(|err| PromoteError::file_read(request.path, &err))?;
        let file = self.registry.file(&path)?;
        let mut delta = file.lock().map_err(|_| PromoteError::LockPoisoned { path: path.clone() })?;

        let site = delta.correct(request.site);
        let content = fs::read_to_string(&path).map_err(|err| PromoteError::file_read(&path, &err))?;
        let span = match locate(&content, site, request.method) {
            Located::Literal(span) => span,
            other => {
                debug!(
                    target: "stet::promote",
                    path = %path.display(),
                    site = %site,
                    outcome = ?other,
                    "no literal to promote"
                );
                return Err(PromoteError::Unresolvable {
                    path,
                    site,
                    reason: other.describe().to_owned(),
                });
            }
        };

        let replacement = render(&content, &span, request.value);
        if span.text(&content) == Some(replacement.as_str()) {
            debug!(target: "stet::promote", path = %path.display(), site = %site, "literal already up to date");
            return Ok(PromotionOutcome::Unchanged { path });
        }
        let updated = splice(&content, &span, &replacement)?;

        let introduced = self.check.introduced_errors(&path, &content, &updated)?;
        if !introduced.is_empty() {
            return Err(PromoteError::SyntaxRejected {
                path,
                failures: introduced,
            });
        }

        write_atomically(&path, &updated)?;
        let edit = AppliedEdit {
            site,
            old_end: position_at(&content, span.end),
            new_end: position_after(position_at(&content, span.start), &replacement),
        };
        delta.record(edit);
        info!(
            target: "stet::promote",
            path = %path.display(),
            site = %site,
            original_site = %request.site,
            line_shift = delta.line_shift(),
            "promoted expectation"
        );
        Ok(PromotionOutcome::Written { path, edit })
    }
}

/// Renders the replacement literal for `span`.
///
/// Blocks keep their delimiter style and indentation. Inline literals stay
/// inline unless the value spans lines, in which case they become raw blocks
/// indented one level deeper than the line holding the literal.
fn render(content: &str, span: &LiteralSpan, value: &str) -> String {
    let line_ending = LineEnding::detect(content);
    match span.layout {
        Layout::Block => encode(value, span.indent_column, span.delimiter, line_ending),
        Layout::Inline if value.contains('\n') => {
            let indent = line_indent(content, span.start) + BLOCK_INDENT;
            encode(value, indent, Delimiter::Raw { hashes: 1 }, line_ending)
        }
        Layout::Inline => encode_inline(value, span.delimiter),
    }
}

/// Width of the leading whitespace on the line containing `offset`.
fn line_indent(content: &str, offset: usize) -> usize {
    let before = content.get(..offset).unwrap_or(content);
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    before
        .get(line_start..)
        .unwrap_or_default()
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

fn splice(content: &str, span: &LiteralSpan, replacement: &str) -> Result<String, PromoteError> {
    let (Some(before), Some(after)) = (content.get(..span.start), content.get(span.end..)) else {
        return Err(PromoteError::Syntax(stet_syntax::SyntaxError::internal_error(
            "literal span is out of bounds",
        )));
    };
    let mut updated = String::with_capacity(before.len() + replacement.len() + after.len());
    updated.push_str(before);
    updated.push_str(replacement);
    updated.push_str(after);
    Ok(updated)
}

/// Replaces `path` with `content` through a temporary file in the same
/// directory, so readers see either the old or the new file.
fn write_atomically(path: &Path, content: &str) -> Result<(), PromoteError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)
        .map_err(|err| PromoteError::file_write(path, &err))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|err| PromoteError::file_write(path, &err))?;
    if let Ok(metadata) = fs::metadata(path) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|err| PromoteError::file_write(path, &err))?;
    }
    temp_file
        .persist(path)
        .map_err(|err| PromoteError::file_write(path, &err.error))?;
    Ok(())
}
