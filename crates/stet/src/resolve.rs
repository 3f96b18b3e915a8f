//! Mapping call-site paths to files on disk.
//!
//! `Location::caller()` reports paths as the compiler saw them: relative to
//! the directory `rustc` ran in, which for workspace members is the
//! workspace root rather than the crate directory.

use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;

use crate::error::PromoteError;

/// Resolves call-site paths against a source root.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    root: Option<Utf8PathBuf>,
    search_from: Option<PathBuf>,
}

impl SourceResolver {
    /// Creates a resolver.
    ///
    /// With a `root`, relative paths are joined onto it. Without one, the
    /// resolver searches upwards from `CARGO_MANIFEST_DIR` (or the current
    /// directory) for the first ancestor containing the file.
    #[must_use]
    pub fn new(root: Option<Utf8PathBuf>) -> Self {
        let search_from = std::env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok());
        Self { root, search_from }
    }

    /// Overrides the directory the upward search starts from.
    #[must_use]
    pub fn with_search_start(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_from = Some(dir.into());
        self
    }

    /// The configured root, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Utf8PathBuf> {
        self.root.as_ref()
    }

    /// Returns the on-disk path of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`PromoteError::SourceNotFound`] when no candidate exists.
    pub fn resolve(&self, file: &Path) -> Result<PathBuf, PromoteError> {
        if file.is_absolute() {
            return existing(file.to_path_buf(), file);
        }
        if let Some(root) = &self.root {
            return existing(root.as_std_path().join(file), file);
        }

        let start = self.search_from.as_deref().ok_or_else(|| PromoteError::SourceNotFound {
            file: file.to_path_buf(),
            reason: String::from("neither CARGO_MANIFEST_DIR nor the current directory is available"),
        })?;
        start
            .ancestors()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| PromoteError::SourceNotFound {
                file: file.to_path_buf(),
                reason: format!(
                    "not found under {} or its parents; set STET_SOURCE_ROOT",
                    start.display()
                ),
            })
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new(None)
    }
}

fn existing(candidate: PathBuf, file: &Path) -> Result<PathBuf, PromoteError> {
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(PromoteError::SourceNotFound {
            file: file.to_path_buf(),
            reason: format!("{} does not exist", candidate.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let tests = dir.path().join("crates/demo/tests");
        fs::create_dir_all(&tests).expect("create dirs");
        fs::write(tests.join("usage.rs"), "fn main() {}\n").expect("write source");
        dir
    }

    #[test]
    fn searches_upwards_from_the_crate_directory() {
        let dir = workspace();
        let resolver = SourceResolver::new(None).with_search_start(dir.path().join("crates/demo"));
        let resolved = resolver
            .resolve(Path::new("crates/demo/tests/usage.rs"))
            .expect("resolve");
        assert_eq!(resolved, dir.path().join("crates/demo/tests/usage.rs"));
    }

    #[test]
    fn configured_root_takes_precedence() {
        let dir = workspace();
        let root = Utf8PathBuf::from_path_buf(dir.path().join("crates/demo")).expect("utf-8 path");
        let resolver = SourceResolver::new(Some(root)).with_search_start("/nonexistent");
        let resolved = resolver.resolve(Path::new("tests/usage.rs")).expect("resolve");
        assert_eq!(resolved, dir.path().join("crates/demo/tests/usage.rs"));
    }

    #[test]
    fn missing_files_are_reported() {
        let dir = workspace();
        let resolver = SourceResolver::new(None).with_search_start(dir.path());
        let error = resolver
            .resolve(Path::new("crates/other/tests/usage.rs"))
            .expect_err("missing file");
        assert!(matches!(error, PromoteError::SourceNotFound { .. }));
        assert!(error.is_unpromotable());
    }

    #[test]
    fn absolute_paths_are_used_as_is() {
        let dir = workspace();
        let path = dir.path().join("crates/demo/tests/usage.rs");
        let resolved = SourceResolver::default().resolve(&path).expect("resolve");
        assert_eq!(resolved, path);
    }
}
