use serde::{Deserialize, Serialize};

/// Whether a mismatching expectation rewrites its literal.
///
/// The decision is layered: a run-wide default, an optional suite override
/// and an optional per-test override. The most specific layer that is set
/// wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PromotionPolicy {
    global: bool,
    suite: Option<bool>,
    test: Option<bool>,
}

impl PromotionPolicy {
    /// Creates a policy from the run-wide default.
    #[must_use]
    pub const fn new(global: bool) -> Self {
        Self {
            global,
            suite: None,
            test: None,
        }
    }

    /// Sets or clears the suite override.
    #[must_use]
    pub const fn with_suite(mut self, promote: Option<bool>) -> Self {
        self.suite = promote;
        self
    }

    /// Sets or clears the per-test override.
    #[must_use]
    pub const fn with_test(mut self, promote: Option<bool>) -> Self {
        self.test = promote;
        self
    }

    /// Resolves the layers into a single decision.
    #[must_use]
    pub const fn promote(self) -> bool {
        match (self.test, self.suite) {
            (Some(promote), _) | (None, Some(promote)) => promote,
            (None, None) => self.global,
        }
    }
}
