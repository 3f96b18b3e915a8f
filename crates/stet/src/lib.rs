//! Expectation tests that can rewrite their own expected values.
//!
//! A test writes output into an [`ExpectTest`] and compares it against a
//! string literal in the test source:
//!
//! ```ignore
//! #[stet::expect_test]
//! fn greets(t: &mut stet::ExpectTest) {
//!     t.println("Ok");
//!     t.print("Oops");
//!     t.expect(r#"
//!         Ok
//!         Oops
//!         "#);
//! }
//! ```
//!
//! Block literals are dedented by the indentation of their closing
//! delimiter line. When a comparison fails and promotion is enabled
//! (`STET_PROMOTE=1`), the literal at the call site is rewritten on disk so
//! that it holds the actual output. Several promotions into one file during
//! a single run are tracked so that later call sites still resolve to their
//! literals.
//!
//! The pieces are:
//!
//! - [`ExpectTests`]: the suite, holding configuration and the shared
//!   [`Promoter`]
//! - [`ExpectTest`]: one test's output buffer and checks
//! - [`Promoter`] and [`EditRegistry`]: on-disk literal rewriting and the
//!   per-file edit log

extern crate self as stet;

mod buffer;
mod error;
mod expect;
mod location;
mod promote;
mod resolve;
mod suite;
pub mod telemetry;
mod tracker;

pub use buffer::ExpectationBuffer;
pub use error::{ExpectError, Mismatch, PromoteError, Promotion};
pub use expect::{ExpectTest, UnconsumedOutput};
pub use location::SourceLocation;
pub use promote::{PromotionOutcome, PromotionRequest, Promoter};
pub use resolve::SourceResolver;
pub use stet_config::{Config, ConfigError, LogFormat, PromotionPolicy};
pub use stet_macros::expect_test;
pub use suite::{ExpectTests, SetupError, TestOptions};
pub use tracker::{AppliedEdit, EditDelta, EditRegistry, FileDelta};

#[cfg(test)]
mod tests;
