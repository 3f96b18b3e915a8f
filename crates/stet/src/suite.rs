//! Suites of expectation tests and per-test options.

use camino::Utf8PathBuf;
use once_cell::sync::Lazy;
use stet_config::{Config, ConfigError, PromotionPolicy};
use thiserror::Error;

use crate::error::ExpectError;
use crate::expect::{ExpectTest, UnconsumedOutput};
use crate::location::SourceLocation;
use crate::promote::{PromotionOutcome, PromotionRequest, Promoter};
use crate::resolve::SourceResolver;
use crate::telemetry::{self, TelemetryError};
use crate::tracker::EditRegistry;

static GLOBAL: Lazy<Result<ExpectTests, SetupError>> = Lazy::new(ExpectTests::discover_with_telemetry);

/// Errors raised while building the process-wide suite.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The environment holds invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Logging was requested but could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// A group of expectation tests sharing configuration and edit state.
///
/// Every promotion of a suite goes through one [`EditRegistry`], so suites
/// that promote into the same files must be the same suite. Most code uses
/// [`ExpectTests::global`].
#[derive(Debug)]
pub struct ExpectTests {
    config: Config,
    suite_promote: Option<bool>,
    resolver: SourceResolver,
    promoter: Promoter,
}

impl ExpectTests {
    /// Creates a suite from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let resolver = SourceResolver::new(config.source_root.clone());
        Self {
            config,
            suite_promote: None,
            resolver,
            promoter: Promoter::new(),
        }
    }

    /// Creates a suite configured from `.stet.toml` and `STET_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a file or variable holds an invalid value.
    pub fn discover() -> Result<Self, ConfigError> {
        Config::discover().map(Self::new)
    }

    /// The process-wide suite, built from the environment on first use.
    ///
    /// Logging is installed when `STET_LOG_FILTER` is set. An already installed
    /// global subscriber is left in place.
    ///
    /// # Errors
    ///
    /// Returns the setup error on every call if the environment holds invalid
    /// configuration.
    pub fn global() -> Result<&'static Self, &'static SetupError> {
        Lazy::force(&GLOBAL).as_ref()
    }

    fn discover_with_telemetry() -> Result<Self, SetupError> {
        let config = Config::discover()?;
        if config.logging_enabled() {
            match telemetry::initialise(&config) {
                Ok(_) | Err(TelemetryError::Subscriber(_)) => {}
                Err(error) => return Err(error.into()),
            }
        }
        Ok(Self::new(config))
    }

    /// Overrides the run-wide promotion default for this suite.
    #[must_use]
    pub const fn promote(mut self, promote: bool) -> Self {
        self.suite_promote = Some(promote);
        self
    }

    /// Resolves call-site paths against `root`.
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.resolver = SourceResolver::new(Some(root.into()));
        self
    }

    /// Replaces the source resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: SourceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The configuration the suite was built from.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The promotion policy with the suite layer applied.
    #[must_use]
    pub const fn policy(&self) -> PromotionPolicy {
        self.config.promotion_policy().with_suite(self.suite_promote)
    }

    /// The registry tracking edits made by this suite.
    #[must_use]
    pub const fn registry(&self) -> &EditRegistry {
        self.promoter.registry()
    }

    /// Starts configuring a test.
    #[must_use]
    pub const fn test(&self) -> TestOptions<'_> {
        TestOptions {
            suite: self,
            promote: None,
            unconsumed: UnconsumedOutput::Forbid,
        }
    }

    /// Rewrites the literal passed to `method` at `location` so that it holds
    /// `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpectError::UnresolvableLiteral`] when the literal cannot
    /// be found or rewritten, and [`ExpectError::Io`] for I/O failures.
    pub fn promote_literal(
        &self,
        location: &SourceLocation,
        method: &str,
        value: &str,
    ) -> Result<PromotionOutcome, ExpectError> {
        let promote = || {
            let path = self.resolver.resolve(location.file())?;
            self.promoter.promote(PromotionRequest {
                path: &path,
                site: location.position(),
                method,
                value,
            })
        };
        promote().map_err(|error| ExpectError::from_promotion(location, error))
    }
}

/// Per-test options, created by [`ExpectTests::test`].
#[derive(Debug, Clone, Copy)]
pub struct TestOptions<'s> {
    suite: &'s ExpectTests,
    promote: Option<bool>,
    unconsumed: UnconsumedOutput,
}

impl<'s> TestOptions<'s> {
    /// Overrides promotion for this test only.
    #[must_use]
    pub const fn promote(mut self, promote: bool) -> Self {
        self.promote = Some(promote);
        self
    }

    /// Discards output left over at the end of the test.
    #[must_use]
    pub const fn allow_unconsumed_output(mut self) -> Self {
        self.unconsumed = UnconsumedOutput::Allow;
        self
    }

    /// Requires output to be left over at the end of the test.
    #[must_use]
    pub const fn expect_unconsumed_output(mut self) -> Self {
        self.unconsumed = UnconsumedOutput::Require;
        self
    }

    /// Starts the test. Call [`ExpectTest::finish`] when done.
    #[must_use]
    pub const fn start(self) -> ExpectTest<'s> {
        let promote = self.suite.policy().with_test(self.promote).promote();
        ExpectTest::new(self.suite, promote, self.unconsumed)
    }

    /// Runs `body` as a test and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns the failures reported by [`ExpectTest::finish`].
    pub fn try_run<F>(self, body: F) -> Result<(), ExpectError>
    where
        F: FnOnce(&mut ExpectTest<'s>),
    {
        let mut test = self.start();
        body(&mut test);
        test.finish()
    }

    /// Runs `body` as a test.
    ///
    /// # Panics
    ///
    /// Panics with the failure report when the test fails.
    pub fn run<F>(self, body: F)
    where
        F: FnOnce(&mut ExpectTest<'s>),
    {
        if let Err(error) = self.try_run(body) {
            panic!("{error}");
        }
    }
}
