//! Test suites for the stet expectation engine.
