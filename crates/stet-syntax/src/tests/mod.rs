//! Cross-module tests for stet-syntax.

mod unit;
