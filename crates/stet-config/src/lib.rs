//! Configuration for stet expectation tests.
//!
//! [`Config`] is layered by `ortho_config`: defaults, then `.stet.toml`
//! (or the file named by `STET_CONFIG_PATH`), then `STET_*` variables, then
//! command-line flags. Expectation tests run inside the test harness, which
//! owns the real process arguments, so [`Config::discover`] hands the loader
//! a bare program name and only files and the environment take effect:
//!
//! | variable           | meaning                                         |
//! |--------------------|-------------------------------------------------|
//! | `STET_PROMOTE`     | rewrite mismatching literals (`1`/`0`, ...)     |
//! | `STET_SOURCE_ROOT` | directory call-site paths are relative to       |
//! | `STET_LOG_FILTER`  | tracing filter; logging is off when unset       |
//! | `STET_LOG_FORMAT`  | `compact` (default) or `json`                   |

mod defaults;
mod error;
mod logging;
mod policy;
mod switch;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    CONFIG_PATH_ENV, DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LOG_FORMAT_ENV, PROGRAM_NAME, PROMOTE_ENV,
    SOURCE_ROOT_ENV, default_log_filter, default_log_format, default_promote,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
pub use policy::PromotionPolicy;
pub use switch::{Switch, deserialize_switch};

/// Run-wide configuration for expectation tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(prefix = "STET")]
pub struct Config {
    /// Whether mismatching expectations rewrite their literals by default.
    #[ortho_config(default = default_promote())]
    #[serde(deserialize_with = "deserialize_switch")]
    pub promote: bool,
    /// Directory that call-site paths are resolved against, when set.
    pub source_root: Option<Utf8PathBuf>,
    /// Tracing filter. `None` leaves logging uninstalled.
    pub log_filter: Option<String>,
    /// Format of emitted log lines.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            promote: default_promote(),
            source_root: None,
            log_filter: None,
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from configuration files and `STET_*` variables.
    ///
    /// The test harness's own arguments are never parsed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a file or variable holds an invalid
    /// value.
    pub fn discover() -> Result<Self, ConfigError> {
        Self::load_from_iter([PROGRAM_NAME]).map_err(ConfigError::from)
    }

    /// Returns `true` when a log filter is configured.
    #[must_use]
    pub const fn logging_enabled(&self) -> bool {
        self.log_filter.is_some()
    }

    /// Returns the configured log filter, or the default one when it is
    /// unset or blank.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        match self.log_filter.as_deref() {
            Some(filter) if !filter.trim().is_empty() => filter,
            _ => DEFAULT_LOG_FILTER,
        }
    }

    /// Starts a promotion policy from the run-wide default.
    #[must_use]
    pub const fn promotion_policy(&self) -> PromotionPolicy {
        PromotionPolicy::new(self.promote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    fn load_with_file(toml: &str) -> (TempDir, Result<Config, ConfigError>) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("stet.toml");
        fs::write(&path, toml).expect("write config");
        let args = vec![
            OsString::from(PROGRAM_NAME),
            OsString::from("--config-path"),
            path.into_os_string(),
        ];
        let result = Config::load_from_iter(args).map_err(ConfigError::from);
        (dir, result)
    }

    #[test]
    fn file_values_are_loaded() {
        let (_dir, result) = load_with_file(concat!(
            "promote = true\n",
            "source_root = \"/work/project\"\n",
            "log_filter = \"stet=debug\"\n",
            "log_format = \"json\"\n",
        ));
        let config = result.expect("config");
        assert!(config.promote);
        assert_eq!(config.source_root, Some(Utf8PathBuf::from("/work/project")));
        assert_eq!(config.log_filter(), "stet=debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[rstest]
    #[case("promote = \"yes\"\n", true)]
    #[case("promote = \"off\"\n", false)]
    #[case("promote = 1\n", true)]
    #[case("promote = \"\"\n", false)]
    fn promote_accepts_switch_spellings(#[case] toml: &str, #[case] expected: bool) {
        let (_dir, result) = load_with_file(toml);
        assert_eq!(result.expect("config").promote, expected);
    }

    #[test]
    fn invalid_switch_fails_to_load() {
        let (_dir, result) = load_with_file("promote = \"maybe\"\n");
        let err = result.expect_err("invalid switch");
        assert!(matches!(err, ConfigError::Load { .. }));
        assert!(err.to_string().contains("failed to load stet configuration"));
    }

    #[test]
    fn invalid_log_format_flag_fails_to_load() {
        let args = [PROGRAM_NAME, "--log-format", "pretty"];
        assert!(Config::load_from_iter(args).is_err());
    }

    #[rstest]
    #[case(None, false, DEFAULT_LOG_FILTER)]
    #[case(Some(""), true, DEFAULT_LOG_FILTER)]
    #[case(Some("   "), true, DEFAULT_LOG_FILTER)]
    #[case(Some("stet=trace"), true, "stet=trace")]
    fn log_filter_falls_back_when_blank(
        #[case] filter: Option<&str>,
        #[case] enabled: bool,
        #[case] effective: &str,
    ) {
        let config = Config {
            log_filter: filter.map(str::to_owned),
            ..Config::default()
        };
        assert_eq!(config.logging_enabled(), enabled);
        assert_eq!(config.log_filter(), effective);
    }

    #[test]
    fn partial_serialised_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"promote": true}"#).expect("deserialise");
        assert!(config.promote);
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.source_root, None);
    }

    #[test]
    fn policy_starts_from_config() {
        let config = Config {
            promote: true,
            ..Config::default()
        };
        assert!(config.promotion_policy().promote());
        assert!(!config.promotion_policy().with_test(Some(false)).promote());
    }
}
