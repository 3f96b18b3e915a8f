use crate::logging::LogFormat;

/// Program name handed to the configuration loader in place of real arguments.
pub const PROGRAM_NAME: &str = "stet";

/// Environment variable enabling promotion for the whole run.
pub const PROMOTE_ENV: &str = "STET_PROMOTE";

/// Environment variable overriding the directory call-site paths resolve from.
pub const SOURCE_ROOT_ENV: &str = "STET_SOURCE_ROOT";

/// Environment variable holding the log filter. Logging stays off when unset.
pub const LOG_FILTER_ENV: &str = "STET_LOG_FILTER";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "STET_LOG_FORMAT";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "STET_CONFIG_PATH";

/// Log filter used when `STET_LOG_FILTER` is set but blank.
pub const DEFAULT_LOG_FILTER: &str = "stet=info";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Promotion is opt-in.
#[must_use]
pub const fn default_promote() -> bool {
    false
}
