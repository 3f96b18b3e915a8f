use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How stet renders its promotion and comparison events.
///
/// Parsed from `STET_LOG_FORMAT` or `--log-format`, ignoring ASCII case on
/// the command line.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with fields flattened, for CI log capture.
    Json,
    /// One short line per event, printed between test results.
    #[default]
    Compact,
}

/// Rejection of an unknown `STET_LOG_FORMAT` spelling.
pub type LogFormatParseError = strum::ParseError;
