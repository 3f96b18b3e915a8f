use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// An on/off value read from the environment.
///
/// Accepts the usual spellings (`1`, `true`, `yes`, `on` and their
/// negatives), ignoring ASCII case.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Switch {
    /// Enabled.
    #[strum(to_string = "on", serialize = "1", serialize = "true", serialize = "yes")]
    On,
    /// Disabled.
    #[strum(to_string = "off", serialize = "0", serialize = "false", serialize = "no")]
    Off,
}

impl Switch {
    /// Returns `true` for [`Switch::On`].
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for Switch {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Deserialises a flag from a boolean, `0`/`1` or a [`Switch`] spelling.
///
/// Blank text counts as off, so an exported but empty variable disables the
/// flag.
///
/// # Errors
///
/// Returns a custom deserialiser error for any other value.
pub fn deserialize_switch<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    let invalid = |value: &dyn std::fmt::Display| {
        D::Error::custom(format!(
            "`{value}` is not a valid switch; use 1/0, true/false, yes/no or on/off"
        ))
    };
    match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => Ok(value),
        Raw::Int(0) => Ok(false),
        Raw::Int(1) => Ok(true),
        Raw::Int(other) => Err(invalid(&other)),
        Raw::Text(text) if text.trim().is_empty() => Ok(false),
        Raw::Text(text) => Switch::from_str(text.trim())
            .map(Switch::is_on)
            .map_err(|_| invalid(&text)),
    }
}
