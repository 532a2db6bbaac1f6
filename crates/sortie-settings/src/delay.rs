//! Human-friendly delay values.
//!
//! Delays in the settings file may be plain numbers (milliseconds) or
//! strings with a unit suffix: `"500ms"`, `"5s"`, `"3min"`, `"1.5h"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// A delay given either in milliseconds or as a string with a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelayValue {
    /// Milliseconds.
    Millis(u64),
    /// A duration string such as `"3min"`.
    Text(String),
}

impl DelayValue {
    /// Resolve to milliseconds.
    pub fn to_millis(&self) -> Result<u64> {
        match self {
            Self::Millis(ms) => Ok(*ms),
            Self::Text(text) => parse_duration_ms(text)
                .ok_or_else(|| SettingsError::InvalidValue(format!("unparseable delay {text:?}"))),
        }
    }
}

impl fmt::Display for DelayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}ms"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Parse a duration string into milliseconds.
///
/// A bare number is milliseconds. Recognized units (case-insensitive):
/// `ms`, `s`/`sec`/`seconds`, `m`/`min`/`minutes`, `h`/`hr`/`hours`.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn parse_duration_ms(value: &str) -> Option<u64> {
    let value = value.trim().to_lowercase();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }

    let factor = match unit.trim() {
        "" | "ms" | "msec" | "millis" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        _ => return None,
    };
    Some((number * factor).round() as u64)
}
