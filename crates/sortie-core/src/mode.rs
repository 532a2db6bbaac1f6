//! Actor mode: which device class a session impersonates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::counters::Channel;

const MOBILE_CHANNELS: &[Channel] = &[Channel::Mobile];
const DESKTOP_CHANNELS: &[Channel] = &[Channel::Desktop, Channel::DesktopSecondary];

/// Device class of a search session.
///
/// Mobile and desktop sessions for the same account are independent: each
/// owns its own browser surfaces and its own session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// Mobile user agent; only `mobileSearch[0]` counts.
    Mobile,
    /// Desktop user agent; `pcSearch[0]` and `pcSearch[1]` count.
    Desktop,
}

impl SearchMode {
    /// Counter channels that make up this mode's deficit.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Self::Mobile => MOBILE_CHANNELS,
            Self::Desktop => DESKTOP_CHANNELS,
        }
    }

    /// Whether this is the mobile mode.
    pub fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }

    /// Lowercase label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sets_do_not_overlap() {
        for channel in SearchMode::Mobile.channels() {
            assert!(!SearchMode::Desktop.channels().contains(channel));
        }
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_value(SearchMode::Desktop).unwrap(),
            serde_json::json!("desktop")
        );
        let mode: SearchMode = serde_json::from_str("\"mobile\"").unwrap();
        assert!(mode.is_mobile());
    }

    #[test]
    fn display_matches_label() {
        assert_eq!(SearchMode::Mobile.to_string(), "mobile");
    }
}
