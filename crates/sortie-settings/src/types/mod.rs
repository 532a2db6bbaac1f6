//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so partial
//! JSON is accepted and missing fields take their production default.

mod queries;
mod search;

pub use queries::*;
pub use search::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "search": { "clickRandomResults": false, "searchDelay": { "min": "10s", "max": "30s" } },
///   "queries": { "useTrends": true },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortieSettings {
    /// Search engine behavior: engagement toggles, delays, thresholds, timings.
    pub search: SearchSettings,
    /// Candidate query sources.
    pub queries: QuerySettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl SortieSettings {
    /// Correct invalid invariants in place.
    ///
    /// Called during loading. Invalid values are corrected with a warning
    /// rather than rejected.
    pub fn validate(&mut self) {
        self.search.validate();
        self.queries.validate();
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of the compact format.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serialize_camel_case() {
        let json = serde_json::to_value(SortieSettings::default()).unwrap();
        assert!(json["search"].get("scrollRandomResults").is_some());
        assert!(json["search"].get("retryMobileSearchAmount").is_some());
        assert!(json["queries"].get("maxSeedRounds").is_some());
        assert_eq!(json["logging"]["level"], "info");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: SortieSettings =
            serde_json::from_str(r#"{"logging": {"json": true}}"#).unwrap();
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.search.stall_limit, 10);
    }

    #[test]
    fn serde_roundtrip_preserves_values() {
        let mut settings = SortieSettings::default();
        settings.search.click_random_results = false;
        settings.queries.gains_limit = 4;
        let json = serde_json::to_string(&settings).unwrap();
        let back: SortieSettings = serde_json::from_str(&json).unwrap();
        assert!(!back.search.click_random_results);
        assert_eq!(back.queries.gains_limit, 4);
    }
}
