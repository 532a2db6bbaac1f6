//! Settings loading: compiled defaults, the user file, then `SORTIE_*`
//! environment overrides, then [`SortieSettings::validate`].
//!
//! The user file is overlaid onto the serialized defaults key by key, so a
//! file that only sets `{"search": {"stallLimit": 3}}` keeps every other
//! default. Nulls in the file are ignored.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::delay::{DelayValue, parse_duration_ms};
use crate::errors::{Result, SettingsError};
use crate::types::SortieSettings;

/// Explicit settings file location, overriding the home-directory default.
pub const SETTINGS_PATH_VAR: &str = "SORTIE_SETTINGS";

/// Where the settings file lives: `$SORTIE_SETTINGS`, else
/// `~/.sortie/settings.json`. `None` when neither is available.
pub fn settings_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(SETTINGS_PATH_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".sortie").join("settings.json"))
}

/// Load settings from [`settings_path`].
pub fn load_settings() -> Result<SortieSettings> {
    match settings_path() {
        Some(path) => load_settings_from_path(&path),
        None => {
            debug!("no home directory, using default settings");
            Ok(finish(SortieSettings::default()))
        }
    }
}

/// Load settings from `path`. A missing file yields defaults; unreadable or
/// malformed files are errors.
pub fn load_settings_from_path(path: &Path) -> Result<SortieSettings> {
    if !path.exists() {
        debug!(?path, "settings file not found, using defaults");
        return Ok(finish(SortieSettings::default()));
    }

    debug!(?path, "loading settings from file");
    let malformed = |source: serde_json::Error| SettingsError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let user: Value = serde_json::from_str(&content).map_err(malformed)?;
    if !user.is_object() {
        return Err(SettingsError::NotAnObject {
            path: path.to_path_buf(),
        });
    }

    let mut merged = serde_json::to_value(SortieSettings::default()).map_err(malformed)?;
    overlay(&mut merged, user);
    let settings = serde_json::from_value(merged).map_err(malformed)?;
    Ok(finish(settings))
}

fn finish(mut settings: SortieSettings) -> SortieSettings {
    apply_env_overrides(&mut settings);
    settings.validate();
    settings
}

/// Write `source` over `target`: objects merge per key, nulls are skipped,
/// anything else replaces the target value.
fn overlay(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                if value.is_null() {
                    continue;
                }
                match target_map.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        let _ = target_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Apply `SORTIE_*` overrides from the process environment.
pub fn apply_env_overrides(settings: &mut SortieSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply `SORTIE_*` overrides read through `lookup`. Invalid values are
/// ignored with a warning and the file or default value is kept.
pub fn apply_overrides(settings: &mut SortieSettings, lookup: impl Fn(&str) -> Option<String>) {
    let env = Overrides { lookup };

    // ── Search ──────────────────────────────────────────────────────
    if let Some(v) = env.flag("SORTIE_USE_GEO_LOCALE") {
        settings.search.use_geo_locale_queries = v;
    }
    if let Some(v) = env.flag("SORTIE_SCROLL_RANDOM_RESULTS") {
        settings.search.scroll_random_results = v;
    }
    if let Some(v) = env.flag("SORTIE_CLICK_RANDOM_RESULTS") {
        settings.search.click_random_results = v;
    }
    if let Some(v) = env.delay("SORTIE_SEARCH_DELAY_MIN") {
        settings.search.search_delay.min = v;
    }
    if let Some(v) = env.delay("SORTIE_SEARCH_DELAY_MAX") {
        settings.search.search_delay.max = v;
    }
    if let Some(v) = env.count("SORTIE_RETRY_MOBILE_SEARCHES", 0..=20) {
        settings.search.retry_mobile_search_amount = v;
    }
    if let Some(v) = env.text("SORTIE_HOME_LOCATION") {
        settings.search.home_location = v;
    }

    // ── Queries ─────────────────────────────────────────────────────
    if let Some(v) = env.text("SORTIE_SUGGESTIONS_URL") {
        settings.queries.suggestions_url = v;
    }
    if let Some(v) = env.text("SORTIE_TRENDS_URL") {
        settings.queries.trends_url = v;
    }
    if let Some(v) = env.flag("SORTIE_USE_TRENDS") {
        settings.queries.use_trends = v;
    }
    if let Some(v) = env.text("SORTIE_FALLBACK_COUNTRY") {
        settings.queries.fallback_country = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.text("SORTIE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.flag("SORTIE_LOG_JSON") {
        settings.logging.json = v;
    }
}

/// Typed reads over a variable lookup.
struct Overrides<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Overrides<F> {
    fn text(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn flag(&self, name: &str) -> Option<bool> {
        let raw = self.text(name)?;
        let parsed = parse_bool(&raw);
        if parsed.is_none() {
            warn!(key = name, value = %raw, "invalid boolean override, ignoring");
        }
        parsed
    }

    fn count(&self, name: &str, range: RangeInclusive<u32>) -> Option<u32> {
        let raw = self.text(name)?;
        let parsed = parse_u32_in(&raw, &range);
        if parsed.is_none() {
            warn!(
                key = name,
                value = %raw,
                min = range.start(),
                max = range.end(),
                "out-of-range count override, ignoring"
            );
        }
        parsed
    }

    fn delay(&self, name: &str) -> Option<DelayValue> {
        let raw = self.text(name)?;
        if parse_duration_ms(&raw).is_some() {
            Some(DelayValue::Text(raw))
        } else {
            warn!(key = name, value = %raw, "invalid delay override, ignoring");
            None
        }
    }
}

/// `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, case-insensitive.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a `u32` that must fall inside `range`.
pub fn parse_u32_in(val: &str, range: &RangeInclusive<u32>) -> Option<u32> {
    val.trim().parse().ok().filter(|n| range.contains(n))
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use super::*;

    /// Loading reads the process environment, so every test that loads or
    /// mutates it runs under this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// SAFETY: env mutation is racy across threads; callers hold
    /// `ENV_LOCK` and restore the previous value.
    fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    fn restore_env(key: &str, prev: Option<String>) {
        match prev {
            Some(v) => set_env(key, &v),
            None => unsafe { std::env::remove_var(key) },
        }
    }

    fn write_settings(json: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, json).unwrap();
        (dir, path)
    }

    // ── overlay ─────────────────────────────────────────────────────

    #[test]
    fn overlay_merges_nested_objects() {
        let mut target = serde_json::json!({"search": {"stallLimit": 10, "homeLocation": "a"}});
        overlay(&mut target, serde_json::json!({"search": {"stallLimit": 3}}));
        assert_eq!(target["search"]["stallLimit"], 3);
        assert_eq!(target["search"]["homeLocation"], "a");
    }

    #[test]
    fn overlay_skips_nulls_and_replaces_scalars() {
        let mut target = serde_json::json!({"searchDelay": {"min": {"nested": true}}, "gainsLimit": 2});
        overlay(
            &mut target,
            serde_json::json!({"searchDelay": {"min": "5s"}, "gainsLimit": null}),
        );
        assert_eq!(target["searchDelay"]["min"], "5s");
        assert_eq!(target["gainsLimit"], 2);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn missing_file_yields_defaults() {
        let _env = env_lock();
        let settings = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.search.home_location, "https://bing.com");
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let _env = env_lock();
        let (_dir, path) = write_settings(
            r#"{"search": {"clickRandomResults": false, "searchDelay": {"min": "10s"}}}"#,
        );

        let settings = load_settings_from_path(&path).unwrap();
        assert!(!settings.search.click_random_results);
        assert!(settings.search.scroll_random_results);
        assert_eq!(settings.search.search_delay.bounds_ms(), (10_000, 300_000));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let _env = env_lock();
        let (_dir, path) = write_settings("{ not json");
        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Malformed { path: ref p, .. } if *p == path));
    }

    #[test]
    fn wrongly_typed_field_is_malformed() {
        let _env = env_lock();
        let (_dir, path) = write_settings(r#"{"search": {"stallLimit": "many"}}"#);
        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Malformed { .. }));
    }

    #[test]
    fn non_object_root_is_rejected() {
        let _env = env_lock();
        let (_dir, path) = write_settings("[1, 2]");
        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::NotAnObject { .. }));
    }

    #[test]
    fn loading_runs_validation() {
        let _env = env_lock();
        let (_dir, path) = write_settings(
            r#"{"search": {"searchDelay": {"min": 8000, "max": 2000}, "stallLimit": 0}}"#,
        );
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.search.search_delay.bounds_ms(), (2000, 8000));
        assert_eq!(settings.search.stall_limit, 1);
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn process_env_overrides_file_values() {
        let _env = env_lock();
        let vars = [
            ("SORTIE_CLICK_RANDOM_RESULTS", "off"),
            ("SORTIE_SEARCH_DELAY_MIN", "10s"),
            ("SORTIE_RETRY_MOBILE_SEARCHES", "99"),
        ];
        let previous: Vec<_> = vars.iter().map(|(k, _)| (*k, std::env::var(k).ok())).collect();
        for (key, val) in vars {
            set_env(key, val);
        }

        let (_dir, path) = write_settings(
            r#"{"search": {"clickRandomResults": true, "retryMobileSearchAmount": 4}}"#,
        );
        let result = load_settings_from_path(&path);

        for (key, prev) in previous {
            restore_env(key, prev);
        }
        let settings = result.unwrap();
        assert!(!settings.search.click_random_results);
        assert_eq!(settings.search.search_delay.bounds_ms().0, 10_000);
        assert_eq!(settings.search.retry_mobile_search_amount, 4);
    }

    #[test]
    fn lookup_overrides_every_section() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SORTIE_USE_GEO_LOCALE", "yes"),
            ("SORTIE_USE_TRENDS", "0"),
            ("SORTIE_FALLBACK_COUNTRY", "DE"),
            ("SORTIE_LOG_JSON", "true"),
            ("SORTIE_HOME_LOCATION", "   "),
        ]);
        let mut settings = SortieSettings::default();
        apply_overrides(&mut settings, |name| vars.get(name).map(ToString::to_string));

        assert!(settings.search.use_geo_locale_queries);
        assert!(!settings.queries.use_trends);
        assert_eq!(settings.queries.fallback_country, "DE");
        assert!(settings.logging.json);
        assert_eq!(settings.search.home_location, "https://bing.com");
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut settings = SortieSettings::default();
        apply_overrides(&mut settings, |name| match name {
            "SORTIE_SCROLL_RANDOM_RESULTS" => Some("sometimes".into()),
            "SORTIE_SEARCH_DELAY_MAX" => Some("later".into()),
            "SORTIE_RETRY_MOBILE_SEARCHES" => Some("-2".into()),
            _ => None,
        });

        let defaults = SortieSettings::default();
        assert!(settings.search.scroll_random_results);
        assert_eq!(
            settings.search.search_delay.bounds_ms(),
            defaults.search.search_delay.bounds_ms()
        );
        assert_eq!(
            settings.search.retry_mobile_search_amount,
            defaults.search.retry_mobile_search_amount
        );
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_u32_in_bounds() {
        assert_eq!(parse_u32_in("3", &(0..=20)), Some(3));
        assert_eq!(parse_u32_in("21", &(0..=20)), None);
        assert_eq!(parse_u32_in("-1", &(0..=20)), None);
    }
}
