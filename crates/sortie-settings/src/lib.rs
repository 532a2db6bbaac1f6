//! # sortie-settings
//!
//! Configuration for the sortie search engine, loaded in three layers
//! (lowest to highest priority):
//!
//! 1. **Compiled defaults**: [`SortieSettings::default()`]
//! 2. **User file**: `~/.sortie/settings.json`, deep-merged over defaults
//! 3. **Environment variables**: `SORTIE_*` overrides
//!
//! The engine only reads settings; nothing here is mutated after loading.

#![deny(unsafe_code)]

pub mod delay;
pub mod errors;
pub mod loader;
pub mod types;

pub use delay::{DelayValue, parse_duration_ms};
pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, apply_overrides, load_settings, load_settings_from_path, settings_path};
pub use types::*;
