//! # sortie-core
//!
//! Shared vocabulary for the sortie search-completion engine.
//!
//! - **Counters**: [`counters::CountersSnapshot`] as read from the points sensor,
//!   with per-channel [`counters::PointProgress`] entries
//! - **Modes**: [`mode::SearchMode`] selects which channels a session works on
//! - **Progress**: [`progress::missing_points`] turns a snapshot into the deficit
//! - **Logging**: [`logging::init_subscriber`] and in-memory capture for tests
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other sortie crates.

#![deny(unsafe_code)]

pub mod counters;
pub mod logging;
pub mod mode;
pub mod progress;

pub use counters::{Channel, CountersSnapshot, PointProgress};
pub use mode::SearchMode;
pub use progress::missing_points;
