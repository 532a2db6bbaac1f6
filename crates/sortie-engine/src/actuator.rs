//! Collaborator seams: the browser surface set and the points sensor.
//!
//! Implementations wrap a real browser driver and the rewards dashboard.
//! The engine only ever holds them behind `Arc<dyn …>`, and a session calls
//! them strictly sequentially.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use sortie_core::CountersSnapshot;

use crate::errors::{ActuatorError, SensorError};

/// Opaque handle to one browser surface (tab).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub String);

impl SurfaceId {
    /// Create a handle from any string-like id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vertical extent of a page, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollExtent {
    /// Visible viewport height.
    pub viewport: u64,
    /// Full document height.
    pub total: u64,
}

impl ScrollExtent {
    /// Largest useful scroll offset. Zero when the page fits the viewport.
    pub fn max_offset(&self) -> u64 {
        self.total.saturating_sub(self.viewport)
    }
}

/// Browser surface primitives. Every call may fail with an
/// [`ActuatorError`].
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Bring the most recently opened surface to the front and return it.
    async fn focus_latest_surface(&self) -> Result<SurfaceId, ActuatorError>;

    /// Navigate `surface` to `location` and wait for the load.
    async fn navigate(&self, surface: &SurfaceId, location: &str) -> Result<(), ActuatorError>;

    /// Scroll `surface` to a vertical offset.
    async fn scroll_to(&self, surface: &SurfaceId, offset: u64) -> Result<(), ActuatorError>;

    /// Viewport and document height of `surface`.
    async fn scroll_extent(&self, surface: &SurfaceId) -> Result<ScrollExtent, ActuatorError>;

    /// Wait up to `timeout` for `selector` to be visible, focus it, clear
    /// its content (select-all, delete) and type `text`.
    async fn locate_and_type(
        &self,
        surface: &SurfaceId,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), ActuatorError>;

    /// Submit the focused input (Enter).
    async fn submit(&self, surface: &SurfaceId) -> Result<(), ActuatorError>;

    /// Number of elements currently matching `selector`.
    async fn count(&self, surface: &SurfaceId, selector: &str) -> Result<usize, ActuatorError>;

    /// Click the `nth` match of `selector`, waiting up to `timeout` for it.
    async fn click(
        &self,
        surface: &SurfaceId,
        selector: &str,
        nth: usize,
        timeout: Duration,
    ) -> Result<(), ActuatorError>;

    /// Close `surface`.
    async fn close(&self, surface: &SurfaceId) -> Result<(), ActuatorError>;

    /// Open a new blank surface.
    async fn open_new(&self) -> Result<SurfaceId, ActuatorError>;

    /// Current location (URL) of `surface`.
    async fn current_location(&self, surface: &SurfaceId) -> Result<String, ActuatorError>;

    /// Number of open surfaces.
    async fn surface_count(&self) -> Result<usize, ActuatorError>;
}

/// Read-only source of point counters. Idempotent; may be called at will.
#[async_trait]
pub trait Sensor: Send + Sync {
    /// Current counters snapshot.
    async fn counters(&self) -> Result<CountersSnapshot, SensorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_offset_saturates() {
        let page = ScrollExtent {
            viewport: 800,
            total: 3000,
        };
        assert_eq!(page.max_offset(), 2200);
        let short = ScrollExtent {
            viewport: 800,
            total: 600,
        };
        assert_eq!(short.max_offset(), 0);
    }

    #[test]
    fn surface_id_displays_raw_id() {
        assert_eq!(SurfaceId::new("tab-3").to_string(), "tab-3");
    }
}
