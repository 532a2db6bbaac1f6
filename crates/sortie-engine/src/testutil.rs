//! Scripted in-memory browser for tests.
//!
//! [`FakeBrowser`] implements both [`Actuator`] and [`Sensor`]: submitting a
//! query credits its configured points to one counter channel, so a session
//! can be driven end to end without a real browser. Faults are injected per
//! operation with the `fail_*` methods.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sortie_core::{Channel, CountersSnapshot, PointProgress};

use crate::actuator::{Actuator, ScrollExtent, Sensor, SurfaceId};
use crate::errors::{ActuatorError, SensorError};
use crate::executor::RESULT_LINK;

const DEFAULT_SURFACES: &[&str] = &["https://rewards.bing.com", "https://bing.com"];

struct Surface {
    id: SurfaceId,
    location: String,
}

#[derive(Default)]
struct Faults {
    submits: u32,
    navigations: u32,
    inputs: u32,
    sensor_reads: u32,
    sensor_down: bool,
}

struct Inner {
    surfaces: Vec<Surface>,
    next_id: u32,
    counters: CountersSnapshot,
    credit: Channel,
    points: HashMap<String, u32>,
    default_points: u32,
    typed: String,
    searches: Vec<String>,
    clicks: Vec<usize>,
    scrolls: Vec<u64>,
    sensor_reads: u32,
    popups_on_click: bool,
    result_links: usize,
    faults: Faults,
}

/// In-memory browser and points dashboard.
pub struct FakeBrowser {
    inner: Mutex<Inner>,
}

impl FakeBrowser {
    /// A browser reporting `counters`, with two surfaces open. Submitted
    /// queries add their points to the `credit` channel, capped at its
    /// maximum.
    pub fn new(counters: CountersSnapshot, credit: Channel) -> Self {
        let mut inner = Inner {
            surfaces: Vec::new(),
            next_id: 0,
            counters,
            credit,
            points: HashMap::new(),
            default_points: 0,
            typed: String::new(),
            searches: Vec::new(),
            clicks: Vec::new(),
            scrolls: Vec::new(),
            sensor_reads: 0,
            popups_on_click: false,
            result_links: 10,
            faults: Faults::default(),
        };
        for location in DEFAULT_SURFACES {
            inner.push_surface(location);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Desktop account missing `missing` points on `pcSearch[0]`.
    pub fn desktop(missing: u32) -> Self {
        let counters = CountersSnapshot::default()
            .with_channel(Channel::Desktop, PointProgress::new(0, missing));
        Self::new(counters, Channel::Desktop)
    }

    /// Mobile account missing `missing` points on `mobileSearch[0]`.
    pub fn mobile(missing: u32) -> Self {
        let counters = CountersSnapshot::default()
            .with_channel(Channel::Mobile, PointProgress::new(0, missing));
        Self::new(counters, Channel::Mobile)
    }

    /// Points credited for `query`.
    #[must_use]
    pub fn with_points(self, query: &str, points: u32) -> Self {
        let _ = self.inner.lock().points.insert(query.to_string(), points);
        self
    }

    /// Points credited for queries without an explicit value.
    #[must_use]
    pub fn with_default_points(self, points: u32) -> Self {
        self.inner.lock().default_points = points;
        self
    }

    /// Replace the open surfaces; the last one is the latest.
    #[must_use]
    pub fn with_surfaces(self, locations: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.surfaces.clear();
            for location in locations {
                inner.push_surface(location);
            }
        }
        self
    }

    /// Clicking a result link opens it in a new surface.
    #[must_use]
    pub fn with_popups_on_click(self) -> Self {
        self.inner.lock().popups_on_click = true;
        self
    }

    /// Fail the next `n` submits.
    pub fn fail_submits(&self, n: u32) {
        self.inner.lock().faults.submits = n;
    }

    /// Fail the next `n` navigations.
    pub fn fail_navigations(&self, n: u32) {
        self.inner.lock().faults.navigations = n;
    }

    /// Make the query input missing for the next `n` lookups.
    pub fn fail_inputs(&self, n: u32) {
        self.inner.lock().faults.inputs = n;
    }

    /// Fail the next `n` counter reads.
    pub fn fail_sensor_reads(&self, n: u32) {
        self.inner.lock().faults.sensor_reads = n;
    }

    /// Fail every counter read until re-enabled.
    pub fn set_sensor_down(&self, down: bool) {
        self.inner.lock().faults.sensor_down = down;
    }

    /// Queries submitted successfully, in order.
    pub fn searches(&self) -> Vec<String> {
        self.inner.lock().searches.clone()
    }

    /// Result-link indices clicked, in order.
    pub fn clicks(&self) -> Vec<usize> {
        self.inner.lock().clicks.clone()
    }

    /// Scroll offsets applied, in order (including resets to 0).
    pub fn scrolls(&self) -> Vec<u64> {
        self.inner.lock().scrolls.clone()
    }

    /// Counter reads served, including failed ones.
    pub fn sensor_reads(&self) -> u32 {
        self.inner.lock().sensor_reads
    }

    /// Locations of the open surfaces, oldest first.
    pub fn locations(&self) -> Vec<String> {
        self.inner
            .lock()
            .surfaces
            .iter()
            .map(|s| s.location.clone())
            .collect()
    }

    /// Current counters.
    pub fn snapshot(&self) -> CountersSnapshot {
        self.inner.lock().counters.clone()
    }
}

impl Inner {
    fn push_surface(&mut self, location: &str) -> SurfaceId {
        self.next_id += 1;
        let id = SurfaceId::new(format!("surface-{}", self.next_id));
        self.surfaces.push(Surface {
            id: id.clone(),
            location: location.to_string(),
        });
        id
    }

    fn surface_mut(&mut self, id: &SurfaceId) -> Result<&mut Surface, ActuatorError> {
        self.surfaces
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| ActuatorError::SurfaceClosed {
                surface: id.to_string(),
            })
    }

    fn latest(&self) -> Result<SurfaceId, ActuatorError> {
        self.surfaces
            .last()
            .map(|s| s.id.clone())
            .ok_or_else(|| ActuatorError::Internal {
                message: "no open surface".into(),
            })
    }

    fn credit(&mut self, query: &str) {
        let points = self
            .points
            .get(query)
            .copied()
            .unwrap_or(self.default_points);
        let current = self
            .counters
            .channel(self.credit)
            .copied()
            .unwrap_or_default();
        let updated = PointProgress::new(
            (current.point_progress + points).min(current.point_progress_max),
            current.point_progress_max,
        );
        self.counters = std::mem::take(&mut self.counters).with_channel(self.credit, updated);
    }
}

fn take_fault(counter: &mut u32) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

#[async_trait]
impl Actuator for FakeBrowser {
    async fn focus_latest_surface(&self) -> Result<SurfaceId, ActuatorError> {
        self.inner.lock().latest()
    }

    async fn navigate(&self, surface: &SurfaceId, location: &str) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock();
        if take_fault(&mut inner.faults.navigations) {
            return Err(ActuatorError::Navigation {
                message: format!("net::ERR_TIMED_OUT at {location}"),
            });
        }
        inner.surface_mut(surface)?.location = location.to_string();
        Ok(())
    }

    async fn scroll_to(&self, surface: &SurfaceId, offset: u64) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock();
        let _ = inner.surface_mut(surface)?;
        inner.scrolls.push(offset);
        Ok(())
    }

    async fn scroll_extent(&self, surface: &SurfaceId) -> Result<ScrollExtent, ActuatorError> {
        let _ = self.inner.lock().surface_mut(surface)?;
        Ok(ScrollExtent {
            viewport: 800,
            total: 3000,
        })
    }

    async fn locate_and_type(
        &self,
        surface: &SurfaceId,
        selector: &str,
        text: &str,
        _timeout: Duration,
    ) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock();
        let _ = inner.surface_mut(surface)?;
        if take_fault(&mut inner.faults.inputs) {
            return Err(ActuatorError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        text.clone_into(&mut inner.typed);
        Ok(())
    }

    async fn submit(&self, surface: &SurfaceId) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock();
        if take_fault(&mut inner.faults.submits) {
            return Err(ActuatorError::Internal {
                message: "target crashed".into(),
            });
        }
        let query = std::mem::take(&mut inner.typed);
        inner.surface_mut(surface)?.location =
            format!("https://www.bing.com/search?q={}", query.replace(' ', "+"));
        inner.credit(&query);
        inner.searches.push(query);
        Ok(())
    }

    async fn count(&self, surface: &SurfaceId, selector: &str) -> Result<usize, ActuatorError> {
        let mut inner = self.inner.lock();
        let _ = inner.surface_mut(surface)?;
        Ok(if selector == RESULT_LINK {
            inner.result_links
        } else {
            0
        })
    }

    async fn click(
        &self,
        surface: &SurfaceId,
        selector: &str,
        nth: usize,
        timeout: Duration,
    ) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock();
        let _ = inner.surface_mut(surface)?;
        if selector != RESULT_LINK {
            return Err(ActuatorError::Timeout {
                operation: format!("wait for {selector}"),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        inner.clicks.push(nth);
        if inner.popups_on_click {
            let _ = inner.push_surface(&format!("https://result.example/{nth}"));
        }
        Ok(())
    }

    async fn close(&self, surface: &SurfaceId) -> Result<(), ActuatorError> {
        let mut inner = self.inner.lock();
        let before = inner.surfaces.len();
        inner.surfaces.retain(|s| &s.id != surface);
        if inner.surfaces.len() == before {
            return Err(ActuatorError::SurfaceClosed {
                surface: surface.to_string(),
            });
        }
        Ok(())
    }

    async fn open_new(&self) -> Result<SurfaceId, ActuatorError> {
        Ok(self.inner.lock().push_surface("about:blank"))
    }

    async fn current_location(&self, surface: &SurfaceId) -> Result<String, ActuatorError> {
        Ok(self.inner.lock().surface_mut(surface)?.location.clone())
    }

    async fn surface_count(&self) -> Result<usize, ActuatorError> {
        Ok(self.inner.lock().surfaces.len())
    }
}

#[async_trait]
impl Sensor for FakeBrowser {
    async fn counters(&self) -> Result<CountersSnapshot, SensorError> {
        let mut inner = self.inner.lock();
        inner.sensor_reads += 1;
        if inner.faults.sensor_down || take_fault(&mut inner.faults.sensor_reads) {
            return Err(SensorError::Unavailable {
                message: "dashboard returned 503".into(),
            });
        }
        Ok(inner.counters.clone())
    }
}
