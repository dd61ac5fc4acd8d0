//! Builder for configuring controller instances

use std::sync::Arc;
use std::time::Duration;

use super::AvailabilityController;
use crate::cache::DEFAULT_SNAPSHOT_TTL;
use crate::gateway::RestGateway;
use crate::{AvailabilityGateway, CourtsideError, Result};

/// Quiet period before a date selection turns into a load.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Distance from the active date at which the cache is proactively
/// topped up.
pub const DEFAULT_PREFETCH_BUFFER_DAYS: u16 = 3;

/// Length of each prefetch range.
pub const DEFAULT_PREFETCH_SPAN_DAYS: u16 = 7;

/// Length of the one-off range fetched on first activation.
pub const DEFAULT_INITIAL_RANGE_DAYS: u16 = 14;

/// Main entry point for creating controller instances.
pub struct Courtside;

impl Courtside {
    /// Create a new builder for configuring the controller.
    pub fn builder() -> CourtsideBuilder {
        CourtsideBuilder::new()
    }
}

/// Resolved controller tunables.
#[derive(Clone, Debug)]
pub(crate) struct ControllerConfig {
    pub snapshot_ttl: Duration,
    pub debounce: Duration,
    pub prefetch_buffer_days: u16,
    pub prefetch_span_days: u16,
    pub initial_range_days: u16,
    pub member_id: Option<String>,
}

/// Builder for configuring controller instances.
///
/// The gateway is a constructor dependency; there is no process-wide
/// shared instance. Tests inject a fake gateway; production callers use
/// [`rest`](Self::rest) or hand in their own [`AvailabilityGateway`].
pub struct CourtsideBuilder {
    gateway: Option<Arc<dyn AvailabilityGateway>>,
    snapshot_ttl: Duration,
    debounce: Duration,
    prefetch_buffer_days: u16,
    prefetch_span_days: u16,
    initial_range_days: u16,
    member_id: Option<String>,
}

impl CourtsideBuilder {
    pub fn new() -> Self {
        Self {
            gateway: None,
            snapshot_ttl: DEFAULT_SNAPSHOT_TTL,
            debounce: DEFAULT_DEBOUNCE,
            prefetch_buffer_days: DEFAULT_PREFETCH_BUFFER_DAYS,
            prefetch_span_days: DEFAULT_PREFETCH_SPAN_DAYS,
            initial_range_days: DEFAULT_INITIAL_RANGE_DAYS,
            member_id: None,
        }
    }

    /// Use a custom gateway implementation.
    pub fn gateway(mut self, gateway: Arc<dyn AvailabilityGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Use the bundled REST gateway against the given booking service.
    pub fn rest(self, base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        self.gateway(Arc::new(RestGateway::new(base_url, api_token)))
    }

    /// Set how long a cached snapshot may serve reads (default: 5 minutes).
    pub fn snapshot_ttl(mut self, ttl: Duration) -> Self {
        self.snapshot_ttl = ttl;
        self
    }

    /// Set the navigation quiet period (default: 200 ms).
    pub fn debounce(mut self, quiet: Duration) -> Self {
        self.debounce = quiet;
        self
    }

    /// Set the prefetch trigger distance in days (default: 3).
    pub fn prefetch_buffer_days(mut self, days: u16) -> Self {
        self.prefetch_buffer_days = days;
        self
    }

    /// Set the prefetch range length in days (default: 7).
    pub fn prefetch_span_days(mut self, days: u16) -> Self {
        self.prefetch_span_days = days;
        self
    }

    /// Set the initial range length in days (default: 14).
    pub fn initial_range_days(mut self, days: u16) -> Self {
        self.initial_range_days = days;
        self
    }

    /// Identify the signed-in member, enabling own-booking queries.
    pub fn member_id(mut self, id: impl Into<String>) -> Self {
        self.member_id = Some(id.into());
        self
    }

    /// Build the controller.
    ///
    /// Fails with [`CourtsideError::Configuration`] when no gateway is
    /// configured or a range length is zero.
    pub fn build(self) -> Result<AvailabilityController> {
        let gateway = self
            .gateway
            .ok_or_else(|| CourtsideError::Configuration("no gateway configured".into()))?;
        if self.prefetch_span_days == 0 || self.initial_range_days == 0 {
            return Err(CourtsideError::Configuration(
                "range lengths must be at least one day".into(),
            ));
        }
        Ok(AvailabilityController::new(
            gateway,
            ControllerConfig {
                snapshot_ttl: self.snapshot_ttl,
                debounce: self.debounce,
                prefetch_buffer_days: self.prefetch_buffer_days,
                prefetch_span_days: self.prefetch_span_days,
                initial_range_days: self.initial_range_days,
                member_id: self.member_id,
            },
        ))
    }
}

impl Default for CourtsideBuilder {
    fn default() -> Self {
        Self::new()
    }
}
