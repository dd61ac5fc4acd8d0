//! Core AvailabilityGateway trait

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{AvailabilitySnapshot, BookingStatus, DateKey, Result};

/// The backend capability the availability engine is built on.
///
/// Abstracts over the booking service's transport, allowing the controller
/// to be driven against a fake gateway in tests without any hidden global
/// state. The shipped implementation is [`RestGateway`](crate::RestGateway).
///
/// Timeouts are the implementation's concern and surface here as ordinary
/// [`Network`](crate::CourtsideError::Network) failures. A call whose result
/// has become obsolete reports [`Cancelled`](crate::CourtsideError::Cancelled);
/// the caller swallows it.
#[async_trait]
pub trait AvailabilityGateway: Send + Sync {
    /// Fetch the availability snapshot for a single date.
    async fn fetch_availability(&self, date: DateKey) -> Result<AvailabilitySnapshot>;

    /// Fetch snapshots for `days` consecutive dates starting at `start`.
    ///
    /// All-or-nothing: a failure means no partial data for any of the
    /// requested dates.
    async fn fetch_availability_range(
        &self,
        start: DateKey,
        days: u16,
    ) -> Result<BTreeMap<DateKey, AvailabilitySnapshot>>;

    /// Fetch the current member's booking status.
    ///
    /// Returns `Ok(None)` when no authenticated session exists. That is a
    /// normal "no status" outcome, not an error.
    async fn fetch_booking_status(&self) -> Result<Option<BookingStatus>>;

    /// Cancel a reservation.
    ///
    /// A rejection carries a member-displayable reason when the server
    /// provides one (e.g. "cancellation not allowed"), as
    /// [`Forbidden`](crate::CourtsideError::Forbidden).
    async fn cancel_reservation(&self, reservation_id: &str) -> Result<()>;
}
