//! Point-in-time availability data for one date.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::DateKey;

/// Occupancy state of a single court slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStatus {
    /// Open for booking.
    Available,
    /// Booked by a member.
    Reserved,
    /// Booked on short notice (reduced cancellation window).
    ShortNotice,
    /// Blocked by the club (maintenance, events).
    Blocked,
    /// Blocked temporarily; may reopen.
    TemporarilyBlocked,
}

/// Reservation details attached to an occupied slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    /// Server-side reservation identifier; the handle for cancellation.
    pub reservation_id: String,
    /// Member who holds the reservation, when the server discloses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
}

/// Block details attached to a blocked slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One bookable time slot on one court.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Slot start time, in the club's reference time zone.
    pub start: NaiveTime,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockInfo>,
}

/// Slot list for one court on one date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtDay {
    pub court_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_name: Option<String>,
    pub slots: Vec<Slot>,
}

/// Known state of all courts for one date at the time it was fetched.
///
/// Immutable once constructed: a new fetch produces a new snapshot that
/// replaces, never merges into, the cached entry for its date. The one
/// local mutation in the system, optimistic reservation removal, goes
/// through [`without_reservation`](Self::without_reservation) and produces
/// a fresh value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySnapshot {
    pub date: DateKey,
    pub courts: Vec<CourtDay>,
    /// When the server generated this data, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// IANA name of the club's reference time zone, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl AvailabilitySnapshot {
    /// Look up a slot by court and start time.
    pub fn slot_at(&self, court_id: &str, start: NaiveTime) -> Option<&Slot> {
        self.courts
            .iter()
            .find(|c| c.court_id == court_id)?
            .slots
            .iter()
            .find(|s| s.start == start)
    }

    /// Whether a slot can be booked: it must be available and must not have
    /// started yet relative to `now` (club-local wall time).
    pub fn is_bookable(&self, court_id: &str, start: NaiveTime, now: NaiveDateTime) -> bool {
        let Some(slot) = self.slot_at(court_id, start) else {
            return false;
        };
        slot.status == SlotStatus::Available && self.date.date().and_time(start) > now
    }

    /// Whether the slot holds a reservation belonging to `member_id`.
    pub fn is_own_booking(&self, court_id: &str, start: NaiveTime, member_id: &str) -> bool {
        self.slot_at(court_id, start)
            .and_then(|s| s.booking.as_ref())
            .and_then(|b| b.member_id.as_deref())
            == Some(member_id)
    }

    /// Copy of this snapshot with one reservation filtered out of the given
    /// court's slot list.
    ///
    /// The basis of the optimistic cancellation path: the slot disappears
    /// from the occupied list immediately, before server confirmation.
    pub fn without_reservation(&self, court_id: &str, reservation_id: &str) -> Self {
        let mut copy = self.clone();
        if let Some(court) = copy.courts.iter_mut().find(|c| c.court_id == court_id) {
            court.slots.retain(|s| {
                s.booking.as_ref().map(|b| b.reservation_id.as_str()) != Some(reservation_id)
            });
        }
        copy
    }
}
