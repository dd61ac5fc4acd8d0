//! Public types for the Courtside API.

mod booking;
mod date;
mod snapshot;
mod view;

pub use booking::BookingStatus;
pub use date::{DateKey, RangeKey};
pub use snapshot::{AvailabilitySnapshot, BlockInfo, BookingInfo, CourtDay, Slot, SlotStatus};
pub use view::{DashboardView, Notice};
