//! Courtside - availability caching and prefetching for court-booking clients
//!
//! This crate provides the availability engine behind a booking dashboard:
//! a per-date cache of court-availability snapshots with expiry, range-based
//! prefetching around the member's viewing position, de-duplication of
//! in-flight range fetches, debounced date navigation, cooperative
//! supersession of loads, and optimistic reservation cancellation with
//! rollback. The backend is abstracted behind the [`AvailabilityGateway`]
//! trait; a reqwest-based [`RestGateway`] is included.
//!
//! # Example
//!
//! ```rust,no_run
//! use courtside::{Courtside, DateKey};
//!
//! #[tokio::main]
//! async fn main() -> courtside::Result<()> {
//!     let controller = Courtside::builder()
//!         .rest("https://api.courtclub.example", "session-token")
//!         .member_id("member-1234")
//!         .build()?;
//!
//!     let mut view = controller.subscribe();
//!     controller.activate(DateKey::today_utc()).await;
//!
//!     // navigate; rapid taps collapse into one load
//!     controller.select_date(DateKey::today_utc().offset(1));
//!
//!     view.changed().await.ok();
//!     if let Some(snapshot) = &view.borrow().snapshot {
//!         println!("{} courts on {}", snapshot.courts.len(), snapshot.date);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use controller::{AvailabilityController, Courtside, CourtsideBuilder};
pub use error::{CourtsideError, Result};
pub use gateway::{RestGateway, SessionEvent};
pub use traits::AvailabilityGateway;

// Re-export all types
pub use types::{
    AvailabilitySnapshot, BlockInfo, BookingInfo, BookingStatus, CourtDay, DashboardView, DateKey,
    Notice, RangeKey, Slot, SlotStatus,
};
