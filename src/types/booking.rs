//! Member booking status.

use serde::{Deserialize, Serialize};

/// The current member's reservation counts and limits.
///
/// Always fetched fresh, never cached with expiry. Consumed by the UI to
/// decide whether to offer booking at all; its absence (no session, fetch
/// failure) only means the permission state is unknown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatus {
    /// Reservations currently held by the member.
    pub active_reservations: u32,
    /// Maximum concurrent reservations the membership allows.
    pub max_reservations: u32,
    /// Short-notice reservations currently held.
    #[serde(default)]
    pub short_notice_reservations: u32,
    /// Whether the server will accept another booking right now.
    pub can_book: bool,
}

impl BookingStatus {
    /// Reservations the member can still make before hitting the limit.
    pub fn remaining(&self) -> u32 {
        self.max_reservations.saturating_sub(self.active_reservations)
    }
}
