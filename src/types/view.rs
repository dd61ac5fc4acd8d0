//! Published view state.

use super::{AvailabilitySnapshot, BookingStatus, DateKey};

/// A non-blocking notice shown alongside whatever data is on screen.
///
/// Distinct from the blocking error state: a notice never replaces visible
/// availability data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A background refresh failed while cached data stayed visible.
    ConnectionProblem { message: String },
    /// A reservation cancellation was rejected and has been rolled back.
    CancellationFailed { message: String },
}

impl Notice {
    /// The display message carried by the notice.
    pub fn message(&self) -> &str {
        match self {
            Notice::ConnectionProblem { message } | Notice::CancellationFailed { message } => {
                message
            }
        }
    }
}

/// Everything the dashboard UI needs, published as one value over a
/// `tokio::sync::watch` channel.
///
/// Mutated only by the controller; collaborators hold a receiver and treat
/// each observed value as immutable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardView {
    /// The date the member is looking at.
    pub active_date: Option<DateKey>,
    /// Best-known availability for the active date, or `None` before the
    /// first successful load.
    pub snapshot: Option<AvailabilitySnapshot>,
    /// Raised while a load runs with no usable cache entry for the active
    /// date. A previously displayed snapshot stays in `snapshot` until
    /// replaced.
    pub loading: bool,
    /// Blocking, retryable error state. Mutually exclusive with visible
    /// data; a failure with a snapshot on display downgrades to `notice`.
    pub error: Option<String>,
    /// Non-blocking notice; visible data stays on screen.
    pub notice: Option<Notice>,
    /// Current booking permission state, or `None` when unavailable.
    pub booking_status: Option<BookingStatus>,
}
