//! Availability controller.
//!
//! [`AvailabilityController`] owns the per-date snapshot cache and turns a
//! member's date navigation into the smallest possible number of gateway
//! calls: cached dates render instantly and refresh in the background, a
//! rolling window around the viewed date is kept warm by range prefetches,
//! rapid navigation is debounced, and superseded loads are discarded before
//! they can clobber newer state.
//!
//! # Concurrency
//!
//! All shared state (cache, pending-range set, active date) sits behind
//! mutexes with short critical sections that are never held across an
//! await. Published view state goes through a `tokio::sync::watch` channel,
//! so collaborators observe consistent whole-view values.
//!
//! Supersession is cooperative: every primary load records a generation
//! number at start and re-checks it after the gateway call returns. A stale
//! generation means a newer load took over while this one was suspended,
//! and the result is discarded without touching cache or view. Prefetch tasks
//! are independent of the primary load and of each other; they are keyed by
//! `(start, days)` and de-duplicated, never canceled.
//!
//! The optimistic-cancellation write happens before the first await of the
//! cancel path, so the UI reflects the member's intent immediately; the
//! asynchronous confirmation or rollback is a second, independent write.

mod builder;

pub use builder::{Courtside, CourtsideBuilder};
pub(crate) use builder::ControllerConfig;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::AvailabilityGateway;
use crate::cache::{PendingRanges, SnapshotCache};
use crate::telemetry;
use crate::types::{DashboardView, DateKey, Notice, RangeKey, Slot};

/// Lock with poison recovery: a panicked task leaves state that is still
/// safe to read, and the controller must outlive any one failed task.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates availability loading, caching, prefetching, and optimistic
/// cancellation for one dashboard.
///
/// Cheap to clone; clones share the same state and view channel. Built via
/// [`Courtside::builder()`].
#[derive(Clone)]
pub struct AvailabilityController {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn AvailabilityGateway>,
    config: ControllerConfig,
    cache: Mutex<SnapshotCache>,
    pending_ranges: Mutex<PendingRanges>,
    view_tx: watch::Sender<DashboardView>,
    active_date: Mutex<Option<DateKey>>,
    load_generation: AtomicU64,
    debounce_task: Mutex<Option<JoinHandle<()>>>,
    initial_range_attempted: AtomicBool,
}

impl Inner {
    fn publish<F: FnOnce(&mut DashboardView)>(&self, mutate: F) {
        self.view_tx.send_modify(mutate);
    }

    fn current_date(&self) -> Option<DateKey> {
        *lock(&self.active_date)
    }

    fn set_active_date(&self, date: DateKey) {
        *lock(&self.active_date) = Some(date);
        self.publish(|v| v.active_date = Some(date));
    }

    fn next_generation(&self) -> u64 {
        self.load_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.load_generation.load(Ordering::SeqCst) == generation
    }

    fn is_active(&self, date: DateKey) -> bool {
        self.current_date() == Some(date)
    }
}

impl AvailabilityController {
    pub(crate) fn new(gateway: Arc<dyn AvailabilityGateway>, config: ControllerConfig) -> Self {
        let snapshot_ttl = config.snapshot_ttl;
        let (view_tx, _) = watch::channel(DashboardView::default());
        Self {
            inner: Arc::new(Inner {
                gateway,
                config,
                cache: Mutex::new(SnapshotCache::new(snapshot_ttl)),
                pending_ranges: Mutex::new(PendingRanges::new()),
                view_tx,
                active_date: Mutex::new(None),
                load_generation: AtomicU64::new(0),
                debounce_task: Mutex::new(None),
                initial_range_attempted: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribe to published view state.
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.inner.view_tx.subscribe()
    }

    /// The current published view state.
    pub fn view(&self) -> DashboardView {
        self.inner.view_tx.borrow().clone()
    }

    /// First activation: load a two-week window around today.
    ///
    /// Issues a single range fetch covering `today` plus the configured
    /// initial range. On success every returned day lands in the cache and
    /// `today` is displayed; on failure the ordinary single-day path for
    /// `today` takes over. The initial range is attempted once per session;
    /// later calls behave like [`load_availability`](Self::load_availability).
    pub async fn activate(&self, today: DateKey) {
        let inner = &self.inner;
        inner.set_active_date(today);
        if inner.initial_range_attempted.swap(true, Ordering::SeqCst) {
            self.run_load(today, false).await;
            return;
        }

        let days = inner.config.initial_range_days;
        let generation = inner.next_generation();
        inner.publish(|v| {
            v.loading = true;
            v.error = None;
        });

        let key = RangeKey::new(today, days);
        let claimed = lock(&inner.pending_ranges).try_begin(key);
        let result = inner.gateway.fetch_availability_range(today, days).await;
        if claimed {
            lock(&inner.pending_ranges).finish(&key);
        }
        if !inner.is_current(generation) {
            return;
        }

        match result {
            Ok(range) => {
                metrics::counter!(telemetry::RANGE_FETCHES_TOTAL,
                    "kind" => "initial", "outcome" => "ok")
                .increment(1);
                let todays = range.get(&today).cloned();
                {
                    let mut cache = lock(&inner.cache);
                    for (date, snapshot) in range {
                        cache.insert(date, snapshot);
                    }
                }
                match todays {
                    Some(snapshot) => {
                        inner.publish(|v| {
                            v.snapshot = Some(snapshot);
                            v.loading = false;
                            v.error = None;
                            v.notice = None;
                        });
                        self.spawn_booking_status_refresh();
                    }
                    // range came back without today: treat as a miss
                    None => self.run_load(today, false).await,
                }
            }
            Err(e) if e.is_cancellation() => {
                debug!("initial range load cancelled");
            }
            Err(e) => {
                metrics::counter!(telemetry::RANGE_FETCHES_TOTAL,
                    "kind" => "initial", "outcome" => "error")
                .increment(1);
                warn!(error = %e, "initial range load failed, falling back to single day");
                self.run_load(today, false).await;
            }
        }
    }

    /// Select the date the member is looking at.
    ///
    /// Publishes the new active date immediately and schedules a load after
    /// the configured quiet period. Rapid repeated calls collapse into a
    /// single load for the last date set; each call restarts the timer.
    pub fn select_date(&self, date: DateKey) {
        self.inner.set_active_date(date);

        let mut pending = lock(&self.inner.debounce_task);
        if let Some(task) = pending.take() {
            task.abort();
        }
        let controller = self.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(controller.inner.config.debounce).await;
            let Some(date) = controller.inner.current_date() else {
                return;
            };
            controller.run_load(date, false).await;
        }));
    }

    /// Load availability for the active date.
    ///
    /// The core read path, and also the manual refresh trigger (pull to
    /// refresh, error retry). Supersedes any in-flight load.
    pub async fn load_availability(&self) {
        let Some(date) = self.inner.current_date() else {
            debug!("load requested before any date was selected");
            return;
        };
        self.run_load(date, false).await;
    }

    /// Drop the cached entry for a date and re-fetch it in the background,
    /// without a loading indicator.
    ///
    /// Used after a booking or cancellation so the grid reflects server
    /// truth without a visible flash. Also refreshes booking status.
    pub fn invalidate(&self, date: DateKey) {
        lock(&self.inner.cache).remove(date);
        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_load(date, true).await;
        });
    }

    /// Re-fetch the active date after a booking change.
    pub fn reload_after_booking_change(&self) {
        if let Some(date) = self.inner.current_date() {
            self.invalidate(date);
        }
    }

    /// Cancel a reservation optimistically.
    ///
    /// The reservation disappears from the displayed and cached snapshot
    /// before the network call is issued; the cache entry keeps its
    /// original fetch stamp since this is a local mutation, not fresh data.
    /// A rejected cancellation restores the captured state exactly and
    /// surfaces a [`Notice::CancellationFailed`].
    pub async fn cancel_reservation(&self, reservation_id: &str, court_id: &str) {
        let inner = &self.inner;
        let Some(date) = inner.current_date() else {
            return;
        };

        let displayed = inner.view_tx.borrow().snapshot.clone();
        let Some(displayed) = displayed else {
            // nothing on screen to mutate; just issue the call
            if let Err(e) = inner.gateway.cancel_reservation(reservation_id).await {
                let message = e.user_message();
                inner.publish(|v| v.notice = Some(Notice::CancellationFailed { message }));
            } else {
                self.spawn_booking_status_refresh();
            }
            return;
        };

        // capture for rollback, then apply the optimistic update, all
        // before the first await
        let previous_entry = lock(&inner.cache).entry(date);
        let optimistic = displayed.without_reservation(court_id, reservation_id);
        lock(&inner.cache).patch(date, optimistic.clone());
        inner.publish(|v| {
            v.snapshot = Some(optimistic);
            v.notice = None;
        });

        match inner.gateway.cancel_reservation(reservation_id).await {
            Ok(()) => {
                metrics::counter!(telemetry::CANCELLATIONS_TOTAL, "outcome" => "ok").increment(1);
                self.spawn_booking_status_refresh();
            }
            Err(e) => {
                metrics::counter!(telemetry::CANCELLATIONS_TOTAL, "outcome" => "rolled_back")
                    .increment(1);
                warn!(reservation = reservation_id, error = %e,
                    "cancellation rejected, rolling back");
                lock(&inner.cache).restore(date, previous_entry);
                let message = e.user_message();
                inner.publish(|v| {
                    v.snapshot = Some(displayed);
                    v.notice = Some(Notice::CancellationFailed { message });
                });
            }
        }
    }

    /// Drop all cache entries. In-flight requests are not canceled.
    pub fn clear_cache(&self) {
        lock(&self.inner.cache).clear();
    }

    /// Look up a slot in the displayed snapshot.
    pub fn slot_at(&self, court_id: &str, start: NaiveTime) -> Option<Slot> {
        self.inner
            .view_tx
            .borrow()
            .snapshot
            .as_ref()?
            .slot_at(court_id, start)
            .cloned()
    }

    /// Whether a displayed slot can be booked: available and not in the
    /// past relative to `now` (club-local wall time).
    pub fn is_slot_bookable(&self, court_id: &str, start: NaiveTime, now: NaiveDateTime) -> bool {
        self.inner
            .view_tx
            .borrow()
            .snapshot
            .as_ref()
            .is_some_and(|s| s.is_bookable(court_id, start, now))
    }

    /// Whether a displayed slot holds the configured member's reservation.
    pub fn is_own_booking(&self, court_id: &str, start: NaiveTime) -> bool {
        let Some(member) = self.inner.config.member_id.as_deref() else {
            return false;
        };
        self.inner
            .view_tx
            .borrow()
            .snapshot
            .as_ref()
            .is_some_and(|s| s.is_own_booking(court_id, start, member))
    }

    /// The primary load path.
    ///
    /// `silent` skips the cached-publish/loading-indicator stage, used by
    /// [`invalidate`](Self::invalidate) so a post-booking refresh causes no
    /// visible flash.
    async fn run_load(&self, date: DateKey, silent: bool) {
        let inner = &self.inner;
        let generation = inner.next_generation();
        self.spawn_booking_status_refresh();

        if !silent {
            let cached = lock(&inner.cache).get(date).cloned();
            match cached {
                Some(snapshot) => {
                    // unexpired hit: render instantly, refresh below
                    inner.publish(|v| {
                        v.snapshot = Some(snapshot);
                        v.loading = false;
                        v.error = None;
                    });
                }
                None => {
                    // miss: raise the loading flag; whatever snapshot is
                    // already displayed stays visible until replaced
                    inner.publish(|v| {
                        v.loading = true;
                        v.error = None;
                    });
                }
            }
        }

        let result = inner.gateway.fetch_availability(date).await;
        if !inner.is_current(generation) {
            metrics::counter!(telemetry::LOADS_TOTAL, "outcome" => "superseded").increment(1);
            debug!(date = %date, "load superseded, discarding result");
            return;
        }

        match result {
            Ok(snapshot) => {
                metrics::counter!(telemetry::LOADS_TOTAL, "outcome" => "ok").increment(1);
                lock(&inner.cache).insert(date, snapshot.clone());
                if inner.is_active(date) {
                    inner.publish(|v| {
                        v.snapshot = Some(snapshot);
                        v.loading = false;
                        v.error = None;
                        v.notice = None;
                    });
                }
            }
            Err(e) if e.is_cancellation() => {
                debug!(date = %date, "load cancelled, discarding");
            }
            Err(e) => {
                metrics::counter!(telemetry::LOADS_TOTAL, "outcome" => "error").increment(1);
                if inner.is_active(date) {
                    let message = e.user_message();
                    let has_data = inner.view_tx.borrow().snapshot.is_some();
                    if has_data {
                        // never replace visible data with an error screen
                        warn!(date = %date, error = %e,
                            "refresh failed, keeping stale snapshot visible");
                        inner.publish(|v| {
                            v.loading = false;
                            v.notice = Some(Notice::ConnectionProblem { message });
                        });
                    } else {
                        warn!(date = %date, error = %e, "load failed with nothing to show");
                        inner.publish(|v| {
                            v.loading = false;
                            v.error = Some(message);
                        });
                    }
                }
            }
        }

        self.evaluate_prefetch(date);
    }

    /// Keep a rolling window around the viewed date warm.
    ///
    /// Runs after every non-superseded single-day load. Checks the cache at
    /// `date ± buffer`; a cold edge triggers a range fetch covering the week
    /// on that side. Best-effort: failures are swallowed.
    fn evaluate_prefetch(&self, date: DateKey) {
        let buffer = i64::from(self.inner.config.prefetch_buffer_days);
        let span = self.inner.config.prefetch_span_days;
        let (ahead_cold, behind_cold) = {
            let cache = lock(&self.inner.cache);
            (
                !cache.contains_usable(date.offset(buffer)),
                !cache.contains_usable(date.offset(-buffer)),
            )
        };
        if ahead_cold {
            self.spawn_range_fetch(RangeKey::new(date.offset(1), span), "ahead");
        }
        if behind_cold {
            self.spawn_range_fetch(RangeKey::new(date.offset(-i64::from(span)), span), "behind");
        }
    }

    /// Issue a range fetch unless an identical one is already pending.
    ///
    /// The pending key is claimed before the request goes out and released
    /// unconditionally when it completes. Results decompose into one cache
    /// entry per returned date, stamped at completion time, which may
    /// overwrite fresher single-day data; last completion wins.
    fn spawn_range_fetch(&self, key: RangeKey, kind: &'static str) {
        if !lock(&self.inner.pending_ranges).try_begin(key) {
            metrics::counter!(telemetry::RANGE_FETCHES_DEDUPED_TOTAL).increment(1);
            debug!(start = %key.start, days = key.days, "identical range fetch pending, skipping");
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner
                .gateway
                .fetch_availability_range(key.start, key.days)
                .await;
            lock(&inner.pending_ranges).finish(&key);
            match result {
                Ok(range) => {
                    metrics::counter!(telemetry::RANGE_FETCHES_TOTAL,
                        "kind" => kind, "outcome" => "ok")
                    .increment(1);
                    let mut cache = lock(&inner.cache);
                    for (date, snapshot) in range {
                        cache.insert(date, snapshot);
                    }
                }
                Err(e) => {
                    metrics::counter!(telemetry::RANGE_FETCHES_TOTAL,
                        "kind" => kind, "outcome" => "error")
                    .increment(1);
                    debug!(start = %key.start, days = key.days, error = %e,
                        "prefetch failed, ignoring");
                }
            }
        });
    }

    /// Booking status is always fetched fresh and never blocks the
    /// availability display; a failure just makes the status unavailable.
    fn spawn_booking_status_refresh(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.gateway.fetch_booking_status().await {
                Ok(status) => inner.publish(|v| v.booking_status = status),
                Err(e) => {
                    debug!(error = %e, "booking status refresh failed");
                    inner.publish(|v| v.booking_status = None);
                }
            }
        });
    }
}
