//! Telemetry metric name constants.
//!
//! Centralised metric names for courtside operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `courtside_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `outcome`: "ok" | "error" | "superseded"
//! - `kind`: prefetch direction, "ahead" | "behind" | "initial"

/// Total availability loads started (single-day primary path).
///
/// Labels: `outcome` ("ok" | "error" | "superseded").
pub const LOADS_TOTAL: &str = "courtside_loads_total";

/// Total snapshot cache hits.
pub const CACHE_HITS_TOTAL: &str = "courtside_cache_hits_total";

/// Total snapshot cache misses (expired reads included).
pub const CACHE_MISSES_TOTAL: &str = "courtside_cache_misses_total";

/// Total range fetches issued.
///
/// Labels: `kind` ("ahead" | "behind" | "initial"), `outcome` ("ok" | "error").
pub const RANGE_FETCHES_TOTAL: &str = "courtside_range_fetches_total";

/// Total range fetches skipped because an identical fetch was pending.
pub const RANGE_FETCHES_DEDUPED_TOTAL: &str = "courtside_range_fetches_deduped_total";

/// Total reservation cancellations attempted.
///
/// Labels: `outcome` ("ok" | "rolled_back").
pub const CANCELLATIONS_TOTAL: &str = "courtside_cancellations_total";
