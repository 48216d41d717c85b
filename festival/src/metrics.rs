//! Business metrics for the festival monitor.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `festival.scans.total{direction,outcome}` - Entry and exit scans
//! - `festival.alerts.raised` - Critical capacity alerts raised
//!
//! ## Gauges
//! - `festival.attendees.total` - Head count across all venues

use metrics::{describe_counter, describe_gauge};

/// Scans processed, labelled by `direction` and `outcome`
pub const FESTIVAL_SCANS_TOTAL: &str = "festival.scans.total";
/// Critical alerts raised
pub const FESTIVAL_ALERTS_RAISED: &str = "festival.alerts.raised";
/// Sum of all venue head counts after the latest action
pub const FESTIVAL_ATTENDEES_TOTAL: &str = "festival.attendees.total";

/// Register descriptions for the festival metrics.
///
/// Call once at startup, next to `festpulse_runtime::metrics::register_metrics`.
pub fn register_metrics() {
    describe_counter!(
        FESTIVAL_SCANS_TOTAL,
        "Entry and exit scans by direction and outcome"
    );
    describe_counter!(FESTIVAL_ALERTS_RAISED, "Critical capacity alerts raised");
    describe_gauge!(
        FESTIVAL_ATTENDEES_TOTAL,
        "Current number of attendees across all venues"
    );

    tracing::debug!("Festival metrics registered");
}
