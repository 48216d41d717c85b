//! Metric names recorded by the runtime.
//!
//! Metrics go through the `metrics` facade. Nothing is exported unless the
//! embedding application installs a recorder; without one every call is a
//! no-op.

use metrics::{Unit, describe_counter, describe_histogram};

// Re-export metrics macros for use in other crates
pub use metrics::{counter, gauge, histogram};

/// Actions accepted by a store
pub const STORE_ACTIONS_TOTAL: &str = "store.actions.total";
/// Reducer wall time per action
pub const STORE_REDUCER_DURATION: &str = "store.reducer.duration_seconds";
/// Effects executed, labelled by `type`
pub const STORE_EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Ticks fired by a [`crate::Ticker`]
pub const TICKER_TICKS_TOTAL: &str = "ticker.ticks.total";

/// Register descriptions for the store and ticker metrics.
///
/// Call once after installing a recorder so exporters can attach help text.
pub fn register_metrics() {
    describe_counter!(STORE_ACTIONS_TOTAL, "Total number of actions sent to stores");
    describe_histogram!(
        STORE_REDUCER_DURATION,
        Unit::Seconds,
        "Time spent inside the reducer while holding the state lock"
    );
    describe_counter!(STORE_EFFECTS_EXECUTED, "Effects executed by type");
    describe_counter!(TICKER_TICKS_TOTAL, "Periodic ticks delivered to stores");
}
