//! Metrics for observability and monitoring.
//!
//! The store records through the `metrics` facade. Nothing is exported
//! unless the application installs a recorder; call [`describe_metrics`]
//! once after installing it so the exporter carries descriptions.
//!
//! # Metrics
//!
//! | Name | Kind | Labels |
//! |------|------|--------|
//! | `store.dispatch.total` | counter | |
//! | `store.dispatch.rejected` | counter | `reason` |
//! | `store.reducer.duration_seconds` | histogram | |
//! | `store.subscribers.notified` | counter | |
//! | `store.queue.depth` | gauge | |

use metrics::{describe_counter, describe_gauge, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Successful dispatches
pub const DISPATCH_TOTAL: &str = "store.dispatch.total";

/// Dispatches rejected before reaching the reducer
pub const DISPATCH_REJECTED: &str = "store.dispatch.rejected";

/// Time spent inside the reducer
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Subscriber invocations
pub const SUBSCRIBERS_NOTIFIED: &str = "store.subscribers.notified";

/// Actions waiting in a dispatch queue
pub const QUEUE_DEPTH: &str = "store.queue.depth";

/// Register all metric descriptions.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of actions applied by stores");
    describe_counter!(
        DISPATCH_REJECTED,
        "Total number of dispatches rejected (invalid action or dispatch in progress)"
    );
    describe_histogram!(REDUCER_DURATION, "Time taken to execute reducers");
    describe_counter!(
        SUBSCRIBERS_NOTIFIED,
        "Total number of subscriber callbacks invoked"
    );
    describe_gauge!(QUEUE_DEPTH, "Number of actions waiting in a dispatch queue");
}
