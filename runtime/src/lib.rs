//! # Reducible Runtime
//!
//! Runtime implementation for the Reducible state container.
//!
//! This crate provides the Store that owns the current state, runs the
//! reducer for each dispatched action, and notifies subscribers.
//!
//! ## Core Components
//!
//! - **Store**: Holds the single current state and coordinates dispatch
//! - **Subscription**: Handle returned by `subscribe`, used to unregister
//! - **`DispatchQueue`**: Serializes dispatches coming from many async tasks
//!
//! ## Example
//!
//! ```ignore
//! use reducible_runtime::Store;
//!
//! let store = Store::new(CounterState { value: 0 }, CounterReducer);
//!
//! let subscription = store.subscribe(|| println!("state changed"));
//! store.dispatch(CounterAction::Increment)?;
//!
//! assert_eq!(store.state().value, 1);
//! subscription.unsubscribe();
//! ```

use reducible_core::action::Action;
use reducible_core::reducer::Reducer;
use reducible_core::selector::Selector;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};

/// Single-writer queue for dispatching from async tasks
pub mod queue;

/// Metric names and descriptions
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use reducible_core::action::ActionError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Every error is returned before the stored state is touched.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The action has no usable `type` discriminant
        #[error("Invalid action: {0}")]
        InvalidAction(#[from] ActionError),

        /// Another dispatch is already running on this store
        ///
        /// Returned when a reducer or subscriber dispatches, or when a second
        /// thread dispatches while the first is still in progress.
        #[error("Dispatch already in progress on this store")]
        ReentrantDispatch,

        /// The dispatch queue worker is no longer running
        #[error("Dispatch queue is closed")]
        QueueClosed,
    }
}

pub use error::StoreError;
pub use queue::DispatchQueue;
pub use store::{Store, Subscription, create_store};

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use reducible_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_name("counter")
///     .with_slow_dispatch_threshold(Duration::from_millis(2));
///
/// assert_eq!(config.name, "counter");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name recorded on every log line and metric emitted by the store
    pub name: String,
    /// Buffer size of a [`DispatchQueue`] fed by this store
    pub queue_capacity: usize,
    /// Dispatches slower than this (reducer plus notification) are logged
    pub slow_dispatch_threshold: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        queue_capacity: usize,
        slow_dispatch_threshold: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            queue_capacity,
            slow_dispatch_threshold,
        }
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the dispatch queue capacity
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the slow dispatch warning threshold
    #[must_use]
    pub const fn with_slow_dispatch_threshold(mut self, threshold: Duration) -> Self {
        self.slow_dispatch_threshold = threshold;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
            queue_capacity: 64,
            slow_dispatch_threshold: Duration::from_millis(10),
        }
    }
}

/// Subscriber callback
type Listener = Arc<dyn Fn() + Send + Sync>;

/// Internal: a registered subscriber and its id
struct ListenerEntry {
    id: u64,
    callback: Listener,
}

/// Internal: the store's ordered subscriber list
type ListenerList = Mutex<Vec<ListenerEntry>>;

/// Internal: RAII guard holding the store's in-progress flag
///
/// Releases the flag on drop, so a panicking reducer or subscriber does not
/// leave the store locked.
struct DispatchGuard<'a>(&'a AtomicBool);

impl<'a> DispatchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Action, Arc, AtomicBool, AtomicU64, DispatchGuard, Instant, ListenerEntry, ListenerList,
        Ordering, PoisonError, Reducer, RwLock, Selector, StoreConfig, StoreError, Weak,
    };
    use crate::metrics as names;

    /// The Store - owner of the current state
    ///
    /// The Store manages:
    /// 1. State (an `Arc` snapshot, replaced wholesale on every dispatch)
    /// 2. Reducer (business logic)
    /// 3. Subscribers (notified after each dispatch, in registration order)
    ///
    /// Construct one per application and pass it explicitly to whatever
    /// needs it; there is no global store.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(CounterState { value: 0 }, CounterReducer);
    ///
    /// store.dispatch(CounterAction::Increment)?;
    /// assert_eq!(store.state().value, 1);
    /// ```
    pub struct Store<R: Reducer> {
        state: RwLock<Arc<R::State>>,
        reducer: R,
        listeners: Arc<ListenerList>,
        next_listener_id: AtomicU64,
        dispatching: AtomicBool,
        config: StoreConfig,
    }

    /// Create a store, starting from `R::State::default()` when no initial
    /// state is given
    pub fn create_store<R>(reducer: R, initial_state: Option<R::State>) -> Store<R>
    where
        R: Reducer,
        R::State: Default,
    {
        Store::new(initial_state.unwrap_or_default(), reducer)
    }

    impl<R: Reducer> Store<R> {
        /// Create a new store with initial state and reducer
        ///
        /// Uses [`StoreConfig::default`].
        pub fn new(initial_state: R::State, reducer: R) -> Self {
            Self::with_config(initial_state, reducer, StoreConfig::default())
        }

        /// Create a new store starting from the default state
        pub fn with_default(reducer: R) -> Self
        where
            R::State: Default,
        {
            Self::new(R::State::default(), reducer)
        }

        /// Create a new store with custom configuration
        pub fn with_config(initial_state: R::State, reducer: R, config: StoreConfig) -> Self {
            tracing::debug!(store = %config.name, "Store created");

            Self {
                state: RwLock::new(Arc::new(initial_state)),
                reducer,
                listeners: Arc::new(ListenerList::default()),
                next_listener_id: AtomicU64::new(0),
                dispatching: AtomicBool::new(false),
                config,
            }
        }

        /// The current state
        ///
        /// Returns the snapshot itself; holding it never blocks dispatch.
        #[must_use]
        pub fn state(&self) -> Arc<R::State> {
            Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
        }

        /// Project the current state through a selector
        pub fn select<Sel>(&self, selector: &Sel) -> Sel::Output
        where
            Sel: Selector<R::State>,
        {
            selector.select(&self.state())
        }

        /// The store configuration
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// The reducer driving this store
        #[must_use]
        pub const fn reducer(&self) -> &R {
            &self.reducer
        }

        /// Whether a dispatch is currently running
        #[must_use]
        pub fn is_dispatching(&self) -> bool {
            self.dispatching.load(Ordering::Acquire)
        }

        /// Number of registered subscribers
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Dispatch an action
        ///
        /// This is the only way to change the state:
        /// 1. Validates the action's `type`
        /// 2. Marks the store as dispatching
        /// 3. Runs the reducer with (current state, action)
        /// 4. Replaces the stored state with the result
        /// 5. Calls every subscriber, in registration order
        ///
        /// # Errors
        ///
        /// - [`StoreError::InvalidAction`] if the action has no usable `type`
        /// - [`StoreError::ReentrantDispatch`] if a dispatch is already running
        ///
        /// In both cases the state is left untouched.
        ///
        /// # Panics
        ///
        /// A panicking reducer unwinds to the caller before the state is
        /// replaced; the store remains usable. A panicking subscriber unwinds
        /// after the state was replaced, skipping the remaining subscribers.
        #[tracing::instrument(skip(self, action), fields(store = %self.config.name), name = "store_dispatch")]
        pub fn dispatch(&self, action: R::Action) -> Result<(), StoreError>
        where
            R::Action: Action,
        {
            let action_type = match action.validate() {
                Ok(action_type) => action_type,
                Err(error) => {
                    tracing::warn!(%error, "Rejected action");
                    metrics::counter!(names::DISPATCH_REJECTED, "reason" => "invalid_action")
                        .increment(1);
                    return Err(error.into());
                },
            };

            let Some(_guard) = DispatchGuard::acquire(&self.dispatching) else {
                tracing::warn!(action_type, "Rejected action: dispatch already in progress");
                metrics::counter!(names::DISPATCH_REJECTED, "reason" => "reentrant").increment(1);
                return Err(StoreError::ReentrantDispatch);
            };

            tracing::debug!(action_type, "Dispatching action");
            metrics::counter!(names::DISPATCH_TOTAL).increment(1);

            let start = Instant::now();
            let current = self.state();

            let next = {
                let span = tracing::trace_span!("reducer_execution");
                let _enter = span.enter();
                self.reducer.reduce(&current, &action)
            };
            metrics::histogram!(names::REDUCER_DURATION).record(start.elapsed().as_secs_f64());

            let changed = !Arc::ptr_eq(&current, &next);
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
            tracing::trace!(changed, "State replaced");

            let notified = self.notify();

            let elapsed = start.elapsed();
            if elapsed > self.config.slow_dispatch_threshold {
                tracing::warn!(
                    action_type,
                    elapsed_ms = elapsed.as_millis(),
                    subscribers = notified,
                    "Slow dispatch"
                );
            }

            tracing::debug!(action_type, changed, subscribers = notified, "Dispatch completed");
            Ok(())
        }

        /// Register a callback invoked after every successful dispatch
        ///
        /// Subscribers added while a notification pass is running are first
        /// called on the next dispatch.
        pub fn subscribe<F>(&self, callback: F) -> Subscription
        where
            F: Fn() + Send + Sync + 'static,
        {
            let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);

            let mut listeners = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            listeners.push(ListenerEntry {
                id,
                callback: Arc::new(callback),
            });
            tracing::trace!(store = %self.config.name, subscriber = id, total = listeners.len(), "Subscribed");

            Subscription {
                id,
                listeners: Arc::downgrade(&self.listeners),
            }
        }

        /// Notify a snapshot of the subscriber list
        ///
        /// Changes to the list made by the callbacks apply from the next pass.
        fn notify(&self) -> usize {
            let snapshot: Vec<_> = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|entry| Arc::clone(&entry.callback))
                .collect();

            tracing::trace!(count = snapshot.len(), "Notifying subscribers");
            for callback in &snapshot {
                callback();
            }

            metrics::counter!(names::SUBSCRIBERS_NOTIFIED).increment(snapshot.len() as u64);
            snapshot.len()
        }
    }

    impl<R> Default for Store<R>
    where
        R: Reducer + Default,
        R::State: Default,
    {
        fn default() -> Self {
            Self::with_default(R::default())
        }
    }

    impl<R: Reducer> std::fmt::Debug for Store<R>
    where
        R::State: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("name", &self.config.name)
                .field("state", &self.state())
                .field("subscribers", &self.subscriber_count())
                .finish_non_exhaustive()
        }
    }

    /// Handle returned by [`Store::subscribe`]
    ///
    /// Holds only a weak reference to the store's subscriber list, so it
    /// never keeps the store alive. Dropping the handle does not unsubscribe.
    #[derive(Debug, Clone)]
    pub struct Subscription {
        id: u64,
        listeners: Weak<ListenerList>,
    }

    impl Subscription {
        /// Remove the callback from the store
        ///
        /// Returns `false` if it was already removed or the store is gone.
        /// If called during a notification pass, the current pass still
        /// runs to completion with the callback included.
        pub fn unsubscribe(&self) -> bool {
            let Some(listeners) = self.listeners.upgrade() else {
                return false;
            };

            let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let before = listeners.len();
            listeners.retain(|entry| entry.id != self.id);
            let removed = listeners.len() != before;

            if removed {
                tracing::trace!(subscriber = self.id, "Unsubscribed");
            }
            removed
        }

        /// Identifier of this subscription, unique within its store
        #[must_use]
        pub const fn id(&self) -> u64 {
            self.id
        }
    }
}
