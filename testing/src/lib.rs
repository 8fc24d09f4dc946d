//! # Reducible Testing
//!
//! Testing utilities and helpers for reducers and stores.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then builder for reducers
//! - Assertion helpers for state identity
//! - [`mocks::CallLog`] for checking subscriber order
//! - [`helpers::StateLog`] for recording every state a store publishes
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use reducible_testing::ReducerTest;
//!
//! #[test]
//! fn test_increment() {
//!     ReducerTest::new(CounterReducer)
//!         .given_state(CounterState { value: 0 })
//!         .when_action(CounterAction::Increment)
//!         .then_state(|state| assert_eq!(state.value, 1))
//!         .run();
//! }
//! ```

/// Mock implementations for testing
pub mod mocks {
    use std::sync::{Arc, Mutex, PoisonError};

    /// Shared log of labelled calls
    ///
    /// Hand out [`CallLog::recorder`] closures as subscribers and compare
    /// the order they fired in.
    ///
    /// # Example
    ///
    /// ```
    /// use reducible_testing::mocks::CallLog;
    ///
    /// let log = CallLog::new();
    /// let a = log.recorder("A");
    /// let b = log.recorder("B");
    ///
    /// b();
    /// a();
    /// assert_eq!(log.calls(), vec!["B", "A"]);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct CallLog {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl CallLog {
        /// Create an empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A callback that appends `label` to this log each time it runs
        #[must_use]
        pub fn recorder(&self, label: &'static str) -> impl Fn() + Clone + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            move || {
                calls
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(label);
            }
        }

        /// Labels recorded so far, oldest first
        #[must_use]
        pub fn calls(&self) -> Vec<&'static str> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of recorded calls
        #[must_use]
        pub fn len(&self) -> usize {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        /// Whether nothing has been recorded
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Forget every recorded call
        pub fn clear(&self) {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    use reducible_core::reducer::Reducer;
    use reducible_runtime::{Store, Subscription};
    use std::sync::{Arc, Mutex, PoisonError, Weak};

    /// Every state snapshot a store published, in order
    ///
    /// Attach with [`StateLog::attach`]; the log subscribes to the store and
    /// keeps the `Arc` it sees after each dispatch, so tests can check both
    /// values and identity.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Arc::new(Store::with_default(CounterReducer));
    /// let states = StateLog::attach(&store);
    ///
    /// store.dispatch(CounterAction::Increment)?;
    /// assert_eq!(states.values(|s| s.value), vec![1]);
    /// ```
    pub struct StateLog<S> {
        states: Arc<Mutex<Vec<Arc<S>>>>,
        subscription: Subscription,
    }

    impl<S> StateLog<S>
    where
        S: Send + Sync + 'static,
    {
        /// Subscribe to `store` and start recording
        ///
        /// Holds only a weak reference to the store.
        pub fn attach<R>(store: &Arc<Store<R>>) -> Self
        where
            R: Reducer<State = S> + Send + Sync + 'static,
        {
            let states = Arc::new(Mutex::new(Vec::new()));

            let weak: Weak<Store<R>> = Arc::downgrade(store);
            let sink = Arc::clone(&states);
            let subscription = store.subscribe(move || {
                if let Some(store) = weak.upgrade() {
                    sink.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(store.state());
                }
            });

            Self {
                states,
                subscription,
            }
        }

        /// Recorded snapshots, oldest first
        #[must_use]
        pub fn snapshots(&self) -> Vec<Arc<S>> {
            self.states
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Project every recorded snapshot
        pub fn values<T>(&self, project: impl Fn(&S) -> T) -> Vec<T> {
            self.states
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|state| project(&**state))
                .collect()
        }

        /// Number of notifications seen
        #[must_use]
        pub fn len(&self) -> usize {
            self.states.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        /// Whether no notification has been seen
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Stop recording
        pub fn detach(&self) -> bool {
            self.subscription.unsubscribe()
        }
    }
}

/// Property-based testing utilities
///
/// Strategies for driving reducers with arbitrary action sequences.
pub mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use reducible_core::reducer::Reducer;
    use std::sync::Arc;

    /// Sequences of up to `max_len` actions drawn from `action`
    pub fn action_sequences<A>(
        action: impl Strategy<Value = A>,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<A>>
    where
        A: std::fmt::Debug,
    {
        vec(action, 0..=max_len)
    }

    /// Fold `actions` through `reducer`, returning every intermediate state
    ///
    /// The first element is `initial`.
    pub fn replay<R: Reducer>(
        reducer: &R,
        initial: Arc<R::State>,
        actions: &[R::Action],
    ) -> Vec<Arc<R::State>> {
        let mut states = Vec::with_capacity(actions.len() + 1);
        states.push(initial);

        for action in actions {
            if let Some(current) = states.last() {
                let next = reducer.reduce(current, action);
                states.push(next);
            }
        }

        states
    }
}

/// Ergonomic reducer testing utilities
pub mod reducer_test;

// Re-export commonly used items
pub use mocks::CallLog;
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reducible_core::reducer::{reducer_fn, unchanged, updated};
    use std::sync::Arc;

    #[test]
    fn test_call_log_records_in_order() {
        let log = CallLog::new();
        let a = log.recorder("A");
        let b = log.recorder("B");

        a();
        b();
        a();

        assert_eq!(log.calls(), vec!["A", "B", "A"]);
        assert_eq!(log.len(), 3);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_call_log_clones_share_calls() {
        let log = CallLog::new();
        let other = log.clone();
        other.recorder("A")();
        assert_eq!(log.calls(), vec!["A"]);
    }

    #[test]
    fn test_replay_includes_initial_state() {
        let reducer = reducer_fn(|state: &Arc<i64>, by: &i64| {
            if *by == 0 {
                unchanged(state)
            } else {
                updated(state, |value| *value += by)
            }
        });

        let states = properties::replay(&reducer, Arc::new(0), &[1, 0, 2]);
        let values: Vec<i64> = states.iter().map(|state| **state).collect();
        assert_eq!(values, vec![0, 1, 1, 3]);
        assert!(Arc::ptr_eq(&states[1], &states[2]));
    }

    proptest! {
        #[test]
        fn prop_action_sequences_respect_max_len(actions in properties::action_sequences(0u8..4, 5)) {
            prop_assert!(actions.len() <= 5);
        }
    }
}
