//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use reducible_core::reducer::Reducer;
use std::sync::Arc;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Several `when_action` calls are applied in order; assertions run against
/// the final state.
///
/// # Example
///
/// ```ignore
/// use reducible_testing::ReducerTest;
///
/// ReducerTest::new(CounterReducer)
///     .given_state(CounterState { value: 0 })
///     .when_action(CounterAction::Increment)
///     .then_state(|state| {
///         assert_eq!(state.value, 1);
///     })
///     .run();
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    initial_state: Option<Arc<R::State>>,
    actions: Vec<R::Action>,
    state_assertions: Vec<StateAssertion<R::State>>,
    expect_unchanged: bool,
}

impl<R: Reducer> ReducerTest<R> {
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            expect_unchanged: false,
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(Arc::new(state));
        self
    }

    /// Start from an existing snapshot (Given)
    #[must_use]
    pub fn given_snapshot(mut self, state: Arc<R::State>) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to apply (When)
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions to apply in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = R::Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Expect the reducer to return the given snapshot itself (Then)
    #[must_use]
    pub const fn then_unchanged(mut self) -> Self {
        self.expect_unchanged = true;
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state is not set, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let initial = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        // Execute reducer
        let state = self
            .actions
            .iter()
            .fold(Arc::clone(&initial), |state, action| {
                self.reducer.reduce(&state, action)
            });

        if self.expect_unchanged {
            assertions::assert_same_state(&initial, &state);
        }

        // Run state assertions
        for assertion in self.state_assertions {
            assertion(&state);
        }
    }
}

/// Helper assertions for state identity
pub mod assertions {
    use std::sync::Arc;

    /// Assert that `after` is the very same snapshot as `before`
    ///
    /// # Panics
    ///
    /// Panics if the two `Arc`s point at different allocations.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_same_state<S>(before: &Arc<S>, after: &Arc<S>) {
        assert!(
            Arc::ptr_eq(before, after),
            "Expected the reducer to return the previous state unchanged, but got a new snapshot"
        );
    }

    /// Assert that `after` is a new snapshot, distinct from `before`
    ///
    /// # Panics
    ///
    /// Panics if the two `Arc`s point at the same allocation.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_new_state<S>(before: &Arc<S>, after: &Arc<S>) {
        assert!(
            !Arc::ptr_eq(before, after),
            "Expected a new state snapshot, but the reducer returned the previous one"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reducible_core::reducer::{Reducer, unchanged, updated};

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Decrement,
        Ignored,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;

        fn reduce(&self, state: &Arc<TestState>, action: &TestAction) -> Arc<TestState> {
            match action {
                TestAction::Increment => updated(state, |s| s.count += 1),
                TestAction::Decrement => updated(state, |s| s.count -= 1),
                TestAction::Ignored => unchanged(state),
            }
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_decrement() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 5 })
            .when_action(TestAction::Decrement)
            .then_state(|state| {
                assert_eq!(state.count, 4);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_action_sequence() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_actions([
                TestAction::Increment,
                TestAction::Increment,
                TestAction::Decrement,
            ])
            .then_state(|state| assert_eq!(state.count, 1))
            .run();
    }

    #[test]
    fn test_reducer_test_unchanged() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 3 })
            .when_action(TestAction::Ignored)
            .then_unchanged()
            .run();
    }

    #[test]
    #[should_panic(expected = "previous state unchanged")]
    fn test_reducer_test_unchanged_fails_on_update() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 3 })
            .when_action(TestAction::Increment)
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_assertions() {
        let state = Arc::new(TestState { count: 0 });
        assertions::assert_same_state(&state, &TestReducer.reduce(&state, &TestAction::Ignored));
        assertions::assert_new_state(&state, &TestReducer.reduce(&state, &TestAction::Increment));
    }
}
