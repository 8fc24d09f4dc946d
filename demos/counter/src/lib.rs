//! # Counter Example
//!
//! A single-field counter walking through every piece of the architecture.
//!
//! This example showcases:
//! - State as an immutable snapshot
//! - Actions with `"domain/event"` type strings, and their creators
//! - A pure reducer that copies the state to update it
//! - Store usage: dispatch, subscribe, read the state
//! - Selectors
//!
//! ## Example
//!
//! ```
//! use counter::{CounterReducer, CounterState, increment, select_counter_value};
//! use reducible_runtime::create_store;
//!
//! let store = create_store(CounterReducer, Some(CounterState { value: 0 }));
//!
//! store.dispatch(increment()).unwrap();
//! store.dispatch(increment()).unwrap();
//!
//! assert_eq!(store.select(&select_counter_value), 2);
//! ```

use reducible_core::action::AnyAction;
use reducible_core::reducer::{Reducer, unchanged, updated};
use reducible_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Action type strings handled by [`CounterReducer`]
pub mod types {
    /// Add one
    pub const INCREMENT: &str = "counter/increment";
    /// Subtract one
    pub const DECREMENT: &str = "counter/decrement";
    /// Add the payload
    pub const INCREMENT_BY_AMOUNT: &str = "counter/incrementByAmount";
    /// Back to zero
    pub const RESET: &str = "counter/reset";
}

/// Counter state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    /// Current counter value
    pub value: i64,
}

/// Counter actions
///
/// Serialized as `{"type": "counter/...", "payload": ...}`.
#[derive(Action, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CounterAction {
    /// Increment the counter by 1
    #[action(type = "counter/increment")]
    #[serde(rename = "counter/increment")]
    Increment,

    /// Decrement the counter by 1
    #[action(type = "counter/decrement")]
    #[serde(rename = "counter/decrement")]
    Decrement,

    /// Increment the counter by the given amount
    #[action(type = "counter/incrementByAmount")]
    #[serde(rename = "counter/incrementByAmount")]
    IncrementByAmount(i64),

    /// Reset the counter to 0
    #[action(type = "counter/reset")]
    #[serde(rename = "counter/reset")]
    Reset,
}

/// Action creator for [`types::INCREMENT`]
#[must_use]
pub const fn increment() -> CounterAction {
    CounterAction::Increment
}

/// Action creator for [`types::DECREMENT`]
#[must_use]
pub const fn decrement() -> CounterAction {
    CounterAction::Decrement
}

/// Action creator for [`types::INCREMENT_BY_AMOUNT`]
#[must_use]
pub const fn increment_by_amount(amount: i64) -> CounterAction {
    CounterAction::IncrementByAmount(amount)
}

/// Action creator for [`types::RESET`]
#[must_use]
pub const fn reset() -> CounterAction {
    CounterAction::Reset
}

/// Untyped `counter/increment`, as it would arrive as JSON
#[must_use]
pub fn increment_any() -> AnyAction {
    AnyAction::new(types::INCREMENT)
}

/// Selector for the counter value
#[must_use]
pub const fn select_counter_value(state: &CounterState) -> i64 {
    state.value
}

/// Counter reducer
///
/// Arithmetic saturates at the bounds of `i64`. `Reset` on a counter that
/// is already zero returns the same snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;

    fn reduce(&self, state: &Arc<CounterState>, action: &CounterAction) -> Arc<CounterState> {
        match action {
            CounterAction::Increment => updated(state, |s| s.value = s.value.saturating_add(1)),
            CounterAction::Decrement => updated(state, |s| s.value = s.value.saturating_sub(1)),
            CounterAction::IncrementByAmount(amount) => {
                updated(state, |s| s.value = s.value.saturating_add(*amount))
            },
            CounterAction::Reset if state.value == 0 => unchanged(state),
            CounterAction::Reset => updated(state, |s| s.value = 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reducible_core::action::Action;
    use reducible_testing::ReducerTest;

    #[test]
    fn test_increment() {
        ReducerTest::new(CounterReducer)
            .given_state(CounterState { value: 0 })
            .when_action(increment())
            .then_state(|state| assert_eq!(state.value, 1))
            .run();
    }

    #[test]
    fn test_decrement() {
        ReducerTest::new(CounterReducer)
            .given_state(CounterState { value: 5 })
            .when_action(decrement())
            .then_state(|state| assert_eq!(state.value, 4))
            .run();
    }

    #[test]
    fn test_increment_by_amount() {
        ReducerTest::new(CounterReducer)
            .given_state(CounterState { value: 1 })
            .when_action(increment_by_amount(41))
            .then_state(|state| assert_eq!(state.value, 42))
            .run();
    }

    #[test]
    fn test_reset() {
        ReducerTest::new(CounterReducer)
            .given_state(CounterState { value: 42 })
            .when_action(reset())
            .then_state(|state| assert_eq!(state.value, 0))
            .run();
    }

    #[test]
    fn test_reset_at_zero_is_unchanged() {
        ReducerTest::new(CounterReducer)
            .given_state(CounterState::default())
            .when_action(reset())
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_saturates() {
        ReducerTest::new(CounterReducer)
            .given_state(CounterState { value: i64::MAX })
            .when_actions([increment(), increment_by_amount(10)])
            .then_state(|state| assert_eq!(state.value, i64::MAX))
            .run();
    }

    #[test]
    fn test_action_creators_match_type_constants() {
        assert_eq!(increment().action_type(), Some(types::INCREMENT));
        assert_eq!(decrement().action_type(), Some(types::DECREMENT));
        assert_eq!(
            increment_by_amount(3).action_type(),
            Some(types::INCREMENT_BY_AMOUNT)
        );
        assert_eq!(reset().action_type(), Some(types::RESET));
        assert_eq!(increment_any().action_type(), Some(types::INCREMENT));
    }

    #[test]
    fn test_selector() {
        assert_eq!(select_counter_value(&CounterState { value: 2 }), 2);
    }
}
