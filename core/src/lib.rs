//! # Reducible Core
//!
//! Core traits and types for the Reducible state container.
//!
//! This crate provides the pure half of a Redux-style architecture: the
//! values and functions that describe *what* changes, with no runtime.
//! The `reducible-runtime` crate supplies the Store that executes them.
//!
//! ## Core Concepts
//!
//! - **State**: An immutable snapshot, shared as `Arc<State>`
//! - **Action**: A record describing an event, with a `type` discriminant
//! - **Reducer**: Pure function `(State, Action) → State`
//! - **Selector**: Pure read-only projection `State → T`
//!
//! ## Architecture Principles
//!
//! - Unidirectional Data Flow
//! - Immutable updates (copy, modify the copy, return it)
//! - Identity-preserving no-ops (unrecognized actions return the same `Arc`)
//! - No hidden I/O, randomness or time inside reducers
//!
//! ## Example
//!
//! ```
//! use reducible_core::reducer::{self, Reducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     value: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!
//!     fn reduce(&self, state: &Arc<CounterState>, action: &CounterAction) -> Arc<CounterState> {
//!         match action {
//!             CounterAction::Increment => reducer::updated(state, |s| s.value += 1),
//!         }
//!     }
//! }
//!
//! let state = Arc::new(CounterState::default());
//! let next = CounterReducer.reduce(&state, &CounterAction::Increment);
//! assert_eq!(next.value, 1);
//! assert_eq!(state.value, 0);
//! ```

pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Actions and the untyped [`action::AnyAction`] boundary type
pub mod action;

/// Reducer composition: combine, scope, sequence and adapt reducers
pub mod composition;

/// Selectors and memoized selectors
pub mod selector;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action) → State`.
///
/// They contain all business logic and are deterministic and testable. A
/// reducer never mutates the state it is given; it either returns the same
/// `Arc` (the action is not relevant) or a new `Arc` holding an updated copy.
pub mod reducer {
    use std::marker::PhantomData;
    use std::sync::Arc;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TodosReducer {
    ///     type State = TodosState;
    ///     type Action = TodosAction;
    ///
    ///     fn reduce(&self, state: &Arc<TodosState>, action: &TodosAction) -> Arc<TodosState> {
    ///         match action {
    ///             TodosAction::TodoAdded(text) => updated(state, |s| s.push(text.clone())),
    ///             _ => unchanged(state),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Compute the next state for an action
        ///
        /// Must return `state` itself (pointer-equal) when the action is not
        /// recognized.
        fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State>;
    }

    impl<R: Reducer + ?Sized> Reducer for Box<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
            (**self).reduce(state, action)
        }
    }

    impl<R: Reducer + ?Sized> Reducer for Arc<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
            (**self).reduce(state, action)
        }
    }

    /// Return the current state untouched
    #[must_use]
    pub fn unchanged<S>(state: &Arc<S>) -> Arc<S> {
        Arc::clone(state)
    }

    /// Copy the state, apply `update` to the copy, and return it
    #[must_use]
    pub fn updated<S, F>(state: &Arc<S>, update: F) -> Arc<S>
    where
        S: Clone,
        F: FnOnce(&mut S),
    {
        let mut next = S::clone(state);
        update(&mut next);
        Arc::new(next)
    }

    /// A reducer backed by a plain function or closure
    ///
    /// Created by [`reducer_fn`].
    pub struct FnReducer<S, A, F> {
        f: F,
        _phantom: PhantomData<fn(&S, &A)>,
    }

    /// Turn a function `(&Arc<S>, &A) -> Arc<S>` into a [`Reducer`]
    ///
    /// # Example
    ///
    /// ```
    /// use reducible_core::reducer::{reducer_fn, Reducer};
    /// use std::sync::Arc;
    ///
    /// let double = reducer_fn(|state: &Arc<i64>, _action: &()| Arc::new(**state * 2));
    /// assert_eq!(*double.reduce(&Arc::new(21), &()), 42);
    /// ```
    pub const fn reducer_fn<S, A, F>(f: F) -> FnReducer<S, A, F>
    where
        F: Fn(&Arc<S>, &A) -> Arc<S>,
    {
        FnReducer {
            f,
            _phantom: PhantomData,
        }
    }

    impl<S, A, F> Reducer for FnReducer<S, A, F>
    where
        F: Fn(&Arc<S>, &A) -> Arc<S>,
    {
        type State = S;
        type Action = A;

        fn reduce(&self, state: &Arc<S>, action: &A) -> Arc<S> {
            (self.f)(state, action)
        }
    }

    impl<S, A, F: Clone> Clone for FnReducer<S, A, F> {
        fn clone(&self) -> Self {
            Self {
                f: self.f.clone(),
                _phantom: PhantomData,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::reducer::{Reducer, reducer_fn, unchanged, updated};
    use std::sync::Arc;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        value: i64,
    }

    #[test]
    fn test_updated_leaves_previous_state_alone() {
        let state = Arc::new(Counter { value: 1 });
        let next = updated(&state, |s| s.value += 1);

        assert_eq!(state.value, 1);
        assert_eq!(next.value, 2);
        assert!(!Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_unchanged_is_same_arc() {
        let state = Arc::new(Counter::default());
        assert!(Arc::ptr_eq(&state, &unchanged(&state)));
    }

    enum Act {
        Increment,
        TodoAdded,
    }

    #[test]
    fn test_fn_reducer_ignores_unknown_actions() {
        let reducer = reducer_fn(|state: &Arc<Counter>, action: &Act| match action {
            Act::Increment => updated(state, |s| s.value += 1),
            Act::TodoAdded => unchanged(state),
        });

        let state = Arc::new(Counter::default());
        let next = reducer.reduce(&state, &Act::Increment);
        assert_eq!(next.value, 1);

        let same = reducer.reduce(&next, &Act::TodoAdded);
        assert!(Arc::ptr_eq(&next, &same));
    }

    #[test]
    fn test_boxed_reducer_delegates() {
        let boxed: Box<dyn Reducer<State = Counter, Action = ()>> =
            Box::new(reducer_fn(|state: &Arc<Counter>, _action: &()| {
                updated(state, |s| s.value = 7)
            }));

        let next = boxed.reduce(&Arc::new(Counter::default()), &());
        assert_eq!(next.value, 7);
    }
}
