//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Split the state into named slices, one reducer each
//! - **`scope_reducer`**: Focus a reducer on a single field of a larger state
//! - **`sequence_reducers`**: Run several reducers over the same state in order
//! - **`from_any`**: Feed untyped [`AnyAction`]s to a typed reducer
//!
//! All of them preserve identity: when none of the inner reducers produce a
//! new value, the composite returns the state it was given.
//!
//! # Examples
//!
//! ## Combining Reducers
//!
//! ```
//! use reducible_core::composition::combine_reducers;
//! use reducible_core::reducer::{reducer_fn, unchanged, updated, Reducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default)]
//! struct Counter { value: i64 }
//!
//! #[derive(Clone, Debug, Default)]
//! struct Todos { items: Vec<String> }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     counter: Arc<Counter>,
//!     todos: Arc<Todos>,
//! }
//!
//! enum AppAction {
//!     Increment,
//!     TodoAdded(String),
//! }
//!
//! let root = combine_reducers()
//!     .slice(
//!         "counter",
//!         |s: &AppState| &s.counter,
//!         |s: &mut AppState, v| s.counter = v,
//!         reducer_fn(|state: &Arc<Counter>, action: &AppAction| match action {
//!             AppAction::Increment => updated(state, |c| c.value += 1),
//!             AppAction::TodoAdded(_) => unchanged(state),
//!         }),
//!     )
//!     .slice(
//!         "todos",
//!         |s: &AppState| &s.todos,
//!         |s: &mut AppState, v| s.todos = v,
//!         reducer_fn(|state: &Arc<Todos>, action: &AppAction| match action {
//!             AppAction::TodoAdded(text) => updated(state, |t| t.items.push(text.clone())),
//!             AppAction::Increment => unchanged(state),
//!         }),
//!     );
//!
//! let state = Arc::new(AppState::default());
//! let next = root.reduce(&state, &AppAction::Increment);
//! assert_eq!(next.counter.value, 1);
//! assert!(Arc::ptr_eq(&state.todos, &next.todos));
//! ```

use crate::action::AnyAction;
use crate::reducer::{Reducer, unchanged};
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased slice of a [`CombinedReducer`]
trait SliceReducer<S, A>: Send + Sync {
    /// Name of the field this slice owns
    fn key(&self) -> &'static str;

    /// Reduce this slice of `previous`, writing into `next` only on change
    ///
    /// `next` is created lazily from `previous` the first time any slice
    /// changes, so an action nobody handles never clones the aggregate.
    fn reduce_into(&self, previous: &S, action: &A, next: &mut Option<S>);
}

struct Slice<S, Sub, A, R> {
    key: &'static str,
    get_state: fn(&S) -> &Arc<Sub>,
    set_state: fn(&mut S, Arc<Sub>),
    reducer: R,
    _phantom: PhantomData<fn(&A)>,
}

impl<S, Sub, A, R> SliceReducer<S, A> for Slice<S, Sub, A, R>
where
    S: Clone,
    R: Reducer<State = Sub, Action = A> + Send + Sync,
{
    fn key(&self) -> &'static str {
        self.key
    }

    fn reduce_into(&self, previous: &S, action: &A, next: &mut Option<S>) {
        let current = (self.get_state)(previous);
        let reduced = self.reducer.reduce(current, action);

        if !Arc::ptr_eq(current, &reduced) {
            let next = next.get_or_insert_with(|| previous.clone());
            (self.set_state)(next, reduced);
        }
    }
}

/// Start building a reducer over named slices of `S`
///
/// Every action is routed to every slice reducer. A new aggregate is
/// assembled only when at least one slice returns a new `Arc`; otherwise the
/// previous aggregate is returned as is.
#[must_use]
pub fn combine_reducers<S, A>() -> CombinedReducer<S, A> {
    CombinedReducer {
        slices: SmallVec::new(),
    }
}

/// A reducer assembled from named slice reducers.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A> {
    slices: SmallVec<[Box<dyn SliceReducer<S, A>>; 4]>,
}

impl<S, A> CombinedReducer<S, A>
where
    S: Clone + 'static,
    A: 'static,
{
    /// Add a slice
    ///
    /// # Arguments
    ///
    /// - `key`: Name of the slice, used for introspection
    /// - `get_state`: Reads the slice out of the aggregate
    /// - `set_state`: Writes a new slice value into a copy of the aggregate
    /// - `reducer`: The slice reducer
    #[must_use]
    pub fn slice<Sub, R>(
        mut self,
        key: &'static str,
        get_state: fn(&S) -> &Arc<Sub>,
        set_state: fn(&mut S, Arc<Sub>),
        reducer: R,
    ) -> Self
    where
        Sub: 'static,
        R: Reducer<State = Sub, Action = A> + Send + Sync + 'static,
    {
        self.slices.push(Box::new(Slice {
            key,
            get_state,
            set_state,
            reducer,
            _phantom: PhantomData,
        }));
        self
    }
}

impl<S, A> CombinedReducer<S, A> {
    /// Slice names in the order they were added
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.iter().map(|slice| slice.key())
    }

    /// Number of slices
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Whether no slice has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl<S, A> Reducer for CombinedReducer<S, A> {
    type State = S;
    type Action = A;

    fn reduce(&self, state: &Arc<S>, action: &A) -> Arc<S> {
        let mut next = None;

        for slice in &self.slices {
            slice.reduce_into(&**state, action, &mut next);
        }

        next.map_or_else(|| unchanged(state), Arc::new)
    }
}

/// Scopes a reducer to operate on a single field of a larger state.
///
/// This allows you to reuse reducers designed for smaller state types
/// within a larger application state.
///
/// # Examples
///
/// ```
/// use reducible_core::composition::scope_reducer;
/// use reducible_core::reducer::{reducer_fn, updated, Reducer};
/// use std::sync::Arc;
///
/// #[derive(Clone, Default)]
/// struct CounterState { count: i32 }
///
/// #[derive(Clone, Default)]
/// struct AppState {
///     counter: Arc<CounterState>,
///     other_data: String,
/// }
///
/// let scoped = scope_reducer(
///     reducer_fn(|state: &Arc<CounterState>, by: &i32| updated(state, |c| c.count += by)),
///     |app: &AppState| &app.counter,
///     |app: &mut AppState, counter| app.counter = counter,
/// );
///
/// let next = scoped.reduce(&Arc::new(AppState::default()), &3);
/// assert_eq!(next.counter.count, 3);
/// ```
pub const fn scope_reducer<S, SubS, A, R>(
    reducer: R,
    get_state: fn(&S) -> &Arc<SubS>,
    set_state: fn(&mut S, Arc<SubS>),
) -> ScopedReducer<S, SubS, A, R>
where
    R: Reducer<State = SubS, Action = A>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, R> {
    reducer: R,
    get_state: fn(&S) -> &Arc<SubS>,
    set_state: fn(&mut S, Arc<SubS>),
    _phantom: PhantomData<fn(&A)>,
}

impl<S, SubS, A, R> Reducer for ScopedReducer<S, SubS, A, R>
where
    S: Clone,
    R: Reducer<State = SubS, Action = A>,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &Arc<S>, action: &A) -> Arc<S> {
        let current = (self.get_state)(&**state);
        let reduced = self.reducer.reduce(current, action);

        if Arc::ptr_eq(current, &reduced) {
            return unchanged(state);
        }

        let mut next = S::clone(state);
        (self.set_state)(&mut next, reduced);
        Arc::new(next)
    }
}

/// Boxed reducer accepted by [`sequence_reducers`]
pub type BoxedReducer<S, A> = Box<dyn Reducer<State = S, Action = A> + Send + Sync>;

/// Runs multiple reducers over the same state, in order.
///
/// Each reducer sees the state produced by the one before it. Useful for
/// splitting cross-cutting logic (e.g. an audit counter) out of a domain
/// reducer without giving it its own slice.
#[must_use]
pub fn sequence_reducers<S, A>(reducers: Vec<BoxedReducer<S, A>>) -> SequencedReducer<S, A> {
    SequencedReducer { reducers }
}

/// A reducer that threads state through several reducers.
///
/// Created by [`sequence_reducers`].
pub struct SequencedReducer<S, A> {
    reducers: Vec<BoxedReducer<S, A>>,
}

impl<S, A> Reducer for SequencedReducer<S, A> {
    type State = S;
    type Action = A;

    fn reduce(&self, state: &Arc<S>, action: &A) -> Arc<S> {
        self.reducers
            .iter()
            .fold(unchanged(state), |current, reducer| {
                reducer.reduce(&current, action)
            })
    }
}

/// Adapts a typed reducer to accept [`AnyAction`]s.
///
/// Each incoming action is decoded into `R::Action`. Actions that cannot be
/// decoded (unknown `type`, wrong payload shape) are not recognized by this
/// reducer, so the state is returned unchanged.
pub const fn from_any<R>(reducer: R) -> AnyActionReducer<R>
where
    R: Reducer,
    R::Action: DeserializeOwned,
{
    AnyActionReducer { reducer }
}

/// A typed reducer behind an [`AnyAction`] decoding boundary.
///
/// Created by [`from_any`].
pub struct AnyActionReducer<R> {
    reducer: R,
}

impl<R> AnyActionReducer<R> {
    /// The wrapped typed reducer
    pub const fn inner(&self) -> &R {
        &self.reducer
    }
}

impl<R> Reducer for AnyActionReducer<R>
where
    R: Reducer,
    R::Action: DeserializeOwned,
{
    type State = R::State;
    type Action = AnyAction;

    fn reduce(&self, state: &Arc<Self::State>, action: &AnyAction) -> Arc<Self::State> {
        match action.decode::<R::Action>() {
            Ok(typed) => self.reducer.reduce(state, &typed),
            Err(_) => unchanged(state),
        }
    }
}
