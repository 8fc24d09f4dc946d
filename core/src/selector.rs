//! Selectors: read-only projections over state
//!
//! Any `Fn(&S) -> T` is a [`Selector`]. Selectors compose with
//! [`SelectorExt::map`], and [`memoize`] wraps a projection so that it is
//! only recomputed when the slices of state it reads change identity.
//!
//! ```
//! use reducible_core::selector::{Selector, SelectorExt};
//!
//! struct CounterState { value: i64 }
//!
//! let select_value = |state: &CounterState| state.value;
//! let select_is_even = select_value.map(|value: &i64| value % 2 == 0);
//!
//! let state = CounterState { value: 2 };
//! assert_eq!(select_value.select(&state), 2);
//! assert!(select_is_even.select(&state));
//! ```

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A pure projection from state `S`
pub trait Selector<S: ?Sized> {
    /// What the selector extracts
    type Output;

    /// Extract the projection from `state`
    fn select(&self, state: &S) -> Self::Output;
}

impl<S, T, F> Selector<S> for F
where
    S: ?Sized,
    F: Fn(&S) -> T,
{
    type Output = T;

    fn select(&self, state: &S) -> T {
        self(state)
    }
}

/// Combinators available on every [`Selector`]
pub trait SelectorExt<S: ?Sized>: Selector<S> + Sized {
    /// Project the output of this selector further
    fn map<G, T>(self, then: G) -> Map<Self, G>
    where
        G: Fn(&Self::Output) -> T,
    {
        Map { first: self, then }
    }
}

impl<S: ?Sized, Sel: Selector<S>> SelectorExt<S> for Sel {}

/// A selector applied to the output of another selector.
///
/// Created by [`SelectorExt::map`].
#[derive(Debug, Clone, Copy)]
pub struct Map<Sel, G> {
    first: Sel,
    then: G,
}

impl<S, Sel, G, T> Selector<S> for Map<Sel, G>
where
    S: ?Sized,
    Sel: Selector<S>,
    G: Fn(&Sel::Output) -> T,
{
    type Output = T;

    fn select(&self, state: &S) -> T {
        (self.then)(&self.first.select(state))
    }
}

/// Identity of the slices a memoized selector reads
///
/// Implemented for `Arc<T>` and tuples of up to three keys. Two keys are
/// the same when every `Arc` in them points at the same allocation.
pub trait IdentityKey {
    /// Whether `self` and `other` refer to the same slices
    fn same_as(&self, other: &Self) -> bool;
}

impl<T: ?Sized> IdentityKey for Arc<T> {
    fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<A: IdentityKey, B: IdentityKey> IdentityKey for (A, B) {
    fn same_as(&self, other: &Self) -> bool {
        self.0.same_as(&other.0) && self.1.same_as(&other.1)
    }
}

impl<A: IdentityKey, B: IdentityKey, C: IdentityKey> IdentityKey for (A, B, C) {
    fn same_as(&self, other: &Self) -> bool {
        self.0.same_as(&other.0) && self.1.same_as(&other.1) && self.2.same_as(&other.2)
    }
}

/// Memoize `project` over the slices returned by `input`
///
/// `input` returns the `Arc` (or a tuple of `Arc`s) of the slices the
/// projection reads. The projection is recomputed only when that key is not
/// pointer-equal to the one seen on the previous call; otherwise the cached
/// output is cloned.
///
/// ```
/// use reducible_core::selector::{memoize, Selector};
/// use std::sync::Arc;
///
/// struct AppState { todos: Arc<Vec<String>> }
///
/// let select_count = memoize(
///     |state: &AppState| Arc::clone(&state.todos),
///     |todos: &Arc<Vec<String>>| todos.len(),
/// );
///
/// let state = AppState { todos: Arc::new(vec!["Buy milk".to_string()]) };
/// assert_eq!(select_count.select(&state), 1);
/// assert_eq!(select_count.select(&state), 1);
/// assert_eq!(select_count.recomputations(), 1);
/// ```
pub fn memoize<S, K, T, I, P>(input: I, project: P) -> Memoized<S, K, T, I, P>
where
    S: ?Sized,
    K: IdentityKey,
    I: Fn(&S) -> K,
    P: Fn(&K) -> T,
    T: Clone,
{
    Memoized {
        input,
        project,
        cache: Mutex::new(None),
        recomputations: AtomicU64::new(0),
        _phantom: PhantomData,
    }
}

/// A projection cached by slice identity.
///
/// Created by [`memoize`].
pub struct Memoized<S: ?Sized, K, T, I, P> {
    input: I,
    project: P,
    cache: Mutex<Option<(K, T)>>,
    recomputations: AtomicU64,
    _phantom: PhantomData<fn(&S)>,
}

impl<S: ?Sized, K, T, I, P> Memoized<S, K, T, I, P> {
    /// How many times the projection has actually run
    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    /// Drop the cached value so the next call recomputes
    pub fn reset(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl<S, K, T, I, P> Selector<S> for Memoized<S, K, T, I, P>
where
    S: ?Sized,
    K: IdentityKey,
    I: Fn(&S) -> K,
    P: Fn(&K) -> T,
    T: Clone,
{
    type Output = T;

    fn select(&self, state: &S) -> T {
        let key = (self.input)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((seen, output)) = cache.as_ref() {
            if seen.same_as(&key) {
                return output.clone();
            }
        }

        let output = (self.project)(&key);
        *cache = Some((key, output.clone()));
        self.recomputations.fetch_add(1, Ordering::Relaxed);

        output
    }
}
