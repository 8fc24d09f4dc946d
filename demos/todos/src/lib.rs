//! # Todos Example
//!
//! A todo list split into two slices, each with its own reducer:
//! - `todos`: the items themselves
//! - `filters`: which items the view shows
//!
//! The slices are combined into one root reducer with
//! [`combine_reducers`], and [`visible_todos_selector`] memoizes the
//! filtered list on the identity of both slices.
//!
//! ## Example
//!
//! ```
//! use reducible_runtime::Store;
//! use todos::{StatusFilter, add_todo, app_reducer, status_filter_changed, visible_todos_selector};
//!
//! let store = Store::with_default(app_reducer());
//! store.dispatch(add_todo("Buy milk")).unwrap();
//! store.dispatch(status_filter_changed(StatusFilter::Active)).unwrap();
//!
//! let visible = store.select(&visible_todos_selector());
//! assert_eq!(visible.len(), 1);
//! ```

use reducible_core::composition::{CombinedReducer, combine_reducers};
use reducible_core::reducer::{Reducer, unchanged, updated};
use reducible_core::selector::{Memoized, memoize};
use reducible_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Action type strings handled by this example
pub mod types {
    /// A todo was added; payload is its text
    pub const TODO_ADDED: &str = "todos/todoAdded";
    /// A todo was toggled; payload is its id
    pub const TODO_TOGGLED: &str = "todos/todoToggled";
    /// A todo was deleted; payload is its id
    pub const TODO_DELETED: &str = "todos/todoDeleted";
    /// Every completed todo was removed
    pub const COMPLETED_CLEARED: &str = "todos/completedCleared";
    /// The status filter changed; payload is the new filter
    pub const STATUS_FILTER_CHANGED: &str = "filters/statusFilterChanged";
}

/// A single todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier, unique within a [`TodosState`]
    pub id: u64,
    /// What needs doing
    pub text: String,
    /// Whether it is done
    pub completed: bool,
}

/// The `todos` slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodosState {
    /// Items in insertion order
    pub items: Vec<Todo>,
    /// Id given to the next added todo
    pub next_id: u64,
}

/// Which todos the view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every todo
    #[default]
    All,
    /// Todos not yet completed
    Active,
    /// Completed todos
    Completed,
}

impl StatusFilter {
    /// Whether `todo` passes this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

/// The `filters` slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltersState {
    /// Current status filter
    pub status: StatusFilter,
}

/// Root state: one `Arc` per slice
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The `todos` slice
    pub todos: Arc<TodosState>,
    /// The `filters` slice
    pub filters: Arc<FiltersState>,
}

/// Every action of the example
#[derive(Action, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AppAction {
    /// Add a todo with the given text
    #[action(type = "todos/todoAdded")]
    #[serde(rename = "todos/todoAdded")]
    TodoAdded(String),

    /// Flip the completed flag of a todo
    #[action(type = "todos/todoToggled")]
    #[serde(rename = "todos/todoToggled")]
    TodoToggled(u64),

    /// Remove a todo
    #[action(type = "todos/todoDeleted")]
    #[serde(rename = "todos/todoDeleted")]
    TodoDeleted(u64),

    /// Remove every completed todo
    #[action(type = "todos/completedCleared")]
    #[serde(rename = "todos/completedCleared")]
    CompletedCleared,

    /// Show a different subset of todos
    #[action(type = "filters/statusFilterChanged")]
    #[serde(rename = "filters/statusFilterChanged")]
    StatusFilterChanged(StatusFilter),
}

/// Action creator for [`types::TODO_ADDED`]
pub fn add_todo(text: impl Into<String>) -> AppAction {
    AppAction::TodoAdded(text.into())
}

/// Action creator for [`types::TODO_TOGGLED`]
#[must_use]
pub const fn toggle_todo(id: u64) -> AppAction {
    AppAction::TodoToggled(id)
}

/// Action creator for [`types::TODO_DELETED`]
#[must_use]
pub const fn delete_todo(id: u64) -> AppAction {
    AppAction::TodoDeleted(id)
}

/// Action creator for [`types::COMPLETED_CLEARED`]
#[must_use]
pub const fn clear_completed() -> AppAction {
    AppAction::CompletedCleared
}

/// Action creator for [`types::STATUS_FILTER_CHANGED`]
#[must_use]
pub const fn status_filter_changed(status: StatusFilter) -> AppAction {
    AppAction::StatusFilterChanged(status)
}

/// Reducer for the `todos` slice
///
/// Toggling or deleting an unknown id, and clearing when nothing is
/// completed, return the same snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodosReducer;

impl Reducer for TodosReducer {
    type State = TodosState;
    type Action = AppAction;

    fn reduce(&self, state: &Arc<TodosState>, action: &AppAction) -> Arc<TodosState> {
        match action {
            AppAction::TodoAdded(text) => updated(state, |s| {
                s.items.push(Todo {
                    id: s.next_id,
                    text: text.clone(),
                    completed: false,
                });
                s.next_id += 1;
            }),
            AppAction::TodoToggled(id) => match state.items.iter().position(|t| t.id == *id) {
                Some(index) => updated(state, |s| {
                    s.items[index].completed = !s.items[index].completed;
                }),
                None => unchanged(state),
            },
            AppAction::TodoDeleted(id) => match state.items.iter().position(|t| t.id == *id) {
                Some(index) => updated(state, |s| {
                    s.items.remove(index);
                }),
                None => unchanged(state),
            },
            AppAction::CompletedCleared if state.items.iter().any(|t| t.completed) => {
                updated(state, |s| s.items.retain(|t| !t.completed))
            },
            AppAction::CompletedCleared | AppAction::StatusFilterChanged(_) => unchanged(state),
        }
    }
}

/// Reducer for the `filters` slice
#[derive(Debug, Clone, Copy, Default)]
pub struct FiltersReducer;

impl Reducer for FiltersReducer {
    type State = FiltersState;
    type Action = AppAction;

    fn reduce(&self, state: &Arc<FiltersState>, action: &AppAction) -> Arc<FiltersState> {
        match action {
            AppAction::StatusFilterChanged(status) if *status != state.status => {
                updated(state, |s| s.status = *status)
            },
            _ => unchanged(state),
        }
    }
}

/// The root reducer: `todos` and `filters` combined
#[must_use]
pub fn app_reducer() -> CombinedReducer<AppState, AppAction> {
    combine_reducers()
        .slice(
            "todos",
            |s: &AppState| &s.todos,
            |s: &mut AppState, todos| s.todos = todos,
            TodosReducer,
        )
        .slice(
            "filters",
            |s: &AppState| &s.filters,
            |s: &mut AppState, filters| s.filters = filters,
            FiltersReducer,
        )
}

/// Every todo, in insertion order
#[must_use]
pub fn select_todos(state: &AppState) -> &[Todo] {
    &state.todos.items
}

/// Number of todos not yet completed
#[must_use]
pub fn select_remaining_count(state: &AppState) -> usize {
    state.todos.items.iter().filter(|t| !t.completed).count()
}

/// Current status filter
#[must_use]
pub fn select_status_filter(state: &AppState) -> StatusFilter {
    state.filters.status
}

/// Identity key of [`visible_todos_selector`]: both slices it reads
pub type VisibleTodosKey = (Arc<TodosState>, Arc<FiltersState>);

/// Memoized selector returned by [`visible_todos_selector`]
pub type VisibleTodos = Memoized<
    AppState,
    VisibleTodosKey,
    Arc<[Todo]>,
    fn(&AppState) -> VisibleTodosKey,
    fn(&VisibleTodosKey) -> Arc<[Todo]>,
>;

fn visible_todos_key(state: &AppState) -> VisibleTodosKey {
    (Arc::clone(&state.todos), Arc::clone(&state.filters))
}

fn filter_todos((todos, filters): &VisibleTodosKey) -> Arc<[Todo]> {
    todos
        .items
        .iter()
        .filter(|todo| filters.status.matches(todo))
        .cloned()
        .collect()
}

/// The todos that pass the current filter, memoized
///
/// Recomputes only when the `todos` or `filters` slice is replaced. Keep
/// one instance per consumer; each caches its own last result.
#[must_use]
pub fn visible_todos_selector() -> VisibleTodos {
    memoize(
        visible_todos_key as fn(&AppState) -> VisibleTodosKey,
        filter_todos as fn(&VisibleTodosKey) -> Arc<[Todo]>,
    )
}
