//! Todos example binary
//!
//! Dispatches todo and filter actions against a combined root reducer and
//! reads the visible todos through a memoized selector.

use reducible_core::action::AnyAction;
use reducible_runtime::{Store, StoreConfig};
use serde_json::json;
use std::sync::Arc;
use todos::{
    AppState, StatusFilter, add_todo, app_reducer, clear_completed, select_remaining_count,
    select_status_filter, status_filter_changed, toggle_todo, visible_todos_selector,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todos=debug,reducible_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Todos Example ===\n");

    let reducer = app_reducer();
    println!("Slices: {:?}", reducer.keys().collect::<Vec<_>>());

    let store = Arc::new(Store::with_config(
        AppState::default(),
        reducer,
        StoreConfig::default().with_name("todos"),
    ));

    let visible_todos = visible_todos_selector();

    let weak = Arc::downgrade(&store);
    let _subscription = store.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            tracing::info!(
                remaining = store.select(&select_remaining_count),
                filter = ?store.select(&select_status_filter),
                "Todos updated"
            );
        }
    });

    store.dispatch(add_todo("Buy milk"))?;
    store.dispatch(add_todo("Learn reducers"))?;
    store.dispatch(add_todo("Write tests"))?;
    store.dispatch(toggle_todo(1))?;

    for todo in store.select(&visible_todos).iter() {
        println!("[{}] {}", if todo.completed { "x" } else { " " }, todo.text);
    }

    // An action arriving as JSON is decoded into the typed enum first
    let incoming = AnyAction::from_json(json!({
        "type": "filters/statusFilterChanged",
        "payload": "active"
    }));
    store.dispatch(incoming.decode()?)?;

    println!("\nActive only:");
    for todo in store.select(&visible_todos).iter() {
        println!("[ ] {}", todo.text);
    }

    // Same slices, so the cached list is reused
    let _ = store.select(&visible_todos);
    println!("Visible list computed {} times", visible_todos.recomputations());

    store.dispatch(clear_completed())?;
    store.dispatch(status_filter_changed(StatusFilter::All))?;
    println!("\nAfter clearing completed: {} todos", store.select(&visible_todos).len());

    println!("\n=== Demonstration Complete ===");
    Ok(())
}
