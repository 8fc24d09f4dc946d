//! Counter example binary
//!
//! Walks through state, actions, reducer, store, dispatch and selectors with
//! a single-field counter.

use counter::{
    CounterAction, CounterReducer, CounterState, decrement, increment, increment_any,
    increment_by_amount, reset, select_counter_value, types,
};
use reducible_core::action::AnyAction;
use reducible_core::composition::from_any;
use reducible_runtime::{DispatchQueue, Store, StoreConfig, create_store};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,reducible_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Counter Example ===\n");

    // Create store with reducer and initial state
    let store = Arc::new(create_store(CounterReducer, Some(CounterState { value: 0 })));
    println!("Initial state: {:?}", store.state());

    let weak = Arc::downgrade(&store);
    let subscription = store.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            tracing::info!(value = store.state().value, "Subscriber notified");
        }
    });

    // Dispatch
    println!("\n>>> Dispatching: {}", types::INCREMENT);
    store.dispatch(CounterAction::Increment)?;
    println!("State: {:?}", store.state());

    // Dispatch through an action creator
    println!("\n>>> Dispatching: increment()");
    store.dispatch(increment())?;
    println!("State: {:?}", store.state());

    println!("\n>>> Dispatching: incrementByAmount(5), decrement()");
    store.dispatch(increment_by_amount(5))?;
    store.dispatch(decrement())?;

    // Selectors
    let current_value = store.select(&select_counter_value);
    println!("Selected value: {current_value}");

    subscription.unsubscribe();
    store.dispatch(reset())?;
    println!("\nAfter reset (unsubscribed): {:?}", store.state());

    // Untyped actions, as received from JSON
    println!("\n=== JSON actions ===\n");
    let json_store = Store::with_config(
        CounterState::default(),
        from_any(CounterReducer),
        StoreConfig::default().with_name("counter-json"),
    );

    let action = AnyAction::from_json(json!({ "type": "counter/incrementByAmount", "payload": 3 }));
    json_store.dispatch(action)?;
    json_store.dispatch(increment_any())?;
    println!("State: {:?}", json_store.state());

    let unknown = AnyAction::new("todos/todoAdded").with_payload(json!("Buy milk"));
    json_store.dispatch(unknown)?;
    println!("After an action this reducer does not handle: {:?}", json_store.state());

    match json_store.dispatch(AnyAction::from_json(json!({ "payload": "x" }))) {
        Ok(()) => println!("Action without a type was accepted"),
        Err(error) => println!("Action without a type was rejected: {error}"),
    }

    // Many producers, one writer
    println!("\n=== Dispatch queue ===\n");
    let (queue, worker) = DispatchQueue::spawn(Arc::clone(&store));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let queue = queue.clone();
            tokio::spawn(async move {
                for _ in 0..25 {
                    queue.send(increment()).await?;
                }
                Ok::<_, reducible_runtime::StoreError>(())
            })
        })
        .collect();

    for producer in producers {
        producer.await??;
    }
    drop(queue);
    worker.await?;

    println!("Value after 100 queued increments: {}", store.select(&select_counter_value));

    println!("\n=== Demonstration Complete ===");
    Ok(())
}
