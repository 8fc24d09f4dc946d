//! A single-writer queue in front of a [`Store`].
//!
//! The store rejects a dispatch that overlaps another one. When many async
//! tasks need to dispatch, route them through a `DispatchQueue`: one worker
//! task owns the store and applies actions one at a time, in arrival order,
//! and each producer awaits the result of its own action.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(Store::new(CounterState::default(), CounterReducer));
//! let (queue, worker) = DispatchQueue::spawn(Arc::clone(&store));
//!
//! queue.send(CounterAction::Increment).await?;
//! assert_eq!(store.state().value, 1);
//!
//! drop(queue);
//! worker.await?;
//! ```

use crate::metrics::QUEUE_DEPTH;
use crate::{Store, StoreError};
use reducible_core::action::Action;
use reducible_core::reducer::Reducer;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Internal: an action and the channel its result goes back on
struct Envelope<A> {
    action: A,
    reply: oneshot::Sender<Result<(), StoreError>>,
}

/// Cloneable producer handle for a store's dispatch worker
pub struct DispatchQueue<A> {
    sender: mpsc::Sender<Envelope<A>>,
    capacity: usize,
}

impl<A> DispatchQueue<A>
where
    A: Action + Send + 'static,
{
    /// Spawn the worker task for `store`
    ///
    /// The queue holds up to [`StoreConfig::queue_capacity`](crate::StoreConfig)
    /// pending actions; `send` waits for room beyond that. The worker stops
    /// once every `DispatchQueue` handle has been dropped and the backlog is
    /// drained.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(store: Arc<Store<R>>) -> (Self, JoinHandle<()>)
    where
        R: Reducer<Action = A> + Send + Sync + 'static,
        R::State: Send + Sync + 'static,
    {
        let capacity = store.config().queue_capacity.max(1);
        let (sender, mut receiver) = mpsc::channel::<Envelope<A>>(capacity);

        let worker = tokio::spawn(async move {
            tracing::debug!(store = %store.config().name, capacity, "Dispatch queue started");

            while let Some(Envelope { action, reply }) = receiver.recv().await {
                let result = store.dispatch(action);

                // Producer may have stopped waiting; the action was still applied
                let _ = reply.send(result);
            }

            tracing::debug!(store = %store.config().name, "Dispatch queue closed");
        });

        (Self { sender, capacity }, worker)
    }

    /// Enqueue an action and wait until the worker has dispatched it
    ///
    /// # Errors
    ///
    /// - [`StoreError::QueueClosed`] if the worker is no longer running
    /// - any error returned by [`Store::dispatch`]
    pub async fn send(&self, action: A) -> Result<(), StoreError> {
        let (reply, response) = oneshot::channel();

        self.sender
            .send(Envelope { action, reply })
            .await
            .map_err(|_| StoreError::QueueClosed)?;

        // Precision loss is irrelevant for queue sizes
        #[allow(clippy::cast_precision_loss)]
        let depth = self.depth() as f64;
        crate::metrics::gauge!(QUEUE_DEPTH).set(depth);

        response.await.map_err(|_| StoreError::QueueClosed)?
    }

    /// Number of actions waiting for the worker
    #[must_use]
    pub fn depth(&self) -> usize {
        self.capacity.saturating_sub(self.sender.capacity())
    }

    /// Whether the worker has stopped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<A> Clone for DispatchQueue<A> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            capacity: self.capacity,
        }
    }
}

impl<A> std::fmt::Debug for DispatchQueue<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("capacity", &self.capacity)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreConfig;
    use reducible_core::action::AnyAction;
    use reducible_core::reducer::{reducer_fn, unchanged, updated};
    use std::sync::Mutex;

    type CounterReducer = Box<dyn Reducer<State = i64, Action = AnyAction> + Send + Sync>;

    fn counter_store(capacity: usize) -> Arc<Store<CounterReducer>> {
        let reducer: CounterReducer = Box::new(reducer_fn(
            |state: &Arc<i64>, action: &AnyAction| match action.action_type() {
                Some("counter/increment") => updated(state, |value| *value += 1),
                _ => unchanged(state),
            },
        ));

        Arc::new(Store::with_config(
            0,
            reducer,
            StoreConfig::default().with_queue_capacity(capacity),
        ))
    }

    #[tokio::test]
    async fn test_send_applies_action() {
        let store = counter_store(4);
        let (queue, _worker) = DispatchQueue::spawn(Arc::clone(&store));

        assert!(queue.send(AnyAction::new("counter/increment")).await.is_ok());
        assert_eq!(*store.state(), 1);
    }

    #[tokio::test]
    async fn test_send_returns_dispatch_errors() {
        let store = counter_store(4);
        let (queue, _worker) = DispatchQueue::spawn(Arc::clone(&store));

        let result = queue.send(AnyAction::default()).await;
        assert!(matches!(result, Err(StoreError::InvalidAction(_))));
        assert_eq!(*store.state(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_producers_are_serialized() {
        let store = counter_store(2);
        let (queue, worker) = DispatchQueue::spawn(Arc::clone(&store));

        let producers: Vec<_> = (0..16)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for _ in 0..10 {
                        let _ = queue.send(AnyAction::new("counter/increment")).await;
                    }
                })
            })
            .collect();

        for producer in producers {
            let _ = producer.await;
        }

        drop(queue);
        let _ = worker.await;

        assert_eq!(*store.state(), 160);
    }

    #[tokio::test]
    async fn test_notifications_follow_queue_order() {
        let store = counter_store(8);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&store);
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                sink.lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push(*store.state());
            }
        });

        let (queue, _worker) = DispatchQueue::spawn(Arc::clone(&store));
        for _ in 0..3 {
            let _ = queue.send(AnyAction::new("counter/increment")).await;
        }

        let seen = seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_send_after_worker_stopped() {
        let store = counter_store(4);
        let (queue, worker) = DispatchQueue::spawn(Arc::clone(&store));

        worker.abort();
        let _ = worker.await;

        assert!(queue.is_closed());
        let result = queue.send(AnyAction::new("counter/increment")).await;
        assert!(matches!(result, Err(StoreError::QueueClosed)));
    }
}
