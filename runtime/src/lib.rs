//! # Taskpad Runtime
//!
//! Runtime implementation for the Taskpad state architecture.
//!
//! This crate provides the imperative shell around the pure core:
//!
//! - **Store**: Owns state, runs the reducer, executes effects, notifies observers
//! - **`WriteQueue`**: Latest-wins persistence queue with one write in flight
//! - **`FileStore`**: Directory-backed [`KeyValueStore`](taskpad_core::storage::KeyValueStore)
//! - **metrics**: Metric descriptions and Prometheus recorder installation
//!
//! ## Example
//!
//! ```ignore
//! use taskpad_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment)
//!     .with_observer(persistence);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taskpad_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Directory-backed key-value storage
pub mod file_store;

/// Metric descriptions and recorder installation
pub mod metrics;

/// Latest-wins persistence queue
pub mod write_queue;

pub use error::StoreError;
pub use file_store::FileStore;
pub use store::{StateObserver, Store};
pub use write_queue::{WriteQueue, WriteQueueError};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects an action
/// started. Effects of follow-up actions fed back into the store are tracked
/// by their own handles.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_, rx) = watch::channel(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: counter shared between an [`EffectHandle`] and running effects
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counters on drop
///
/// Keeps both the per-action and the store-wide counters accurate even if
/// the effect panics.
struct DecrementGuard {
    tracking: EffectTracking,
    pending: Arc<AtomicUsize>,
}

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.tracking.decrement();
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicUsize, DecrementGuard, Duration, Effect, EffectHandle, EffectTracking,
        Ordering, Reducer, RwLock, StoreError, watch,
    };
    use std::sync::atomic::AtomicBool;

    /// Receives every state the store produces.
    ///
    /// Observers are called synchronously after each reduced action, while
    /// the store still holds its write lock. They therefore see states in
    /// exactly the order actions were dispatched, and must not block.
    pub trait StateObserver<S>: Send + Sync {
        /// Called with the state that resulted from the latest action
        fn state_changed(&self, state: &S);
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; `send` is the only writer)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Observers (notified after every action)
    /// 5. Effect execution (with feedback loop)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        observers: Vec<Arc<dyn StateObserver<S>>>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                observers: Vec::new(),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Register an observer notified after every action
        ///
        /// Observers are called in registration order.
        #[must_use]
        pub fn with_observer(mut self, observer: Arc<dyn StateObserver<S>>) -> Self {
            self.observers.push(observer);
            self
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Sets the shutdown flag (rejecting new actions), then waits for
        /// pending effects to complete.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// This is the only way to change state:
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Notifies observers with the new state
        /// 4. Starts the returned effects asynchronously
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Concurrent `send()` calls serialize at the reducer.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.actions.rejected").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.actions.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                for observer in &self.observers {
                    observer.state_changed(&state);
                }

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Count an effect as started and return the guard that finishes it
        fn start_effect(&self, tracking: &EffectTracking) -> DecrementGuard {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            DecrementGuard {
                tracking: tracking.clone(),
                pending: Arc::clone(&self.pending_effects),
            }
        }

        /// Send an action produced by an effect back into the store
        async fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            if let Err(error) = self.send(action).await {
                tracing::warn!(%error, "Dropped action produced by effect");
            }
        }

        /// Execute an effect with tracking
        ///
        /// Effect failures never halt the store: a panicking effect task is
        /// contained by tokio and the guard still settles the counters.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    let guard = self.start_effect(tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        if let Some(action) = fut.await {
                            store.feed_back(action).await;
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    let guard = self.start_effect(tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        tokio::time::sleep(duration).await;
                        store.feed_back(*action).await;
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    let guard = self.start_effect(tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        for effect in effects {
                            let (tx, mut rx) = watch::channel(());
                            let step = EffectTracking {
                                counter: Arc::new(AtomicUsize::new(0)),
                                notifier: Arc::new(tx),
                            };
                            store.execute_effect(effect, &step);

                            while step.counter.load(Ordering::SeqCst) > 0 {
                                if rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                observers: self.observers.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}
