//! # FestPulse Runtime
//!
//! Runtime for the FestPulse crowd monitor.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling, plus the [`Ticker`] that drives periodic actions.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state and is its only writer. Every action runs the
//!   reducer under a single write lock, so timer-driven and user-driven
//!   mutations never interleave.
//! - **Effect Executor**: Executes effect descriptions and feeds actions back
//!   into the store.
//! - **Ticker**: A scoped periodic timer bound to a store; dropping it cancels
//!   the schedule.
//!
//! ## Example
//!
//! ```ignore
//! use festpulse_runtime::{Store, Ticker};
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//! let ticker = Ticker::spawn(store.clone(), Duration::from_secs(5), || Action::Tick);
//!
//! store.send(Action::ScanEntry { venue_id }).await?;
//! let total = store.state(|s| s.total_attendees()).await;
//!
//! drop(ticker); // timer cancelled
//! ```

use festpulse_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Metric names and descriptions
pub mod metrics;

/// Scoped periodic action scheduling
pub mod ticker;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Domain outcomes never show up here: a reducer that ignores an action
    /// still completes successfully. These variants only describe the
    /// lifecycle of the store itself.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;
pub use ticker::Ticker;

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl AtomicCounterGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, Duration, Effect, Ordering, Reducer,
        RwLock, StoreError,
    };
    use tokio::sync::broadcast;

    /// Default number of actions buffered for slow subscribers
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the write lock is the single mutation boundary)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Action broadcast, so read-only views can refresh after each change
    ///
    /// Cloning a store is cheap and yields another handle to the same state.
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
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        action_broadcast: broadcast::Sender<A>,
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
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Create a new Store with custom action broadcast capacity
        ///
        /// Increase the capacity when many slow subscribers are attached and
        /// frequently lag behind.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// The injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Whether `shutdown` has been initiated on any handle of this store
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Number of effects still running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Sets the shutdown flag (rejecting new actions) and waits for
        /// pending effects to complete.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
        /// when `timeout` expires.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(50);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running",
                        pending
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(pending_effects = pending, "Waiting for effects to complete");
                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Releases the lock and broadcasts the action to subscribers
        /// 4. Starts the returned effects on background tasks
        ///
        /// Concurrent `send()` calls serialize at the reducer: each reduce
        /// completes its read-modify-write before the next one starts.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!(crate::metrics::STORE_ACTIONS_TOTAL).increment(1);
            let observed = action.clone();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!(crate::metrics::STORE_REDUCER_DURATION)
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            // No subscribers is fine: views attach and detach freely
            let _ = self.action_broadcast.send(observed);

            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let total = store.state(|s| s.total_attendees()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to every action processed by the store
        ///
        /// Actions are published after the reducer has applied them, so a
        /// subscriber that reads state on receipt sees the change.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        fn execute_effect(&self, effect: Effect<A>)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!(crate::metrics::STORE_EFFECTS_EXECUTED, "type" => "none")
                        .increment(1);
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!(crate::metrics::STORE_EFFECTS_EXECUTED, "type" => "parallel")
                        .increment(1);
                    for effect in effects {
                        self.execute_effect(effect);
                    }
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!(crate::metrics::STORE_EFFECTS_EXECUTED, "type" => "delay")
                        .increment(1);

                    let pending_guard = AtomicCounterGuard::acquire(&self.pending_effects);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending_guard = pending_guard;
                        tokio::time::sleep(duration).await;
                        if let Err(error) = store.send(*action).await {
                            tracing::debug!(%error, "Delayed action dropped");
                        }
                    });
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!(crate::metrics::STORE_EFFECTS_EXECUTED, "type" => "future")
                        .increment(1);

                    let pending_guard = AtomicCounterGuard::acquire(&self.pending_effects);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending_guard = pending_guard;
                        if let Some(action) = fut.await {
                            if let Err(error) = store.send(action).await {
                                tracing::debug!(%error, "Effect feedback dropped");
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
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
