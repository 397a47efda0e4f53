//! # Storefront Runtime
//!
//! Runtime implementation for the storefront architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back
//!   to reducers
//! - **Transact**: An atomic async section over the state lock, for
//!   operations that must observe and mutate state around an await (e.g.
//!   order materialization)
//!
//! ## Example
//!
//! ```ignore
//! use storefront_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send a command
//! store.send(Command::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use storefront_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects spawned by a `send` to finish
        #[error("Timeout waiting for effects")]
        Timeout,
    }
}

pub use error::StoreError;

/// Tracks outstanding effects spawned by one `send` call.
///
/// Cloned into every spawned effect task; the matching [`EffectHandle`]
/// resolves once the counter returns to zero.
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        let previous = self.counter.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            // Last effect finished; wake any waiting handle.
            let _ = self.notifier.send(());
        }
    }
}

/// Decrements the tracking counter on drop, so the counter stays accurate
/// even when an effect task panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Decrements an atomic counter on drop.
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle for awaiting the effects spawned by one `send` call
///
/// `send` returns after *starting* effect execution. Await the handle when a
/// caller (typically a test) needs the side effects and their feedback
/// actions to have completed.
pub struct EffectHandle {
    counter: Arc<AtomicUsize>,
    receiver: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let (notifier, receiver) = watch::channel(());
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = Self {
            counter: Arc::clone(&counter),
            receiver,
        };
        let tracking = EffectTracking { counter, notifier };
        (handle, tracking)
    }

    /// Wait until all tracked effects have completed
    pub async fn wait(&mut self) {
        loop {
            if self.counter.load(Ordering::SeqCst) == 0 {
                return;
            }
            if self.receiver.changed().await.is_err() {
                // All tracking senders dropped; nothing left to wait for.
                return;
            }
        }
    }

    /// Wait for effect completion with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the effects are still running when
    /// the timeout expires.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with feedback loop)
///
/// Concurrent `send` calls serialize at the reducer: the reducer runs while
/// holding the state write lock, so one session's commands are applied one
/// at a time in arrival order.
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
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires write lock on state
    /// 2. Calls reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// `send` returns after *starting* effect execution, not completion;
    /// await the returned [`EffectHandle`] to wait for the effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        metrics::counter!("store.commands.total").increment(1);

        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            effects
        };

        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }

        Ok(handle)
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released
    /// promptly:
    ///
    /// ```ignore
    /// let item_count = store.state(|s| s.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Run an atomic section over the state write lock
    ///
    /// The closure receives exclusive access to the state and may await
    /// inside the section; the lock is held until its future resolves. All
    /// concurrent `send` and `transact` calls on this store serialize behind
    /// it.
    ///
    /// This is the primitive behind order materialization: snapshot the
    /// cart, await the durable write, and clear the cart, with no other
    /// mutation interleaving.
    ///
    /// ```ignore
    /// let total = store
    ///     .transact(|cart: &mut CartState| {
    ///         async move {
    ///             let total = cart.total();
    ///             cart.clear();
    ///             total
    ///         }
    ///         .boxed()
    ///     })
    ///     .await;
    /// ```
    pub async fn transact<T, F>(&self, f: F) -> T
    where
        F: for<'s> FnOnce(&'s mut S) -> BoxFuture<'s, T>,
    {
        let mut state = self.state.write().await;
        tracing::trace!("Entered transact section");
        f(&mut state).await
    }

    /// Initiate graceful shutdown of the store
    ///
    /// Sets the shutdown flag (rejecting new actions), then waits for
    /// pending effects to complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
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
                tracing::error!(pending_effects = pending, "Shutdown timed out");
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Execute an effect with completion tracking
    ///
    /// Effect failures are fire-and-forget: a panicking effect task is
    /// logged by the runtime and the [`DecrementGuard`] keeps the counters
    /// accurate.
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Parallel(effects) => {
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                for effect in effects {
                    self.execute_effect(effect, tracking.clone());
                }
            },
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                tracking.increment();

                self.pending_effects.fetch_add(1, Ordering::SeqCst);
                let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking);
                    let _pending_guard = pending_guard;

                    if let Some(action) = fut.await {
                        tracing::trace!("Effect produced an action, sending to store");
                        let _ = store.send(action).await;
                    }
                });
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use futures::FutureExt;
    use storefront_core::SmallVec;
    use storefront_core::smallvec;

    #[derive(Clone, Debug, Default)]
    struct CounterState {
        count: i32,
        pongs: u32,
    }

    #[derive(Clone, Debug)]
    enum CounterAction {
        Increment,
        Ping,
        Pong,
        SlowPing,
    }

    #[derive(Clone)]
    struct TestEnv;

    #[derive(Clone)]
    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    SmallVec::new()
                },
                CounterAction::Ping => {
                    smallvec![Effect::future(async { Some(CounterAction::Pong) })]
                },
                CounterAction::SlowPing => {
                    smallvec![Effect::future(async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        Some(CounterAction::Pong)
                    })]
                },
                CounterAction::Pong => {
                    state.pongs += 1;
                    SmallVec::new()
                },
            }
        }
    }

    fn test_store() -> Store<CounterState, CounterAction, TestEnv, CounterReducer> {
        Store::new(CounterState::default(), CounterReducer, TestEnv)
    }

    #[tokio::test]
    async fn send_applies_reducer() {
        let store = test_store();
        store.send(CounterAction::Increment).await.unwrap();
        store.send(CounterAction::Increment).await.unwrap();

        let count = store.state(|s| s.count).await;
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn effect_feedback_reaches_reducer() {
        let store = test_store();
        let mut handle = store.send(CounterAction::Ping).await.unwrap();
        handle.wait().await;

        let pongs = store.state(|s| s.pongs).await;
        assert_eq!(pongs, 1);
    }

    #[tokio::test]
    async fn parallel_effects_all_execute() {
        #[derive(Clone)]
        struct FanOutReducer;

        impl Reducer for FanOutReducer {
            type State = CounterState;
            type Action = CounterAction;
            type Environment = TestEnv;

            fn reduce(
                &self,
                state: &mut Self::State,
                action: Self::Action,
                _env: &Self::Environment,
            ) -> SmallVec<[Effect<Self::Action>; 4]> {
                match action {
                    CounterAction::Ping => {
                        smallvec![Effect::merge(vec![
                            Effect::future(async { Some(CounterAction::Pong) }),
                            Effect::future(async { Some(CounterAction::Pong) }),
                            Effect::None,
                        ])]
                    },
                    CounterAction::Pong => {
                        state.pongs += 1;
                        SmallVec::new()
                    },
                    _ => SmallVec::new(),
                }
            }
        }

        let store = Store::new(CounterState::default(), FanOutReducer, TestEnv);
        let mut handle = store.send(CounterAction::Ping).await.unwrap();
        handle.wait().await;

        let pongs = store.state(|s| s.pongs).await;
        assert_eq!(pongs, 2);
    }

    #[tokio::test]
    async fn wait_with_timeout_expires_on_slow_effect() {
        let store = test_store();
        let mut handle = store.send(CounterAction::SlowPing).await.unwrap();

        let result = handle.wait_with_timeout(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn transact_holds_lock_across_await() {
        let store = test_store();

        // The transact section sleeps while holding the lock; the concurrent
        // send must observe the mutation it makes.
        let transacting = store.clone();
        let section = tokio::spawn(async move {
            transacting
                .transact(|state: &mut CounterState| {
                    async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        state.count = 100;
                    }
                    .boxed()
                })
                .await;
        });

        // Give the transact section time to acquire the lock first.
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.send(CounterAction::Increment).await.unwrap();
        section.await.unwrap();

        let count = store.state(|s| s.count).await;
        assert_eq!(count, 101);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = test_store();
        store.shutdown(Duration::from_millis(100)).await.unwrap();

        let result = store.send(CounterAction::Increment).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    }

    #[tokio::test]
    async fn shutdown_times_out_with_running_effect() {
        let store = test_store();
        let _handle = store.send(CounterAction::SlowPing).await.unwrap();

        let result = store.shutdown(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
    }
}
