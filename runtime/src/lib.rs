//! # Storefront Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer for every action, executes effects
//! - **Feedback loop**: Actions produced by effects are reduced by the same
//!   Store and then broadcast to observers
//! - **Request/response**: `send_observed` hands a caller the actions its own
//!   effects fed back, on a channel no other traffic shares
//! - **`EffectHandle`**: Lets a caller wait until the effects started by one
//!   action have finished
//!
//! ## Example
//!
//! ```ignore
//! use storefront_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use storefront_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Every effect started by the action finished without producing a
        /// matching action
        #[error("Effects finished without a matching action")]
        NoMatchingAction,
    }
}

pub use error::StoreError;

/// Handle for waiting on the effects started by a single action
///
/// Returned by [`Store::send`]. The handle counts effects that are still
/// running; `wait` returns once that count reaches zero. An effect counts as
/// finished only after the action it produced has been reduced, so state
/// observed after `wait` includes the feedback.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await;
/// handle.wait().await;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle together with the tracking context used by effects
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Number of effects from this action that have not finished yet
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, nothing left to wait for
                break;
            }
        }
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Ensures the counter is decremented even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, Effect, EffectHandle, EffectTracking, DecrementGuard, Reducer, RwLock, StoreError,
    };
    use tokio::sync::{broadcast, mpsc};

    /// Sender half of the per-call channel used by [`Store::send_observed`]
    type Feedback<A> = mpsc::UnboundedSender<A>;

    /// Default capacity of the action broadcast channel
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; every action is reduced under the write lock,
    ///    so transitions never interleave)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and every clone shares the same state.
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
        /// Actions produced by effects, published after they have been reduced.
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
        ///
        /// The action broadcast channel holds [`DEFAULT_BROADCAST_CAPACITY`]
        /// actions; use [`Store::with_broadcast_capacity`] to change it.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Create a new store with a custom broadcast channel capacity
        ///
        /// A capacity of zero is raised to one.
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
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// The action is reduced immediately under the state write lock. The
        /// returned [`EffectHandle`] tracks the effects the reducer produced.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        /// Reducers should be pure functions that do not panic.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> EffectHandle
        where
            R: Clone,
            E: Clone,
        {
            self.send_with_feedback(action, None).await
        }

        /// Send an action and observe every action its effects feed back
        ///
        /// Each fed-back action is delivered on the returned receiver after it
        /// has been reduced, including actions from effects those actions
        /// start in turn. The channel is private to this call and unbounded,
        /// so nothing is lost to other traffic on the store. The receiver
        /// yields `None` once every such effect has finished.
        pub async fn send_observed(&self, action: A) -> mpsc::UnboundedReceiver<A>
        where
            R: Clone,
            E: Clone,
        {
            let (tx, rx) = mpsc::unbounded_channel();
            let _handle = self.send_with_feedback(action, Some(tx)).await;
            rx
        }

        async fn send_with_feedback(
            &self,
            action: A,
            feedback: Option<Feedback<A>>,
        ) -> EffectHandle
        where
            R: Clone,
            E: Clone,
        {
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracking, feedback.as_ref());
            }

            handle
        }

        /// Send an action and wait for a matching result action
        ///
        /// Designed for request-response calls from the presentation layer.
        /// Results arrive through [`Store::send_observed`], so concurrent
        /// callers never crowd each other out. The matching action has already
        /// been reduced when it is returned.
        ///
        /// There is no timeout: a caller stays suspended for as long as an
        /// effect of its action is still running.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::NoMatchingAction`] if every effect finished
        /// without producing a matching action.
        pub async fn send_and_wait_for<F>(&self, action: A, predicate: F) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut results = self.send_observed(action).await;

            while let Some(action) = results.recv().await {
                if predicate(&action) {
                    return Ok(action);
                }
            }
            Err(StoreError::NoMatchingAction)
        }

        /// Subscribe to actions produced by effects
        ///
        /// Only actions fed back by effects are broadcast, never the actions
        /// passed to [`Store::send`] directly.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let event_count = store.state(|s| s.events.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Execute an effect with tracking
        ///
        /// `Effect::Future` runs on a spawned task. If it yields an action, the
        /// action is reduced by this store and broadcast, then handed to the
        /// feedback channel if there is one. The [`DecrementGuard`] marks the
        /// effect finished only after that.
        fn execute_effect(
            &self,
            effect: Effect<A>,
            tracking: &EffectTracking,
            feedback: Option<&Feedback<A>>,
        )
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    let guard = DecrementGuard(tracking.clone());
                    let store = self.clone();
                    let feedback = feedback.cloned();

                    tokio::spawn(async move {
                        let _guard = guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            let _ = store
                                .send_with_feedback(action.clone(), feedback.clone())
                                .await;
                            let _ = store.action_broadcast.send(action.clone());
                            if let Some(feedback) = feedback {
                                let _ = feedback.send(action);
                            }
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
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
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
