//! # Storefront Testing
//!
//! Testing utilities and helpers for reducers built on `storefront-core`.
//!
//! This crate provides:
//! - Deterministic environment implementations (`FixedClock`)
//! - The Given-When-Then [`ReducerTest`] harness
//! - Assertion helpers for effects
//! - [`resolve_effects`] to run described effects without a Store
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(StorefrontReducer::new())
//!     .with_env(test_environment())
//!     .given_state(loaded_catalog())
//!     .when_action(StorefrontAction::ResetOrder)
//!     .then_state(|state| assert!(state.order.is_none()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use storefront_core::effect::Effect;
use storefront_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Run every `Effect::Future` in `effects` to completion, in order
///
/// Returns the actions the effects produced. `Effect::None` contributes
/// nothing. This lets reducer tests follow the feedback loop by hand,
/// without a Store.
pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        if let Effect::Future(fut) = effect {
            if let Some(action) = fut.await {
                actions.push(action);
            }
        }
    }
    actions
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
