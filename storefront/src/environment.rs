//! Injected dependencies for the storefront reducer.

use crate::api::EventsApi;
use std::sync::Arc;
use storefront_core::environment::Clock;

/// Everything the reducer's effects need from the outside world
///
/// Both members are trait objects so tests can substitute a stub API and a
/// fixed clock.
#[derive(Clone)]
pub struct StorefrontEnvironment {
    /// Remote events API
    pub api: Arc<dyn EventsApi>,
    /// Source of `purchase_date`
    pub clock: Arc<dyn Clock>,
}

impl StorefrontEnvironment {
    /// Creates a new `StorefrontEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn EventsApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

impl std::fmt::Debug for StorefrontEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontEnvironment").finish_non_exhaustive()
    }
}
