//! Remote events API.
//!
//! The reducer never talks to the network itself. Its effects capture an
//! `Arc<dyn EventsApi>` from the environment and call it from a spawned task.
//!
//! - [`GraphQlEventsApi`]: the production client (GraphQL over HTTP)
//! - [`StubEventsApi`]: an in-memory implementation for tests and demos

use crate::types::{Event, EventId, PurchaseReceipt};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub mod graphql;
pub mod stub;

pub use graphql::GraphQlEventsApi;
pub use stub::StubEventsApi;

/// Errors returned by an [`EventsApi`]
///
/// The `Display` text is what ends up in front of the user, so remote and
/// transport errors print their message unadorned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, timeout)
    #[error("{0}")]
    Transport(String),

    /// Non-success status with a body that is not a GraphQL response
    #[error("Unexpected HTTP status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response could not be decoded into the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The remote system reported an error (first GraphQL error message)
    #[error("{0}")]
    Remote(String),
}

/// Boxed future returned by [`EventsApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The two remote operations the storefront depends on
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the API can
/// be held as `Arc<dyn EventsApi>` in the environment and moved into effects.
pub trait EventsApi: Send + Sync {
    /// Fetch the whole catalog, in server order
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; the caller records its message as the fetch error.
    fn fetch_events(&self) -> ApiFuture<'_, Vec<Event>>;

    /// Buy `quantity` tickets for `event_id`
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; nothing is changed locally when this fails.
    fn purchase_tickets(&self, event_id: &EventId, quantity: u32) -> ApiFuture<'_, PurchaseReceipt>;
}
