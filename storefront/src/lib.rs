//! # Storefront
//!
//! Client-side state container for an event ticket storefront.
//!
//! One [`Storefront`] holds the catalog fetched from the events API, the
//! selected event and the last order. Views read a [`StorefrontSnapshot`]
//! and call back into the container:
//!
//! - the catalog is fetched once, when the container starts
//! - [`Storefront::select`] picks an event
//! - [`Storefront::purchase`] validates against the local catalog, calls the
//!   remote mutation and, only on success, decrements inventory and records
//!   the [`Order`]
//! - [`Storefront::reset_order`] clears the order
//!
//! All transitions go through [`StorefrontReducer`], run by a
//! `storefront_runtime::Store`.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront::api::GraphQlEventsApi;
//! use storefront::{Storefront, StorefrontEnvironment};
//! use storefront_core::environment::SystemClock;
//!
//! # async fn example() -> Result<(), storefront::StorefrontError> {
//! let env = StorefrontEnvironment::new(
//!     Arc::new(GraphQlEventsApi::new("http://localhost:3000/graphql")),
//!     Arc::new(SystemClock),
//! );
//! let storefront = Storefront::start(env).await;
//! storefront.wait_for_catalog().await?;
//!
//! let receipt = storefront.purchase("1", 2).await?;
//! println!("order {}", receipt.order_number);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod config;
pub mod environment;
pub mod error;
pub mod reducer;
pub mod storefront;
pub mod types;
pub mod view;

pub use actions::StorefrontAction;
pub use config::StorefrontConfig;
pub use environment::StorefrontEnvironment;
pub use error::StorefrontError;
pub use reducer::StorefrontReducer;
pub use storefront::{PendingPurchase, Storefront};
pub use types::{
    Event, EventId, Money, Order, PurchaseId, PurchaseReceipt, StorefrontSnapshot, StorefrontState,
};
