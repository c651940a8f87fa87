//! Errors surfaced to the presentation layer.

use crate::types::EventId;
use thiserror::Error;

/// Everything that can go wrong in a storefront operation
///
/// Purchase errors are returned to the caller and never stored in state.
/// The messages are the ones shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    /// The catalog could not be loaded
    #[error("{0}")]
    FetchFailure(String),

    /// The purchase referenced an event missing from the local catalog
    #[error("Event not found")]
    NotFound {
        /// Requested event
        event_id: EventId,
    },

    /// The requested quantity was zero or negative
    #[error("Quantity must be greater than zero")]
    InvalidQuantity {
        /// Requested quantity
        quantity: i64,
    },

    /// More tickets were requested than the local catalog has left
    #[error("Not enough tickets available")]
    InsufficientInventory {
        /// Requested quantity
        requested: i64,
        /// Tickets left
        available: u32,
    },

    /// Another purchase for the same event is still waiting on the remote system
    #[error("A purchase for this event is already in progress")]
    PurchaseInProgress {
        /// Contended event
        event_id: EventId,
    },

    /// The remote purchase call failed; nothing was changed locally
    #[error("{0}")]
    PurchaseRemoteFailure(String),

    /// The store could not deliver a result
    #[error("Storefront unavailable: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages() {
        let not_found = StorefrontError::NotFound {
            event_id: EventId::new("nope"),
        };
        assert_eq!(not_found.to_string(), "Event not found");

        let invalid = StorefrontError::InvalidQuantity { quantity: 0 };
        assert_eq!(invalid.to_string(), "Quantity must be greater than zero");

        let insufficient = StorefrontError::InsufficientInventory {
            requested: 6,
            available: 5,
        };
        assert_eq!(insufficient.to_string(), "Not enough tickets available");

        let remote = StorefrontError::PurchaseRemoteFailure("Sold out upstream".to_string());
        assert_eq!(remote.to_string(), "Sold out upstream");
    }
}
