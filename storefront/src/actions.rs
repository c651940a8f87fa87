//! Actions processed by the storefront reducer.

use crate::error::StorefrontError;
use crate::types::{Event, EventId, PurchaseId, PurchaseReceipt};

/// Every input to the storefront reducer
///
/// Commands come from the presentation layer. Events are fed back by the
/// effects that talk to the remote API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorefrontAction {
    // ========== Commands ==========
    /// Load the catalog (issued once, at startup)
    FetchEvents,

    /// Make an event the current selection
    SelectEvent {
        /// Event to select
        event_id: EventId,
    },

    /// Buy tickets for an event
    PurchaseTickets {
        /// Correlation id for the settling action
        purchase_id: PurchaseId,
        /// Event to buy tickets for
        event_id: EventId,
        /// Requested quantity, unvalidated
        quantity: i64,
    },

    /// Forget the last order
    ResetOrder,

    // ========== Events ==========
    /// The catalog query succeeded
    EventsLoaded {
        /// Events in server order
        events: Vec<Event>,
    },

    /// The catalog query failed
    EventsFailed {
        /// Message shown in place of the catalog
        error: String,
    },

    /// The remote purchase succeeded
    TicketsPurchased {
        /// Correlation id of the request
        purchase_id: PurchaseId,
        /// Event the tickets are for
        event_id: EventId,
        /// Validated quantity
        quantity: u32,
        /// Remote payload, returned to the caller
        receipt: PurchaseReceipt,
    },

    /// The purchase failed local validation; no remote call was made
    PurchaseRejected {
        /// Correlation id of the request
        purchase_id: PurchaseId,
        /// Why it was rejected
        error: StorefrontError,
    },

    /// The remote purchase call failed
    PurchaseFailed {
        /// Correlation id of the request
        purchase_id: PurchaseId,
        /// Event the purchase was for
        event_id: EventId,
        /// Remote or transport failure
        error: StorefrontError,
    },
}

impl StorefrontAction {
    /// Whether this action settles the purchase `purchase_id`
    #[must_use]
    pub fn settles(&self, purchase_id: PurchaseId) -> bool {
        match self {
            Self::TicketsPurchased { purchase_id: id, .. }
            | Self::PurchaseRejected { purchase_id: id, .. }
            | Self::PurchaseFailed { purchase_id: id, .. } => *id == purchase_id,
            _ => false,
        }
    }

    /// Whether this action settles the catalog fetch
    #[must_use]
    pub const fn settles_catalog(&self) -> bool {
        matches!(self, Self::EventsLoaded { .. } | Self::EventsFailed { .. })
    }
}
