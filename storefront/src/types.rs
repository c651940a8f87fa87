//! Domain types for the event storefront.
//!
//! The catalog, the current selection and the last order all live in one
//! [`StorefrontState`]. Views never hold these types mutably; they read a
//! [`StorefrontSnapshot`] and dispatch actions.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an event, as assigned by the remote API
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an `EventId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Correlates a purchase request with the action that settles it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PurchaseId(Uuid);

impl PurchaseId {
    /// Creates a new random `PurchaseId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PurchaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// A non-negative amount of money, stored in cents
///
/// On the wire a price is a plain decimal number (`12.5`). It is rounded to
/// the nearest cent when decoded, so `price × quantity` is exact afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Converts a decimal amount (dollars) to `Money`
    ///
    /// Returns `None` for negative, non-finite or out-of-range amounts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return None;
        }
        Some(Self(cents as u64))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount as a decimal number of dollars
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity, saturating at the largest amount
    #[must_use]
    pub const fn saturating_multiply(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_decimal(amount).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid price {amount}: must be a non-negative number"))
        })
    }
}

// ============================================================================
// Catalog entities
// ============================================================================

/// An event offered in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier
    pub id: EventId,
    /// Display name
    pub name: String,
    /// ISO-8601 timestamp of the event, as sent by the API
    pub date: String,
    /// Venue
    pub location: String,
    /// Long description
    pub description: String,
    /// Price of a single ticket
    pub price: Money,
    /// Tickets left for sale
    pub tickets_available: u32,
    /// Image URI
    pub image: String,
}

impl Event {
    /// Whether no tickets are left
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.tickets_available == 0
    }

    /// Parses [`Event::date`] as an RFC 3339 timestamp
    #[must_use]
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date).ok()
    }
}

/// A completed purchase, snapshotted from the catalog at purchase time
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Event the tickets are for
    pub event_id: EventId,
    /// Event name at purchase time
    pub event_name: String,
    /// Event date at purchase time
    pub event_date: String,
    /// Number of tickets bought
    pub quantity: u32,
    /// Unit price × quantity
    pub total_price: Money,
    /// When the purchase was confirmed locally
    pub purchase_date: DateTime<Utc>,
}

/// Success payload of the remote purchase mutation
///
/// Handed back to the purchase caller. The reducer does not use
/// [`PurchaseReceipt::event`]; it recomputes availability locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// Order number assigned by the remote system
    pub order_number: String,
    /// The event as the remote system sees it after the purchase
    pub event: Event,
    /// Tickets bought
    #[serde(deserialize_with = "whole_number")]
    pub quantity: u32,
}

/// Accepts `2` and `2.0` alike; GraphQL `Float` fields may arrive either way
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(serde::de::Error::custom(format!(
            "invalid quantity {value}: must be a whole number"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(value as u32)
}

// ============================================================================
// State
// ============================================================================

/// State of the storefront container
///
/// The selection is stored as an id and resolved against `events` on read,
/// so the selected event can never disagree with its catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorefrontState {
    /// Catalog in server order
    pub events: Vec<Event>,
    /// True until the single catalog fetch settles
    pub is_loading: bool,
    /// Catalog fetch failure message
    pub error: Option<String>,
    /// Id of the selected event
    pub selected: Option<EventId>,
    /// Most recent order
    pub order: Option<Order>,
    fetch_requested: bool,
    purchases_in_flight: HashSet<EventId>,
}

impl StorefrontState {
    /// State at startup: loading, nothing fetched yet
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            is_loading: true,
            error: None,
            selected: None,
            order: None,
            fetch_requested: false,
            purchases_in_flight: HashSet::new(),
        }
    }

    /// State after a successful catalog fetch
    #[must_use]
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events,
            is_loading: false,
            fetch_requested: true,
            ..Self::new()
        }
    }

    /// Looks up an event by id
    #[must_use]
    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    /// The selected event, if any
    #[must_use]
    pub fn current_event(&self) -> Option<&Event> {
        self.selected.as_ref().and_then(|id| self.event(id))
    }

    /// Whether a purchase for `id` is waiting on the remote system
    #[must_use]
    pub fn is_purchase_in_flight(&self, id: &EventId) -> bool {
        self.purchases_in_flight.contains(id)
    }

    /// Read-only view handed to the presentation layer
    #[must_use]
    pub fn snapshot(&self) -> StorefrontSnapshot {
        StorefrontSnapshot {
            events: self.events.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            current_event: self.current_event().cloned(),
            order: self.order.clone(),
        }
    }

    pub(crate) const fn fetch_requested(&self) -> bool {
        self.fetch_requested
    }

    pub(crate) const fn mark_fetch_requested(&mut self) {
        self.fetch_requested = true;
    }

    pub(crate) fn begin_purchase(&mut self, id: EventId) {
        self.purchases_in_flight.insert(id);
    }

    pub(crate) fn finish_purchase(&mut self, id: &EventId) {
        self.purchases_in_flight.remove(id);
    }
}

impl Default for StorefrontState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the presentation layer may read
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontSnapshot {
    /// Catalog in server order
    pub events: Vec<Event>,
    /// True until the catalog fetch settles
    pub is_loading: bool,
    /// Catalog fetch failure message
    pub error: Option<String>,
    /// The selected event
    pub current_event: Option<Event>,
    /// Most recent order
    pub order: Option<Order>,
}
