//! In-memory events API
//!
//! Behaves like the remote system: it keeps its own inventory, validates
//! purchases against it and hands out sequential order numbers. Purchases can
//! be held open to observe the storefront while a request is in flight.

use super::{ApiError, ApiFuture, EventsApi};
use crate::types::{Event, EventId, Money, PurchaseReceipt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

#[derive(Debug, Default)]
struct StubInner {
    catalog: Vec<Event>,
    fetch_error: Option<String>,
    purchase_error: Option<String>,
    orders: usize,
}

/// In-memory [`EventsApi`]
///
/// Cloning shares the same catalog and counters.
///
/// # Example
///
/// ```
/// use storefront::api::{EventsApi, StubEventsApi};
///
/// # async fn example() {
/// let api = StubEventsApi::new(StubEventsApi::demo_catalog());
/// let events = api.fetch_events().await.unwrap_or_default();
/// assert_eq!(events.len(), 3);
/// assert_eq!(api.fetch_calls(), 1);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct StubEventsApi {
    inner: Arc<Mutex<StubInner>>,
    fetch_calls: Arc<AtomicUsize>,
    purchase_calls: Arc<AtomicUsize>,
    gate: watch::Sender<bool>,
}

impl StubEventsApi {
    /// Create a stub serving `catalog`
    #[must_use]
    pub fn new(catalog: Vec<Event>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            inner: Arc::new(Mutex::new(StubInner {
                catalog,
                ..StubInner::default()
            })),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            purchase_calls: Arc::new(AtomicUsize::new(0)),
            gate,
        }
    }

    /// A small fixed catalog
    #[must_use]
    pub fn demo_catalog() -> Vec<Event> {
        vec![
            Event {
                id: EventId::new("1"),
                name: "Summer Music Festival".to_string(),
                date: "2025-07-15T18:00:00Z".to_string(),
                location: "Central Park, New York".to_string(),
                description: "Three stages of live music from dusk until midnight.".to_string(),
                price: Money::from_cents(8999),
                tickets_available: 150,
                image: "https://picsum.photos/seed/festival/600/400".to_string(),
            },
            Event {
                id: EventId::new("2"),
                name: "Tech Conference 2025".to_string(),
                date: "2025-09-22T09:00:00Z".to_string(),
                location: "Moscone Center, San Francisco".to_string(),
                description: "Two days of talks and workshops on systems programming.".to_string(),
                price: Money::from_cents(29900),
                tickets_available: 42,
                image: "https://picsum.photos/seed/conference/600/400".to_string(),
            },
            Event {
                id: EventId::new("3"),
                name: "Comedy Night".to_string(),
                date: "2025-05-03T20:30:00Z".to_string(),
                location: "The Laugh Factory, Chicago".to_string(),
                description: "Stand-up from five touring comedians.".to_string(),
                price: Money::from_cents(2500),
                tickets_available: 0,
                image: "https://picsum.photos/seed/comedy/600/400".to_string(),
            },
        ]
    }

    /// Make every catalog fetch fail with `message`
    #[must_use]
    pub fn failing_fetch(self, message: impl Into<String>) -> Self {
        self.lock().fetch_error = Some(message.into());
        self
    }

    /// Make every purchase fail with `message`
    pub fn fail_purchases_with(&self, message: impl Into<String>) {
        self.lock().purchase_error = Some(message.into());
    }

    /// Hold purchases open until [`StubEventsApi::release`] is called
    pub fn hold_purchases(&self) {
        self.gate.send_replace(false);
    }

    /// Let held and future purchases complete
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Number of catalog fetches received
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of purchase requests received
    #[must_use]
    pub fn purchase_calls(&self) -> usize {
        self.purchase_calls.load(Ordering::SeqCst)
    }

    /// Tickets left on the remote side
    #[must_use]
    pub fn remote_tickets(&self, event_id: &EventId) -> Option<u32> {
        self.lock()
            .catalog
            .iter()
            .find(|event| &event.id == event_id)
            .map(|event| event.tickets_available)
    }

    fn lock(&self) -> MutexGuard<'_, StubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle_purchase(
        &self,
        event_id: &EventId,
        quantity: u32,
    ) -> Result<PurchaseReceipt, ApiError> {
        let mut inner = self.lock();

        if let Some(message) = &inner.purchase_error {
            return Err(ApiError::Remote(message.clone()));
        }

        let event = inner
            .catalog
            .iter_mut()
            .find(|event| &event.id == event_id)
            .ok_or_else(|| ApiError::Remote("Event not found".to_string()))?;

        if quantity > event.tickets_available {
            return Err(ApiError::Remote("Not enough tickets available".to_string()));
        }
        event.tickets_available -= quantity;
        let event = event.clone();

        inner.orders += 1;
        Ok(PurchaseReceipt {
            order_number: format!("ORD-{:04}", inner.orders),
            event,
            quantity,
        })
    }
}

impl Default for StubEventsApi {
    fn default() -> Self {
        Self::new(Self::demo_catalog())
    }
}

impl EventsApi for StubEventsApi {
    fn fetch_events(&self) -> ApiFuture<'_, Vec<Event>> {
        Box::pin(async move {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            let inner = self.lock();
            match &inner.fetch_error {
                Some(message) => Err(ApiError::Remote(message.clone())),
                None => Ok(inner.catalog.clone()),
            }
        })
    }

    fn purchase_tickets(
        &self,
        event_id: &EventId,
        quantity: u32,
    ) -> ApiFuture<'_, PurchaseReceipt> {
        let event_id = event_id.clone();
        let mut gate = self.gate.subscribe();

        Box::pin(async move {
            self.purchase_calls.fetch_add(1, Ordering::SeqCst);
            if gate.wait_for(|open| *open).await.is_err() {
                return Err(ApiError::Transport("stub shut down".to_string()));
            }
            self.settle_purchase(&event_id, quantity)
        })
    }
}
