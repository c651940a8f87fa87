//! The storefront reducer.
//!
//! Owns every state transition of the catalog, the selection and the order.
//! Remote calls are described as effects; their results come back as actions
//! and are applied here in a single transition each.

use crate::actions::StorefrontAction;
use crate::environment::StorefrontEnvironment;
use crate::error::StorefrontError;
use crate::types::{EventId, Order, PurchaseId, StorefrontState};
use std::sync::Arc;
use storefront_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for [`StorefrontState`]
#[derive(Clone, Copy, Debug, Default)]
pub struct StorefrontReducer;

impl StorefrontReducer {
    /// Creates a new `StorefrontReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a purchase against the local catalog
    ///
    /// Checks run in a fixed order: the event exists, the quantity is
    /// positive, enough tickets are left, and no other purchase for the
    /// event is in flight. Returns the quantity as a ticket count.
    ///
    /// # Errors
    ///
    /// The [`StorefrontError`] of the first check that fails.
    pub fn validate_purchase(
        state: &StorefrontState,
        event_id: &EventId,
        quantity: i64,
    ) -> Result<u32, StorefrontError> {
        let Some(event) = state.event(event_id) else {
            return Err(StorefrontError::NotFound {
                event_id: event_id.clone(),
            });
        };

        if quantity <= 0 {
            return Err(StorefrontError::InvalidQuantity { quantity });
        }

        let insufficient = StorefrontError::InsufficientInventory {
            requested: quantity,
            available: event.tickets_available,
        };
        let Ok(tickets) = u32::try_from(quantity) else {
            return Err(insufficient);
        };
        if tickets > event.tickets_available {
            return Err(insufficient);
        }

        if state.is_purchase_in_flight(event_id) {
            return Err(StorefrontError::PurchaseInProgress {
                event_id: event_id.clone(),
            });
        }

        Ok(tickets)
    }

    /// Hands a validation failure back to the caller without touching state
    fn reject(purchase_id: PurchaseId, error: StorefrontError) -> Effect<StorefrontAction> {
        async_effect! {
            Some(StorefrontAction::PurchaseRejected { purchase_id, error })
        }
    }

    /// Applies a confirmed purchase: decrement, then snapshot the order
    fn apply_purchase(
        state: &mut StorefrontState,
        event_id: &EventId,
        quantity: u32,
        env: &StorefrontEnvironment,
    ) {
        let Some(event) = state.events.iter_mut().find(|event| &event.id == event_id) else {
            tracing::warn!(%event_id, "Purchased event is no longer in the catalog");
            return;
        };

        if quantity > event.tickets_available {
            tracing::warn!(
                %event_id,
                quantity,
                available = event.tickets_available,
                "Remote purchase exceeded local availability"
            );
        }
        event.tickets_available = event.tickets_available.saturating_sub(quantity);

        let total_price = event
            .price
            .checked_multiply(quantity)
            .unwrap_or_else(|| event.price.saturating_multiply(quantity));

        let order = Order {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_date: event.date.clone(),
            quantity,
            total_price,
            purchase_date: env.clock.now(),
        };

        tracing::info!(
            %event_id,
            quantity,
            total = %order.total_price,
            remaining = event.tickets_available,
            "Purchase completed"
        );
        state.order = Some(order);
    }
}

impl Reducer for StorefrontReducer {
    type State = StorefrontState;
    type Action = StorefrontAction;
    type Environment = StorefrontEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            StorefrontAction::FetchEvents => {
                if state.fetch_requested() {
                    tracing::warn!("Catalog already requested, ignoring fetch");
                    return SmallVec::new();
                }
                state.mark_fetch_requested();
                state.is_loading = true;
                tracing::debug!("Fetching catalog");

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    match api.fetch_events().await {
                        Ok(events) => Some(StorefrontAction::EventsLoaded { events }),
                        Err(error) => Some(StorefrontAction::EventsFailed {
                            error: error.to_string(),
                        }),
                    }
                }]
            },

            StorefrontAction::SelectEvent { event_id } => {
                state.selected = state.event(&event_id).map(|event| event.id.clone());
                tracing::debug!(%event_id, found = state.selected.is_some(), "Selected event");
                SmallVec::new()
            },

            StorefrontAction::PurchaseTickets {
                purchase_id,
                event_id,
                quantity,
            } => {
                let quantity = match Self::validate_purchase(state, &event_id, quantity) {
                    Ok(quantity) => quantity,
                    Err(error) => {
                        tracing::warn!(%purchase_id, %event_id, %error, "Purchase rejected");
                        metrics::counter!("storefront.purchases.rejected", "reason" => "validation")
                            .increment(1);
                        return smallvec![Self::reject(purchase_id, error)];
                    },
                };

                state.begin_purchase(event_id.clone());
                tracing::debug!(%purchase_id, %event_id, quantity, "Submitting purchase");

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    match api.purchase_tickets(&event_id, quantity).await {
                        Ok(receipt) => Some(StorefrontAction::TicketsPurchased {
                            purchase_id,
                            event_id,
                            quantity,
                            receipt,
                        }),
                        Err(error) => Some(StorefrontAction::PurchaseFailed {
                            purchase_id,
                            event_id,
                            error: StorefrontError::PurchaseRemoteFailure(error.to_string()),
                        }),
                    }
                }]
            },

            StorefrontAction::ResetOrder => {
                state.order = None;
                tracing::debug!("Order reset");
                SmallVec::new()
            },

            // ========== Events ==========
            StorefrontAction::EventsLoaded { events } => {
                if !state.is_loading {
                    tracing::warn!("Catalog already settled, ignoring loaded events");
                    return SmallVec::new();
                }
                tracing::info!(count = events.len(), "Catalog loaded");
                state.events = events;
                state.error = None;
                state.is_loading = false;
                SmallVec::new()
            },

            StorefrontAction::EventsFailed { error } => {
                if !state.is_loading {
                    tracing::warn!("Catalog already settled, ignoring fetch failure");
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Catalog fetch failed");
                state.error = Some(error);
                state.is_loading = false;
                SmallVec::new()
            },

            StorefrontAction::TicketsPurchased {
                purchase_id,
                event_id,
                quantity,
                receipt,
            } => {
                state.finish_purchase(&event_id);
                tracing::debug!(
                    %purchase_id,
                    order_number = %receipt.order_number,
                    "Purchase confirmed"
                );
                Self::apply_purchase(state, &event_id, quantity, env);
                metrics::counter!("storefront.purchases.completed").increment(1);
                SmallVec::new()
            },

            StorefrontAction::PurchaseRejected { purchase_id, error } => {
                tracing::debug!(%purchase_id, %error, "Purchase rejection delivered");
                SmallVec::new()
            },

            StorefrontAction::PurchaseFailed {
                purchase_id,
                event_id,
                error,
            } => {
                state.finish_purchase(&event_id);
                tracing::warn!(%purchase_id, %event_id, %error, "Remote purchase failed");
                metrics::counter!("storefront.purchases.rejected", "reason" => "remote")
                    .increment(1);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::StubEventsApi;
    use crate::types::{Event, Money, PurchaseReceipt};
    use storefront_core::environment::Clock;
    use storefront_testing::{ReducerTest, assertions, resolve_effects, test_clock};

    fn concert() -> Event {
        Event {
            id: EventId::new("e1"),
            name: "Concert".to_string(),
            date: "2025-06-01T19:30:00Z".to_string(),
            location: "Arena".to_string(),
            description: "Live".to_string(),
            price: Money::from_cents(1000),
            tickets_available: 5,
            image: "https://example.com/e1.png".to_string(),
        }
    }

    fn play() -> Event {
        Event {
            id: EventId::new("e2"),
            name: "Play".to_string(),
            date: "2025-06-02T20:00:00Z".to_string(),
            location: "Theatre".to_string(),
            description: "Drama".to_string(),
            price: Money::from_cents(1999),
            tickets_available: 3,
            image: "https://example.com/e2.png".to_string(),
        }
    }

    fn catalog() -> Vec<Event> {
        vec![concert(), play()]
    }

    fn env_with(api: StubEventsApi) -> StorefrontEnvironment {
        StorefrontEnvironment::new(Arc::new(api), Arc::new(test_clock()))
    }

    fn test_env() -> StorefrontEnvironment {
        env_with(StubEventsApi::new(catalog()))
    }

    fn purchase(event_id: &str, quantity: i64) -> (PurchaseId, StorefrontAction) {
        let purchase_id = PurchaseId::new();
        let action = StorefrontAction::PurchaseTickets {
            purchase_id,
            event_id: EventId::new(event_id),
            quantity,
        };
        (purchase_id, action)
    }

    fn receipt(quantity: u32) -> PurchaseReceipt {
        PurchaseReceipt {
            order_number: "ORD-0001".to_string(),
            event: concert(),
            quantity,
        }
    }

    #[tokio::test]
    async fn fetch_loads_catalog() {
        let env = test_env();
        let mut state = StorefrontState::new();

        let effects =
            StorefrontReducer::new().reduce(&mut state, StorefrontAction::FetchEvents, &env);
        assert!(state.is_loading);

        let actions = resolve_effects(effects).await;
        assert_eq!(actions, vec![StorefrontAction::EventsLoaded { events: catalog() }]);

        for action in actions {
            let _ = StorefrontReducer::new().reduce(&mut state, action, &env);
        }
        assert!(!state.is_loading);
        assert_eq!(state.events, catalog());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn fetch_failure_sets_error() {
        let env = env_with(StubEventsApi::new(catalog()).failing_fetch("Network request failed"));
        let mut state = StorefrontState::new();

        let effects =
            StorefrontReducer::new().reduce(&mut state, StorefrontAction::FetchEvents, &env);
        for action in resolve_effects(effects).await {
            let _ = StorefrontReducer::new().reduce(&mut state, action, &env);
        }

        assert!(!state.is_loading);
        assert!(state.events.is_empty());
        assert_eq!(state.error.as_deref(), Some("Network request failed"));
    }

    #[test]
    fn second_fetch_is_ignored() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::new())
            .when_action(StorefrontAction::FetchEvents)
            .when_action(StorefrontAction::FetchEvents)
            .then_state(|state| assert!(state.is_loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn late_catalog_results_are_ignored() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(StorefrontAction::EventsLoaded { events: vec![] })
            .when_action(StorefrontAction::EventsFailed {
                error: "late".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.events, catalog());
                assert!(state.error.is_none());
            })
            .run();
    }

    #[test]
    fn select_event_matches_exactly() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("e2"),
            })
            .then_state(|state| {
                assert_eq!(state.current_event().map(|e| e.name.as_str()), Some("Play"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn select_unknown_event_clears_selection() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("e1"),
            })
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("E1"),
            })
            .then_state(|state| {
                assert!(state.selected.is_none());
                assert!(state.current_event().is_none());
            })
            .run();
    }

    #[test]
    fn repeated_select_of_present_event_is_idempotent() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("e1"),
            })
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("e1"),
            })
            .then_history(|states| {
                assert_eq!(states[1].selected, Some(EventId::new("e1")));
                assert_eq!(states[2], states[1]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn repeated_select_of_absent_event_is_idempotent() {
        let mut selected = StorefrontState::with_events(catalog());
        selected.selected = Some(EventId::new("e2"));

        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(selected)
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("missing"),
            })
            .when_action(StorefrontAction::SelectEvent {
                event_id: EventId::new("missing"),
            })
            .then_history(|states| {
                assert!(states[1].current_event().is_none());
                assert_eq!(states[2], states[1]);
                assert_eq!(states[1].events, states[0].events);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn validation_order() {
        let mut state = StorefrontState::with_events(catalog());
        let e1 = EventId::new("e1");

        assert_eq!(
            StorefrontReducer::validate_purchase(&state, &EventId::new("missing"), 0),
            Err(StorefrontError::NotFound {
                event_id: EventId::new("missing")
            })
        );
        assert_eq!(
            StorefrontReducer::validate_purchase(&state, &e1, -1),
            Err(StorefrontError::InvalidQuantity { quantity: -1 })
        );
        assert_eq!(
            StorefrontReducer::validate_purchase(&state, &e1, 6),
            Err(StorefrontError::InsufficientInventory {
                requested: 6,
                available: 5
            })
        );
        assert_eq!(
            StorefrontReducer::validate_purchase(&state, &e1, i64::MAX),
            Err(StorefrontError::InsufficientInventory {
                requested: i64::MAX,
                available: 5
            })
        );
        assert_eq!(StorefrontReducer::validate_purchase(&state, &e1, 5), Ok(5));

        state.begin_purchase(e1.clone());
        assert_eq!(
            StorefrontReducer::validate_purchase(&state, &e1, 1),
            Err(StorefrontError::PurchaseInProgress { event_id: e1 })
        );
    }

    #[tokio::test]
    async fn rejected_purchase_leaves_state_unchanged() {
        let env = test_env();
        let initial = StorefrontState::with_events(catalog());

        for (event_id, quantity) in [("e1", 0), ("e1", -3), ("e1", 6), ("nope", 1)] {
            let (purchase_id, action) = purchase(event_id, quantity);
            let mut state = initial.clone();

            let effects = StorefrontReducer::new().reduce(&mut state, action, &env);
            assert_eq!(state, initial);

            let actions = resolve_effects(effects).await;
            assert_eq!(actions.len(), 1);
            assert!(actions[0].settles(purchase_id));
            assert!(matches!(actions[0], StorefrontAction::PurchaseRejected { .. }));

            let _ = StorefrontReducer::new().reduce(&mut state, actions[0].clone(), &env);
            assert_eq!(state, initial);
        }
    }

    #[tokio::test]
    async fn successful_purchase_decrements_and_creates_order() {
        let env = test_env();
        let mut state = StorefrontState::with_events(catalog());
        state.selected = Some(EventId::new("e1"));

        let (purchase_id, action) = purchase("e1", 2);
        let effects = StorefrontReducer::new().reduce(&mut state, action, &env);
        assert!(state.is_purchase_in_flight(&EventId::new("e1")));
        assert_eq!(state.events[0].tickets_available, 5);

        let actions = resolve_effects(effects).await;
        assert!(actions[0].settles(purchase_id));
        for action in actions {
            let _ = StorefrontReducer::new().reduce(&mut state, action, &env);
        }

        assert_eq!(state.events[0].tickets_available, 3);
        assert_eq!(state.events[1].tickets_available, 3);
        assert_eq!(state.current_event().map(|e| e.tickets_available), Some(3));
        assert!(!state.is_purchase_in_flight(&EventId::new("e1")));

        let order = state.order.unwrap();
        assert_eq!(order.event_id, EventId::new("e1"));
        assert_eq!(order.event_name, "Concert");
        assert_eq!(order.event_date, "2025-06-01T19:30:00Z");
        assert_eq!(order.quantity, 2);
        assert_eq!(order.total_price, Money::from_cents(2000));
        assert_eq!(order.purchase_date, test_clock().now());
    }

    #[test]
    fn new_order_replaces_previous() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(StorefrontAction::TicketsPurchased {
                purchase_id: PurchaseId::new(),
                event_id: EventId::new("e1"),
                quantity: 1,
                receipt: receipt(1),
            })
            .when_action(StorefrontAction::TicketsPurchased {
                purchase_id: PurchaseId::new(),
                event_id: EventId::new("e2"),
                quantity: 3,
                receipt: receipt(3),
            })
            .then_state(|state| {
                let order = state.order.as_ref().unwrap();
                assert_eq!(order.event_name, "Play");
                assert_eq!(order.total_price, Money::from_cents(5997));
                assert_eq!(state.events[0].tickets_available, 4);
                assert_eq!(state.events[1].tickets_available, 0);
            })
            .run();
    }

    #[test]
    fn second_purchase_for_same_event_is_rejected_while_in_flight() {
        let (_, first) = purchase("e1", 1);
        let (_, second) = purchase("e1", 1);

        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(first)
            .when_action(second)
            .then_state(|state| {
                assert!(state.is_purchase_in_flight(&EventId::new("e1")));
                assert_eq!(state.events[0].tickets_available, 5);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[tokio::test]
    async fn purchases_for_different_events_proceed() {
        let env = test_env();
        let mut state = StorefrontState::with_events(catalog());

        let (_, first) = purchase("e1", 1);
        let (second_id, second) = purchase("e2", 1);
        let _ = StorefrontReducer::new().reduce(&mut state, first, &env);
        let effects = StorefrontReducer::new().reduce(&mut state, second, &env);

        let actions = resolve_effects(effects).await;
        assert!(matches!(
            &actions[0],
            StorefrontAction::TicketsPurchased { purchase_id, .. } if *purchase_id == second_id
        ));
    }

    #[tokio::test]
    async fn remote_failure_changes_nothing() {
        let api = StubEventsApi::new(catalog());
        api.fail_purchases_with("Payment declined");
        let env = env_with(api);
        let initial = StorefrontState::with_events(catalog());
        let mut state = initial.clone();

        let (purchase_id, action) = purchase("e1", 2);
        let effects = StorefrontReducer::new().reduce(&mut state, action, &env);
        let actions = resolve_effects(effects).await;

        assert_eq!(
            actions,
            vec![StorefrontAction::PurchaseFailed {
                purchase_id,
                event_id: EventId::new("e1"),
                error: StorefrontError::PurchaseRemoteFailure("Payment declined".to_string()),
            }]
        );

        for action in actions {
            let _ = StorefrontReducer::new().reduce(&mut state, action, &env);
        }
        assert_eq!(state, initial);
    }

    #[test]
    fn reset_order_clears_order() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(test_env())
            .given_state(StorefrontState::with_events(catalog()))
            .when_action(StorefrontAction::TicketsPurchased {
                purchase_id: PurchaseId::new(),
                event_id: EventId::new("e1"),
                quantity: 2,
                receipt: receipt(2),
            })
            .when_action(StorefrontAction::ResetOrder)
            .then_state(|state| {
                assert!(state.order.is_none());
                assert_eq!(state.events[0].tickets_available, 3);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
