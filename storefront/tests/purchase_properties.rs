//! Property tests for the purchase transitions of the reducer

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use proptest::prelude::*;
use std::sync::Arc;
use storefront::api::StubEventsApi;
use storefront::{
    Event, EventId, Money, PurchaseId, PurchaseReceipt, StorefrontAction, StorefrontEnvironment,
    StorefrontReducer, StorefrontState,
};
use storefront_core::reducer::Reducer;
use storefront_testing::test_clock;

fn event(index: usize, price_cents: u64, tickets_available: u32) -> Event {
    Event {
        id: EventId::new(format!("e{index}")),
        name: format!("Event {index}"),
        date: "2025-06-01T19:30:00Z".to_string(),
        location: "Arena".to_string(),
        description: "Live".to_string(),
        price: Money::from_cents(price_cents),
        tickets_available,
        image: "https://example.com/e.png".to_string(),
    }
}

fn catalog_strategy() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec((0_u64..100_000, 0_u32..500), 1..6).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, (price, tickets))| event(index, price, tickets))
            .collect()
    })
}

fn test_env() -> StorefrontEnvironment {
    StorefrontEnvironment::new(Arc::new(StubEventsApi::new(vec![])), Arc::new(test_clock()))
}

proptest! {
    #[test]
    fn confirmed_purchase_decrements_only_its_event(
        catalog in catalog_strategy(),
        pick in any::<prop::sample::Index>(),
        fraction in 0.0_f64..=1.0,
    ) {
        let target = pick.get(&catalog).clone();
        prop_assume!(target.tickets_available > 0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let quantity = ((f64::from(target.tickets_available) * fraction).ceil() as u32)
            .clamp(1, target.tickets_available);

        let mut state = StorefrontState::with_events(catalog.clone());
        let _ = StorefrontReducer::new().reduce(
            &mut state,
            StorefrontAction::TicketsPurchased {
                purchase_id: PurchaseId::new(),
                event_id: target.id.clone(),
                quantity,
                receipt: PurchaseReceipt {
                    order_number: "ORD-0001".to_string(),
                    event: target.clone(),
                    quantity,
                },
            },
            &test_env(),
        );

        for (before, after) in catalog.iter().zip(&state.events) {
            if before.id == target.id {
                prop_assert_eq!(after.tickets_available, before.tickets_available - quantity);
            } else {
                prop_assert_eq!(after, before);
            }
        }

        let order = state.order.unwrap();
        prop_assert_eq!(order.quantity, quantity);
        prop_assert_eq!(
            order.total_price.cents(),
            target.price.cents() * u64::from(quantity)
        );
    }

    #[test]
    fn non_positive_quantity_is_rejected_without_change(
        catalog in catalog_strategy(),
        pick in any::<prop::sample::Index>(),
        quantity in i64::MIN..=0,
    ) {
        let target = pick.get(&catalog).id.clone();
        let initial = StorefrontState::with_events(catalog);
        let mut state = initial.clone();

        let effects = StorefrontReducer::new().reduce(
            &mut state,
            StorefrontAction::PurchaseTickets {
                purchase_id: PurchaseId::new(),
                event_id: target.clone(),
                quantity,
            },
            &test_env(),
        );

        prop_assert_eq!(&state, &initial);
        prop_assert_eq!(effects.len(), 1);
        prop_assert!(!state.is_purchase_in_flight(&target));
    }

    #[test]
    fn excessive_quantity_is_rejected_without_change(
        catalog in catalog_strategy(),
        pick in any::<prop::sample::Index>(),
        excess in 1_i64..1_000,
    ) {
        let target = pick.get(&catalog).clone();
        let initial = StorefrontState::with_events(catalog);
        let mut state = initial.clone();

        let quantity = i64::from(target.tickets_available) + excess;
        assert_eq!(
            StorefrontReducer::validate_purchase(&state, &target.id, quantity),
            Err(storefront::StorefrontError::InsufficientInventory {
                requested: quantity,
                available: target.tickets_available,
            })
        );

        let _ = StorefrontReducer::new().reduce(
            &mut state,
            StorefrontAction::PurchaseTickets {
                purchase_id: PurchaseId::new(),
                event_id: target.id,
                quantity,
            },
            &test_env(),
        );
        prop_assert_eq!(&state, &initial);
    }
}
