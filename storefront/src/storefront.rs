//! The storefront container handed to the presentation layer.
//!
//! [`Storefront`] wraps a [`Store`] running the [`StorefrontReducer`] and
//! exposes the operation set a view needs: read a snapshot, select an event,
//! buy tickets and reset the order.

use crate::actions::StorefrontAction;
use crate::environment::StorefrontEnvironment;
use crate::error::StorefrontError;
use crate::reducer::StorefrontReducer;
use crate::types::{EventId, PurchaseId, PurchaseReceipt, StorefrontSnapshot, StorefrontState};
use storefront_runtime::Store;
use storefront_runtime::store::DEFAULT_BROADCAST_CAPACITY;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

type StorefrontStore =
    Store<StorefrontState, StorefrontAction, StorefrontEnvironment, StorefrontReducer>;

/// The storefront state container
///
/// Owned by the composition root and passed by reference (or cloned; clones
/// share one store).
#[derive(Clone)]
pub struct Storefront {
    store: StorefrontStore,
}

impl Storefront {
    /// Build the container and issue the single catalog fetch
    pub async fn start(env: StorefrontEnvironment) -> Self {
        Self::start_with_capacity(env, DEFAULT_BROADCAST_CAPACITY).await
    }

    /// Like [`Storefront::start`], with a custom action broadcast capacity
    pub async fn start_with_capacity(env: StorefrontEnvironment, capacity: usize) -> Self {
        let store = Store::with_broadcast_capacity(
            StorefrontState::new(),
            StorefrontReducer::new(),
            env,
            capacity,
        );
        let _ = store.send(StorefrontAction::FetchEvents).await;
        Self { store }
    }

    /// Wait until the catalog fetch has settled
    ///
    /// # Errors
    ///
    /// [`StorefrontError::FetchFailure`] with the recorded message if the
    /// fetch failed.
    pub async fn wait_for_catalog(&self) -> Result<(), StorefrontError> {
        let mut rx = self.store.subscribe_actions();

        while self.store.state(|s| s.is_loading).await {
            match rx.recv().await {
                Ok(action) if action.settles_catalog() => break,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {},
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(StorefrontError::Store("action channel closed".to_string()));
                },
            }
        }

        self.store
            .state(|s| match &s.error {
                Some(error) => Err(StorefrontError::FetchFailure(error.clone())),
                None => Ok(()),
            })
            .await
    }

    /// Everything the presentation layer may read
    pub async fn snapshot(&self) -> StorefrontSnapshot {
        self.store.state(StorefrontState::snapshot).await
    }

    /// Select the event with `event_id`, or clear the selection if none matches
    pub async fn select(&self, event_id: impl Into<EventId>) {
        let _ = self
            .store
            .send(StorefrontAction::SelectEvent {
                event_id: event_id.into(),
            })
            .await;
    }

    /// Buy `quantity` tickets and wait for the result
    ///
    /// On success the catalog, the selection and the order have already been
    /// updated when this returns.
    ///
    /// # Errors
    ///
    /// Validation errors, [`StorefrontError::PurchaseInProgress`] or
    /// [`StorefrontError::PurchaseRemoteFailure`]. State is unchanged in
    /// every error case.
    #[tracing::instrument(skip(self, event_id))]
    pub async fn purchase(
        &self,
        event_id: impl Into<EventId>,
        quantity: i64,
    ) -> Result<PurchaseReceipt, StorefrontError> {
        let purchase_id = PurchaseId::new();
        let action = StorefrontAction::PurchaseTickets {
            purchase_id,
            event_id: event_id.into(),
            quantity,
        };

        let settled = self
            .store
            .send_and_wait_for(action, move |a| a.settles(purchase_id))
            .await
            .map_err(|e| StorefrontError::Store(e.to_string()))?;

        outcome_of(settled)
    }

    /// Start a purchase without waiting for it
    ///
    /// The purchase has been validated (and, if valid, submitted) when this
    /// returns. Use the handle to check whether it has settled or to await
    /// its outcome.
    pub async fn begin_purchase(
        &self,
        event_id: impl Into<EventId>,
        quantity: i64,
    ) -> PendingPurchase {
        let purchase_id = PurchaseId::new();

        let mut results = self
            .store
            .send_observed(StorefrontAction::PurchaseTickets {
                purchase_id,
                event_id: event_id.into(),
                quantity,
            })
            .await;

        let task = tokio::spawn(async move {
            while let Some(action) = results.recv().await {
                if action.settles(purchase_id) {
                    return outcome_of(action);
                }
            }
            Err(StorefrontError::Store(format!(
                "purchase {purchase_id} finished without a result"
            )))
        });

        PendingPurchase { purchase_id, task }
    }

    /// Forget the last order
    pub async fn reset_order(&self) {
        let _ = self.store.send(StorefrontAction::ResetOrder).await;
    }

    /// Observe actions produced by remote calls, after they have been applied
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorefrontAction> {
        self.store.subscribe_actions()
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront").finish_non_exhaustive()
    }
}

/// A purchase submitted with [`Storefront::begin_purchase`]
#[derive(Debug)]
pub struct PendingPurchase {
    purchase_id: PurchaseId,
    task: JoinHandle<Result<PurchaseReceipt, StorefrontError>>,
}

impl PendingPurchase {
    /// Correlation id of this purchase
    #[must_use]
    pub const fn purchase_id(&self) -> PurchaseId {
        self.purchase_id
    }

    /// Whether the purchase has settled, successfully or not
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the outcome
    ///
    /// # Errors
    ///
    /// Same as [`Storefront::purchase`].
    pub async fn outcome(self) -> Result<PurchaseReceipt, StorefrontError> {
        self.task
            .await
            .map_err(|e| StorefrontError::Store(e.to_string()))?
    }
}

fn outcome_of(action: StorefrontAction) -> Result<PurchaseReceipt, StorefrontError> {
    match action {
        StorefrontAction::TicketsPurchased { receipt, .. } => Ok(receipt),
        StorefrontAction::PurchaseRejected { error, .. }
        | StorefrontAction::PurchaseFailed { error, .. } => Err(error),
        other => Err(StorefrontError::Store(format!(
            "unexpected purchase settlement: {other:?}"
        ))),
    }
}
