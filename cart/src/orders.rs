//! Order lifecycle operations.
//!
//! Status changes are validated against the [`OrderStatus`] machine before
//! they are persisted. Shipping and cancelling dispatch a best-effort
//! notification to the customer: spawned, non-blocking, with failures
//! logged and swallowed. A lost notification never rolls back a transition.

use crate::environment::{
    Notification, Notifier, OrderRepository, PaymentGateway, PaymentSession,
    StorefrontEnvironment,
};
use crate::error::OrderError;
use crate::types::{CustomerId, Order, OrderId, OrderStatus, PaymentMethod};
use std::sync::Arc;

/// Imperative shell over the order repository, notifier and payment gateway
#[derive(Clone)]
pub struct OrderService {
    environment: StorefrontEnvironment,
}

impl OrderService {
    /// Creates a new order service
    #[must_use]
    pub const fn new(environment: StorefrontEnvironment) -> Self {
        Self { environment }
    }

    /// Fetch one order
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for an unknown identifier.
    pub async fn order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.environment
            .orders
            .order(id)
            .await
            .map_err(OrderError::from)
    }

    /// Fetch a customer's order history, most recent first
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Persistence`] if the repository is unavailable.
    pub async fn history(&self, customer: CustomerId) -> Result<Vec<Order>, OrderError> {
        self.environment
            .orders
            .history(customer)
            .await
            .map_err(OrderError::from)
    }

    /// Move an order to a new status
    ///
    /// Legal transitions are persisted; moving to `Shipped` or `Cancelled`
    /// additionally dispatches a notification to the customer.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] for an unknown identifier.
    /// - [`OrderError::InvalidTransition`] if the status machine does not
    ///   admit the edge; nothing is written.
    /// - [`OrderError::Persistence`] if the status write fails.
    #[tracing::instrument(skip(self), fields(%id, %next))]
    pub async fn update_status(&self, id: OrderId, next: OrderStatus) -> Result<(), OrderError> {
        let order = self
            .environment
            .orders
            .order(id)
            .await
            .map_err(OrderError::from)?;

        if !order.status.can_transition_to(next) {
            tracing::debug!(from = %order.status, "Rejected status change");
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        self.environment
            .orders
            .update_status(id, next)
            .await
            .map_err(OrderError::from)?;
        tracing::info!(from = %order.status, "Order status updated");

        let mut updated = order;
        updated.status = next;
        match next {
            OrderStatus::Shipped => self.dispatch(Notification::OrderShipped(updated)),
            OrderStatus::Cancelled => self.dispatch(Notification::OrderCancelled(updated)),
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Delivered => {},
        }

        Ok(())
    }

    /// Cancel an order on the customer's behalf
    ///
    /// Customer cancellation is stricter than the status machine: only
    /// orders still Pending may be cancelled by their owner. Staff paths
    /// (and payment callbacks) use [`Self::update_status`] directly, which
    /// also admits cancelling a Processing order.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] for an unknown identifier.
    /// - [`OrderError::InvalidTransition`] if the order is past Pending.
    /// - [`OrderError::Persistence`] if the status write fails.
    pub async fn cancel(&self, id: OrderId) -> Result<(), OrderError> {
        let order = self
            .environment
            .orders
            .order(id)
            .await
            .map_err(OrderError::from)?;

        if order.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        self.update_status(id, OrderStatus::Cancelled).await
    }

    /// Open a payment session for an order, if its payment method needs one
    ///
    /// Cash-on-delivery orders return `None`; card orders return the
    /// gateway's redirect target. A later, entirely external callback
    /// updates the order's status.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] for an unknown identifier.
    /// - [`OrderError::Payment`] if the gateway declines or is unreachable.
    pub async fn begin_payment(&self, id: OrderId) -> Result<Option<PaymentSession>, OrderError> {
        let order = self
            .environment
            .orders
            .order(id)
            .await
            .map_err(OrderError::from)?;

        match order.payment_method {
            PaymentMethod::CashOnDelivery => Ok(None),
            PaymentMethod::Card => {
                let session = self
                    .environment
                    .gateway
                    .payment_session(order.id, order.total)
                    .await?;
                Ok(Some(session))
            },
        }
    }

    /// Best-effort notification dispatch
    fn dispatch(&self, notification: Notification) {
        let notifier = Arc::clone(&self.environment.notifier);
        tokio::spawn(async move {
            if let Err(error) = notifier.notify(notification).await {
                tracing::warn!(%error, "Notification dispatch failed");
            }
        });
    }
}

