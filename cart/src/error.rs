//! Error types for the storefront domain.
//!
//! `NotFound` and `EmptyCart` are recoverable at the boundary and surfaced
//! as user-visible messages; `InvalidTransition` is returned to the caller,
//! which owns UI messaging; persistence failures abort the whole operation
//! with no partial state retained. Notification failures are never fatal.

use crate::types::{OrderId, OrderStatus, ProductId};
use storefront_runtime::StoreError;
use thiserror::Error;

/// Errors from catalog lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No product with this identifier exists
    #[error("product {0} not found")]
    NotFound(ProductId),
}

/// Errors from the order repository
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No order with this identifier exists
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The atomic write did not complete; nothing was persisted
    #[error("write did not complete: {0}")]
    WriteFailed(String),
}

/// Errors from cart operations
#[derive(Error, Debug)]
pub enum CartError {
    /// The referenced product does not exist in the catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The session store refused the command
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from order materialization
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Checkout attempted with no items; the caller must not proceed to
    /// payment
    #[error("cannot place an order from an empty cart")]
    EmptyCart,

    /// The atomic order write failed; the cart is left intact
    #[error("order could not be persisted: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Errors from order lifecycle operations
#[derive(Error, Debug)]
pub enum OrderError {
    /// No order with this identifier exists
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The requested status change violates the order state machine
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition {
        /// Status the order currently holds
        from: OrderStatus,
        /// Status that was requested
        to: OrderStatus,
    },

    /// The status update could not be persisted
    #[error("order update could not be persisted: {0}")]
    Persistence(RepositoryError),

    /// The payment gateway refused to open a session
    #[error("payment session could not be created: {0}")]
    Payment(#[from] PaymentGatewayError),
}

impl From<RepositoryError> for OrderError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

/// Errors from notification dispatch
///
/// Always swallowed by callers: a failed notification never rolls back the
/// state change that triggered it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The message could not be handed to the delivery channel
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

/// Errors from the payment gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentGatewayError {
    /// The gateway declined to open a payment session
    #[error("payment declined: {reason}")]
    Declined {
        /// Decline reason as reported by the gateway
        reason: String,
    },

    /// The gateway did not answer in time
    #[error("payment gateway timeout")]
    Timeout,

    /// Any other gateway-side failure
    #[error("payment gateway error: {message}")]
    Other {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;

    #[test]
    fn repository_not_found_maps_to_order_not_found() {
        let id = OrderId::new();
        let err = OrderError::from(RepositoryError::NotFound(id));
        assert!(matches!(err, OrderError::NotFound(found) if found == id));
    }

    #[test]
    fn repository_write_failure_maps_to_persistence() {
        let err = OrderError::from(RepositoryError::WriteFailed("disk full".to_string()));
        assert!(matches!(err, OrderError::Persistence(_)));
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "order cannot move from Shipped to Cancelled");
    }
}
