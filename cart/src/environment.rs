//! External collaborator interfaces and the environment bundle.
//!
//! Everything the storefront core talks to (catalog, durable order
//! storage, wishlist, notification delivery, payment gateway, the clock)
//! is a trait here. The reducer and the services receive one
//! [`StorefrontEnvironment`] carrying `Arc`s of them all; production
//! implementations live outside this crate, test doubles in
//! `storefront-testing`.

use crate::error::{CatalogError, NotifyError, PaymentGatewayError, RepositoryError};
use crate::types::{
    CustomerId, Money, NewOrder, Order, OrderId, OrderStatus, Product, ProductId,
};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::environment::Clock;

/// Catalog lookup
///
/// Returns the product's current price and availability, or `NotFound` for
/// an unknown identifier.
pub trait Catalog: Send + Sync {
    /// Look up a product by identifier
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown identifier.
    fn product(&self, id: ProductId) -> BoxFuture<'static, Result<Product, CatalogError>>;
}

/// Durable order storage
///
/// `create` persists an order and all of its items as a single atomic
/// multi-record write: either everything is durable or nothing is.
pub trait OrderRepository: Send + Sync {
    /// Atomically persist a new order with its items, returning the
    /// assigned identifier
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::WriteFailed`] if the write did not
    /// complete; no partial records are observable afterwards.
    fn create(&self, order: NewOrder) -> BoxFuture<'static, Result<OrderId, RepositoryError>>;

    /// Fetch an order by identifier
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown identifier.
    fn order(&self, id: OrderId) -> BoxFuture<'static, Result<Order, RepositoryError>>;

    /// Fetch a customer's orders, most recent first
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::WriteFailed`] if the backing store is
    /// unavailable.
    fn history(&self, customer: CustomerId)
    -> BoxFuture<'static, Result<Vec<Order>, RepositoryError>>;

    /// Persist a status change for an existing order
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown identifier.
    fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> BoxFuture<'static, Result<(), RepositoryError>>;
}

/// Per-customer wishlist storage
///
/// `remove` is the cross-collaborator side effect of adding a product to
/// the cart: a carted product leaves the customer's wishlist.
pub trait WishlistStore: Send + Sync {
    /// Add a product to a customer's wishlist; returns false if it was
    /// already present
    fn add(
        &self,
        customer: CustomerId,
        product: ProductId,
        added_at: DateTime<Utc>,
    ) -> BoxFuture<'static, bool>;

    /// Remove a product from a customer's wishlist; returns true if an
    /// entry was removed
    fn remove(&self, customer: CustomerId, product: ProductId) -> BoxFuture<'static, bool>;

    /// Number of products on a customer's wishlist
    fn count(&self, customer: CustomerId) -> BoxFuture<'static, usize>;
}

/// A message dispatched to a customer on an order lifecycle transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The order has been handed to the carrier
    OrderShipped(Order),
    /// The order was cancelled before shipping
    OrderCancelled(Order),
}

/// Fire-and-forget notification delivery
///
/// Dispatch is best-effort and non-blocking: callers spawn it, log
/// failures, and never roll back the state change that triggered it.
pub trait Notifier: Send + Sync {
    /// Dispatch one notification
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Dispatch`] if the message could not be handed
    /// to the delivery channel; callers swallow this.
    fn notify(&self, notification: Notification) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// An opened payment session at the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Where to send the customer to complete payment
    pub redirect_url: String,
}

/// Payment gateway
///
/// Given an order total, opens a session and returns a redirect target for
/// completing payment. The verification callback that later updates the
/// order's status is an entirely external protocol.
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session for an order
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentGatewayError`] if the gateway declines or is
    /// unreachable.
    fn payment_session(
        &self,
        order_id: OrderId,
        amount: Money,
    ) -> BoxFuture<'static, Result<PaymentSession, PaymentGatewayError>>;
}

/// Environment for the storefront containing all injected dependencies
#[derive(Clone)]
pub struct StorefrontEnvironment {
    /// Product catalog
    pub catalog: Arc<dyn Catalog>,
    /// Durable order storage
    pub orders: Arc<dyn OrderRepository>,
    /// Per-customer wishlists
    pub wishlist: Arc<dyn WishlistStore>,
    /// Notification delivery
    pub notifier: Arc<dyn Notifier>,
    /// Payment gateway
    pub gateway: Arc<dyn PaymentGateway>,
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl StorefrontEnvironment {
    /// Creates a new environment bundle
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Catalog>,
        orders: Arc<dyn OrderRepository>,
        wishlist: Arc<dyn WishlistStore>,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            orders,
            wishlist,
            notifier,
            gateway,
            clock,
        }
    }
}
