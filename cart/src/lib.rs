//! # Storefront Cart
//!
//! The storefront domain: a session-backed shopping cart and the order
//! materialization logic built on top of it.
//!
//! The mutable pre-checkout basket is an explicit state value
//! ([`cart::CartState`]) driven by a command enum ([`cart::CartCommand`])
//! through a pure reducer. Checkout ([`checkout::place_order`]) converts a
//! non-empty cart snapshot into one immutable order with its line items in a
//! single atomic section, then clears the cart. Orders afterwards move
//! through a fixed status machine ([`types::OrderStatus`]) driven by
//! [`orders::OrderService`].
//!
//! External collaborators (catalog, persistence, wishlist, notifications,
//! payment gateway) are trait interfaces in [`environment`]; production
//! implementations live outside this crate, test doubles in
//! `storefront-testing`.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod environment;
pub mod error;
pub mod orders;
pub mod service;
pub mod sessions;
pub mod types;

pub use cart::{CartCommand, CartEntry, CartLine, CartReducer, CartState, QuantityDelta};
pub use checkout::{CartStore, place_order};
pub use config::SessionConfig;
pub use environment::{
    Catalog, Notification, Notifier, OrderRepository, PaymentGateway, PaymentSession,
    StorefrontEnvironment, WishlistStore,
};
pub use error::{
    CartError, CatalogError, CheckoutError, NotifyError, OrderError, PaymentGatewayError,
    RepositoryError,
};
pub use orders::OrderService;
pub use service::{CartAddOutcome, CartService, CartView, WishlistOutcome};
pub use sessions::CartSessions;
pub use types::{
    CustomerId, Money, NewOrder, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, Product,
    ProductId, SessionId, ShippingDetails,
};
