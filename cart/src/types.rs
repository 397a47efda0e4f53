//! Core domain types for the storefront.
//!
//! Money is an exact fixed-point amount in minor units; every identifier is
//! a newtype over a UUID. Orders progress through states:
//! Pending → Processing → Shipped → Delivered, with cancellation as a side
//! exit while not yet shipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a product
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Creates a new random `ProductId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `ProductId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random `OrderId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an `OrderId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a customer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a new random `CustomerId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `CustomerId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a cart session
///
/// A session may belong to an authenticated customer or be anonymous; the
/// cart it owns is never shared with another session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random `SessionId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `SessionId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount in cents (to avoid floating point issues)
///
/// All currency arithmetic stays in integer minor units; floating point is
/// used for display only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a new money amount from cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new money amount from dollars (converted to cents)
    #[must_use]
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// The zero amount
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the value in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in dollars (as floating point)
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // i64 to f64 precision loss is acceptable for display
    pub fn dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.dollars())
    }
}

/// A product as the catalog presents it
///
/// The cart treats products as immutable: the price is captured into the
/// cart entry at add time and never re-read at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Current unit price
    pub price: Money,
    /// Whether the product can currently be purchased
    pub is_available: bool,
    /// When the product was listed
    pub created_at: DateTime<Utc>,
}

/// Shipping details captured at checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    /// Recipient full name
    pub full_name: String,
    /// Delivery address
    pub address: String,
    /// Contact phone number
    pub phone: String,
}

/// How an order is paid for
///
/// Payment-session creation happens after materialization, keyed off this
/// field; cash-on-delivery orders never touch the gateway.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Pay the courier on delivery
    CashOnDelivery,
    /// Pay by card through the payment gateway
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CashOnDelivery => write!(f, "cash on delivery"),
            Self::Card => write!(f, "card"),
        }
    }
}

/// Status of an order in its lifecycle
///
/// The happy path is forward-only: Pending → Processing → Shipped →
/// Delivered. Cancellation is a side exit available until the order ships.
/// Delivered and Cancelled are terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order created, payment/fulfilment not started
    Pending,
    /// Order accepted and being prepared
    Processing,
    /// Order handed to the carrier
    Shipped,
    /// Order received by the customer
    Delivered,
    /// Order cancelled before shipping
    Cancelled,
}

impl OrderStatus {
    /// Whether the status machine admits a transition to `next`
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Pending | Self::Processing, Self::Cancelled)
        )
    }

    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A single line item in an order
///
/// Quantity and price are copied verbatim from the cart snapshot at
/// purchase time and never change afterwards, independent of later product
/// price changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product this line refers to
    pub product_id: ProductId,
    /// Product name at purchase time
    pub name: String,
    /// Quantity ordered
    pub quantity: u32,
    /// Price per unit at purchase time
    pub price: Money,
}

impl OrderItem {
    /// Calculates the total price for this line item
    #[must_use]
    pub const fn line_total(&self) -> Money {
        Money::from_cents(self.price.cents() * self.quantity as i64)
    }
}

/// A persisted order
///
/// Created once, atomically, from a non-empty cart snapshot; `status` is
/// the only field that mutates afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier (assigned by the repository)
    pub id: OrderId,
    /// Customer who placed the order
    pub customer: CustomerId,
    /// When the order was created
    pub created_at: DateTime<Utc>,
    /// Total price at creation, equal to the sum of item line totals
    pub total: Money,
    /// Shipping details captured at checkout
    pub shipping: ShippingDetails,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// How the order is paid for
    pub payment_method: PaymentMethod,
    /// Line items, immutable once created
    pub items: Vec<OrderItem>,
}

/// An order about to be persisted
///
/// Orders are born Pending; the repository assigns the identifier when the
/// atomic multi-record write completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Customer placing the order
    pub customer: CustomerId,
    /// Creation timestamp from the injected clock
    pub created_at: DateTime<Utc>,
    /// Total price, exact sum of item line totals
    pub total: Money,
    /// Shipping details captured at checkout
    pub shipping: ShippingDetails,
    /// How the order will be paid for
    pub payment_method: PaymentMethod,
    /// Line items copied from the cart snapshot
    pub items: Vec<OrderItem>,
}
