//! The storefront's request-facing boundary.
//!
//! One [`CartService`] per deployment: it resolves products through the
//! catalog, routes cart commands to the caller's session store, and hands
//! checkout to the materializer. Each method corresponds to one
//! user-visible operation.

use crate::cart::{CartCommand, CartLine, CartState, QuantityDelta};
use crate::checkout::place_order;
use crate::config::SessionConfig;
use crate::environment::{Catalog, StorefrontEnvironment, WishlistStore};
use crate::error::{CartError, CheckoutError};
use crate::sessions::CartSessions;
use crate::types::{CustomerId, Money, OrderId, PaymentMethod, ProductId, SessionId, ShippingDetails};
use serde::{Deserialize, Serialize};
use storefront_core::environment::Clock;

/// What the boundary reports back after an add-to-cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAddOutcome {
    /// Number of distinct products now in the cart
    pub cart_size: usize,
    /// Display name of the added product
    pub product_name: String,
    /// Unit price captured into the cart
    pub unit_price: Money,
}

/// A rendered view of one session's cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    /// One line per distinct product
    pub lines: Vec<CartLine>,
    /// Exact sum of all line totals
    pub total: Money,
}

/// What the boundary reports back after a wishlist change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistOutcome {
    /// Whether the wishlist actually changed (false e.g. when adding a
    /// product that was already listed)
    pub changed: bool,
    /// Number of products now on the wishlist
    pub count: usize,
    /// Display name of the product
    pub product_name: String,
}

/// Request-facing storefront operations over per-session cart stores
pub struct CartService {
    environment: StorefrontEnvironment,
    sessions: CartSessions,
}

impl CartService {
    /// Creates a new service with its own session registry
    #[must_use]
    pub fn new(environment: StorefrontEnvironment, config: SessionConfig) -> Self {
        let sessions = CartSessions::new(config, environment.clone());
        Self {
            environment,
            sessions,
        }
    }

    /// The underlying session registry
    #[must_use]
    pub const fn sessions(&self) -> &CartSessions {
        &self.sessions
    }

    /// Add one unit of a product to the session's cart
    ///
    /// Resolves the product through the catalog first, so the price is
    /// captured at add time; returns the updated cart size and the
    /// product's display data.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Catalog`] if the product does not exist; the
    /// cart is untouched.
    pub async fn add_to_cart(
        &self,
        session: SessionId,
        customer: Option<CustomerId>,
        product_id: ProductId,
    ) -> Result<CartAddOutcome, CartError> {
        let product = self.environment.catalog.product(product_id).await?;
        let product_name = product.name.clone();
        let unit_price = product.price;

        let store = self.sessions.session(session, customer).await;
        store.send(CartCommand::AddItem { product }).await?;
        let cart_size = store.state(CartState::len).await;

        Ok(CartAddOutcome {
            cart_size,
            product_name,
            unit_price,
        })
    }

    /// Remove a product's entry from the session's cart; absence is benign
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the session store refused the
    /// command.
    pub async fn remove_from_cart(
        &self,
        session: SessionId,
        product_id: ProductId,
    ) -> Result<(), CartError> {
        let store = self.sessions.session(session, None).await;
        store.send(CartCommand::RemoveItem { product_id }).await?;
        Ok(())
    }

    /// Step a product's quantity up or down; unknown products are a no-op
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] if the session store refused the
    /// command.
    pub async fn update_quantity(
        &self,
        session: SessionId,
        product_id: ProductId,
        delta: QuantityDelta,
    ) -> Result<(), CartError> {
        let command = match delta {
            QuantityDelta::Increase => CartCommand::IncreaseQuantity { product_id },
            QuantityDelta::Decrease => CartCommand::DecreaseQuantity { product_id },
        };

        let store = self.sessions.session(session, None).await;
        store.send(command).await?;
        Ok(())
    }

    /// A snapshot of the session's cart for rendering
    pub async fn cart_view(&self, session: SessionId) -> CartView {
        let store = self.sessions.session(session, None).await;
        store
            .state(|state| CartView {
                lines: state.lines().collect(),
                total: state.total(),
            })
            .await
    }

    /// Materialize the session's cart into an order
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if the cart holds no items.
    /// - [`CheckoutError::Persistence`] if the atomic write failed; the
    ///   cart is left intact.
    pub async fn checkout(
        &self,
        session: SessionId,
        customer: CustomerId,
        shipping: ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<OrderId, CheckoutError> {
        let store = self.sessions.session(session, Some(customer)).await;
        place_order(&store, &self.environment, customer, shipping, payment_method).await
    }

    /// Add a product to a customer's wishlist
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Catalog`] if the product does not exist.
    pub async fn add_to_wishlist(
        &self,
        customer: CustomerId,
        product_id: ProductId,
    ) -> Result<WishlistOutcome, CartError> {
        let product = self.environment.catalog.product(product_id).await?;
        let changed = self
            .environment
            .wishlist
            .add(customer, product_id, self.environment.clock.now())
            .await;
        let count = self.environment.wishlist.count(customer).await;

        Ok(WishlistOutcome {
            changed,
            count,
            product_name: product.name,
        })
    }

    /// Remove a product from a customer's wishlist
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Catalog`] if the product does not exist.
    pub async fn remove_from_wishlist(
        &self,
        customer: CustomerId,
        product_id: ProductId,
    ) -> Result<WishlistOutcome, CartError> {
        let product = self.environment.catalog.product(product_id).await?;
        let changed = self.environment.wishlist.remove(customer, product_id).await;
        let count = self.environment.wishlist.count(customer).await;

        Ok(WishlistOutcome {
            changed,
            count,
            product_name: product.name,
        })
    }
}

